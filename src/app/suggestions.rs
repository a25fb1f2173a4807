use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::app::models::Suggestion;
use crate::app::todo_edit::{insert_char_at, remove_char_at};

// Single line input holding the context sent to the suggestion endpoint.
// The text survives a request so it can be refined and sent again.
#[derive(Debug, Default)]
pub struct SuggestionPrompt {
    pub active: bool,
    text: String,
    cursor: usize,
}

impl SuggestionPrompt {
    pub fn open(&mut self) {
        self.active = true;
        self.cursor = self.text.chars().count();
    }

    pub fn close(&mut self) {
        self.active = false;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn input(&mut self, ch: char) {
        insert_char_at(&mut self.text, self.cursor, ch);
        self.cursor += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor > 0 {
            remove_char_at(&mut self.text, self.cursor - 1);
            self.cursor -= 1;
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }
}

// Read-only list of suggestions shown over the todo list
#[derive(Debug, Default)]
pub struct SuggestionOverlay {
    suggestions: Vec<Suggestion>,
    visible: bool,
}

impl SuggestionOverlay {
    pub fn show(&mut self, suggestions: Vec<Suggestion>) {
        self.suggestions = suggestions;
        self.visible = true;
    }

    // Hides the overlay and drops the suggestions
    pub fn close(&mut self) {
        self.suggestions.clear();
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }
}

pub fn get_prompt_ui(prompt: &SuggestionPrompt, pending: bool) -> Vec<Line<'static>> {
    const CURSOR: Style = Style::new().fg(Color::Black).bg(Color::White);

    let before: String = prompt.text.chars().take(prompt.cursor).collect();
    let under: String = prompt.text.chars().skip(prompt.cursor).take(1).collect();
    let after: String = prompt.text.chars().skip(prompt.cursor + 1).collect();

    let input = if prompt.text.is_empty() {
        Line::from(vec![
            Span::styled("E", CURSOR),
            Span::styled("nter a task description...", Style::new().fg(Color::Rgb(62, 62, 62))),
        ])
    } else {
        Line::from(vec![
            Span::raw(before),
            Span::styled(if under.is_empty() { " ".to_string() } else { under }, CURSOR),
            Span::raw(after),
        ])
    };

    let help = if pending {
        "Getting suggestions..."
    } else {
        "Enter - get suggestions, Esc - back"
    };

    vec![input, Line::raw(""), Line::raw(help)]
}

pub fn get_overlay_ui(overlay: &SuggestionOverlay) -> Vec<Line<'static>> {
    let mut text = Vec::new();

    if overlay.suggestions.is_empty() {
        text.push(Line::raw("No suggestions for this description."));
    }

    for suggestion in &overlay.suggestions {
        text.push(Line::from(Span::styled(
            suggestion.title.clone(),
            Style::new().add_modifier(Modifier::BOLD),
        )));
        if let Some(description) = suggestion.description.as_deref().filter(|d| !d.is_empty()) {
            text.push(Line::raw(format!("  {}", description)));
        }
        text.push(Line::raw(format!("  Priority: {}", suggestion.priority)));
        let due = match suggestion.due_date {
            Some(date) => date.format("%d.%m.%Y").to_string(),
            None => "-".to_string(),
        };
        text.push(Line::raw(format!("  Due Date: {}", due)));
        text.push(Line::raw(""));
    }

    text.push(Line::raw("Esc/Enter - close"));
    text
}
