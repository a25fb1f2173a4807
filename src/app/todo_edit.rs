use chrono::NaiveDate;
use derivative::Derivative;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::app::models::{NewTodoDraft, Priority};

pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

const TITLE: usize = 0;
const DESCRIPTION: usize = 1;
const DUE_DATE: usize = 2;
const PRIORITY: usize = 3;

// State object for the new todo dialog
// Keeps track of whether the dialog is open, the cursor and the draft being typed
#[derive(Debug, Default)]
pub struct DraftFormState {
    pub dialog_active: bool,
    content: DraftContent,
    error_message: Option<String>,
    // (char offset, field)
    cursor_position: (usize, usize),
}

// Raw text of the fields; the due date is only parsed on submit
#[derive(Debug, Derivative)]
#[derivative(Default)]
struct DraftContent {
    title: String,
    description: String,
    due_date: String,
    #[derivative(Default(value = "Priority::Medium"))]
    priority: Priority,
}

impl DraftFormState {
    // Opens the dialog; a draft kept from a failed submission stays filled in
    pub fn open(&mut self) {
        self.dialog_active = true;
        self.cursor_position = (self.field_len(TITLE), TITLE);
    }

    // Closes the dialog and throws the draft away
    pub fn cancel(&mut self) {
        *self = DraftFormState::default();
    }

    // Called once the backend stored the draft
    pub fn clear(&mut self) {
        self.cancel();
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    // Submission is disabled while the title has no visible characters
    pub fn can_submit(&self) -> bool {
        !self.content.title.trim().is_empty()
    }

    // Builds the draft to send. None when the form cannot be submitted yet.
    pub fn to_draft(&mut self) -> Option<NewTodoDraft> {
        if !self.can_submit() {
            return None;
        }

        let due_date = match self.content.due_date.trim() {
            "" => None,
            raw => match NaiveDate::parse_from_str(raw, DUE_DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    self.error_message = Some("Due date should be in format yyyy-mm-dd".to_string());
                    return None;
                }
            },
        };

        // Text goes out as typed; only the emptiness checks look past whitespace
        let description = &self.content.description;
        self.error_message = None;
        Some(NewTodoDraft {
            title: self.content.title.clone(),
            description: (!description.trim().is_empty()).then(|| description.clone()),
            priority: self.content.priority,
            due_date,
        })
    }

    // Move the cursor one field below, keeping the column when possible
    pub fn move_cursor_down(&mut self) {
        let (x, y) = self.cursor_position;
        let y = (y + 1).min(PRIORITY);
        self.cursor_position = (x.min(self.field_len(y)), y);
    }

    // Move the cursor one field above, keeping the column when possible
    pub fn move_cursor_up(&mut self) {
        let (x, y) = self.cursor_position;
        let y = y.saturating_sub(1);
        self.cursor_position = (x.min(self.field_len(y)), y);
    }

    pub fn move_cursor_left(&mut self) {
        let (x, y) = self.cursor_position;
        if y == PRIORITY {
            // Priority is picked, not typed
            self.content.priority = self.content.priority.next().next();
            return;
        }
        self.cursor_position = (x.saturating_sub(1), y);
    }

    pub fn move_cursor_right(&mut self) {
        let (x, y) = self.cursor_position;
        if y == PRIORITY {
            self.content.priority = self.content.priority.next();
            return;
        }
        self.cursor_position = ((x + 1).min(self.field_len(y)), y);
    }

    // Delete the char before the cursor
    pub fn delete_char(&mut self) {
        let (x, y) = self.cursor_position;
        if x == 0 {
            return;
        }
        if let Some(field) = self.text_field_mut(y) {
            remove_char_at(field, x - 1);
            self.cursor_position = (x - 1, y);
        }
    }

    // Handles a typed char by inserting it into the field under the cursor
    pub fn input(&mut self, to_insert: char) {
        let (x, y) = self.cursor_position;
        if y == PRIORITY {
            match to_insert {
                'l' | 'L' => self.content.priority = Priority::Low,
                'm' | 'M' => self.content.priority = Priority::Medium,
                'h' | 'H' => self.content.priority = Priority::High,
                ' ' => self.content.priority = self.content.priority.next(),
                _ => {}
            }
            return;
        }
        if let Some(field) = self.text_field_mut(y) {
            insert_char_at(field, x, to_insert);
            self.cursor_position = (x + 1, y);
        }
    }

    fn text_field_mut(&mut self, y: usize) -> Option<&mut String> {
        match y {
            TITLE => Some(&mut self.content.title),
            DESCRIPTION => Some(&mut self.content.description),
            DUE_DATE => Some(&mut self.content.due_date),
            _ => None,
        }
    }

    // Maps the vertical cursor position to the displayed value of that field
    fn field_value(&self, y: usize) -> String {
        match y {
            TITLE => self.content.title.clone(),
            DESCRIPTION => self.content.description.clone(),
            DUE_DATE => self.content.due_date.clone(),
            PRIORITY => self.content.priority.to_string(),
            _ => String::new(),
        }
    }

    fn field_len(&self, y: usize) -> usize {
        self.field_value(y).chars().count()
    }
}

pub(crate) fn insert_char_at(text: &mut String, char_index: usize, ch: char) {
    let byte_index = text
        .char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    text.insert(byte_index, ch);
}

pub(crate) fn remove_char_at(text: &mut String, char_index: usize) {
    if let Some((byte_index, _)) = text.char_indices().nth(char_index) {
        text.remove(byte_index);
    }
}

// Returns the UI content for the new todo dialog
pub fn get_draft_edit_ui(form: &DraftFormState, submitting: bool) -> Vec<Line<'static>> {
    const GRAY_TEXT: Style = Style::new().fg(Color::Rgb(62, 62, 62));
    const WHITE_TEXT: Style = Style::new().fg(Color::White);
    const BLACK_ON_WHITE: Style = Style::new().fg(Color::Black).bg(Color::White);

    let fields = [
        ("Title:       ", "My todo title", TITLE),
        ("Description: ", "Add a description...", DESCRIPTION),
        ("Due date:    ", "2024-11-23", DUE_DATE),
        ("Priority:    ", "medium", PRIORITY),
    ];
    let (cursor_x, cursor_y) = form.cursor_position;
    let mut text = Vec::new();

    for (prefix, placeholder, y) in fields {
        let value = form.field_value(y);
        let mut spans = vec![Span::styled(prefix, WHITE_TEXT)];

        if y != cursor_y {
            if value.is_empty() {
                spans.push(Span::styled(placeholder, GRAY_TEXT));
            } else {
                spans.push(Span::styled(value, WHITE_TEXT));
            }
        } else if y == PRIORITY {
            spans.push(Span::styled(format!("< {} >", value), BLACK_ON_WHITE));
        } else if value.is_empty() {
            // First placeholder char doubles as the cursor
            spans.push(Span::styled(placeholder.chars().take(1).collect::<String>(), BLACK_ON_WHITE));
            spans.push(Span::styled(placeholder.chars().skip(1).collect::<String>(), GRAY_TEXT));
        } else {
            spans.push(Span::styled(value.chars().take(cursor_x).collect::<String>(), WHITE_TEXT));
            let under_cursor: String = value.chars().skip(cursor_x).take(1).collect();
            if under_cursor.is_empty() {
                spans.push(Span::styled(" ", BLACK_ON_WHITE));
            } else {
                spans.push(Span::styled(under_cursor, BLACK_ON_WHITE));
            }
            spans.push(Span::styled(value.chars().skip(cursor_x + 1).collect::<String>(), WHITE_TEXT));
        }

        text.push(Line::from(spans));
    }

    text.push(Line::raw(""));

    if let Some(error_message) = form.error_message() {
        text.push(Line::from(Span::styled(
            error_message.to_string(),
            Style::new().fg(Color::Red),
        )));
        text.push(Line::raw(""));
    }

    let help = if submitting {
        "Adding..."
    } else if form.can_submit() {
        "Enter - add todo, Esc - cancel"
    } else {
        "Enter a title to add the todo, Esc - cancel"
    };
    text.push(Line::from(Span::styled(help, WHITE_TEXT)));

    text
}
