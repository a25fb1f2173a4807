use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{prelude::*, widgets::*};
use std::{
    io,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::app::api::TodoApi;
use crate::app::command::{Request, Response};
use crate::app::session::Session;
use crate::app::suggestions::{get_overlay_ui, get_prompt_ui};
use crate::app::todo_edit::get_draft_edit_ui;
use crate::app::todo_list::*;

pub struct App {
    pub session: Session,
    api: Arc<dyn TodoApi>,
    runtime: Handle,
    responses_tx: UnboundedSender<Response>,
    responses_rx: UnboundedReceiver<Response>,
}

impl App {
    pub fn new(api: Arc<dyn TodoApi>, runtime: Handle) -> App {
        let (responses_tx, responses_rx) = mpsc::unbounded_channel();
        App {
            session: Session::default(),
            api,
            runtime,
            responses_tx,
            responses_rx,
        }
    }

    // Run the request in the background; its Response comes back through the channel
    fn send(&self, request: Request) {
        tracing::debug!(?request, "Sending request");
        let api = Arc::clone(&self.api);
        let responses = self.responses_tx.clone();
        self.runtime.spawn(async move {
            let response = request.execute(api.as_ref()).await;
            // Only fails once the UI loop has exited
            let _ = responses.send(response);
        });
    }

    fn send_if(&self, request: Option<Request>) {
        if let Some(request) = request {
            self.send(request);
        }
    }

    // Apply every finished request; state is only mutated on the UI thread
    fn drain_responses(&mut self) {
        while let Ok(response) = self.responses_rx.try_recv() {
            self.session.apply(response);
        }
    }

    // Handle one key press. Returns false when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let session = &mut self.session;

        if session.notice().is_some() {
            // The notice swallows every key until acknowledged
            if matches!(code, KeyCode::Enter | KeyCode::Esc) {
                session.dismiss_notice();
            }
            return true;
        }

        if session.is_confirming_delete() {
            match code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    let request = session.confirm_delete();
                    self.send_if(request);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => session.cancel_delete(),
                _ => {}
            }
            return true;
        }

        if session.overlay.is_visible() {
            if matches!(code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) {
                session.close_suggestions();
            }
            return true;
        }

        if session.draft.dialog_active {
            // Handle input for the new todo dialog
            match code {
                KeyCode::Down => session.draft.move_cursor_down(),
                KeyCode::Up => session.draft.move_cursor_up(),
                KeyCode::Esc => session.draft.cancel(),
                KeyCode::Enter => {
                    let request = session.submit_draft();
                    self.send_if(request);
                }
                KeyCode::Left => session.draft.move_cursor_left(),
                KeyCode::Right => session.draft.move_cursor_right(),
                KeyCode::Backspace => session.draft.delete_char(),
                KeyCode::Char(to_insert) => session.draft.input(to_insert),
                _ => {}
            }
            return true;
        }

        if session.prompt.active {
            // Handle input for the suggestion prompt
            match code {
                KeyCode::Esc => session.prompt.close(),
                KeyCode::Enter => {
                    let request = session.request_suggestions();
                    self.send_if(request);
                }
                KeyCode::Left => session.prompt.move_cursor_left(),
                KeyCode::Right => session.prompt.move_cursor_right(),
                KeyCode::Backspace => session.prompt.delete_char(),
                KeyCode::Char(to_insert) => session.prompt.input(to_insert),
                _ => {}
            }
            return true;
        }

        // Handle input for the todo list navigation, sorting and state change
        match code {
            KeyCode::Char('q') => return false,
            KeyCode::Char('x') => session.request_delete_selected(),
            KeyCode::Left => session.todos.unselect(),
            KeyCode::Down => session.todos.next(),
            KeyCode::Up => session.todos.previous(),
            KeyCode::Char('a') => session.draft.open(),
            KeyCode::Char('s') => session.prompt.open(),
            KeyCode::Char('r') => {
                let request = session.refresh();
                self.send(request);
            }
            KeyCode::Char('d') => session.todos.set_sort(SortedBy::ByDueDate),
            KeyCode::Char('f') => session.todos.set_sort(SortedBy::ByName),
            KeyCode::Char('g') => session.todos.set_sort(SortedBy::ByPriority),
            KeyCode::Enter => {
                let request = session.toggle_selected();
                self.send_if(request);
            }
            _ => {}
        }
        true
    }
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    tick_rate: Duration,
) -> io::Result<()> {
    let request = app.session.refresh();
    app.send(request);

    let mut last_tick = Instant::now();
    loop {
        app.drain_responses();
        terminal.draw(|f| draw_ui(f, &mut app.session))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && !app.handle_key(key.code) {
                    return Ok(());
                }
            }
        }
        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }
}

// Draws the whole user interface
fn draw_ui(f: &mut Frame, session: &mut Session) {
    let today = Local::now().date_naive();

    // Create two chunks of screen in 60-40 ratio
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(f.size());

    // DRAW LEFT PART
    let title = if session.in_flight().any() {
        "Todos (syncing...)"
    } else {
        "Todos"
    };
    let todo_list = List::new(get_list_items_ui(session.todos.items.as_slice()))
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    f.render_stateful_widget(todo_list, chunks[0], &mut session.todos.state);

    // DRAW RIGHT PART
    if session.draft.dialog_active {
        let new_todo = Paragraph::new(get_draft_edit_ui(&session.draft, session.is_creating()))
            .block(Block::new().title("Add Todo").borders(Borders::ALL))
            .style(Style::new().white());
        f.render_widget(new_todo, chunks[1]);
    } else if session.prompt.active {
        let prompt = Paragraph::new(get_prompt_ui(&session.prompt, session.is_suggesting()))
            .block(Block::new().title("AI Suggestions").borders(Borders::ALL))
            .style(Style::new().white())
            .wrap(Wrap { trim: false });
        f.render_widget(prompt, chunks[1]);
    } else {
        // Otherwise display instructions and statistics in vertically split layout
        let right_side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        let instructions = Paragraph::new(get_instructions_ui())
            .block(Block::new().title("Commands").borders(Borders::ALL))
            .style(Style::new().white());

        let statistics = Paragraph::new(get_statistics_ui(&session.todos, today))
            .block(Block::new().title("Statistics").borders(Borders::ALL))
            .style(Style::new().white());

        f.render_widget(instructions, right_side[0]);
        f.render_widget(statistics, right_side[1]);
    }

    // OVERLAYS
    if session.overlay.is_visible() {
        let area = centered_rect(70, 70, f.size());
        let overlay = Paragraph::new(get_overlay_ui(&session.overlay))
            .block(Block::new().title("Suggested Todos").borders(Borders::ALL))
            .style(Style::new().white())
            .wrap(Wrap { trim: false });
        f.render_widget(Clear, area);
        f.render_widget(overlay, area);
    }

    if let Some(todo) = session.pending_delete() {
        let area = centered_rect(50, 20, f.size());
        let question = Paragraph::new(vec![
            Line::raw(format!("Delete \"{}\"?", todo.title)),
            Line::raw(""),
            Line::raw("y - delete, n - keep"),
        ])
        .block(Block::new().title("Confirm").borders(Borders::ALL))
        .style(Style::new().white())
        .wrap(Wrap { trim: false });
        f.render_widget(Clear, area);
        f.render_widget(question, area);
    }

    if let Some(notice) = session.notice() {
        let area = centered_rect(50, 20, f.size());
        let notice = Paragraph::new(vec![
            Line::raw(notice.to_string()),
            Line::raw(""),
            Line::raw("Enter - OK"),
        ])
        .block(Block::new().title("Notice").borders(Borders::ALL))
        .style(Style::new().yellow())
        .wrap(Wrap { trim: false });
        f.render_widget(Clear, area);
        f.render_widget(notice, area);
    }
}

// Rectangle of the given percentage size in the middle of `area`
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
