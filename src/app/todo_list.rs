use chrono::{Duration, NaiveDate};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::*;

use crate::app::models::{Priority, TodoItem};

// Possible todo list sorting orders
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SortedBy {
    ByDueDate,
    ByName,
    ByPriority,
}

// Local copy of the backend's todos plus the view state of the list widget
#[derive(Debug, Default)]
pub struct TodoList {
    pub state: ListState,
    pub items: Vec<TodoItem>,
    sorted_by: Option<SortedBy>,
    reversed: bool,
}

impl TodoList {
    pub fn with_items(items: Vec<TodoItem>) -> TodoList {
        TodoList {
            items,
            ..TodoList::default()
        }
    }

    // Replace the whole collection with a fresh copy from the backend
    pub fn replace_all(&mut self, items: Vec<TodoItem>) {
        self.items = items;
        if let Some(sorted_by) = self.sorted_by {
            self.sort_items(sorted_by);
            if self.reversed {
                self.items.reverse();
            }
        }
        self.clamp_selection();
    }

    pub fn append(&mut self, item: TodoItem) {
        self.items.push(item);
    }

    // Flip the completion flag of one todo; false if it is not in the list
    pub fn flip_completed(&mut self, id: &str) -> bool {
        match self.find_mut(id) {
            Some(todo) => {
                todo.completed = !todo.completed;
                true
            }
            None => false,
        }
    }

    // Overwrite a todo with the copy the backend acknowledged
    pub fn replace(&mut self, updated: TodoItem) -> bool {
        match self.find_mut(&updated.id) {
            Some(todo) => {
                *todo = updated;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<TodoItem> {
        let index = self.items.iter().position(|todo| todo.id == id)?;
        let removed = self.items.remove(index);
        self.clamp_selection();
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<&TodoItem> {
        self.items.iter().find(|todo| todo.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut TodoItem> {
        self.items.iter_mut().find(|todo| todo.id == id)
    }

    // Move the selection to the next item
    pub fn next(&mut self) {
        let i = match self.state.selected() {
            Some(i) if !self.items.is_empty() && i < self.items.len() - 1 => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    // Move the selection to the previous item
    pub fn previous(&mut self) {
        let i = match self.state.selected() {
            Some(0) | None => self.items.len().saturating_sub(1),
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn unselect(&mut self) {
        self.state.select(None);
    }

    pub fn get_selected(&self) -> Option<&TodoItem> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    fn clamp_selection(&mut self) {
        match self.state.selected() {
            Some(_) if self.items.is_empty() => self.state.select(None),
            Some(i) if i >= self.items.len() => self.state.select(Some(self.items.len() - 1)),
            _ => {}
        }
    }

    pub fn get_uncompleted(&self) -> Vec<&TodoItem> {
        self.items.iter().filter(|todo| !todo.completed).collect()
    }

    // Open todos due within seven days of `today`, late ones included
    pub fn get_due_next_week(&self, today: NaiveDate) -> Vec<&TodoItem> {
        let next_week = today + Duration::weeks(1);
        self.open_due_before(next_week)
    }

    pub fn get_late(&self, today: NaiveDate) -> Vec<&TodoItem> {
        self.open_due_before(today)
    }

    fn open_due_before(&self, limit: NaiveDate) -> Vec<&TodoItem> {
        self.items
            .iter()
            .filter(|todo| !todo.completed && todo.due_date.is_some_and(|due| due < limit))
            .collect()
    }

    // Sort the items by the given order; the same order twice reverses it
    pub fn set_sort(&mut self, sorted_by: SortedBy) {
        if self.sorted_by == Some(sorted_by) {
            self.items.reverse();
            self.reversed = !self.reversed;
        } else {
            self.sort_items(sorted_by);
            self.reversed = false;
        }
        self.sorted_by = Some(sorted_by);
    }

    fn sort_items(&mut self, sorted_by: SortedBy) {
        match sorted_by {
            SortedBy::ByName => self.items.sort_by(|a, b| a.title.cmp(&b.title)),
            // Highest priority first
            SortedBy::ByPriority => self.items.sort_by(|a, b| b.priority.cmp(&a.priority)),
            // Undated todos go last
            SortedBy::ByDueDate => self.items.sort_by_key(|todo| (todo.due_date.is_none(), todo.due_date)),
        }
    }
}

// Build the UI (list) for the todos
pub fn get_list_items_ui(todos: &[TodoItem]) -> Vec<ListItem<'_>> {
    todos
        .iter()
        .map(|todo| {
            let title_color = match todo.priority {
                Priority::Low => Color::White,
                Priority::Medium => Color::Yellow,
                Priority::High => Color::Red,
            };

            let mut title = Span::from(todo.title.as_str()).fg(title_color);
            if todo.completed {
                title = title.crossed_out().dim();
            }

            let mut lines = vec![Line::from(vec![
                Span::from(if todo.completed { "[✓] " } else { "[ ] " }),
                title,
            ])];

            let due = match todo.due_date {
                Some(date) => date.format("%d.%m.%Y").to_string(),
                None => "-".to_string(),
            };
            lines.push(Line::from(vec![
                Span::from(format!("    Due: {}", due)),
                Span::from(format!(" Priority: {}", todo.priority)),
            ]));

            if let Some(description) = todo.description.as_deref().filter(|d| !d.is_empty()) {
                lines.push(Line::from(Span::styled(
                    format!("    {}", description),
                    Style::default().fg(Color::Gray),
                )));
            }

            ListItem::new(lines).style(Style::default().fg(Color::White))
        })
        .collect()
}

// Build the UI (lines) for statistics infobox
pub fn get_statistics_ui<'a>(list: &TodoList, today: NaiveDate) -> Vec<Line<'a>> {
    vec![
        Line::from(format!("Total todos: {}", list.items.len())),
        Line::from(format!("Uncompleted: {}", list.get_uncompleted().len())),
        Line::from(format!("Due next week: {}", list.get_due_next_week(today).len())),
        Line::from(format!("Late: {}", list.get_late(today).len())),
    ]
}

// Build the UI (lines) for instructions infobox
pub fn get_instructions_ui<'a>() -> Vec<Line<'a>> {
    vec![
        "Enter - toggle do/done".into(),
        "a - add a todo".into(),
        "x - delete a todo".into(),
        "s - ask for AI suggestions".into(),
        "r - reload from server".into(),
        "d - sort by due date".into(),
        "f - sort by name".into(),
        "g - sort by priority".into(),
        "q - quit".into(),
    ]
}

#[cfg(test)]
pub(crate) fn todo(id: &str, title: &str, due: Option<(i32, u32, u32)>) -> TodoItem {
    TodoItem {
        id: id.into(),
        title: title.into(),
        description: None,
        priority: Priority::Medium,
        due_date: due.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        completed: false,
    }
}
