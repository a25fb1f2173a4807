// Application state and the rules for reconciling it with the backend.
// Each user intent either returns the Request to send or is handled locally;
// `apply` changes the todos only when a call succeeded.
use crate::app::command::{Request, Response};
use crate::app::models::TodoItem;
use crate::app::suggestions::{SuggestionOverlay, SuggestionPrompt};
use crate::app::todo_edit::DraftFormState;
use crate::app::todo_list::TodoList;

pub const EMPTY_PROMPT_NOTICE: &str = "Please enter a task description";
pub const SUGGESTIONS_FAILED_NOTICE: &str = "Failed to get AI suggestions. Please try again later.";

// Outstanding requests per operation
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct InFlight {
    pub refresh: usize,
    pub create: usize,
    pub toggle: usize,
    pub delete: usize,
    pub suggest: usize,
}

impl InFlight {
    pub fn any(&self) -> bool {
        self.refresh + self.create + self.toggle + self.delete + self.suggest > 0
    }
}

#[derive(Debug, Default)]
pub struct Session {
    pub todos: TodoList,
    pub draft: DraftFormState,
    pub prompt: SuggestionPrompt,
    pub overlay: SuggestionOverlay,
    pending_delete: Option<String>,
    notice: Option<String>,
    in_flight: InFlight,
    // Mutations the backend has acknowledged so far
    acknowledged: u64,
}

impl Session {
    pub fn in_flight(&self) -> InFlight {
        self.in_flight
    }

    pub fn is_creating(&self) -> bool {
        self.in_flight.create > 0
    }

    pub fn is_suggesting(&self) -> bool {
        self.in_flight.suggest > 0
    }

    // Message that must be acknowledged before anything else happens
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn refresh(&mut self) -> Request {
        self.in_flight.refresh += 1;
        Request::Refresh {
            since: self.acknowledged,
        }
    }

    // Blank titles and a create already on its way are refused locally
    pub fn submit_draft(&mut self) -> Option<Request> {
        if self.is_creating() {
            return None;
        }
        let draft = self.draft.to_draft()?;
        self.in_flight.create += 1;
        Some(Request::Create(draft))
    }

    pub fn toggle_selected(&mut self) -> Option<Request> {
        let id = self.todos.get_selected()?.id.clone();
        Some(self.toggle(id))
    }

    pub fn toggle(&mut self, id: String) -> Request {
        self.in_flight.toggle += 1;
        Request::Toggle(id)
    }

    // Deleting needs a confirmation first; nothing is sent yet
    pub fn request_delete_selected(&mut self) {
        if let Some(id) = self.todos.get_selected().map(|todo| todo.id.clone()) {
            self.request_delete(id);
        }
    }

    pub fn request_delete(&mut self, id: String) {
        self.pending_delete = Some(id);
    }

    // The todo waiting for the user to confirm its deletion
    pub fn pending_delete(&self) -> Option<&TodoItem> {
        self.pending_delete.as_deref().and_then(|id| self.todos.get(id))
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.pending_delete().is_some()
    }

    pub fn confirm_delete(&mut self) -> Option<Request> {
        let id = self.pending_delete.take()?;
        if self.todos.get(&id).is_none() {
            return None;
        }
        self.in_flight.delete += 1;
        Some(Request::Delete(id))
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn request_suggestions(&mut self) -> Option<Request> {
        if self.is_suggesting() {
            return None;
        }
        if self.prompt.is_blank() {
            self.notice = Some(EMPTY_PROMPT_NOTICE.to_string());
            return None;
        }
        self.in_flight.suggest += 1;
        Some(Request::Suggest(self.prompt.text().to_string()))
    }

    pub fn close_suggestions(&mut self) {
        self.overlay.close();
    }

    // A confirmation for a todo that vanished from the list is dropped
    fn drop_stale_confirmation(&mut self) {
        if let Some(id) = self.pending_delete.as_deref() {
            if self.todos.get(id).is_none() {
                tracing::debug!(id, "Dropping delete confirmation for missing todo");
                self.pending_delete = None;
            }
        }
    }

    // Reconcile local state with the outcome of a backend call
    pub fn apply(&mut self, response: Response) {
        match response {
            Response::Refreshed { since, result } => {
                self.in_flight.refresh = self.in_flight.refresh.saturating_sub(1);
                match result {
                    // Taken before a mutation we already applied; it would undo it
                    Ok(todos) if since < self.acknowledged => {
                        tracing::info!(
                            count = todos.len(),
                            since,
                            acknowledged = self.acknowledged,
                            "Discarding stale todo list"
                        );
                    }
                    Ok(todos) => {
                        tracing::info!(count = todos.len(), "Loaded todos");
                        self.todos.replace_all(todos);
                        self.drop_stale_confirmation();
                    }
                    Err(e) => tracing::error!(error = %e, "Error fetching todos"),
                }
            }
            Response::Created(result) => {
                self.in_flight.create = self.in_flight.create.saturating_sub(1);
                match result {
                    Ok(todo) => {
                        tracing::info!(id = %todo.id, "Added todo");
                        self.acknowledged += 1;
                        self.todos.append(todo);
                        self.draft.clear();
                    }
                    // The draft stays in the form for another try
                    Err(e) => tracing::error!(error = %e, "Error adding todo"),
                }
            }
            Response::Toggled { id, result } => {
                self.in_flight.toggle = self.in_flight.toggle.saturating_sub(1);
                match result {
                    Ok(Some(updated)) if updated.id == id => {
                        self.acknowledged += 1;
                        tracing::info!(%id, completed = updated.completed, "Toggled todo");
                        self.todos.replace(updated);
                    }
                    Ok(_) => {
                        tracing::info!(%id, "Toggled todo");
                        self.acknowledged += 1;
                        self.todos.flip_completed(&id);
                    }
                    Err(e) => tracing::error!(%id, error = %e, "Error toggling todo"),
                }
            }
            Response::Deleted { id, result } => {
                self.in_flight.delete = self.in_flight.delete.saturating_sub(1);
                match result {
                    Ok(()) => {
                        tracing::info!(%id, "Deleted todo");
                        self.acknowledged += 1;
                        self.todos.remove(&id);
                        self.drop_stale_confirmation();
                    }
                    Err(e) => tracing::error!(%id, error = %e, "Error deleting todo"),
                }
            }
            Response::Suggested(result) => {
                self.in_flight.suggest = self.in_flight.suggest.saturating_sub(1);
                match result {
                    Ok(suggestions) => {
                        tracing::info!(count = suggestions.len(), "Received suggestions");
                        self.prompt.close();
                        self.overlay.show(suggestions);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Error getting AI suggestions");
                        self.notice = Some(SUGGESTIONS_FAILED_NOTICE.to_string());
                    }
                }
            }
        }
    }
}
