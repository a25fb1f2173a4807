// Backend calls as values: the session decides what to send, the UI runs it
// in the background and hands the Response back to the session.
use crate::app::api::TodoApi;
use crate::app::error::ClientError;
use crate::app::models::{NewTodoDraft, Suggestion, TodoItem};
use crate::app::session::Session;

#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    // `since` is the number of acknowledged mutations when the refresh was sent
    Refresh { since: u64 },
    Create(NewTodoDraft),
    Toggle(String),
    Delete(String),
    Suggest(String),
}

#[derive(Debug)]
pub enum Response {
    Refreshed {
        since: u64,
        result: Result<Vec<TodoItem>, ClientError>,
    },
    Created(Result<TodoItem, ClientError>),
    Toggled {
        id: String,
        result: Result<Option<TodoItem>, ClientError>,
    },
    Deleted {
        id: String,
        result: Result<(), ClientError>,
    },
    Suggested(Result<Vec<Suggestion>, ClientError>),
}

impl Request {
    // Performs exactly one backend call
    pub async fn execute(self, api: &dyn TodoApi) -> Response {
        match self {
            Request::Refresh { since } => Response::Refreshed {
                since,
                result: api.list_todos().await,
            },
            Request::Create(draft) => Response::Created(api.create_todo(&draft).await),
            Request::Toggle(id) => {
                let result = api.toggle_todo(&id).await;
                Response::Toggled { id, result }
            }
            Request::Delete(id) => {
                let result = api.delete_todo(&id).await;
                Response::Deleted { id, result }
            }
            Request::Suggest(context) => Response::Suggested(api.suggest(&context).await),
        }
    }
}

// Runs a request to completion and reconciles the session with its outcome
pub async fn dispatch(session: &mut Session, api: &dyn TodoApi, request: Request) {
    let response = request.execute(api).await;
    session.apply(response);
}
