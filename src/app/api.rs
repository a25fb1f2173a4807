// Communication with the todo backend over HTTP
// One method per endpoint; every non-2xx answer becomes ClientError::Status
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::app::error::{ClientError, ConfigError};
use crate::app::models::{NewTodoDraft, Suggestion, SuggestionRequest, TodoItem};

#[async_trait]
pub trait TodoApi: Send + Sync + 'static {
    async fn list_todos(&self) -> Result<Vec<TodoItem>, ClientError>;
    async fn create_todo(&self, draft: &NewTodoDraft) -> Result<TodoItem, ClientError>;
    // Some backends answer with the updated todo, others with nothing useful
    async fn toggle_todo(&self, id: &str) -> Result<Option<TodoItem>, ClientError>;
    async fn delete_todo(&self, id: &str) -> Result<(), ClientError>;
    async fn suggest(&self, context: &str) -> Result<Vec<Suggestion>, ClientError>;
}

pub struct HttpTodoApi {
    client: Client,
    base_url: Url,
}

impl HttpTodoApi {
    pub fn new(base_url: &str) -> Result<HttpTodoApi, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidApiUrl {
            url: base_url.to_string(),
            reason,
        };
        let base_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("cannot be a base url".into()));
        }
        Ok(HttpTodoApi {
            client: Client::new(),
            base_url,
        })
    }

    // Appends `/api/<segments>` to the base url, percent-encoding each segment
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    // Url for one todo; ids that would change the meaning of the path are refused
    fn todo_url(&self, id: &str, action: Option<&str>) -> Result<Url, ClientError> {
        if matches!(id, "" | "." | "..") {
            return Err(ClientError::InvalidId(id.to_string()));
        }
        let mut segments = vec!["todos", id];
        segments.extend(action);
        Ok(self.url(&segments))
    }
}

#[async_trait]
impl TodoApi for HttpTodoApi {
    async fn list_todos(&self) -> Result<Vec<TodoItem>, ClientError> {
        let response = self.client.get(self.url(&["todos"])).send().await?;
        decode(response).await
    }

    async fn create_todo(&self, draft: &NewTodoDraft) -> Result<TodoItem, ClientError> {
        let response = self
            .client
            .post(self.url(&["todos"]))
            .json(draft)
            .send()
            .await?;
        decode(response).await
    }

    async fn toggle_todo(&self, id: &str) -> Result<Option<TodoItem>, ClientError> {
        let response = self
            .client
            .put(self.todo_url(id, Some("toggle"))?)
            .send()
            .await?;
        let body = success_body(response).await?;

        match serde_json::from_str::<TodoItem>(&body) {
            Ok(todo) => Ok(Some(todo)),
            Err(e) => {
                tracing::debug!(id, error = %e, "toggle response carried no todo");
                Ok(None)
            }
        }
    }

    async fn delete_todo(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.todo_url(id, None)?)
            .send()
            .await?;
        success_body(response).await?;
        Ok(())
    }

    async fn suggest(&self, context: &str) -> Result<Vec<Suggestion>, ClientError> {
        let response = self
            .client
            .post(self.url(&["ai", "suggestions"]))
            .json(&SuggestionRequest { context })
            .send()
            .await?;
        decode(response).await
    }
}

// Read the body of a 2xx response, or turn the response into a status error
async fn success_body(response: Response) -> Result<String, ClientError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ClientError::Status { status, body });
    }
    Ok(body)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let body = success_body(response).await?;
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::Priority;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_todo(id: &str, completed: bool) -> serde_json::Value {
        json!({
            "_id": id,
            "title": "Water plants",
            "description": "",
            "priority": "low",
            "dueDate": "2024-06-01T00:00:00.000Z",
            "completed": completed
        })
    }

    #[tokio::test]
    async fn lists_todos() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/todos"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([backend_todo("a", false), backend_todo("b", true)])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpTodoApi::new(&server.uri()).unwrap();
        let todos = api.list_todos().await.unwrap();

        assert_eq!(todos.len(), 2);
        assert_eq!(todos[0].id, "a");
        assert_eq!(todos[1].completed, true);
        assert_eq!(todos[0].due_date, NaiveDate::from_ymd_opt(2024, 6, 1));
    }

    #[tokio::test]
    async fn create_posts_the_draft_and_returns_the_stored_todo() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/todos"))
            .and(body_json(json!({
                "title": "Water plants",
                "priority": "high",
                "dueDate": "2024-06-01"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(backend_todo("new-id", false)))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpTodoApi::new(&format!("{}/", server.uri())).unwrap();
        let draft = NewTodoDraft {
            title: "Water plants".into(),
            description: None,
            priority: Priority::High,
            due_date: NaiveDate::from_ymd_opt(2024, 6, 1),
        };

        let created = api.create_todo(&draft).await.unwrap();
        assert_eq!(created.id, "new-id");
    }

    #[tokio::test]
    async fn toggle_returns_server_copy_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/todos/a/toggle"))
            .respond_with(ResponseTemplate::new(200).set_body_json(backend_todo("a", true)))
            .mount(&server)
            .await;

        let api = HttpTodoApi::new(&server.uri()).unwrap();
        let updated = api.toggle_todo("a").await.unwrap();
        assert_eq!(updated.map(|todo| todo.completed), Some(true));
    }

    #[tokio::test]
    async fn toggle_tolerates_an_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/todos/a/toggle"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let api = HttpTodoApi::new(&server.uri()).unwrap();
        assert_eq!(api.toggle_todo("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_ignores_the_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/todos/a"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"message\":\"deleted\"}"))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpTodoApi::new(&server.uri()).unwrap();
        api.delete_todo("a").await.unwrap();
    }

    #[tokio::test]
    async fn suggest_sends_context() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/ai/suggestions"))
            .and(body_json(json!({ "context": "plan a trip" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "title": "Book flights", "description": "Compare prices", "priority": "high", "dueDate": "2024-07-01" },
                { "title": "Pack", "priority": "low", "dueDate": null }
            ])))
            .mount(&server)
            .await;

        let api = HttpTodoApi::new(&server.uri()).unwrap();
        let suggestions = api.suggest("plan a trip").await.unwrap();

        assert_eq!(
            suggestions,
            vec![
                Suggestion {
                    title: "Book flights".into(),
                    description: Some("Compare prices".into()),
                    priority: Priority::High,
                    due_date: NaiveDate::from_ymd_opt(2024, 7, 1),
                },
                Suggestion {
                    title: "Pack".into(),
                    description: None,
                    priority: Priority::Low,
                    due_date: None,
                },
            ]
        );
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/todos/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let api = HttpTodoApi::new(&server.uri()).unwrap();
        match api.delete_todo("missing").await {
            Err(ClientError::Status { status, body }) => {
                assert_eq!(status.as_u16(), 404);
                assert_eq!(body, "not found");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_payload_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
            .mount(&server)
            .await;

        let api = HttpTodoApi::new(&server.uri()).unwrap();
        assert!(matches!(api.list_todos().await, Err(ClientError::Decode(_))));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let api = HttpTodoApi::new("http://127.0.0.1:9").unwrap();
        assert!(matches!(api.list_todos().await, Err(ClientError::Transport(_))));
    }

    #[tokio::test]
    async fn ids_are_sent_as_a_single_path_segment() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/todos/a%3Fb/toggle"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/todos/x%2Fy"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpTodoApi::new(&server.uri()).unwrap();
        assert_eq!(api.toggle_todo("a?b").await.unwrap(), None);
        api.delete_todo("x/y").await.unwrap();
    }

    #[tokio::test]
    async fn dot_segment_ids_are_refused_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let api = HttpTodoApi::new(&server.uri()).unwrap();
        assert!(matches!(api.delete_todo("..").await, Err(ClientError::InvalidId(id)) if id == ".."));
        assert!(matches!(api.toggle_todo("").await, Err(ClientError::InvalidId(_))));
    }

    #[test]
    fn base_path_is_kept_in_front_of_the_api_prefix() {
        let api = HttpTodoApi::new("http://proxy.local/todo-app/").unwrap();
        assert_eq!(api.url(&["todos"]).as_str(), "http://proxy.local/todo-app/api/todos");
        assert!(HttpTodoApi::new("mailto:someone@example.com").is_err());
    }
}
