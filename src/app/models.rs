use chrono::NaiveDate;
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    // Next value in the low -> medium -> high cycle used by the form
    pub fn next(self) -> Priority {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        };
        f.write_str(label)
    }
}

// A todo as stored by the backend. The identifier is assigned server side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    #[serde(default, with = "due_date", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
}

// Fields of a todo that has not been sent to the backend yet
#[derive(Clone, Debug, PartialEq, Serialize, Derivative)]
#[derivative(Default)]
#[serde(rename_all = "camelCase")]
pub struct NewTodoDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[derivative(Default(value = "Priority::Medium"))]
    pub priority: Priority,
    #[serde(with = "due_date", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

impl NewTodoDraft {
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: Priority,
    #[serde(default, with = "due_date")]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionRequest<'a> {
    pub context: &'a str,
}

// The backend stores dates as timestamps while forms send plain dates, so
// both shapes are accepted. Only the calendar date is kept.
mod due_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        let raw = match raw.as_deref().map(str::trim) {
            None | Some("") => return Ok(None),
            Some(raw) => raw,
        };

        if let Ok(date) = NaiveDate::parse_from_str(raw, FORMAT) {
            return Ok(Some(date));
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|timestamp| Some(timestamp.naive_utc().date()))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decodes_backend_todo_with_timestamp_due_date() {
        let todo: TodoItem = serde_json::from_value(json!({
            "_id": "65a1",
            "title": "Write report",
            "description": "Quarterly numbers",
            "priority": "high",
            "dueDate": "2024-03-15T00:00:00.000Z",
            "completed": true,
            "__v": 0
        }))
        .unwrap();

        assert_eq!(
            todo,
            TodoItem {
                id: "65a1".into(),
                title: "Write report".into(),
                description: Some("Quarterly numbers".into()),
                priority: Priority::High,
                due_date: NaiveDate::from_ymd_opt(2024, 3, 15),
                completed: true,
            }
        );
    }

    #[test]
    fn missing_optional_fields_fall_back() {
        let todo: TodoItem = serde_json::from_value(json!({
            "id": "7",
            "title": "Call mom",
            "priority": "low",
            "dueDate": ""
        }))
        .unwrap();

        assert_eq!(todo.id, "7");
        assert_eq!(todo.description, None);
        assert_eq!(todo.due_date, None);
        assert!(!todo.completed);
    }

    #[test]
    fn rejects_unknown_priority() {
        let result = serde_json::from_value::<TodoItem>(json!({
            "_id": "1",
            "title": "x",
            "priority": "urgent"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn draft_serializes_plain_date_and_omits_unset_fields() {
        let draft = NewTodoDraft {
            title: "Buy milk".into(),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 2),
            ..NewTodoDraft::default()
        };

        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({ "title": "Buy milk", "priority": "medium", "dueDate": "2024-01-02" })
        );
    }

    #[test]
    fn draft_title_must_have_visible_characters() {
        let mut draft = NewTodoDraft::default();
        assert!(!draft.has_title());
        draft.title = "   \t".into();
        assert!(!draft.has_title());
        draft.title = " a ".into();
        assert!(draft.has_title());
    }

    #[test]
    fn priority_cycles_through_all_levels() {
        assert_eq!(Priority::Low.next(), Priority::Medium);
        assert_eq!(Priority::Medium.next(), Priority::High);
        assert_eq!(Priority::High.next(), Priority::Low);
    }
}
