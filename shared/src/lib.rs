use serde::{Deserialize, Serialize};

/// A single to-do item, owned by one user and pinned to one calendar date.
///
/// Serialized camelCase on the wire (`isCompleted`, `userId`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub is_completed: bool,
    /// `YYYY-MM-DD`, exact-match partition key for listing.
    pub date: String,
    /// Subject identifier from the verified token. Set server-side, never
    /// taken from a request body.
    pub user_id: String,
}

/// Body of `POST /createTodo`. `date` is optional here so the server can
/// answer 400 with its own error message instead of a deserialization reject.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub title: String,
    pub is_completed: Option<bool>,
    pub date: Option<String>,
}

/// Body of `PUT /editTodo/:id`. Absent fields are left unchanged; a supplied
/// field is applied verbatim, so `isCompleted: false` is distinct from
/// leaving it out.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
    pub date: Option<String>,
}

/// Strict `YYYY-MM-DD` check used by both sides of the wire.
///
/// The parser alone accepts non-padded input like `2025-6-1`, which would
/// land under a partition key that exact-match listing never finds, so the
/// value must also round-trip to the canonical zero-padded form.
pub fn valid_date(date: &str) -> bool {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .is_ok_and(|d| d.format("%Y-%m-%d").to_string() == date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_calendar_dates() {
        assert!(valid_date("2025-06-01"));
        assert!(valid_date("2024-02-29"));
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(!valid_date(""));
        assert!(!valid_date("2025-13-01"));
        assert!(!valid_date("2025-02-30"));
        assert!(!valid_date("06-01-2025"));
        assert!(!valid_date("2025-06-01T00:00:00Z"));
    }

    #[test]
    fn rejects_non_padded_dates() {
        // Parses fine but is not the canonical partition key.
        assert!(!valid_date("2025-6-1"));
        assert!(!valid_date("2025-06-1"));
        assert!(!valid_date("2025-6-01"));
    }

    #[test]
    fn todo_round_trips_camel_case() {
        let json = r#"{"id":7,"title":"Buy milk","isCompleted":false,"date":"2025-06-01","userId":"sub-1"}"#;
        let todo: Todo = serde_json::from_str(json).unwrap();
        assert_eq!(todo.id, 7);
        assert!(!todo.is_completed);
        assert_eq!(serde_json::to_string(&todo).unwrap(), json);
    }

    #[test]
    fn update_request_distinguishes_false_from_absent() {
        let explicit: UpdateTodoRequest =
            serde_json::from_str(r#"{"isCompleted":false}"#).unwrap();
        assert_eq!(explicit.is_completed, Some(false));

        let absent: UpdateTodoRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.is_completed, None);
    }
}
