use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Open,
    Completed,
    Canceled,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::Completed => "completed",
            Status::Canceled => "canceled",
        }
    }
}

/// A to-do as reported by Things. Only `name` and `status` are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

impl TaskItem {
    pub fn new(name: impl Into<String>, status: Status) -> Self {
        Self {
            name: name.into(),
            notes: None,
            status,
            creation_date: None,
            modification_date: None,
            due_date: None,
            completion_date: None,
            cancellation_date: None,
            tag_names: Vec::new(),
            area: None,
            project: None,
        }
    }
}

/// Result of a mutating request. `message` is what the user sees either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub success: bool,
    pub message: String,
}

impl OperationOutcome {
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn name_and_status_only_leaves_optionals_empty() {
        let todo: TaskItem =
            serde_json::from_str(r#"{"name":"Buy groceries","status":"open"}"#).expect("parse");
        assert_eq!(todo, TaskItem::new("Buy groceries", Status::Open));
    }

    #[test]
    fn rich_payload_parses_dates_and_parents() {
        let raw = r#"{
            "name": "Write report",
            "status": "completed",
            "notes": "Quarterly",
            "creationDate": "2024-01-10T09:00:00.000Z",
            "completionDate": "2024-01-15T17:30:00.000Z",
            "tagNames": ["Work", "Important"],
            "area": "Work",
            "project": "Q1 Report"
        }"#;
        let todo: TaskItem = serde_json::from_str(raw).expect("parse");
        assert_eq!(todo.status, Status::Completed);
        assert_eq!(todo.notes.as_deref(), Some("Quarterly"));
        assert_eq!(
            todo.completion_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 17, 30, 0).unwrap())
        );
        assert_eq!(todo.tag_names, vec!["Work", "Important"]);
        assert_eq!(todo.area.as_deref(), Some("Work"));
        assert_eq!(todo.project.as_deref(), Some("Q1 Report"));
        assert!(todo.due_date.is_none());
    }

    #[test]
    fn unknown_status_is_rejected() {
        let parsed = serde_json::from_str::<TaskItem>(r#"{"name":"x","status":"someday"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn serialization_omits_empty_fields() {
        let json = serde_json::to_string(&TaskItem::new("Simple", Status::Canceled)).expect("json");
        assert_eq!(json, r#"{"name":"Simple","status":"canceled"}"#);
    }
}
