use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::task::Priority;

/// A task in the local-only list. Never sent to the remote store; the
/// identifier is client-generated and completion is a flag plus an
/// optional timestamp rather than a status enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalTask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    pub is_completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Free-text category label, local-only
    #[serde(default)]
    pub category: Option<String>,
    /// Display color code for the category, local-only
    #[serde(default)]
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields the user fills in before a local task is created
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub category: Option<String>,
    pub color: Option<String>,
}

impl TaskForm {
    pub fn new(title: impl Into<String>) -> Self {
        TaskForm {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Validate the form against `today` (start of the current local day).
    ///
    /// Returns one entry per offending field; an empty vec means the form
    /// may be submitted. Violations block creation, they are never raised
    /// as errors further down.
    pub fn validate(&self, today: NaiveDate) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "title is required"));
        }
        if let Some(due) = self.due_date
            && due < today
        {
            errors.push(FieldError::new("due_date", "due date cannot be in the past"));
        }
        errors
    }
}

/// A field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        FieldError {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 24).unwrap()
    }

    #[test]
    fn empty_title_is_rejected() {
        let form = TaskForm::new("   ");
        let errors = form.validate(today());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "title");
    }

    #[test]
    fn past_due_date_is_rejected() {
        let mut form = TaskForm::new("X");
        form.due_date = Some(today() - Duration::days(1));
        let errors = form.validate(today());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "due_date");
    }

    #[test]
    fn today_is_an_acceptable_due_date() {
        let mut form = TaskForm::new("X");
        form.due_date = Some(today());
        assert!(form.validate(today()).is_empty());
    }

    #[test]
    fn both_violations_are_reported() {
        let mut form = TaskForm::new("");
        form.due_date = Some(today() - Duration::days(7));
        assert_eq!(form.validate(today()).len(), 2);
    }

    #[test]
    fn local_task_serde_field_names() {
        let task = LocalTask {
            id: "1724500000000".into(),
            title: "Buy milk".into(),
            description: None,
            due_date: None,
            priority: Priority::Low,
            is_completed: false,
            completed_at: None,
            category: Some("errands".into()),
            color: Some("#ff8800".into()),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["isCompleted"], serde_json::json!(false));
        assert!(json["completedAt"].is_null());
    }
}
