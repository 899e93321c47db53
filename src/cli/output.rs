use serde::Serialize;

use crate::model::local_task::{FieldError, LocalTask};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub priority: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct ValidationJson {
    pub errors: Vec<FieldError>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &LocalTask) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        title: task.title.clone(),
        completed: task.is_completed,
        priority: task.priority.label().to_string(),
        due: task.due_date.map(|d| d.to_string()),
        category: task.category.clone(),
        description: task.description.clone(),
        created_at: task.created_at.to_rfc3339(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format a single task as a one-line summary
pub fn format_task_line(task: &LocalTask) -> String {
    let check = if task.is_completed { 'x' } else { ' ' };
    let due_str = task
        .due_date
        .map(|d| format!(" due:{}", d))
        .unwrap_or_default();
    let cat_str = task
        .category
        .as_ref()
        .map(|c| format!(" #{}", c))
        .unwrap_or_default();
    format!(
        "[{}] {} {} ({}){}{}",
        check,
        task.id,
        task.title,
        task.priority.label(),
        due_str,
        cat_str
    )
}

/// Format one line per field-level validation failure
pub fn format_validation_errors(errors: &[FieldError]) -> Vec<String> {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect()
}

/// Parse a priority string into Priority
pub fn parse_priority(s: &str) -> Result<crate::model::task::Priority, String> {
    use crate::model::task::Priority;
    match s {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        _ => Err(format!(
            "unknown priority '{}' (expected: low, medium, high)",
            s
        )),
    }
}
