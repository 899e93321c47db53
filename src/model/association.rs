use serde::{Deserialize, Serialize};

use crate::model::RecordId;

/// A pure join record linking one task to one project.
///
/// The relation is many-to-many and this layer enforces no uniqueness:
/// duplicate links between the same task and project are permitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProjectLink {
    pub id: RecordId,
    pub task_id: RecordId,
    pub project_id: RecordId,
}
