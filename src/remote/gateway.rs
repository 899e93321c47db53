use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::model::{
    Project, ProjectDraft, ProjectPatch, RecordId, Task, TaskDraft, TaskPatch, TaskProjectLink,
    User, UserDraft, UserPatch,
};
use crate::remote::fields;
use crate::remote::store::{Filter, ListQuery, OrderBy, Record, RecordStore, StoreError};

/// Error type for gateway operations
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The external client capability was never established; raised before
    /// any store interaction.
    #[error("remote gateway is not initialized")]
    Uninitialized,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("malformed {table} record: {detail}")]
    BadRecord {
        table: &'static str,
        detail: String,
    },
}

/// Handle on the external record store capability. Cheap to clone; all
/// per-entity gateways share one.
#[derive(Clone, Default)]
pub struct Remote {
    store: Option<Arc<dyn RecordStore>>,
}

impl Remote {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Remote { store: Some(store) }
    }

    /// A handle with no store behind it. Every operation through it fails
    /// fast with `GatewayError::Uninitialized`.
    pub fn uninitialized() -> Self {
        Remote { store: None }
    }

    fn store(&self) -> Result<&Arc<dyn RecordStore>, GatewayError> {
        self.store.as_ref().ok_or(GatewayError::Uninitialized)
    }
}

/// Record the single diagnostic for a failed remote call, then hand the
/// failure back unchanged. No retry, no fallback.
fn store_failure(table: &'static str, op: &'static str, err: StoreError) -> GatewayError {
    tracing::error!(table, op, error = %err, "remote call failed");
    GatewayError::Store(err)
}

/// Uniform per-entity gateway contract consumed by the entity state
/// containers.
#[async_trait]
pub trait EntityGateway: Send + Sync {
    type Record: Clone + Send + Sync;
    type Draft: Send + Sync;
    type Patch: Send + Sync;

    /// The identifier of a typed record
    fn record_id(record: &Self::Record) -> &str;

    async fn list(&self, query: ListQuery) -> Result<Vec<Self::Record>, GatewayError>;
    async fn get_by_id(&self, id: &str) -> Result<Option<Self::Record>, GatewayError>;
    async fn create(&self, draft: &Self::Draft) -> Result<Self::Record, GatewayError>;
    async fn update(&self, id: &str, patch: &Self::Patch) -> Result<Self::Record, GatewayError>;
    async fn delete(&self, id: &str) -> Result<(), GatewayError>;
}

// ---------------------------------------------------------------------------
// Field value helpers
// ---------------------------------------------------------------------------

fn req_str(rec: &Record, table: &'static str, field: &'static str) -> Result<String, GatewayError> {
    rec.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| GatewayError::BadRecord {
            table,
            detail: format!("missing field {}", field),
        })
}

fn opt_str(rec: &Record, field: &'static str) -> Option<String> {
    rec.get(field).and_then(Value::as_str).map(str::to_string)
}

fn opt_date(
    rec: &Record,
    table: &'static str,
    field: &'static str,
) -> Result<Option<NaiveDate>, GatewayError> {
    match rec.get(field).and_then(Value::as_str) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(|_| GatewayError::BadRecord {
                table,
                detail: format!("bad date in {}: {}", field, raw),
            }),
    }
}

fn req_timestamp(
    rec: &Record,
    table: &'static str,
    field: &'static str,
) -> Result<DateTime<Utc>, GatewayError> {
    let raw = req_str(rec, table, field)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| GatewayError::BadRecord {
            table,
            detail: format!("bad timestamp in {}: {}", field, raw),
        })
}

fn dec_enum<T: serde::de::DeserializeOwned>(
    rec: &Record,
    table: &'static str,
    field: &'static str,
) -> Result<T, GatewayError> {
    let value = rec.get(field).cloned().unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|_| GatewayError::BadRecord {
        table,
        detail: format!("bad value in {}", field),
    })
}

fn enum_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn date_value(date: Option<NaiveDate>) -> Value {
    match date {
        Some(d) => Value::String(d.to_string()),
        None => Value::Null,
    }
}

fn str_value(s: &Option<String>) -> Value {
    match s {
        Some(s) => Value::String(s.clone()),
        None => Value::Null,
    }
}

// ---------------------------------------------------------------------------
// Task gateway
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct TaskGateway {
    remote: Remote,
}

impl TaskGateway {
    pub fn new(remote: Remote) -> Self {
        TaskGateway { remote }
    }

    /// One batched "id is a member of this set" lookup. Callers must
    /// short-circuit an empty set themselves; an empty membership filter
    /// is a semantically distinct query this layer refuses to guess at.
    pub async fn list_by_ids(&self, ids: &[RecordId]) -> Result<Vec<Task>, GatewayError> {
        let values = ids.iter().map(|id| Value::String(id.clone())).collect();
        self.list(ListQuery::new().filter(Filter::is_in(fields::tasks::ID, values)))
            .await
    }
}

fn decode_task(rec: &Record) -> Result<Task, GatewayError> {
    use fields::tasks as f;
    Ok(Task {
        id: req_str(rec, f::TABLE, f::ID)?,
        title: req_str(rec, f::TABLE, f::TITLE)?,
        description: opt_str(rec, f::DESCRIPTION),
        due_date: opt_date(rec, f::TABLE, f::DUE_DATE)?,
        priority: dec_enum(rec, f::TABLE, f::PRIORITY)?,
        status: dec_enum(rec, f::TABLE, f::STATUS)?,
        assigned_to: opt_str(rec, f::ASSIGNED_TO),
        created_at: req_timestamp(rec, f::TABLE, f::CREATED_AT)?,
    })
}

fn encode_task_draft(draft: &TaskDraft) -> Record {
    use fields::tasks as f;
    let mut rec = Record::new();
    rec.insert(f::TITLE.into(), Value::String(draft.title.clone()));
    rec.insert(f::DESCRIPTION.into(), str_value(&draft.description));
    rec.insert(f::DUE_DATE.into(), date_value(draft.due_date));
    rec.insert(f::PRIORITY.into(), enum_value(&draft.priority));
    rec.insert(f::STATUS.into(), enum_value(&draft.status));
    rec.insert(f::ASSIGNED_TO.into(), str_value(&draft.assigned_to));
    rec.insert(
        f::CREATED_AT.into(),
        Value::String(Utc::now().to_rfc3339()),
    );
    rec
}

fn encode_task_patch(patch: &TaskPatch) -> Record {
    use fields::tasks as f;
    let mut rec = Record::new();
    if let Some(title) = &patch.title {
        rec.insert(f::TITLE.into(), Value::String(title.clone()));
    }
    if let Some(description) = &patch.description {
        rec.insert(f::DESCRIPTION.into(), str_value(description));
    }
    if let Some(due_date) = patch.due_date {
        rec.insert(f::DUE_DATE.into(), date_value(due_date));
    }
    if let Some(priority) = &patch.priority {
        rec.insert(f::PRIORITY.into(), enum_value(priority));
    }
    if let Some(status) = &patch.status {
        rec.insert(f::STATUS.into(), enum_value(status));
    }
    if let Some(assigned_to) = &patch.assigned_to {
        rec.insert(f::ASSIGNED_TO.into(), str_value(assigned_to));
    }
    rec
}

#[async_trait]
impl EntityGateway for TaskGateway {
    type Record = Task;
    type Draft = TaskDraft;
    type Patch = TaskPatch;

    fn record_id(record: &Task) -> &str {
        &record.id
    }

    async fn list(&self, mut query: ListQuery) -> Result<Vec<Task>, GatewayError> {
        use fields::tasks as f;
        if query.order_by.is_empty() {
            query.order_by.push(OrderBy::asc(f::DUE_DATE));
        }
        query.fields = f::COLUMNS.to_vec();
        let records = self
            .remote
            .store()?
            .list(f::TABLE, &query)
            .await
            .map_err(|e| store_failure(f::TABLE, "list", e))?;
        records.iter().map(decode_task).collect()
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Task>, GatewayError> {
        use fields::tasks as f;
        let query = ListQuery::new().filter(Filter::eq(f::ID, id));
        let record = self
            .remote
            .store()?
            .get_one(f::TABLE, &query)
            .await
            .map_err(|e| store_failure(f::TABLE, "get_one", e))?;
        record.as_ref().map(decode_task).transpose()
    }

    async fn create(&self, draft: &TaskDraft) -> Result<Task, GatewayError> {
        use fields::tasks as f;
        let stored = self
            .remote
            .store()?
            .create(f::TABLE, encode_task_draft(draft))
            .await
            .map_err(|e| store_failure(f::TABLE, "create", e))?;
        decode_task(&stored)
    }

    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Task, GatewayError> {
        use fields::tasks as f;
        let stored = self
            .remote
            .store()?
            .update(f::TABLE, id, encode_task_patch(patch))
            .await
            .map_err(|e| store_failure(f::TABLE, "update", e))?;
        decode_task(&stored)
    }

    async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        use fields::tasks as f;
        self.remote
            .store()?
            .delete(f::TABLE, id)
            .await
            .map_err(|e| store_failure(f::TABLE, "delete", e))
    }
}

// ---------------------------------------------------------------------------
// Project gateway
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct ProjectGateway {
    remote: Remote,
}

impl ProjectGateway {
    pub fn new(remote: Remote) -> Self {
        ProjectGateway { remote }
    }
}

fn decode_project(rec: &Record) -> Result<Project, GatewayError> {
    use fields::projects as f;
    Ok(Project {
        id: req_str(rec, f::TABLE, f::ID)?,
        name: req_str(rec, f::TABLE, f::NAME)?,
        description: opt_str(rec, f::DESCRIPTION),
        start_date: opt_date(rec, f::TABLE, f::START_DATE)?,
        end_date: opt_date(rec, f::TABLE, f::END_DATE)?,
        status: dec_enum(rec, f::TABLE, f::STATUS)?,
    })
}

fn encode_project_draft(draft: &ProjectDraft) -> Record {
    use fields::projects as f;
    let mut rec = Record::new();
    rec.insert(f::NAME.into(), Value::String(draft.name.clone()));
    rec.insert(f::DESCRIPTION.into(), str_value(&draft.description));
    rec.insert(f::START_DATE.into(), date_value(draft.start_date));
    rec.insert(f::END_DATE.into(), date_value(draft.end_date));
    rec.insert(f::STATUS.into(), enum_value(&draft.status));
    rec
}

fn encode_project_patch(patch: &ProjectPatch) -> Record {
    use fields::projects as f;
    let mut rec = Record::new();
    if let Some(name) = &patch.name {
        rec.insert(f::NAME.into(), Value::String(name.clone()));
    }
    if let Some(description) = &patch.description {
        rec.insert(f::DESCRIPTION.into(), str_value(description));
    }
    if let Some(start_date) = patch.start_date {
        rec.insert(f::START_DATE.into(), date_value(start_date));
    }
    if let Some(end_date) = patch.end_date {
        rec.insert(f::END_DATE.into(), date_value(end_date));
    }
    if let Some(status) = &patch.status {
        rec.insert(f::STATUS.into(), enum_value(status));
    }
    rec
}

#[async_trait]
impl EntityGateway for ProjectGateway {
    type Record = Project;
    type Draft = ProjectDraft;
    type Patch = ProjectPatch;

    fn record_id(record: &Project) -> &str {
        &record.id
    }

    async fn list(&self, mut query: ListQuery) -> Result<Vec<Project>, GatewayError> {
        use fields::projects as f;
        if query.order_by.is_empty() {
            query.order_by.push(OrderBy::desc(f::START_DATE));
        }
        query.fields = f::COLUMNS.to_vec();
        let records = self
            .remote
            .store()?
            .list(f::TABLE, &query)
            .await
            .map_err(|e| store_failure(f::TABLE, "list", e))?;
        records.iter().map(decode_project).collect()
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Project>, GatewayError> {
        use fields::projects as f;
        let query = ListQuery::new().filter(Filter::eq(f::ID, id));
        let record = self
            .remote
            .store()?
            .get_one(f::TABLE, &query)
            .await
            .map_err(|e| store_failure(f::TABLE, "get_one", e))?;
        record.as_ref().map(decode_project).transpose()
    }

    async fn create(&self, draft: &ProjectDraft) -> Result<Project, GatewayError> {
        use fields::projects as f;
        let stored = self
            .remote
            .store()?
            .create(f::TABLE, encode_project_draft(draft))
            .await
            .map_err(|e| store_failure(f::TABLE, "create", e))?;
        decode_project(&stored)
    }

    async fn update(&self, id: &str, patch: &ProjectPatch) -> Result<Project, GatewayError> {
        use fields::projects as f;
        let stored = self
            .remote
            .store()?
            .update(f::TABLE, id, encode_project_patch(patch))
            .await
            .map_err(|e| store_failure(f::TABLE, "update", e))?;
        decode_project(&stored)
    }

    async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        use fields::projects as f;
        self.remote
            .store()?
            .delete(f::TABLE, id)
            .await
            .map_err(|e| store_failure(f::TABLE, "delete", e))
    }
}

// ---------------------------------------------------------------------------
// User gateway
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct UserGateway {
    remote: Remote,
}

impl UserGateway {
    pub fn new(remote: Remote) -> Self {
        UserGateway { remote }
    }
}

fn decode_user(rec: &Record) -> Result<User, GatewayError> {
    use fields::users as f;
    Ok(User {
        id: req_str(rec, f::TABLE, f::ID)?,
        name: req_str(rec, f::TABLE, f::NAME)?,
        email: req_str(rec, f::TABLE, f::EMAIL)?,
        role: dec_enum(rec, f::TABLE, f::ROLE)?,
    })
}

fn encode_user_draft(draft: &UserDraft) -> Record {
    use fields::users as f;
    let mut rec = Record::new();
    rec.insert(f::NAME.into(), Value::String(draft.name.clone()));
    rec.insert(f::EMAIL.into(), Value::String(draft.email.clone()));
    rec.insert(f::ROLE.into(), enum_value(&draft.role));
    rec
}

fn encode_user_patch(patch: &UserPatch) -> Record {
    use fields::users as f;
    let mut rec = Record::new();
    if let Some(name) = &patch.name {
        rec.insert(f::NAME.into(), Value::String(name.clone()));
    }
    if let Some(email) = &patch.email {
        rec.insert(f::EMAIL.into(), Value::String(email.clone()));
    }
    if let Some(role) = &patch.role {
        rec.insert(f::ROLE.into(), enum_value(role));
    }
    rec
}

#[async_trait]
impl EntityGateway for UserGateway {
    type Record = User;
    type Draft = UserDraft;
    type Patch = UserPatch;

    fn record_id(record: &User) -> &str {
        &record.id
    }

    async fn list(&self, mut query: ListQuery) -> Result<Vec<User>, GatewayError> {
        use fields::users as f;
        if query.order_by.is_empty() {
            query.order_by.push(OrderBy::asc(f::NAME));
        }
        query.fields = f::COLUMNS.to_vec();
        let records = self
            .remote
            .store()?
            .list(f::TABLE, &query)
            .await
            .map_err(|e| store_failure(f::TABLE, "list", e))?;
        records.iter().map(decode_user).collect()
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>, GatewayError> {
        use fields::users as f;
        let query = ListQuery::new().filter(Filter::eq(f::ID, id));
        let record = self
            .remote
            .store()?
            .get_one(f::TABLE, &query)
            .await
            .map_err(|e| store_failure(f::TABLE, "get_one", e))?;
        record.as_ref().map(decode_user).transpose()
    }

    async fn create(&self, draft: &UserDraft) -> Result<User, GatewayError> {
        use fields::users as f;
        let stored = self
            .remote
            .store()?
            .create(f::TABLE, encode_user_draft(draft))
            .await
            .map_err(|e| store_failure(f::TABLE, "create", e))?;
        decode_user(&stored)
    }

    async fn update(&self, id: &str, patch: &UserPatch) -> Result<User, GatewayError> {
        use fields::users as f;
        let stored = self
            .remote
            .store()?
            .update(f::TABLE, id, encode_user_patch(patch))
            .await
            .map_err(|e| store_failure(f::TABLE, "update", e))?;
        decode_user(&stored)
    }

    async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        use fields::users as f;
        self.remote
            .store()?
            .delete(f::TABLE, id)
            .await
            .map_err(|e| store_failure(f::TABLE, "delete", e))
    }
}

// ---------------------------------------------------------------------------
// Task↔project link gateway
// ---------------------------------------------------------------------------

/// Gateway for the join table. Links have no container; the association
/// resolver is their only consumer.
#[derive(Clone)]
pub struct LinkGateway {
    remote: Remote,
}

impl LinkGateway {
    pub fn new(remote: Remote) -> Self {
        LinkGateway { remote }
    }

    pub async fn list_for_project(
        &self,
        project_id: &str,
    ) -> Result<Vec<TaskProjectLink>, GatewayError> {
        use fields::links as f;
        let mut query = ListQuery::new().filter(Filter::eq(f::PROJECT_ID, project_id));
        query.fields = f::COLUMNS.to_vec();
        let records = self
            .remote
            .store()?
            .list(f::TABLE, &query)
            .await
            .map_err(|e| store_failure(f::TABLE, "list", e))?;
        records.iter().map(decode_link).collect()
    }

    /// Create one link record. No duplicate check: the same task/project
    /// pair may be linked more than once.
    pub async fn create_link(
        &self,
        task_id: &str,
        project_id: &str,
    ) -> Result<TaskProjectLink, GatewayError> {
        use fields::links as f;
        let mut rec = Record::new();
        rec.insert(f::TASK_ID.into(), Value::String(task_id.to_string()));
        rec.insert(f::PROJECT_ID.into(), Value::String(project_id.to_string()));
        let stored = self
            .remote
            .store()?
            .create(f::TABLE, rec)
            .await
            .map_err(|e| store_failure(f::TABLE, "create", e))?;
        decode_link(&stored)
    }
}

fn decode_link(rec: &Record) -> Result<TaskProjectLink, GatewayError> {
    use fields::links as f;
    Ok(TaskProjectLink {
        id: req_str(rec, f::TABLE, f::ID)?,
        task_id: req_str(rec, f::TABLE, f::TASK_ID)?,
        project_id: req_str(rec, f::TABLE, f::PROJECT_ID)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;

    fn task_record() -> Record {
        let mut rec = Record::new();
        rec.insert("id".into(), Value::String("7".into()));
        rec.insert("title".into(), Value::String("Write report".into()));
        rec.insert("description".into(), Value::Null);
        rec.insert("due_date".into(), Value::String("2026-09-01".into()));
        rec.insert("priority".into(), Value::String("high".into()));
        rec.insert("status".into(), Value::String("todo".into()));
        rec.insert("assigned_to".into(), Value::Null);
        rec.insert(
            "created_at".into(),
            Value::String("2026-08-20T10:00:00Z".into()),
        );
        rec
    }

    #[test]
    fn decode_task_round_trips_fields() {
        let task = decode_task(&task_record()).unwrap();
        assert_eq!(task.id, "7");
        assert_eq!(task.title, "Write report");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date.unwrap().to_string(), "2026-09-01");
        assert!(task.assigned_to.is_none());
    }

    #[test]
    fn decode_task_missing_title_is_bad_record() {
        let mut rec = task_record();
        rec.shift_remove("title");
        let err = decode_task(&rec).unwrap_err();
        assert!(matches!(err, GatewayError::BadRecord { table: "tasks", .. }));
    }

    #[test]
    fn encode_patch_skips_absent_fields() {
        let patch = TaskPatch {
            title: Some("New".into()),
            ..Default::default()
        };
        let rec = encode_task_patch(&patch);
        assert_eq!(rec.len(), 1);
        assert_eq!(rec.get("title"), Some(&Value::String("New".into())));
    }

    #[test]
    fn encode_patch_clears_with_null() {
        let patch = TaskPatch {
            due_date: Some(None),
            ..Default::default()
        };
        let rec = encode_task_patch(&patch);
        assert_eq!(rec.get("due_date"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn uninitialized_remote_fails_before_any_io() {
        let gateway = TaskGateway::new(Remote::uninitialized());
        let err = gateway.list(ListQuery::new()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Uninitialized));
    }
}
