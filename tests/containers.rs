//! End-to-end tests for the entity containers, the association
//! resolver, and the identity wiring, driven against the in-memory
//! record store.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use taskdeck::identity::{ErrorHandler, IdentityWidget, SignInHandler, ViewMode};
use taskdeck::model::config::IdentityConfig;
use taskdeck::model::{ProjectDraft, TaskDraft, TaskPatch, TaskStatus, UserDraft};
use taskdeck::remote::memory::MemoryStore;
use taskdeck::remote::{ListQuery, Remote};
use taskdeck::state::{AuthStatus, Identity, Session};

use taskdeck::io::storage::MemoryStorage;

fn identity() -> Identity {
    Identity {
        id: "u1".into(),
        name: "Ada".into(),
        email: "ada@example.com".into(),
    }
}

fn session(store: &Arc<MemoryStore>) -> Session {
    Session::new(Arc::new(MemoryStorage::new()), Remote::new(store.clone()))
}

fn signed_in(store: &Arc<MemoryStore>) -> Session {
    let session = session(store);
    session.auth.handle_sign_in(identity());
    session
}

fn draft(title: &str, due: &str) -> TaskDraft {
    let mut draft = TaskDraft::new(title);
    draft.due_date = Some(due.parse().unwrap());
    draft
}

// ---------------------------------------------------------------------------
// Auth gating
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unauthenticated_ops_are_neutral_and_touch_nothing() {
    let store = Arc::new(MemoryStore::new());
    let mut session = session(&store);

    assert!(session.tasks.fetch_all(ListQuery::new()).await.is_none());
    assert!(session.tasks.fetch_by_id("1").await.is_none());
    assert!(session.tasks.create(TaskDraft::new("x")).await.is_none());
    assert!(
        session
            .tasks
            .update("1", TaskPatch::default())
            .await
            .is_none()
    );
    assert!(!session.tasks.delete("1").await);

    // Not an error, and no remote traffic
    assert!(session.tasks.last_error().is_none());
    assert_eq!(store.calls("tasks").await, 0);
}

// ---------------------------------------------------------------------------
// Container reconciliation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_appends_exactly_once() {
    let store = Arc::new(MemoryStore::new());
    let mut session = signed_in(&store);

    let created = session.tasks.create(TaskDraft::new("Write report")).await;
    assert_eq!(created.unwrap().title, "Write report");
    assert_eq!(session.tasks.records().len(), 1);
}

#[tokio::test]
async fn fetch_all_orders_tasks_by_due_date_by_default() {
    let store = Arc::new(MemoryStore::new());
    let mut session = signed_in(&store);

    session.tasks.create(draft("later", "2026-12-01")).await;
    session.tasks.create(draft("soon", "2026-09-01")).await;
    session.tasks.create(draft("middle", "2026-10-15")).await;

    session.tasks.fetch_all(ListQuery::new()).await.unwrap();
    let titles: Vec<&str> = session
        .tasks
        .records()
        .iter()
        .map(|t| t.title.as_str())
        .collect();
    assert_eq!(titles, vec!["soon", "middle", "later"]);
}

#[tokio::test]
async fn fetch_all_orders_projects_by_start_date_descending() {
    let store = Arc::new(MemoryStore::new());
    let mut session = signed_in(&store);

    for (name, start) in [
        ("oldest", "2025-01-01"),
        ("newest", "2026-06-01"),
        ("middle", "2025-09-01"),
    ] {
        let mut draft = ProjectDraft::new(name);
        draft.start_date = Some(start.parse().unwrap());
        session.projects.create(draft).await.unwrap();
    }

    session.projects.fetch_all(ListQuery::new()).await.unwrap();
    let names: Vec<&str> = session
        .projects
        .records()
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["newest", "middle", "oldest"]);
}

#[tokio::test]
async fn fetch_all_orders_users_by_name_ascending() {
    let store = Arc::new(MemoryStore::new());
    let mut session = signed_in(&store);

    for name in ["carol", "alice", "bob"] {
        let draft = UserDraft {
            name: name.to_string(),
            email: format!("{}@example.com", name),
            ..Default::default()
        };
        session.users.create(draft).await.unwrap();
    }

    session.users.fetch_all(ListQuery::new()).await.unwrap();
    let names: Vec<&str> = session
        .users
        .records()
        .iter()
        .map(|u| u.name.as_str())
        .collect();
    assert_eq!(names, vec!["alice", "bob", "carol"]);
}

#[tokio::test]
async fn fetch_all_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let mut session = signed_in(&store);

    session.tasks.create(draft("a", "2026-09-01")).await;
    session.tasks.create(draft("b", "2026-10-01")).await;

    session.tasks.fetch_all(ListQuery::new()).await.unwrap();
    let first: Vec<_> = session.tasks.records().to_vec();
    session.tasks.fetch_all(ListQuery::new()).await.unwrap();
    assert_eq!(session.tasks.records(), first.as_slice());
}

#[tokio::test]
async fn missing_record_clears_current_without_error() {
    let store = Arc::new(MemoryStore::new());
    let mut session = signed_in(&store);

    let task = session.tasks.create(TaskDraft::new("x")).await.unwrap();
    session.tasks.fetch_by_id(&task.id).await.unwrap();
    assert!(session.tasks.current().is_some());

    assert!(session.tasks.fetch_by_id("999").await.is_none());
    assert!(session.tasks.current().is_none());
    assert!(session.tasks.last_error().is_none());
}

#[tokio::test]
async fn update_replaces_only_the_matching_cache_entry() {
    let store = Arc::new(MemoryStore::new());
    let mut session = signed_in(&store);

    let first = session.tasks.create(TaskDraft::new("first")).await.unwrap();
    session.tasks.create(TaskDraft::new("second")).await;
    session.tasks.fetch_by_id(&first.id).await;

    let patch = TaskPatch {
        status: Some(TaskStatus::Completed),
        ..Default::default()
    };
    let updated = session.tasks.update(&first.id, patch).await.unwrap();
    assert_eq!(updated.status, TaskStatus::Completed);

    let records = session.tasks.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].status, TaskStatus::Completed);
    assert_eq!(records[1].status, TaskStatus::Todo);
    // The focused record tracks the update
    assert_eq!(session.tasks.current().unwrap().status, TaskStatus::Completed);
}

#[tokio::test]
async fn update_of_uncached_record_leaves_cache_alone() {
    let store = Arc::new(MemoryStore::new());
    let mut seeder = signed_in(&store);
    let task = seeder.tasks.create(TaskDraft::new("seeded")).await.unwrap();

    // A second session with an empty cache updates the same record
    let mut session = signed_in(&store);
    let patch = TaskPatch {
        title: Some("renamed".into()),
        ..Default::default()
    };
    let updated = session.tasks.update(&task.id, patch).await.unwrap();
    assert_eq!(updated.title, "renamed");
    assert!(session.tasks.records().is_empty());
    assert!(session.tasks.last_error().is_none());
}

#[tokio::test]
async fn delete_removes_record_and_clears_current() {
    let store = Arc::new(MemoryStore::new());
    let mut session = signed_in(&store);

    let task = session.tasks.create(TaskDraft::new("doomed")).await.unwrap();
    session.tasks.create(TaskDraft::new("survivor")).await;
    session.tasks.fetch_by_id(&task.id).await;

    assert!(session.tasks.delete(&task.id).await);
    assert_eq!(session.tasks.records().len(), 1);
    assert_eq!(session.tasks.records()[0].title, "survivor");
    assert!(session.tasks.current().is_none());
}

#[tokio::test]
async fn failed_call_records_message_and_keeps_cache() {
    let store = Arc::new(MemoryStore::new());
    let mut session = signed_in(&store);

    session.tasks.create(TaskDraft::new("kept")).await;
    store.fail_next("backend down").await;

    assert!(session.tasks.fetch_all(ListQuery::new()).await.is_none());
    assert_eq!(session.tasks.last_error(), Some("backend down"));
    assert_eq!(session.tasks.records().len(), 1);

    // The next successful call clears the message
    session.tasks.fetch_all(ListQuery::new()).await.unwrap();
    assert!(session.tasks.last_error().is_none());
}

// ---------------------------------------------------------------------------
// Association resolver
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resolver_short_circuits_on_zero_links() {
    let store = Arc::new(MemoryStore::new());
    let session = signed_in(&store);

    let tasks = session.links.tasks_for_project("p1").await.unwrap();
    assert!(tasks.is_empty());
    // The link table was consulted, the task table never was
    assert_eq!(store.calls("task_projects").await, 1);
    assert_eq!(store.calls("tasks").await, 0);
}

#[tokio::test]
async fn resolver_fetches_linked_tasks_in_one_batch() {
    let store = Arc::new(MemoryStore::new());
    let mut session = signed_in(&store);

    let a = session.tasks.create(TaskDraft::new("a")).await.unwrap();
    let b = session.tasks.create(TaskDraft::new("b")).await.unwrap();
    session.tasks.create(TaskDraft::new("unlinked")).await;

    session.links.associate(&a.id, "p1").await.unwrap();
    session.links.associate(&b.id, "p1").await.unwrap();

    let calls_before = store.calls("tasks").await;
    let linked = session.links.tasks_for_project("p1").await.unwrap();
    let mut titles: Vec<&str> = linked.iter().map(|t| t.title.as_str()).collect();
    titles.sort();
    assert_eq!(titles, vec!["a", "b"]);
    assert_eq!(store.calls("tasks").await, calls_before + 1);
}

#[tokio::test]
async fn duplicate_links_are_permitted() {
    let store = Arc::new(MemoryStore::new());
    let mut session = signed_in(&store);

    let task = session.tasks.create(TaskDraft::new("x")).await.unwrap();
    let first = session.links.associate(&task.id, "p1").await.unwrap();
    let second = session.links.associate(&task.id, "p1").await.unwrap();

    // Two distinct link records over the same pair
    assert_ne!(first.id, second.id);
    assert_eq!(first.task_id, second.task_id);
    assert_eq!(first.project_id, second.project_id);
}

// ---------------------------------------------------------------------------
// Identity wiring
// ---------------------------------------------------------------------------

/// Widget stub that captures its callbacks so the test can fire them.
#[derive(Default)]
struct StubWidget {
    callbacks: Mutex<Option<(SignInHandler, ErrorHandler)>>,
    initialized_with: Mutex<Option<(String, String, ViewMode)>>,
}

impl IdentityWidget for StubWidget {
    fn initialize(
        &self,
        client_id: &str,
        target: &str,
        view: ViewMode,
        on_success: SignInHandler,
        on_error: ErrorHandler,
    ) {
        *self.callbacks.lock().unwrap() = Some((on_success, on_error));
        *self.initialized_with.lock().unwrap() =
            Some((client_id.to_string(), target.to_string(), view));
    }

    fn show_login(&self, _target: &str) {}

    fn show_signup(&self, _target: &str) {}
}

#[tokio::test]
async fn widget_success_callback_signs_the_session_in() {
    let store = Arc::new(MemoryStore::new());
    let session = session(&store);
    let widget = StubWidget::default();

    let config = IdentityConfig {
        client_id: Some("cid-123".into()),
        view: Some("signup".into()),
    };
    session.attach_widget(&widget, &config, "#auth");

    let init = widget.initialized_with.lock().unwrap().clone();
    assert_eq!(
        init,
        Some(("cid-123".to_string(), "#auth".to_string(), ViewMode::Signup))
    );

    let (on_success, _) = widget.callbacks.lock().unwrap().take().unwrap();
    on_success(identity(), serde_json::json!({"provider": "stub"}));
    assert_eq!(session.auth.status(), AuthStatus::Authenticated(identity()));
}

#[tokio::test]
async fn widget_error_callback_lands_anonymous() {
    let store = Arc::new(MemoryStore::new());
    let session = session(&store);
    let widget = StubWidget::default();

    session.attach_widget(&widget, &IdentityConfig::default(), "#auth");
    let (_, on_error) = widget.callbacks.lock().unwrap().take().unwrap();
    on_error("provider rejected the credentials".to_string());
    assert_eq!(session.auth.status(), AuthStatus::Anonymous);
}
