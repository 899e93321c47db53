use std::sync::Arc;

use crate::identity::{self, IdentityWidget, ViewMode};
use crate::io::storage::KeyStorage;
use crate::model::config::IdentityConfig;
use crate::remote::gateway::{LinkGateway, ProjectGateway, Remote, TaskGateway, UserGateway};
use crate::state::auth::AuthState;
use crate::state::entity::EntityContainer;
use crate::state::resolver::LinkResolver;

/// Everything a signed-in session works with: the auth state, one
/// container per entity type, and the task↔project resolver. Built once
/// at session start and passed by reference — no ambient globals.
pub struct Session {
    pub auth: Arc<AuthState>,
    pub tasks: EntityContainer<TaskGateway>,
    pub projects: EntityContainer<ProjectGateway>,
    pub users: EntityContainer<UserGateway>,
    pub links: LinkResolver,
}

impl Session {
    pub fn new(storage: Arc<dyn KeyStorage>, remote: Remote) -> Self {
        let auth = Arc::new(AuthState::load(storage));
        let task_gateway = TaskGateway::new(remote.clone());
        Session {
            tasks: EntityContainer::new(Arc::clone(&auth), task_gateway.clone()),
            projects: EntityContainer::new(Arc::clone(&auth), ProjectGateway::new(remote.clone())),
            users: EntityContainer::new(Arc::clone(&auth), UserGateway::new(remote.clone())),
            links: LinkResolver::new(LinkGateway::new(remote), task_gateway),
            auth,
        }
    }

    /// Hook the identity widget's callbacks up to this session's auth
    /// state, using the configured client id and initial view.
    pub fn attach_widget(&self, widget: &dyn IdentityWidget, config: &IdentityConfig, target: &str) {
        let client_id = config.client_id.as_deref().unwrap_or_default();
        let view = match config.view.as_deref() {
            Some("signup") => ViewMode::Signup,
            _ => ViewMode::Login,
        };
        identity::connect(widget, Arc::clone(&self.auth), client_id, target, view);
    }
}
