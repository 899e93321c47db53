use crate::model::{Task, TaskProjectLink};
use crate::remote::gateway::{GatewayError, LinkGateway, TaskGateway};

/// Resolves the many-to-many relation between tasks and projects
/// through the join table.
#[derive(Clone)]
pub struct LinkResolver {
    links: LinkGateway,
    tasks: TaskGateway,
}

impl LinkResolver {
    pub fn new(links: LinkGateway, tasks: TaskGateway) -> Self {
        LinkResolver { links, tasks }
    }

    /// All tasks linked to the given project.
    ///
    /// Zero links short-circuits to an empty list without querying the
    /// task table — a membership query over an empty identifier set is a
    /// different (and likely erroneous) question. Otherwise the
    /// referenced tasks are fetched in one batched lookup.
    pub async fn tasks_for_project(&self, project_id: &str) -> Result<Vec<Task>, GatewayError> {
        let links = self.links.list_for_project(project_id).await?;
        if links.is_empty() {
            return Ok(Vec::new());
        }
        let task_ids: Vec<_> = links.into_iter().map(|link| link.task_id).collect();
        self.tasks.list_by_ids(&task_ids).await
    }

    /// Link one task to one project. Creates exactly one record and
    /// never checks for an existing duplicate; callers that want the
    /// relation unique must deduplicate themselves.
    pub async fn associate(
        &self,
        task_id: &str,
        project_id: &str,
    ) -> Result<TaskProjectLink, GatewayError> {
        self.links.create_link(task_id, project_id).await
    }
}
