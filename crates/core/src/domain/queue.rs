// Queue Domain Model

use std::fmt;

/// Desired state of one Cloud Tasks queue
///
/// Built once by the configuration layer and consumed by a single
/// reconcile task. `name` already carries the client/project namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueSpec {
    pub name: String,
    pub region: String,
    pub project_id: String,
    /// Passed through verbatim to the remote retry policy (e.g. "100ms")
    pub min_backoff: String,
    pub max_backoff: String,
    pub max_concurrent_dispatches: i64,
    pub max_dispatches_per_second: f64,
}

impl QueueSpec {
    /// Namespaced queue name: `{client_name}-{key}-{project_id}`
    pub fn qualified_name(client_name: &str, key: &str, project_id: &str) -> String {
        format!("{}-{}-{}", client_name, key, project_id)
    }

    /// Parent resource path: `projects/{project_id}/locations/{region}`
    pub fn parent(&self) -> String {
        format!("projects/{}/locations/{}", self.project_id, self.region)
    }

    /// Full resource name: `{parent}/queues/{name}`
    pub fn resource_name(&self) -> String {
        format!("{}/queues/{}", self.parent(), self.name)
    }
}

/// What reconciling a queue did to the remote resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueAction {
    Created,
    Updated,
}

impl fmt::Display for QueueAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueAction::Created => write!(f, "created"),
            QueueAction::Updated => write!(f, "updated"),
        }
    }
}
