// Cloud Tasks Configuration - settings records and validation

use super::error::{DomainError, Result};
use super::queue::QueueSpec;
use serde::Deserialize;
use std::collections::BTreeMap;

/// One queue as written in the settings file (`cloudTasks.<key>`)
///
/// Missing fields deserialize to empty/zero and are rejected by
/// [`CloudTasksConfig::validate`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawQueue {
    pub region: String,
    // Lowercase aliases: some settings loaders fold key case
    #[serde(alias = "projectid")]
    pub project_id: String,
    #[serde(alias = "minbackoff")]
    pub min_backoff: String,
    #[serde(alias = "maxbackoff")]
    pub max_backoff: String,
    #[serde(alias = "maxconcurrentdispatches")]
    pub max_concurrent_dispatches: i64,
    #[serde(alias = "maxdispatchespersecond")]
    pub max_dispatches_per_second: f64,
}

/// Top-level settings section
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudTasksSettings {
    #[serde(rename = "cloudTasks", alias = "cloudtasks", default)]
    pub cloud_tasks: BTreeMap<String, RawQueue>,
}

/// Validated queue specs keyed by logical name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloudTasksConfig {
    pub queues: BTreeMap<String, QueueSpec>,
}

impl CloudTasksConfig {
    /// Resolve settings into specs for `client_name` and validate them
    ///
    /// Each queue is renamed to `{client_name}-{key}-{project_id}`.
    pub fn from_settings(settings: CloudTasksSettings, client_name: &str) -> Result<Self> {
        if client_name.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "client name must not be empty".to_string(),
            ));
        }

        let queues = settings
            .cloud_tasks
            .into_iter()
            .map(|(key, raw)| {
                let spec = QueueSpec {
                    name: QueueSpec::qualified_name(client_name, &key, &raw.project_id),
                    region: raw.region,
                    project_id: raw.project_id,
                    min_backoff: raw.min_backoff,
                    max_backoff: raw.max_backoff,
                    max_concurrent_dispatches: raw.max_concurrent_dispatches,
                    max_dispatches_per_second: raw.max_dispatches_per_second,
                };
                (key, spec)
            })
            .collect();

        let config = Self { queues };
        config.validate()?;
        Ok(config)
    }

    /// Apply the `required` rule to every field of every queue
    pub fn validate(&self) -> Result<()> {
        for (key, spec) in &self.queues {
            validate_queue(key, spec)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}

fn validate_queue(key: &str, spec: &QueueSpec) -> Result<()> {
    let required = |field: &'static str| DomainError::RequiredField {
        queue: key.to_string(),
        field,
    };

    if spec.name.trim().is_empty() {
        return Err(required("name"));
    }
    if spec.region.trim().is_empty() {
        return Err(required("region"));
    }
    if spec.project_id.trim().is_empty() {
        return Err(required("projectId"));
    }
    if spec.min_backoff.trim().is_empty() {
        return Err(required("minBackoff"));
    }
    if spec.max_backoff.trim().is_empty() {
        return Err(required("maxBackoff"));
    }
    if spec.max_concurrent_dispatches <= 0 {
        return Err(required("maxConcurrentDispatches"));
    }
    if !spec.max_dispatches_per_second.is_finite() || spec.max_dispatches_per_second <= 0.0 {
        return Err(required("maxDispatchesPerSecond"));
    }
    Ok(())
}
