// Wire Resource - Cloud Tasks queue representation

use super::queue::QueueSpec;
use serde::{Deserialize, Serialize};

/// Rate limits applied by the remote queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RateLimits {
    #[serde(default)]
    pub max_dispatches_per_second: f64,
    #[serde(default)]
    pub max_concurrent_dispatches: i64,
}

/// Retry policy applied by the remote queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    #[serde(default)]
    pub min_backoff: String,
    #[serde(default)]
    pub max_backoff: String,
}

/// Queue resource as understood by the Cloud Tasks API
///
/// Remote responses carry many more fields (state, purgeTime, ...);
/// they are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireQueue {
    pub name: String,
    #[serde(default)]
    pub rate_limits: RateLimits,
    #[serde(default)]
    pub retry_config: RetryConfig,
}

impl WireQueue {
    /// Map a spec 1:1 onto the wire shape
    pub fn from_spec(spec: &QueueSpec) -> Self {
        Self {
            name: spec.name.clone(),
            rate_limits: RateLimits {
                max_dispatches_per_second: spec.max_dispatches_per_second,
                max_concurrent_dispatches: spec.max_concurrent_dispatches,
            },
            retry_config: RetryConfig {
                min_backoff: spec.min_backoff.clone(),
                max_backoff: spec.max_backoff.clone(),
            },
        }
    }

    /// Same resource under a different name (e.g. fully qualified path)
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
}
