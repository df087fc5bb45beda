// Domain Layer - Pure business logic and entities

pub mod config;
pub mod error;
pub mod queue;
pub mod resource;

// Re-exports
pub use config::{CloudTasksConfig, CloudTasksSettings, RawQueue};
pub use error::DomainError;
pub use queue::{QueueAction, QueueSpec};
pub use resource::{RateLimits, RetryConfig, WireQueue};
