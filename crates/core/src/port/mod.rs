// Port Layer - Interfaces for external dependencies

pub mod observer;
pub mod queue_client;

// Re-exports
pub use observer::{NoopObserver, ReconcileObserver, TracingObserver};
pub use queue_client::{LookupOutcome, QueueClient};
