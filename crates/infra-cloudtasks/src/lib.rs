// Fougere Infrastructure - Cloud Tasks Adapter
// Implements: QueueClient over the Cloud Tasks REST API (v2)

mod client;

pub use client::{CloudTasksClient, CloudTasksClientConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
