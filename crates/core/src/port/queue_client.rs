// Queue Client Port (Interface)

use crate::domain::{QueueSpec, WireQueue};
use crate::error::Result;
use async_trait::async_trait;

/// Result of looking up a queue on the remote service
///
/// A failed lookup is the `Err` side of the surrounding `Result`;
/// "not found" is never reported as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(WireQueue),
    NotFound,
}

/// Remote queue-management capability consumed by the reconciler
///
/// Implementations are shared across concurrent reconcile tasks.
/// `QueueSpec` locates the queue by project, region and name. The
/// wire queue carries the desired state.
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Fetch the remote queue named by `spec`
    async fn lookup(&self, spec: &QueueSpec) -> Result<LookupOutcome>;

    /// Create the queue under `spec`'s parent path
    async fn create(&self, spec: &QueueSpec, queue: &WireQueue) -> Result<()>;

    /// Replace rate limits and retry config of an existing queue
    async fn update(&self, spec: &QueueSpec, queue: &WireQueue) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::{AppError, ReconcileStage};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// A call received by [`InMemoryQueueClient`]
    #[derive(Debug, Clone, PartialEq)]
    pub enum ClientCall {
        Lookup(String),
        Create(WireQueue),
        Update(WireQueue),
    }

    impl ClientCall {
        fn matches(&self, stage: ReconcileStage, name: &str) -> bool {
            match (self, stage) {
                (ClientCall::Lookup(n), ReconcileStage::Lookup) => n == name,
                (ClientCall::Create(q), ReconcileStage::Create) => q.name == name,
                (ClientCall::Update(q), ReconcileStage::Update) => q.name == name,
                _ => false,
            }
        }
    }

    /// In-memory QueueClient that records every call
    ///
    /// Queues are keyed by their unqualified spec name. Failures can be
    /// injected per queue and stage.
    #[derive(Default)]
    pub struct InMemoryQueueClient {
        queues: Mutex<HashMap<String, WireQueue>>,
        failures: Mutex<HashMap<(String, ReconcileStage), (Option<u16>, String)>>,
        calls: Mutex<Vec<ClientCall>>,
        latency: Option<Duration>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl InMemoryQueueClient {
        pub fn new() -> Self {
            Self::default()
        }

        /// Delay every call, to observe overlapping tasks
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = Some(latency);
            self
        }

        /// Seed an existing remote queue
        pub fn with_queue(self, queue: WireQueue) -> Self {
            self.queues
                .lock()
                .unwrap()
                .insert(queue.name.clone(), queue);
            self
        }

        /// Make `stage` fail for queue `name`
        pub fn fail(self, name: &str, stage: ReconcileStage, status: Option<u16>, message: &str) -> Self {
            self.failures
                .lock()
                .unwrap()
                .insert((name.to_string(), stage), (status, message.to_string()));
            self
        }

        pub fn calls(&self) -> Vec<ClientCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Number of `stage` calls made for queue `name`
        pub fn count(&self, stage: ReconcileStage, name: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.matches(stage, name))
                .count()
        }

        pub fn queue(&self, name: &str) -> Option<WireQueue> {
            self.queues.lock().unwrap().get(name).cloned()
        }

        /// Highest number of calls that were in progress at once
        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }

        async fn enter(&self, call: ClientCall, stage: ReconcileStage, name: &str) -> Result<()> {
            self.calls.lock().unwrap().push(call);

            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let failure = self
                .failures
                .lock()
                .unwrap()
                .get(&(name.to_string(), stage))
                .cloned();
            match failure {
                Some((status, message)) => Err(AppError::remote(status, message)),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl QueueClient for InMemoryQueueClient {
        async fn lookup(&self, spec: &QueueSpec) -> Result<LookupOutcome> {
            self.enter(
                ClientCall::Lookup(spec.name.clone()),
                ReconcileStage::Lookup,
                &spec.name,
            )
            .await?;

            Ok(match self.queue(&spec.name) {
                Some(queue) => LookupOutcome::Found(queue),
                None => LookupOutcome::NotFound,
            })
        }

        async fn create(&self, spec: &QueueSpec, queue: &WireQueue) -> Result<()> {
            self.enter(
                ClientCall::Create(queue.clone()),
                ReconcileStage::Create,
                &spec.name,
            )
            .await?;

            let mut queues = self.queues.lock().unwrap();
            if queues.contains_key(&queue.name) {
                return Err(AppError::remote(Some(409), "Queue already exists"));
            }
            queues.insert(queue.name.clone(), queue.clone());
            Ok(())
        }

        async fn update(&self, spec: &QueueSpec, queue: &WireQueue) -> Result<()> {
            self.enter(
                ClientCall::Update(queue.clone()),
                ReconcileStage::Update,
                &spec.name,
            )
            .await?;

            let mut queues = self.queues.lock().unwrap();
            match queues.get_mut(&queue.name) {
                Some(existing) => {
                    *existing = queue.clone();
                    Ok(())
                }
                None => Err(AppError::remote(Some(404), "Queue does not exist")),
            }
        }
    }
}
