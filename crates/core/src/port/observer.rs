// Reconcile Observer Port (logging capability)

use crate::domain::QueueAction;
use crate::error::AppError;
use tracing::{error, info};

/// Receives reconcile progress events
///
/// Injected into the reconciler so tests can swap logging for a
/// recording stub or a no-op.
pub trait ReconcileObserver: Send + Sync {
    /// A reconcile run is starting for `total` queues
    fn started(&self, total: usize);

    fn queue_reconciled(&self, queue: &str, action: QueueAction);

    fn queue_failed(&self, queue: &str, error: &AppError);

    /// All tasks joined
    fn finished(&self, succeeded: usize, failed: usize);
}

/// Observer that emits `tracing` events (production)
pub struct TracingObserver;

impl ReconcileObserver for TracingObserver {
    fn started(&self, total: usize) {
        info!(queues = total, "Reconciling Cloud Tasks queues");
    }

    fn queue_reconciled(&self, queue: &str, action: QueueAction) {
        info!(queue = %queue, action = %action, "Queue reconciled");
    }

    fn queue_failed(&self, queue: &str, err: &AppError) {
        match err.reconcile_context() {
            Some((_, stage)) => {
                error!(queue = %queue, stage = %stage, error = %err, "Queue reconcile failed")
            }
            None => error!(queue = %queue, error = %err, "Queue reconcile failed"),
        }
    }

    fn finished(&self, succeeded: usize, failed: usize) {
        if failed == 0 {
            info!(succeeded, "Reconcile complete");
        } else {
            error!(succeeded, failed, "Reconcile finished with failures");
        }
    }
}

/// Observer that discards every event
pub struct NoopObserver;

impl ReconcileObserver for NoopObserver {
    fn started(&self, _total: usize) {}
    fn queue_reconciled(&self, _queue: &str, _action: QueueAction) {}
    fn queue_failed(&self, _queue: &str, _error: &AppError) {}
    fn finished(&self, _succeeded: usize, _failed: usize) {}
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Event captured by [`RecordingObserver`]
    #[derive(Debug, Clone, PartialEq)]
    pub enum ObservedEvent {
        Started(usize),
        Reconciled(String, QueueAction),
        Failed(String, String),
        Finished { succeeded: usize, failed: usize },
    }

    /// Observer that records events for assertions
    #[derive(Default)]
    pub struct RecordingObserver {
        events: Mutex<Vec<ObservedEvent>>,
    }

    impl RecordingObserver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<ObservedEvent> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: ObservedEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl ReconcileObserver for RecordingObserver {
        fn started(&self, total: usize) {
            self.push(ObservedEvent::Started(total));
        }

        fn queue_reconciled(&self, queue: &str, action: QueueAction) {
            self.push(ObservedEvent::Reconciled(queue.to_string(), action));
        }

        fn queue_failed(&self, queue: &str, error: &AppError) {
            self.push(ObservedEvent::Failed(queue.to_string(), error.to_string()));
        }

        fn finished(&self, succeeded: usize, failed: usize) {
            self.push(ObservedEvent::Finished { succeeded, failed });
        }
    }
}
