// Reconcile Use Case - drive remote queues to their declared state

use crate::domain::{CloudTasksConfig, QueueAction, QueueSpec, WireQueue};
use crate::error::{AppError, ReconcileStage, Result};
use crate::port::{LookupOutcome, QueueClient, ReconcileObserver};
use std::sync::Arc;

/// Reconciler service
///
/// Fans out one task per configured queue. Each task looks the queue up and
/// then creates or updates it; tasks are independent, so one failing queue
/// never stops its siblings.
pub struct Reconciler {
    client: Arc<dyn QueueClient>,
    observer: Arc<dyn ReconcileObserver>,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Arguments
    /// * `client` - Remote queue client, shared by all tasks
    /// * `observer` - Receives progress events (logging)
    pub fn new(client: Arc<dyn QueueClient>, observer: Arc<dyn ReconcileObserver>) -> Self {
        Self { client, observer }
    }

    /// Reconcile every queue in `config`
    ///
    /// All tasks are spawned before any result is collected and every task
    /// is joined before returning. Handles are awaited in key order, so
    /// observer events and the returned error follow key order rather than
    /// completion order. Every failure reaches the observer.
    ///
    /// # Example
    /// ```ignore
    /// let reconciler = Reconciler::new(client, Arc::new(TracingObserver));
    /// reconciler.reconcile(&config).await?;
    /// ```
    pub async fn reconcile(&self, config: &CloudTasksConfig) -> Result<()> {
        self.observer.started(config.len());

        let handles: Vec<_> = config
            .queues
            .values()
            .map(|spec| {
                let client = Arc::clone(&self.client);
                let spec = spec.clone();
                let name = spec.name.clone();
                let handle = tokio::spawn(async move { reconcile_one(client.as_ref(), &spec).await });
                (name, handle)
            })
            .collect();

        let mut first_error: Option<AppError> = None;
        let mut succeeded = 0;
        let mut failed = 0;

        for (name, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(AppError::Internal(format!(
                    "reconcile task for queue '{}' aborted: {}",
                    name, join_err
                ))),
            };

            match result {
                Ok(action) => {
                    succeeded += 1;
                    self.observer.queue_reconciled(&name, action);
                }
                Err(e) => {
                    failed += 1;
                    self.observer.queue_failed(&name, &e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        self.observer.finished(succeeded, failed);

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Reconcile a single queue (lookup, then create or update)
    pub async fn reconcile_queue(&self, spec: &QueueSpec) -> Result<QueueAction> {
        reconcile_one(self.client.as_ref(), spec).await
    }
}

/// Per-queue state machine:
/// Lookup -> Found -> Update, Lookup -> NotFound -> Create, Lookup -> Err -> done
async fn reconcile_one(client: &dyn QueueClient, spec: &QueueSpec) -> Result<QueueAction> {
    let outcome = client
        .lookup(spec)
        .await
        .map_err(|e| e.at_stage(&spec.name, ReconcileStage::Lookup))?;

    let queue = WireQueue::from_spec(spec);

    match outcome {
        LookupOutcome::Found(_) => {
            client
                .update(spec, &queue)
                .await
                .map_err(|e| e.at_stage(&spec.name, ReconcileStage::Update))?;
            Ok(QueueAction::Updated)
        }
        LookupOutcome::NotFound => {
            client
                .create(spec, &queue)
                .await
                .map_err(|e| e.at_stage(&spec.name, ReconcileStage::Create))?;
            Ok(QueueAction::Created)
        }
    }
}
