// Central Error Type for the Application

use std::fmt;
use thiserror::Error;

/// Remote call stage a reconcile failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReconcileStage {
    Lookup,
    Create,
    Update,
}

impl fmt::Display for ReconcileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileStage::Lookup => write!(f, "lookup"),
            ReconcileStage::Create => write!(f, "create"),
            ReconcileStage::Update => write!(f, "update"),
        }
    }
}

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote service call failed (transport error or non-success status)
    #[error("Remote error{}: {}", .status.map(|s| format!(" ({})", s)).unwrap_or_default(), .message)]
    Remote { status: Option<u16>, message: String },

    /// A remote call failed while reconciling a specific queue
    #[error("Queue '{queue}' failed at {stage}: {source}")]
    Reconcile {
        queue: String,
        stage: ReconcileStage,
        #[source]
        source: Box<AppError>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        AppError::Remote {
            status,
            message: message.into(),
        }
    }

    /// Annotate a remote failure with the queue and stage it happened in
    pub fn at_stage(self, queue: impl Into<String>, stage: ReconcileStage) -> Self {
        AppError::Reconcile {
            queue: queue.into(),
            stage,
            source: Box::new(self),
        }
    }

    /// Queue name and stage, if this is a reconcile failure
    pub fn reconcile_context(&self) -> Option<(&str, ReconcileStage)> {
        match self {
            AppError::Reconcile { queue, stage, .. } => Some((queue.as_str(), *stage)),
            _ => None,
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
