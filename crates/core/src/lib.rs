// Fougere Core - Domain Logic, Ports & Reconciler
// NO infrastructure dependencies (Hexagonal Architecture)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, ReconcileStage, Result};
