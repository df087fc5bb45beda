// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum DomainError {
    /// A mandatory queue field is missing, empty or zero
    #[error("Key: 'cloudTasks.{queue}.{field}' Error: validate failed on the required rule")]
    RequiredField { queue: String, field: &'static str },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
