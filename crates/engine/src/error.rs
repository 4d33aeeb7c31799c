//! The module contains the errors the ledger can return.
//!
//! - [`Validation`] a single input could not be parsed or is out of range.
//!   Workflows re-prompt the same step.
//! - [`InvariantViolation`] the mutation would break a ledger rule (deleting a
//!   sold purchase, paying more than the outstanding debt, ...).
//! - [`NotFound`] the referenced record does not exist (anymore).
//! - [`Persistence`] the snapshot could not be written; nothing was committed.
//! - [`MalformedImport`] a backup document is unreadable or inconsistent.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InvariantViolation`]: EngineError::InvariantViolation
//!  [`NotFound`]: EngineError::NotFound
//!  [`Persistence`]: EngineError::Persistence
//!  [`MalformedImport`]: EngineError::MalformedImport
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Not allowed: {0}")]
    InvariantViolation(String),
    #[error("{0} not found!")]
    NotFound(String),
    #[error("Storage failure: {0}")]
    Persistence(String),
    #[error("Invalid backup: {0}")]
    MalformedImport(String),
}

impl EngineError {
    /// `true` when the same input step can simply be asked again.
    #[must_use]
    pub fn is_recoverable_input(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}
