//! Engine error types.
//!
//! Two kinds of failure reach a caller: validation errors (the view or request
//! is wrong and retrying will not help) and execution errors raised by the
//! store. Condition compilation never fails; unusable conditions degrade.

use thiserror::Error;

use crate::model::{Style, Unit};
use crate::store::StoreError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Coarse error classification for UI layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fix the view or request.
    Validation,
    /// The store failed; the same request may succeed later.
    Execution,
}

/// Rejected view or request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The view is not bound to an estimation run.
    #[error("view has no dataset result id")]
    MissingDatasetResultId,

    /// A slot the layout requires is absent.
    #[error("required parameter '{0}' is missing")]
    MissingSlot(&'static str),

    /// The style cannot render this unit, or cannot be executed at all.
    #[error("{style} view is not supported for unit '{unit}'")]
    UnsupportedView { style: Style, unit: Unit },

    /// A column identifier that is not in the unit's catalog.
    #[error("unknown column '{column}' for unit '{unit}'")]
    UnknownColumn { column: String, unit: Unit },

    /// Batch requests must ask for at least one row.
    #[error("batch size must be greater than zero")]
    InvalidBatchSize,
}

/// Errors returned by [`QueryEngine`](crate::engine::QueryEngine).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid view: {0}")]
    Validation(#[from] ValidationError),

    #[error("query execution failed: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Store(_) => ErrorKind::Execution,
        }
    }

    /// Check if this error is retriable.
    pub fn is_retriable(&self) -> bool {
        self.kind() == ErrorKind::Execution
    }
}
