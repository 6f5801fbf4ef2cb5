//! Typed outcomes of façade and adapter operations.
//!
//! Every operation returns [`Interaction<T>`]: `Ok` on success or exactly one
//! [`InteractionError`] variant. "Element absent" and "condition never held"
//! are ordinary values here, so callers decide whether they abort a flow.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::driver::DriverError;
use crate::locator::Locator;

/// Result alias used by every façade and adapter operation.
pub type Interaction<T> = Result<T, InteractionError>;

#[derive(Error, Debug)]
pub enum InteractionError {
    /// The locator matched nothing usable within the timeout.
    #[error("Element not found: {locator} (waited {}ms)", .waited.as_millis())]
    NotFound { locator: Locator, waited: Duration },

    /// A wait condition never became true.
    #[error("Timeout after {}ms waiting for {what}", .waited.as_millis())]
    Timeout { what: String, waited: Duration },

    /// The element was found but another element received the click, even
    /// after one scroll-into-view retry.
    #[error("Click intercepted on {target}: {detail}")]
    Intercepted { target: String, detail: String },

    /// The element was re-rendered between locate and act.
    #[error("Stale element reference: {0}")]
    StaleReference(String),

    /// An upload source does not exist on the local filesystem.
    #[error("Local file not found: {}", .path.display())]
    LocalResourceMissing { path: PathBuf },

    /// The field did not hold the expected value after input.
    #[error("Value mismatch on {locator}: expected {expected:?}, found {actual:?}")]
    ValueMismatch {
        locator: Locator,
        expected: String,
        actual: String,
    },

    /// The wait was cancelled by its token.
    #[error("Wait cancelled: {what}")]
    Cancelled { what: String },

    /// Anything else.
    #[error("{0}")]
    Unknown(String),
}

/// Flat classification of an [`InteractionError`] for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    Timeout,
    Intercepted,
    StaleReference,
    LocalResourceMissing,
    ValueMismatch,
    Cancelled,
    Unknown,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NotFound => "not_found",
            FailureKind::Timeout => "timeout",
            FailureKind::Intercepted => "intercepted",
            FailureKind::StaleReference => "stale_reference",
            FailureKind::LocalResourceMissing => "local_resource_missing",
            FailureKind::ValueMismatch => "value_mismatch",
            FailureKind::Cancelled => "cancelled",
            FailureKind::Unknown => "unknown",
        }
    }
}

impl InteractionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            InteractionError::NotFound { .. } => FailureKind::NotFound,
            InteractionError::Timeout { .. } => FailureKind::Timeout,
            InteractionError::Intercepted { .. } => FailureKind::Intercepted,
            InteractionError::StaleReference(_) => FailureKind::StaleReference,
            InteractionError::LocalResourceMissing { .. } => FailureKind::LocalResourceMissing,
            InteractionError::ValueMismatch { .. } => FailureKind::ValueMismatch,
            InteractionError::Cancelled { .. } => FailureKind::Cancelled,
            InteractionError::Unknown(_) => FailureKind::Unknown,
        }
    }

    /// `NotFound` and `Timeout` are the "absent" outcomes a caller may
    /// reasonably treat as a boolean.
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            InteractionError::NotFound { .. } | InteractionError::Timeout { .. }
        )
    }
}

impl From<DriverError> for InteractionError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::StaleElement(detail) => InteractionError::StaleReference(detail),
            other => InteractionError::Unknown(other.to_string()),
        }
    }
}
