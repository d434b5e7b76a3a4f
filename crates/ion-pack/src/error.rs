//! Error type shared by both Ion encodings.

use crate::types::IonType;

/// Result alias used throughout the crate.
pub type IonResult<T> = Result<T, IonError>;

/// Ion coding error.
///
/// Readers and writers latch the first [`IonError::Malformed`],
/// [`IonError::Io`], or [`IonError::Usage`] they produce and return it from
/// every subsequent call. `TypeMismatch` and `OutOfRange` from a scalar
/// accessor are recoverable: the cursor is unchanged and the reader keeps
/// working.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IonError {
    /// The input violates the binary or text grammar.
    #[error("malformed ion at offset {position}: {reason}")]
    Malformed { position: usize, reason: String },

    /// An accessor was called for a value of a different type, or a
    /// structural call was made in an invalid position.
    #[error("{operation} called on a value of type {actual}")]
    TypeMismatch {
        operation: &'static str,
        actual: IonType,
    },

    /// The value cannot be represented in the requested target type.
    #[error("value out of range: {0}")]
    OutOfRange(String),

    /// Calendar validation failed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A symbol ID has no known text and text was requested.
    #[error("no known text for symbol ID ${0}")]
    UnresolvedSymbol(u64),

    /// The underlying byte source or sink failed.
    #[error("i/o failure: {0}")]
    Io(String),

    /// The caller violated the reader/writer protocol.
    #[error("usage violation: {0}")]
    Usage(String),
}

impl IonError {
    pub(crate) fn malformed(position: usize, reason: impl Into<String>) -> Self {
        IonError::Malformed {
            position,
            reason: reason.into(),
        }
    }

    pub(crate) fn mismatch(operation: &'static str, actual: IonType) -> Self {
        IonError::TypeMismatch { operation, actual }
    }

    pub(crate) fn usage(reason: impl Into<String>) -> Self {
        IonError::Usage(reason.into())
    }

    /// Whether this error latches the reader or writer that produced it.
    pub fn is_sticky(&self) -> bool {
        matches!(
            self,
            IonError::Malformed { .. } | IonError::Io(_) | IonError::Usage(_)
        )
    }
}
