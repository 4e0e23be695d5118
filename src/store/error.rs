use std::fmt;

use super::VersionTag;

/// Error type for document store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The document (or directory) does not exist on the store.
    NotFound { path: String },
    /// Credentials were rejected or lack access to the repository.
    Unauthorized(String),
    /// Optimistic concurrency conflict: the presented version tag is stale,
    /// or a create targeted a path that already exists.
    VersionConflict {
        path: String,
        expected: Option<VersionTag>,
        actual: Option<VersionTag>,
    },
    /// Network or HTTP-layer failure of any other kind.
    Transient(String),
    /// The in-process store's lock was poisoned.
    LockPoisoned(&'static str),
}

impl StoreError {
    /// Returns true for the optimistic concurrency rejection.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::VersionConflict { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound { path } => write!(f, "document not found: {}", path),
            StoreError::Unauthorized(msg) => write!(f, "unauthorized: {}", msg),
            StoreError::VersionConflict {
                path,
                expected,
                actual,
            } => write!(
                f,
                "version conflict on {} (expected {}, actual {})",
                path,
                expected.as_ref().map(VersionTag::as_str).unwrap_or("none"),
                actual.as_ref().map(VersionTag::as_str).unwrap_or("none"),
            ),
            StoreError::Transient(msg) => write!(f, "store request failed: {}", msg),
            StoreError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(feature = "github")]
impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transient(err.to_string())
    }
}
