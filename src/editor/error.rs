use std::fmt;

use crate::assets::AssetError;
use crate::codec::CodecError;
use crate::store::StoreError;

/// Coarse classification of editor failures, as reported to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    VersionConflict,
    MalformedDocument,
    Transient,
    /// The request itself was rejected before anything was written.
    InvalidInput,
}

/// Error type for editor operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    Store(StoreError),
    Codec(CodecError),
    Asset(AssetError),
    /// The document decoded, but its value has the wrong shape.
    Schema { path: String, reason: String },
    /// Required fields missing from a record.
    Validation { missing: Vec<&'static str> },
    UnknownRecord(String),
    DuplicateRecord(String),
    IndexOutOfRange { index: usize, len: usize },
    DuplicateBox(String),
    UnknownBox(String),
    /// No document has been loaded into the cache slot yet.
    NotLoaded { path: String },
}

impl EditorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EditorError::Store(err) | EditorError::Asset(AssetError::Store(err)) => match err {
                StoreError::NotFound { .. } => ErrorKind::NotFound,
                StoreError::Unauthorized(_) => ErrorKind::Unauthorized,
                StoreError::VersionConflict { .. } => ErrorKind::VersionConflict,
                StoreError::Transient(_) | StoreError::LockPoisoned(_) => ErrorKind::Transient,
            },
            EditorError::Codec(_) | EditorError::Schema { .. } => ErrorKind::MalformedDocument,
            EditorError::Asset(_)
            | EditorError::Validation { .. }
            | EditorError::UnknownRecord(_)
            | EditorError::DuplicateRecord(_)
            | EditorError::IndexOutOfRange { .. }
            | EditorError::DuplicateBox(_)
            | EditorError::UnknownBox(_)
            | EditorError::NotLoaded { .. } => ErrorKind::InvalidInput,
        }
    }

    pub(crate) fn schema(path: &str, reason: impl fmt::Display) -> Self {
        EditorError::Schema {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::Store(err) => write!(f, "{}", err),
            EditorError::Codec(err) => write!(f, "{}", err),
            EditorError::Asset(err) => write!(f, "{}", err),
            EditorError::Schema { path, reason } => write!(f, "{}: {}", path, reason),
            EditorError::Validation { missing } => {
                write!(f, "missing required fields: {}", missing.join(", "))
            }
            EditorError::UnknownRecord(id) => write!(f, "no record with id {:?}", id),
            EditorError::DuplicateRecord(id) => write!(f, "a record with id {:?} already exists", id),
            EditorError::IndexOutOfRange { index, len } => {
                write!(f, "index {} out of range for {} records", index, len)
            }
            EditorError::DuplicateBox(name) => {
                write!(f, "a box named {:?} already exists", name)
            }
            EditorError::UnknownBox(name) => write!(f, "no box named {:?}", name),
            EditorError::NotLoaded { path } => write!(f, "{} has not been loaded", path),
        }
    }
}

impl std::error::Error for EditorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EditorError::Store(err) => Some(err),
            EditorError::Codec(err) => Some(err),
            EditorError::Asset(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for EditorError {
    fn from(err: StoreError) -> Self {
        EditorError::Store(err)
    }
}

impl From<CodecError> for EditorError {
    fn from(err: CodecError) -> Self {
        EditorError::Codec(err)
    }
}

impl From<AssetError> for EditorError {
    fn from(err: AssetError) -> Self {
        EditorError::Asset(err)
    }
}
