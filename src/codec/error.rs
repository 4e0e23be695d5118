use std::fmt;

/// Error type for decoding and encoding data files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The text does not hold the expected declaration, or its value is not
    /// a pure data literal.
    Malformed { reason: String, offset: usize },
    /// The value could not be rendered as source text.
    Encode(String),
}

impl CodecError {
    pub(crate) fn malformed(reason: impl Into<String>, offset: usize) -> Self {
        CodecError::Malformed {
            reason: reason.into(),
            offset,
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Malformed { reason, offset } => {
                write!(f, "malformed document at byte {}: {}", offset, reason)
            }
            CodecError::Encode(msg) => write!(f, "encode error: {}", msg),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Encode(err.to_string())
    }
}
