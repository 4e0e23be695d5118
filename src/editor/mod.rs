//! Editors - read-modify-write over content files.
//!
//! Every editor works on one path through the session's shared cache slot:
//!
//! 1. `load` fetches and decodes the file and caches `{body, version}`.
//! 2. A mutation copies the cached body, applies the change, encodes it and
//!    writes it with the cached version tag.
//! 3. On success the slot takes the new body and tag; on failure it is left
//!    exactly as it was.
//!
//! The slot's lock is held for the whole of step 2, so mutations on one path
//! are sequenced even across editors. A write against a tag that is stale
//! at the store (another session wrote in between) fails with
//! [`StoreError::VersionConflict`](crate::StoreError) and is never retried.
//!
//! Each editor keeps an [`EditorState`] and the [`Notice`] of its last
//! operation for display.

mod collection;
mod document;
mod error;
mod landing;
mod singleton;

pub use collection::CollectionEditor;
pub use error::{EditorError, ErrorKind};
pub use landing::LandingEditor;
pub use singleton::SingletonEditor;

use crate::store::VersionTag;

/// Lifecycle of an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorState {
    #[default]
    Uninitialized,
    Loading,
    Ready,
    Saving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// User-visible status message of the last operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Result of a mutation that completed without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Written to the store under a new version tag.
    Saved { version: VersionTag },
    /// Applied to the editor's draft only; persisted by a later save.
    Staged,
    /// The confirmation was declined. Nothing changed.
    Cancelled,
}

impl Outcome {
    pub fn version(&self) -> Option<&VersionTag> {
        match self {
            Outcome::Saved { version } => Some(version),
            _ => None,
        }
    }
}

/// Confirmation gate for destructive operations.
///
/// Implemented for `bool` (a decision made up front) and for closures that
/// receive the prompt, e.g. a dialog.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl Confirm for bool {
    fn confirm(&mut self, _prompt: &str) -> bool {
        *self
    }
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// State and last notice of one editor.
#[derive(Debug, Default)]
pub(crate) struct Status {
    state: EditorState,
    notice: Option<Notice>,
}

impl Status {
    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn begin(&mut self, state: EditorState) {
        self.state = state;
    }

    /// Record the result of an operation. `loaded` tells whether a good
    /// state is cached to fall back to.
    pub fn settle<T>(
        &mut self,
        result: &Result<T, EditorError>,
        loaded: bool,
        success: impl FnOnce(&T) -> Notice,
        context: &str,
    ) {
        self.state = if loaded {
            EditorState::Ready
        } else {
            EditorState::Uninitialized
        };
        self.notice = Some(match result {
            Ok(value) => success(value),
            Err(err) => {
                tracing::warn!(error = %err, kind = ?err.kind(), "{}", context);
                Notice::error(format!("{}: {}", context, err))
            }
        });
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }
}

/// `book` -> `Book`.
pub(crate) fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_impls() {
        assert!(true.confirm("delete?"));
        assert!(!false.confirm("delete?"));

        let mut seen = String::new();
        let mut dialog = |prompt: &str| {
            seen = prompt.to_string();
            false
        };
        assert!(!dialog.confirm("Are you sure?"));
        assert_eq!(seen, "Are you sure?");
    }

    #[test]
    fn settle_falls_back_to_uninitialized() {
        let mut status = Status::default();
        status.begin(EditorState::Loading);
        let failed: Result<(), EditorError> = Err(EditorError::UnknownBox("x".into()));
        status.settle(&failed, false, |_| Notice::success("ok"), "Error loading");
        assert_eq!(status.state(), EditorState::Uninitialized);
        assert!(status.notice().unwrap().is_error());
        assert_eq!(
            status.notice().unwrap().message,
            "Error loading: no box named \"x\""
        );

        status.settle(&Ok(()), true, |_| Notice::success("ok"), "Error loading");
        assert_eq!(status.state(), EditorState::Ready);
        assert_eq!(status.notice(), Some(&Notice::success("ok")));
    }

    #[test]
    fn capitalize_labels() {
        assert_eq!(capitalize("timeline entry"), "Timeline entry");
        assert_eq!(capitalize(""), "");
    }
}
