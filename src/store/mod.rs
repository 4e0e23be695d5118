//! Document store - version-tagged files addressed by path.
//!
//! Every document carries a [`VersionTag`] (the git blob SHA of its content).
//! Writes must present the tag they last observed; the store rejects stale
//! tags with [`StoreError::VersionConflict`], which is what prevents lost
//! updates when two editors touch the same file.
//!
//! ## Example
//!
//! ```ignore
//! use folio::{DocumentStore, InMemoryDocumentStore};
//!
//! let store = InMemoryDocumentStore::new();
//! let v1 = store.create_document("books.js", b"const books = [];", "Add books").await?;
//! let doc = store.fetch_document("books.js").await?;
//! let v2 = store.write_document("books.js", b"const books = [1];", &doc.version, "Update books").await?;
//! ```

mod error;
#[cfg(feature = "github")]
mod github;
mod in_memory;

use std::fmt;
use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

pub use error::StoreError;
#[cfg(feature = "github")]
pub use github::GitHubStore;
pub use in_memory::InMemoryDocumentStore;

/// Opaque version tag of a document. Changes whenever the content changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionTag(String);

impl VersionTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Git blob SHA-1 of `content`: `sha1("blob <len>\0" ++ content)`.
    pub fn of_content(content: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(format!("blob {}\0", content.len()).as_bytes());
        hasher.update(content);
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for VersionTag {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

/// A document as fetched from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: String,
    pub content: Vec<u8>,
    pub version: VersionTag,
}

impl Document {
    /// The content as UTF-8 text.
    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.content)
    }
}

/// Kind of a directory listing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: String,
    pub kind: EntryKind,
    pub size: u64,
    pub version: VersionTag,
}

/// An auditable change (commit) recorded by a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub id: String,
    pub message: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

/// Version-tagged document storage.
///
/// All operations are asynchronous; implementations run each call to
/// completion or failure with no retry.
pub trait DocumentStore: Send + Sync {
    /// Fetch a document and its current version tag.
    fn fetch_document(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<Document, StoreError>> + Send;

    /// Replace an existing document. Fails with `VersionConflict` when
    /// `version` is not the document's current tag.
    fn write_document(
        &self,
        path: &str,
        content: &[u8],
        version: &VersionTag,
        message: &str,
    ) -> impl Future<Output = Result<VersionTag, StoreError>> + Send;

    /// Create a document that does not exist yet. Fails with
    /// `VersionConflict` when the path is already taken.
    fn create_document(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> impl Future<Output = Result<VersionTag, StoreError>> + Send;

    /// List the entries directly under `path`.
    fn list_directory(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<Vec<DirectoryEntry>, StoreError>> + Send;

    /// The most recent changes, newest first.
    fn list_recent_changes(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ChangeRecord>, StoreError>> + Send;

    /// Check that the credentials can reach the repository.
    fn verify_access(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
