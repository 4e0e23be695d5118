//! InMemoryDocumentStore - HashMap-backed document store for testing and offline editing.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;

use super::{
    ChangeRecord, Document, DocumentStore, DirectoryEntry, EntryKind, StoreError, VersionTag,
};

/// Internal stored representation of a document.
struct StoredDocument {
    content: Vec<u8>,
    version: VersionTag,
}

/// In-memory document store backed by a HashMap.
///
/// Version tags are git blob SHAs, so they match what the GitHub contents API
/// would report for the same bytes. Every write and create appends a
/// [`ChangeRecord`]. Clone-friendly via Arc: clones share storage.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    storage: Arc<RwLock<HashMap<String, StoredDocument>>>,
    changes: Arc<RwLock<Vec<ChangeRecord>>>,
    change_seq: Arc<AtomicU64>,
    access_denied: Arc<AtomicBool>,
    failures: Arc<Mutex<VecDeque<StoreError>>>,
    author: String,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
            changes: Arc::new(RwLock::new(Vec::new())),
            change_seq: Arc::new(AtomicU64::new(1)),
            access_denied: Arc::new(AtomicBool::new(false)),
            failures: Arc::new(Mutex::new(VecDeque::new())),
            author: "folio".to_string(),
        }
    }

    /// Set the author recorded on change records.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Put a document in place without recording a change.
    pub fn seed(&self, path: &str, content: impl Into<Vec<u8>>) -> Result<VersionTag, StoreError> {
        let content = content.into();
        let version = VersionTag::of_content(&content);
        self.seed_with_version(path, content, version)
    }

    /// Put a document in place under an explicit version tag, as if another
    /// client had written it.
    pub fn seed_with_version(
        &self,
        path: &str,
        content: impl Into<Vec<u8>>,
        version: impl Into<VersionTag>,
    ) -> Result<VersionTag, StoreError> {
        let content = content.into();
        let version = version.into();
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::LockPoisoned("seed"))?;
        storage.insert(
            normalize(path).to_string(),
            StoredDocument {
                content,
                version: version.clone(),
            },
        );
        Ok(version)
    }

    /// Current content of a document, if present.
    pub fn content(&self, path: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(storage.get(normalize(path)).map(|s| s.content.clone()))
    }

    /// Current version tag of a document, if present.
    pub fn version(&self, path: &str) -> Result<Option<VersionTag>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(storage.get(normalize(path)).map(|s| s.version.clone()))
    }

    /// All recorded changes, oldest first.
    pub fn changes(&self) -> Result<Vec<ChangeRecord>, StoreError> {
        let changes = self
            .changes
            .read()
            .map_err(|_| StoreError::LockPoisoned("changes read"))?;
        Ok(changes.clone())
    }

    /// Reject every subsequent call with `Unauthorized` (or lift the rejection).
    pub fn set_access_denied(&self, denied: bool) {
        self.access_denied.store(denied, Ordering::SeqCst);
    }

    /// Make the next store call fail with `error`. Queued failures are
    /// consumed one per call, in order.
    pub fn fail_next(&self, error: StoreError) -> Result<(), StoreError> {
        let mut failures = self
            .failures
            .lock()
            .map_err(|_| StoreError::LockPoisoned("failure queue"))?;
        failures.push_back(error);
        Ok(())
    }

    fn check_call(&self) -> Result<(), StoreError> {
        if self.access_denied.load(Ordering::SeqCst) {
            return Err(StoreError::Unauthorized("bad credentials".into()));
        }
        let mut failures = self
            .failures
            .lock()
            .map_err(|_| StoreError::LockPoisoned("failure queue"))?;
        match failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn record_change(&self, path: &str, message: &str) -> Result<(), StoreError> {
        let seq = self.change_seq.fetch_add(1, Ordering::Relaxed);
        let id = VersionTag::of_content(format!("{}:{}:{}", seq, path, message).as_bytes());
        let mut changes = self
            .changes
            .write()
            .map_err(|_| StoreError::LockPoisoned("changes write"))?;
        changes.push(ChangeRecord {
            id: id.as_str().to_string(),
            message: message.to_string(),
            author: self.author.clone(),
            timestamp: Utc::now(),
        });
        Ok(())
    }
}

impl DocumentStore for InMemoryDocumentStore {
    async fn fetch_document(&self, path: &str) -> Result<Document, StoreError> {
        self.check_call()?;
        let path = normalize(path);
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;

        match storage.get(path) {
            Some(stored) => Ok(Document {
                path: path.to_string(),
                content: stored.content.clone(),
                version: stored.version.clone(),
            }),
            None => Err(StoreError::NotFound {
                path: path.to_string(),
            }),
        }
    }

    async fn write_document(
        &self,
        path: &str,
        content: &[u8],
        version: &VersionTag,
        message: &str,
    ) -> Result<VersionTag, StoreError> {
        self.check_call()?;
        let path = normalize(path);
        let new_version = VersionTag::of_content(content);
        {
            let mut storage = self
                .storage
                .write()
                .map_err(|_| StoreError::LockPoisoned("write"))?;

            let actual = storage
                .get(path)
                .map(|s| s.version.clone())
                .ok_or_else(|| StoreError::NotFound {
                    path: path.to_string(),
                })?;

            if &actual != version {
                return Err(StoreError::VersionConflict {
                    path: path.to_string(),
                    expected: Some(version.clone()),
                    actual: Some(actual),
                });
            }

            storage.insert(
                path.to_string(),
                StoredDocument {
                    content: content.to_vec(),
                    version: new_version.clone(),
                },
            );
        }
        self.record_change(path, message)?;
        Ok(new_version)
    }

    async fn create_document(
        &self,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> Result<VersionTag, StoreError> {
        self.check_call()?;
        let path = normalize(path);
        let version = VersionTag::of_content(content);
        {
            let mut storage = self
                .storage
                .write()
                .map_err(|_| StoreError::LockPoisoned("write"))?;

            if let Some(existing) = storage.get(path) {
                return Err(StoreError::VersionConflict {
                    path: path.to_string(),
                    expected: None,
                    actual: Some(existing.version.clone()),
                });
            }

            storage.insert(
                path.to_string(),
                StoredDocument {
                    content: content.to_vec(),
                    version: version.clone(),
                },
            );
        }
        self.record_change(path, message)?;
        Ok(version)
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<DirectoryEntry>, StoreError> {
        self.check_call()?;
        let dir = normalize(path).trim_end_matches('/');
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir)
        };

        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;

        let mut entries: BTreeMap<String, DirectoryEntry> = BTreeMap::new();
        for (key, stored) in storage.iter() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((child, _)) => {
                    entries.entry(child.to_string()).or_insert_with(|| {
                        let child_path = format!("{}{}", prefix, child);
                        DirectoryEntry {
                            name: child.to_string(),
                            version: VersionTag::of_content(child_path.as_bytes()),
                            path: child_path,
                            kind: EntryKind::Dir,
                            size: 0,
                        }
                    });
                }
                None => {
                    entries.insert(
                        rest.to_string(),
                        DirectoryEntry {
                            name: rest.to_string(),
                            path: key.clone(),
                            kind: EntryKind::File,
                            size: stored.content.len() as u64,
                            version: stored.version.clone(),
                        },
                    );
                }
            }
        }

        if entries.is_empty() && !dir.is_empty() {
            return Err(StoreError::NotFound {
                path: dir.to_string(),
            });
        }

        Ok(entries.into_values().collect())
    }

    async fn list_recent_changes(&self, limit: usize) -> Result<Vec<ChangeRecord>, StoreError> {
        self.check_call()?;
        let changes = self
            .changes
            .read()
            .map_err(|_| StoreError::LockPoisoned("changes read"))?;
        Ok(changes.iter().rev().take(limit).cloned().collect())
    }

    async fn verify_access(&self) -> Result<(), StoreError> {
        self.check_call()
    }
}

fn normalize(path: &str) -> &str {
    path.trim_start_matches('/')
}
