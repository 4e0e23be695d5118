use serde_json::Value;

use super::EditorError;
use crate::codec::CodecError;
use crate::record::Category;
use crate::session::{CacheSlot, CachedDocument, Session};
use crate::store::{DocumentStore, StoreError, VersionTag};

/// Expected top-level shape of a file's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    Array,
    Object,
}

impl Shape {
    fn empty(self) -> Value {
        match self {
            Shape::Array => Value::Array(Vec::new()),
            Shape::Object => Value::Object(Default::default()),
        }
    }

    fn check(self, path: &str, body: &Value) -> Result<(), EditorError> {
        match (self, body) {
            (Shape::Array, Value::Array(_)) | (Shape::Object, Value::Object(_)) => Ok(()),
            (Shape::Array, _) => Err(EditorError::schema(path, "expected an array literal")),
            (Shape::Object, _) => Err(EditorError::schema(path, "expected an object literal")),
        }
    }
}

/// A category's file bound to its cache slot in a session.
pub(crate) struct BoundDocument<'a, S> {
    session: &'a Session<S>,
    category: &'static Category,
    shape: Shape,
    slot: CacheSlot,
}

impl<'a, S: DocumentStore> BoundDocument<'a, S> {
    pub fn new(session: &'a Session<S>, category: &'static Category, shape: Shape) -> Self {
        Self {
            session,
            category,
            shape,
            slot: session.slot(category.path),
        }
    }

    pub fn session(&self) -> &'a Session<S> {
        self.session
    }

    pub fn path(&self) -> &'static str {
        self.category.path
    }

    pub fn slot(&self) -> &CacheSlot {
        &self.slot
    }

    pub async fn is_loaded(&self) -> bool {
        self.slot.lock().await.is_some()
    }

    pub async fn version(&self) -> Option<VersionTag> {
        self.slot
            .lock()
            .await
            .as_ref()
            .and_then(|cached| cached.version.clone())
    }

    pub fn not_loaded(&self) -> EditorError {
        EditorError::NotLoaded {
            path: self.path().to_string(),
        }
    }

    /// Copy of the cached body.
    pub async fn body(&self) -> Result<Value, EditorError> {
        match self.slot.lock().await.as_ref() {
            Some(cached) => Ok(cached.body.clone()),
            None => Err(self.not_loaded()),
        }
    }

    /// Fetch and decode the file into the slot.
    ///
    /// A missing file loads as the empty value with no version tag. `prepare`
    /// runs on the decoded body before it is cached; if it fails, or anything
    /// before it does, the slot keeps its previous contents.
    pub async fn load<F>(&self, prepare: F) -> Result<CachedDocument, EditorError>
    where
        F: FnOnce(&mut Value) -> Result<(), EditorError>,
    {
        let path = self.path();
        let mut guard = self.slot.lock().await;

        let mut loaded = match self.session.store().fetch_document(path).await {
            Ok(document) => {
                let text = document.text().map_err(|e| {
                    CodecError::malformed("document is not valid UTF-8", e.valid_up_to())
                })?;
                let body = self.category.decode(text)?;
                self.shape.check(path, &body)?;
                CachedDocument {
                    body,
                    version: Some(document.version),
                }
            }
            Err(StoreError::NotFound { .. }) => {
                tracing::info!(path, "document missing, starting empty");
                CachedDocument {
                    body: self.shape.empty(),
                    version: None,
                }
            }
            Err(err) => return Err(err.into()),
        };

        prepare(&mut loaded.body)?;
        tracing::debug!(path, version = ?loaded.version, "document loaded");
        *guard = Some(loaded.clone());
        Ok(loaded)
    }

    /// Encode `body` and write it with the cached version tag, or create the
    /// file when it did not exist at load time. On success the slot takes
    /// `body` and the new tag.
    pub async fn commit(
        &self,
        cached: &mut Option<CachedDocument>,
        body: Value,
        message: &str,
    ) -> Result<VersionTag, EditorError> {
        let path = self.path();
        let text = self.category.encode(&body)?;
        let store = self.session.store();

        let version = match cached.as_ref().and_then(|c| c.version.as_ref()) {
            Some(version) => {
                tracing::debug!(path, version = %version, "writing document");
                store
                    .write_document(path, text.as_bytes(), version, message)
                    .await?
            }
            None => {
                tracing::debug!(path, "creating document");
                store.create_document(path, text.as_bytes(), message).await?
            }
        };

        tracing::info!(path, version = %version, message, "document saved");
        *cached = Some(CachedDocument {
            body,
            version: Some(version.clone()),
        });
        Ok(version)
    }
}
