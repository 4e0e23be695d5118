use std::marker::PhantomData;

use super::document::{BoundDocument, Shape};
use super::{capitalize, EditorError, EditorState, Notice, Outcome, Status};
use crate::record::Singleton;
use crate::session::Session;
use crate::store::{DocumentStore, VersionTag};

/// Editor for a file holding one object, such as `reading.js`.
pub struct SingletonEditor<'a, S, T> {
    doc: BoundDocument<'a, S>,
    status: Status,
    _marker: PhantomData<T>,
}

impl<'a, S: DocumentStore, T: Singleton> SingletonEditor<'a, S, T> {
    pub fn new(session: &'a Session<S>) -> Self {
        Self {
            doc: BoundDocument::new(session, T::CATEGORY, Shape::Object),
            status: Status::default(),
            _marker: PhantomData,
        }
    }

    pub fn state(&self) -> EditorState {
        self.status.state()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.status.notice()
    }

    pub async fn version(&self) -> Option<VersionTag> {
        self.doc.version().await
    }

    /// Fetch and decode the file. A missing file loads as `T::default()`.
    pub async fn load(&mut self) -> Result<T, EditorError> {
        self.status.begin(EditorState::Loading);
        let path = self.doc.path();
        let result = self
            .doc
            .load(|body| {
                serde_json::from_value::<T>(body.clone())
                    .map(drop)
                    .map_err(|e| EditorError::schema(path, e))
            })
            .await
            .and_then(|cached| self.typed(cached.body));

        let loaded = self.doc.is_loaded().await;
        let label = capitalize(T::CATEGORY.label);
        self.status.settle(
            &result,
            loaded,
            |_| Notice::info(format!("{} loaded", label)),
            &format!("Error loading {}", T::CATEGORY.label),
        );
        result
    }

    /// The cached value.
    pub async fn value(&self) -> Result<T, EditorError> {
        let body = self.doc.body().await?;
        self.typed(body)
    }

    /// Replace the file's value.
    pub async fn save(&mut self, value: T) -> Result<Outcome, EditorError> {
        self.status.begin(EditorState::Saving);
        let result = self.write(&value).await;
        let loaded = !matches!(result, Err(EditorError::NotLoaded { .. }));
        let label = capitalize(T::CATEGORY.label);
        self.status.settle(
            &result,
            loaded,
            |_| Notice::success(format!("{} saved", label)),
            &format!("Error saving {}", T::CATEGORY.label),
        );
        result
    }

    async fn write(&self, value: &T) -> Result<Outcome, EditorError> {
        let category = T::CATEGORY;
        let body = serde_json::to_value(value).map_err(|e| EditorError::schema(category.path, e))?;
        let missing = category.missing_fields(&body);
        if !missing.is_empty() {
            return Err(EditorError::Validation { missing });
        }

        let mut guard = self.doc.slot().lock().await;
        if guard.is_none() {
            return Err(self.doc.not_loaded());
        }
        let version = self
            .doc
            .commit(&mut guard, body, category.save_message)
            .await?;
        Ok(Outcome::Saved { version })
    }

    fn typed(&self, body: serde_json::Value) -> Result<T, EditorError> {
        serde_json::from_value(body).map_err(|e| EditorError::schema(self.doc.path(), e))
    }
}
