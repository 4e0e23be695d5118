use chrono::{DateTime, Utc};

use super::document::{BoundDocument, Shape};
use super::{Confirm, EditorError, EditorState, Notice, Outcome, Status};
use crate::assets::{self, UploadedImage};
use crate::record::{ImageBox, LandingConfig, Singleton};
use crate::session::Session;
use crate::store::{DocumentStore, StoreError, VersionTag};

const SAVE_HINT: &str = "Save the configuration to persist changes.";

/// Working copy of the landing config and the version it was loaded at.
#[derive(Debug, Clone)]
struct Draft {
    config: LandingConfig,
    base: Option<VersionTag>,
    dirty: bool,
}

/// Editor for `landing-config.js`.
///
/// Box and image edits are staged on a draft and written together by
/// [`save`](LandingEditor::save). The draft remembers the version it was
/// loaded at; saving over a newer version, even one written by another
/// editor in the same session, fails with a version conflict instead of
/// discarding that write.
pub struct LandingEditor<'a, S> {
    doc: BoundDocument<'a, S>,
    status: Status,
    draft: Option<Draft>,
}

impl<'a, S: DocumentStore> LandingEditor<'a, S> {
    pub fn new(session: &'a Session<S>) -> Self {
        Self {
            doc: BoundDocument::new(session, LandingConfig::CATEGORY, Shape::Object),
            status: Status::default(),
            draft: None,
        }
    }

    pub fn state(&self) -> EditorState {
        self.status.state()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.status.notice()
    }

    /// The draft, once loaded.
    pub fn config(&self) -> Option<&LandingConfig> {
        self.draft.as_ref().map(|draft| &draft.config)
    }

    /// Whether the draft has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.draft.as_ref().is_some_and(|draft| draft.dirty)
    }

    /// Fetch the config and start a fresh draft. Returns the number of boxes.
    pub async fn load(&mut self) -> Result<usize, EditorError> {
        self.status.begin(EditorState::Loading);
        let path = self.doc.path();
        let result = self
            .doc
            .load(|body| {
                serde_json::from_value::<LandingConfig>(body.clone())
                    .map(drop)
                    .map_err(|e| EditorError::schema(path, e))
            })
            .await
            .and_then(|cached| {
                let config: LandingConfig = serde_json::from_value(cached.body)
                    .map_err(|e| EditorError::schema(path, e))?;
                Ok(Draft {
                    config,
                    base: cached.version,
                    dirty: false,
                })
            });

        let result = result.map(|draft| {
            let boxes = draft.config.len();
            self.draft = Some(draft);
            boxes
        });
        let loaded = self.draft.is_some();
        self.status.settle(
            &result,
            loaded,
            |boxes| Notice::info(format!("Loaded {} image boxes", boxes)),
            "Error loading landing configuration",
        );
        result
    }

    /// Drop staged changes and restart the draft from the cached document.
    pub async fn discard(&mut self) -> Result<(), EditorError> {
        let path = self.doc.path();
        let cached = {
            let guard = self.doc.slot().lock().await;
            guard.clone().ok_or_else(|| self.doc.not_loaded())?
        };
        let config: LandingConfig =
            serde_json::from_value(cached.body).map_err(|e| EditorError::schema(path, e))?;
        self.draft = Some(Draft {
            config,
            base: cached.version,
            dirty: false,
        });
        self.status.set_notice(Notice::info("Changes discarded"));
        Ok(())
    }

    /// Stage a new, empty box.
    pub fn add_box(
        &mut self,
        name: &str,
        rotation: &str,
        label: Option<String>,
    ) -> Result<Outcome, EditorError> {
        let name = name.trim();
        let result = self.draft_mut().and_then(|draft| {
            if name.is_empty() {
                return Err(EditorError::Validation {
                    missing: vec!["name"],
                });
            }
            let mut image_box = ImageBox::new(label);
            if !rotation.trim().is_empty() {
                image_box.rotation = rotation.trim().to_string();
            }
            if !draft.config.insert(name, image_box) {
                return Err(EditorError::DuplicateBox(name.to_string()));
            }
            draft.dirty = true;
            Ok(Outcome::Staged)
        });
        self.staged(result, "Image box added")
    }

    /// Stage removal of a box and all of its images.
    pub fn remove_box(&mut self, name: &str, mut confirm: impl Confirm) -> Result<Outcome, EditorError> {
        if let Err(err) = self.existing_box(name) {
            return self.staged(Err(err), "");
        }
        let prompt = format!(
            "Are you sure you want to delete the \"{}\" image box and all its images?",
            name
        );
        if !confirm.confirm(&prompt) {
            return Ok(self.cancelled());
        }
        let result = self.draft_mut().map(|draft| {
            draft.config.remove(name);
            draft.dirty = true;
            Outcome::Staged
        });
        self.staged(result, "Image box removed")
    }

    /// Stage an image path at the end of a box.
    pub fn add_image(&mut self, box_name: &str, image_path: &str) -> Result<Outcome, EditorError> {
        let result = self.box_mut(box_name).map(|image_box| {
            image_box.images.push(image_path.to_string());
        });
        let result = result.map(|()| self.mark_dirty());
        self.staged(result, "Image added")
    }

    /// Stage removal of the image at `index` of a box.
    pub fn remove_image(
        &mut self,
        box_name: &str,
        index: usize,
        mut confirm: impl Confirm,
    ) -> Result<Outcome, EditorError> {
        let len = match self.existing_box(box_name) {
            Ok(image_box) => image_box.images.len(),
            Err(err) => return self.staged(Err(err), ""),
        };
        if index >= len {
            return self.staged(Err(EditorError::IndexOutOfRange { index, len }), "");
        }
        if !confirm.confirm("Are you sure you want to delete this image?") {
            return Ok(self.cancelled());
        }
        let result = self.box_mut(box_name).map(|image_box| {
            image_box.images.remove(index);
        });
        let result = result.map(|()| self.mark_dirty());
        self.staged(result, "Image removed")
    }

    /// Upload an image for a box and stage its path. The image itself is
    /// committed right away; the config change waits for `save`.
    pub async fn upload_image(
        &mut self,
        box_name: &str,
        file_name: &str,
        bytes: &[u8],
        now: DateTime<Utc>,
    ) -> Result<UploadedImage, EditorError> {
        if let Err(err) = self.existing_box(box_name) {
            return self.staged(Err(err), "");
        }

        self.status.begin(EditorState::Saving);
        let session = self.doc.session();
        let result = assets::upload_landing_image(session, box_name, file_name, bytes, now)
            .await
            .map_err(EditorError::from)
            .and_then(|uploaded| {
                let image_box = self.box_mut(box_name)?;
                image_box.images.push(uploaded.path.clone());
                Ok(uploaded)
            });
        if result.is_ok() {
            self.mark_dirty();
        }
        self.status.settle(
            &result,
            true,
            |uploaded| Notice::success(format!("Uploaded {}. {}", uploaded.path, SAVE_HINT)),
            "Error uploading images",
        );
        result
    }

    /// Write the draft. Fails with a version conflict when the cached
    /// document moved on since the draft was loaded.
    pub async fn save(&mut self) -> Result<Outcome, EditorError> {
        self.status.begin(EditorState::Saving);
        let result = self.write().await;
        if let Ok(Outcome::Saved { version }) = &result {
            if let Some(draft) = self.draft.as_mut() {
                draft.base = Some(version.clone());
                draft.dirty = false;
            }
        }
        let loaded = self.draft.is_some();
        self.status.settle(
            &result,
            loaded,
            |_| Notice::success("Landing configuration saved"),
            "Error saving configuration",
        );
        result
    }

    async fn write(&self) -> Result<Outcome, EditorError> {
        let draft = self.draft.as_ref().ok_or_else(|| self.doc.not_loaded())?;
        let path = self.doc.path();
        let body = serde_json::to_value(&draft.config).map_err(|e| EditorError::schema(path, e))?;

        let mut guard = self.doc.slot().lock().await;
        let current = match guard.as_ref() {
            Some(cached) => cached.version.clone(),
            None => return Err(self.doc.not_loaded()),
        };
        if current != draft.base {
            return Err(StoreError::VersionConflict {
                path: path.to_string(),
                expected: draft.base.clone(),
                actual: current,
            }
            .into());
        }

        let version = self
            .doc
            .commit(&mut guard, body, LandingConfig::CATEGORY.save_message)
            .await?;
        Ok(Outcome::Saved { version })
    }

    fn cancelled(&mut self) -> Outcome {
        self.status.set_notice(Notice::info("Delete cancelled"));
        Outcome::Cancelled
    }

    fn draft_mut(&mut self) -> Result<&mut Draft, EditorError> {
        match self.draft.as_mut() {
            Some(draft) => Ok(draft),
            None => Err(self.doc.not_loaded()),
        }
    }

    fn existing_box(&self, name: &str) -> Result<&ImageBox, EditorError> {
        let draft = self.draft.as_ref().ok_or_else(|| self.doc.not_loaded())?;
        draft
            .config
            .get(name)
            .ok_or_else(|| EditorError::UnknownBox(name.to_string()))
    }

    fn box_mut(&mut self, name: &str) -> Result<&mut ImageBox, EditorError> {
        self.draft_mut()?
            .config
            .get_mut(name)
            .ok_or_else(|| EditorError::UnknownBox(name.to_string()))
    }

    fn mark_dirty(&mut self) -> Outcome {
        if let Some(draft) = self.draft.as_mut() {
            draft.dirty = true;
        }
        Outcome::Staged
    }

    fn staged<T>(&mut self, result: Result<T, EditorError>, done: &str) -> Result<T, EditorError> {
        let loaded = self.draft.is_some();
        self.status.settle(
            &result,
            loaded,
            |_| Notice::info(format!("{}. {}", done, SAVE_HINT)),
            "Error updating landing configuration",
        );
        result
    }
}
