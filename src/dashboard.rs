//! Overview numbers shown after login.

use serde_json::Value;

use crate::assets::IMAGE_DIR;
use crate::editor::EditorError;
use crate::record::TIMELINE;
use crate::session::Session;
use crate::store::{ChangeRecord, DocumentStore, EntryKind, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    /// Newest first, at most `ClientConfig::recent_changes` entries.
    pub recent_changes: Vec<ChangeRecord>,
    pub timeline_entries: usize,
    pub image_count: usize,
}

/// Collect the dashboard numbers. A missing timeline file or image
/// directory counts as zero.
pub async fn summary<S: DocumentStore>(session: &Session<S>) -> Result<Dashboard, EditorError> {
    let store = session.store();
    let recent_changes = store
        .list_recent_changes(session.config().recent_changes)
        .await?;

    let timeline_entries = match store.fetch_document(TIMELINE.path).await {
        Ok(document) => {
            let text = document.text().map_err(|e| {
                crate::codec::CodecError::malformed("document is not valid UTF-8", e.valid_up_to())
            })?;
            match TIMELINE.decode(text)? {
                Value::Array(items) => items.len(),
                _ => return Err(EditorError::schema(TIMELINE.path, "expected an array literal")),
            }
        }
        Err(StoreError::NotFound { .. }) => 0,
        Err(err) => return Err(err.into()),
    };

    let image_count = match store.list_directory(IMAGE_DIR).await {
        Ok(entries) => entries
            .iter()
            .filter(|entry| entry.kind == EntryKind::File)
            .count(),
        Err(StoreError::NotFound { .. }) => 0,
        Err(err) => return Err(err.into()),
    };

    tracing::debug!(
        changes = recent_changes.len(),
        timeline_entries,
        image_count,
        "dashboard summary"
    );
    Ok(Dashboard {
        recent_changes,
        timeline_entries,
        image_count,
    })
}
