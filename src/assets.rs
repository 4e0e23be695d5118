//! Image uploads and the recent image listing.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::session::Session;
use crate::store::{DirectoryEntry, DocumentStore, EntryKind, StoreError, VersionTag};

pub const IMAGE_DIR: &str = "images";
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];
/// Largest accepted upload, 2 MiB.
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;
pub const DEFAULT_RECENT_IMAGES: usize = 12;

/// Error type for image uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// The file name does not carry an image extension.
    NotAnImage(String),
    TooLarge { size: usize, limit: usize },
    /// Empty name or a name containing path separators.
    InvalidName(String),
    Store(StoreError),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::NotAnImage(name) => write!(f, "not an image file: {}", name),
            AssetError::TooLarge { size, limit } => {
                write!(f, "image must be under {} bytes, got {}", limit, size)
            }
            AssetError::InvalidName(name) => write!(f, "invalid file name: {:?}", name),
            AssetError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for AssetError {
    fn from(err: StoreError) -> Self {
        AssetError::Store(err)
    }
}

/// A stored upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub path: String,
    pub version: VersionTag,
}

/// An entry of the recent image listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub name: String,
    pub path: String,
    /// Public raw URL, when the session knows its repository.
    pub url: Option<String>,
    /// Size in KiB, rounded.
    pub size_kb: u64,
}

/// Whether `name` has one of the accepted image extensions.
pub fn is_image_name(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Check name and size of an upload.
pub fn validate_image(file_name: &str, bytes: &[u8]) -> Result<(), AssetError> {
    if file_name.trim().is_empty() || file_name.contains(['/', '\\']) {
        return Err(AssetError::InvalidName(file_name.to_string()));
    }
    if !is_image_name(file_name) {
        return Err(AssetError::NotAnImage(file_name.to_string()));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AssetError::TooLarge {
            size: bytes.len(),
            limit: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

/// Store a new image as `images/upload-<millis>-<file_name>`.
pub async fn upload_image<S: DocumentStore>(
    session: &Session<S>,
    file_name: &str,
    bytes: &[u8],
    now: DateTime<Utc>,
) -> Result<UploadedImage, AssetError> {
    validate_image(file_name, bytes)?;
    let name = format!("upload-{}-{}", now.timestamp_millis(), file_name);
    let path = format!("{}/{}", IMAGE_DIR, name);
    let message = format!("Upload image: {}", name);
    create(session, path, bytes, &message).await
}

/// Store an image for a landing box as
/// `images/landing/<box>/<millis>-<file_name>`.
pub async fn upload_landing_image<S: DocumentStore>(
    session: &Session<S>,
    box_name: &str,
    file_name: &str,
    bytes: &[u8],
    now: DateTime<Utc>,
) -> Result<UploadedImage, AssetError> {
    validate_image(file_name, bytes)?;
    if box_name.is_empty() || box_name.contains(['/', '\\']) {
        return Err(AssetError::InvalidName(box_name.to_string()));
    }
    let path = format!(
        "{}/landing/{}/{}-{}",
        IMAGE_DIR,
        box_name,
        now.timestamp_millis(),
        file_name
    );
    let message = format!("Upload image: {}", path);
    create(session, path, bytes, &message).await
}

async fn create<S: DocumentStore>(
    session: &Session<S>,
    path: String,
    bytes: &[u8],
    message: &str,
) -> Result<UploadedImage, AssetError> {
    let version = session.store().create_document(&path, bytes, message).await?;
    tracing::info!(path = %path, bytes = bytes.len(), "image uploaded");
    Ok(UploadedImage { path, version })
}

/// Replace (or create) the image at a fixed path, such as a cover image
/// referenced by a content file.
pub async fn upload_to<S: DocumentStore>(
    session: &Session<S>,
    target_path: &str,
    bytes: &[u8],
) -> Result<UploadedImage, AssetError> {
    let file_name = target_path.rsplit('/').next().unwrap_or(target_path);
    validate_image(file_name, bytes)?;

    let message = format!("Update {} via admin panel", target_path);
    let store = session.store();
    let version = match store.fetch_document(target_path).await {
        Ok(existing) => {
            store
                .write_document(target_path, bytes, &existing.version, &message)
                .await?
        }
        Err(StoreError::NotFound { .. }) => {
            store.create_document(target_path, bytes, &message).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(path = target_path, bytes = bytes.len(), "image replaced");
    Ok(UploadedImage {
        path: target_path.to_string(),
        version,
    })
}

/// Up to `limit` image files directly under `images/`, in listing order.
/// A missing directory lists as empty.
pub async fn recent_images<S: DocumentStore>(
    session: &Session<S>,
    limit: usize,
) -> Result<Vec<ImageInfo>, AssetError> {
    let entries = match session.store().list_directory(IMAGE_DIR).await {
        Ok(entries) => entries,
        Err(StoreError::NotFound { .. }) => Vec::new(),
        Err(err) => return Err(err.into()),
    };

    Ok(entries
        .into_iter()
        .filter(|entry| entry.kind == EntryKind::File && is_image_name(&entry.name))
        .take(limit)
        .map(|entry| image_info(session, entry))
        .collect())
}

fn image_info<S: DocumentStore>(session: &Session<S>, entry: DirectoryEntry) -> ImageInfo {
    let url = session.credentials().map(|credentials| {
        format!(
            "{}/{}/{}/{}/{}",
            session.config().raw_base.trim_end_matches('/'),
            credentials.repository(),
            credentials.branch(),
            IMAGE_DIR,
            entry.name
        )
    });
    ImageInfo {
        size_kb: (entry.size + 512) / 1024,
        url,
        name: entry.name,
        path: entry.path,
    }
}
