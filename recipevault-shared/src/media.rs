/// Filesystem blob store for recipe images
///
/// Images are written under a configurable media root at generated,
/// collision-resistant paths (`recipes/<recipe-id>/<uuid>.<ext>`). A recipe
/// holds at most one live image: the caller stores the new blob, swaps the
/// recipe's path, then deletes the orphaned previous blob.
///
/// Payloads are validated by magic-byte sniffing before anything touches
/// disk; non-image payloads are rejected outright.
///
/// # Example
///
/// ```no_run
/// use recipevault_shared::media::{ImageFormat, MediaStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MediaStore::new("/var/lib/recipevault/media");
///
/// let data = std::fs::read("photo.jpg")?;
/// let format = ImageFormat::detect(&data).ok_or("not an image")?;
/// let path = store.store_recipe_image(42, format, &data).await?;
///
/// store.delete(&path).await?;
/// # Ok(())
/// # }
/// ```

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Error type for media store operations
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// Filesystem operation failed
    #[error("Media I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored path escapes the media root
    #[error("Invalid media path: {0}")]
    InvalidPath(String),
}

/// Supported raster image formats, identified by magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Sniffs the image format from the payload's leading bytes
    ///
    /// Returns None for anything that is not a supported raster image.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"\x89PNG\r\n\x1a\n") {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(b"\xff\xd8\xff") {
            return Some(ImageFormat::Jpeg);
        }
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(ImageFormat::Gif);
        }
        // RIFF container with a WEBP fourcc
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::Webp);
        }
        None
    }

    /// File extension for the format
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }
}

/// Blob store rooted at a media directory
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    /// Creates a store rooted at `root`
    ///
    /// The directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Media root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stores a recipe image blob and returns its path relative to the root
    ///
    /// The filename is a fresh UUID, so concurrent uploads cannot collide
    /// and a replaced image never reuses the old path.
    pub async fn store_recipe_image(
        &self,
        recipe_id: i64,
        format: ImageFormat,
        data: &[u8],
    ) -> Result<String, MediaError> {
        let relative = format!(
            "recipes/{}/{}.{}",
            recipe_id,
            Uuid::new_v4(),
            format.extension()
        );
        let absolute = self.root.join(&relative);

        if let Some(parent) = absolute.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&absolute, data).await?;

        debug!(path = %relative, bytes = data.len(), "Stored recipe image");
        Ok(relative)
    }

    /// Deletes a previously stored blob by its relative path
    ///
    /// Deleting a path that no longer exists is not an error; the blob is
    /// gone either way.
    pub async fn delete(&self, relative: &str) -> Result<(), MediaError> {
        let path = Path::new(relative);
        if path.is_absolute()
            || path
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(MediaError::InvalidPath(relative.to_string()));
        }

        match tokio::fs::remove_file(self.root.join(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %relative, "Image blob already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
