// Profile image storage
// Images live under the upload directory as `<uuid>.<ext>` and are referenced as `/uploads/<file>`

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::multipart::{ImageUpload, IMAGE_FIELD};
use crate::validation::{image_extension, IMAGE_TYPE_MESSAGE};

/// URL prefix under which stored images are served
pub const PUBLIC_PREFIX: &str = "/uploads";

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist an image and return its public reference
    async fn save(&self, image: &ImageUpload) -> Result<String, ApiError>;

    /// Remove a previously stored image. Unknown or already-missing references are not errors.
    async fn delete(&self, reference: &str) -> Result<(), ApiError>;
}

/// Filesystem-backed image store
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Create the upload directory if needed
    pub async fn ensure_root(&self) -> Result<(), ApiError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Map a public reference back to a file inside the root.
    /// Anything that is not a bare file name under the prefix is refused.
    fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let file_name = reference
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))?;

        if file_name.is_empty()
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name.starts_with('.')
        {
            return None;
        }
        Some(self.root.join(file_name))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, image: &ImageUpload) -> Result<String, ApiError> {
        let ext = image_extension(&image.content_type)
            .ok_or_else(|| ApiError::field(IMAGE_FIELD, IMAGE_TYPE_MESSAGE))?;
        let file_name = format!("{}.{}", Uuid::new_v4(), ext);

        self.ensure_root().await?;
        tokio::fs::write(self.root.join(&file_name), &image.bytes).await?;

        info!(
            file = %file_name,
            size = image.bytes.len(),
            client_name = ?image.file_name,
            "Stored profile image"
        );
        Ok(format!("{}/{}", PUBLIC_PREFIX, file_name))
    }

    async fn delete(&self, reference: &str) -> Result<(), ApiError> {
        let Some(path) = self.resolve(reference) else {
            warn!("Refusing to delete image outside upload dir: {}", reference);
            return Ok(());
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted image {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Image already gone: {}", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
