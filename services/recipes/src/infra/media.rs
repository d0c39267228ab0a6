use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context as _, anyhow};
use uuid::Uuid;

use crate::domain::media::DecodedImage;
use crate::domain::repository::MediaStorage;
use crate::error::RecipesServiceError;

/// Media files on the local filesystem, served from `base_url`.
#[derive(Clone)]
pub struct LocalMediaStorage {
    pub root: PathBuf,
    pub base_url: String,
}

impl LocalMediaStorage {
    /// Resolve a key under the root, refusing anything that could escape it.
    fn path_for(&self, key: &str) -> Result<PathBuf, RecipesServiceError> {
        let relative = Path::new(key);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(anyhow!("media key escapes storage root: {key}").into());
        }
        Ok(self.root.join(relative))
    }
}

impl MediaStorage for LocalMediaStorage {
    async fn save(
        &self,
        folder: &str,
        image: &DecodedImage,
    ) -> Result<String, RecipesServiceError> {
        let key = format!("{folder}/{}.{}", Uuid::new_v4().simple(), image.extension);
        let path = self.path_for(&key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create media directory {}", parent.display()))?;
        }
        tokio::fs::write(&path, &image.bytes)
            .await
            .with_context(|| format!("write media file {}", path.display()))?;
        tracing::debug!(key = %key, bytes = image.bytes.len(), "media file stored");
        Ok(key)
    }

    async fn delete(&self, key: &str) -> Result<(), RecipesServiceError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("delete media file {}", path.display()))
                .into()),
        }
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}
