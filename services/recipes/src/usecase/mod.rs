pub mod avatar;
pub mod favorite;
pub mod ingredient;
pub mod recipe;
pub mod shopping_cart;
pub mod subscription;
pub mod tag;
pub mod user;

use crate::domain::repository::MediaStorage;

/// Remove a replaced media file. The database already points elsewhere, so a
/// failure here only leaves an orphan behind.
pub(crate) async fn discard_media<M: MediaStorage>(storage: &M, key: Option<String>) {
    if let Some(key) = key {
        if let Err(e) = storage.delete(&key).await {
            tracing::warn!(error = %e, key = %key, "failed to delete media file");
        }
    }
}
