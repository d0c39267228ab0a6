use crate::domain::media::DecodedImage;
use crate::domain::repository::{MediaStorage, UserRepository};
use crate::error::RecipesServiceError;
use crate::usecase::discard_media;

const AVATAR_FOLDER: &str = "users";

// ── SetAvatar ────────────────────────────────────────────────────────────────

pub struct SetAvatarUseCase<R: UserRepository, M: MediaStorage> {
    pub repo: R,
    pub storage: M,
}

impl<R: UserRepository, M: MediaStorage> SetAvatarUseCase<R, M> {
    /// Store the avatar and return its media key.
    pub async fn execute(&self, user_id: i32, data_uri: &str) -> Result<String, RecipesServiceError> {
        let image = DecodedImage::from_data_uri(data_uri).ok_or(RecipesServiceError::InvalidAvatar)?;
        if self.repo.find(user_id, None).await?.is_none() {
            return Err(RecipesServiceError::UserNotFound);
        }
        let key = self.storage.save(AVATAR_FOLDER, &image).await?;
        let previous = match self.repo.set_avatar(user_id, Some(&key)).await {
            Ok(previous) => previous,
            Err(e) => {
                discard_media(&self.storage, Some(key)).await;
                return Err(e);
            }
        };
        discard_media(&self.storage, previous).await;
        Ok(key)
    }
}

// ── DeleteAvatar ─────────────────────────────────────────────────────────────

pub struct DeleteAvatarUseCase<R: UserRepository, M: MediaStorage> {
    pub repo: R,
    pub storage: M,
}

impl<R: UserRepository, M: MediaStorage> DeleteAvatarUseCase<R, M> {
    pub async fn execute(&self, user_id: i32) -> Result<(), RecipesServiceError> {
        if self.repo.find(user_id, None).await?.is_none() {
            return Err(RecipesServiceError::UserNotFound);
        }
        let previous = self.repo.set_avatar(user_id, None).await?;
        discard_media(&self.storage, previous).await;
        Ok(())
    }
}
