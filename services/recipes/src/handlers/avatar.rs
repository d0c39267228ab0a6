use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use foodgram_auth_types::identity::IdentityHeaders;

use crate::error::RecipesServiceError;
use crate::handlers::extract::Json;
use crate::state::AppState;
use crate::usecase::avatar::{DeleteAvatarUseCase, SetAvatarUseCase};

#[derive(Deserialize)]
pub struct AvatarRequest {
    pub avatar: Option<String>,
}

#[derive(Serialize)]
pub struct AvatarResponse {
    pub avatar: String,
}

// ── PUT /api/users/me/avatar ─────────────────────────────────────────────────

pub async fn set_avatar(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<AvatarRequest>,
) -> Result<Json<AvatarResponse>, RecipesServiceError> {
    let data_uri = body.avatar.ok_or(RecipesServiceError::InvalidAvatar)?;
    let usecase = SetAvatarUseCase {
        repo: state.user_repo(),
        storage: state.media_storage(),
    };
    let key = usecase.execute(identity.user_id, &data_uri).await?;
    Ok(Json(AvatarResponse {
        avatar: state.media_link(&key),
    }))
}

// ── DELETE /api/users/me/avatar ──────────────────────────────────────────────

pub async fn delete_avatar(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<StatusCode, RecipesServiceError> {
    let usecase = DeleteAvatarUseCase {
        repo: state.user_repo(),
        storage: state.media_storage(),
    };
    usecase.execute(identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
