use axum::{
    extract::{OriginalUri, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use foodgram_auth_types::identity::IdentityHeaders;
use foodgram_domain::pagination::Page;

use crate::domain::types::{User, UserProfile};
use crate::error::RecipesServiceError;
use crate::handlers::extract::{Json, Path, Query};
use crate::handlers::{PageQuery, page_link};
use crate::state::AppState;
use crate::usecase::user::{
    GetUserUseCase, ListUsersUseCase, RegisterUserInput, RegisterUserUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

impl UserResponse {
    pub fn new(user: User, is_subscribed: bool, state: &AppState) -> Self {
        Self {
            id: user.id,
            avatar: user.avatar.as_deref().map(|key| state.media_link(key)),
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }

    pub fn from_profile(profile: UserProfile, state: &AppState) -> Self {
        Self::new(profile.user, profile.is_subscribed, state)
    }
}

// ── GET /api/users ───────────────────────────────────────────────────────────

pub async fn list_users(
    identity: Option<IdentityHeaders>,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Page<UserResponse>>, RecipesServiceError> {
    let request = query.page_request();
    let usecase = ListUsersUseCase {
        repo: state.user_repo(),
    };
    let (users, count) = usecase
        .execute(identity.map(|i| i.user_id), request)
        .await?;
    let page = Page::new(users, count, request, |n| {
        page_link(&state.public_base_url, &uri, n)
    })
    .map(|profile| UserResponse::from_profile(profile, &state));
    Ok(Json(page))
}

// ── POST /api/users ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Serialize)]
pub struct CreatedUserResponse {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreatedUserResponse>), RecipesServiceError> {
    let usecase = RegisterUserUseCase {
        repo: state.user_repo(),
    };
    let user = usecase
        .execute(RegisterUserInput {
            email: body.email,
            username: body.username,
            first_name: body.first_name,
            last_name: body.last_name,
        })
        .await?;
    tracing::info!(user_id = user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(CreatedUserResponse {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }),
    ))
}

// ── GET /api/users/me ────────────────────────────────────────────────────────

pub async fn get_me(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, RecipesServiceError> {
    let usecase = GetUserUseCase {
        repo: state.user_repo(),
    };
    let profile = usecase
        .execute(identity.user_id, Some(identity.user_id))
        .await?;
    Ok(Json(UserResponse::from_profile(profile, &state)))
}

// ── GET /api/users/{id} ──────────────────────────────────────────────────────

pub async fn get_user(
    identity: Option<IdentityHeaders>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, RecipesServiceError> {
    let usecase = GetUserUseCase {
        repo: state.user_repo(),
    };
    let profile = usecase.execute(id, identity.map(|i| i.user_id)).await?;
    Ok(Json(UserResponse::from_profile(profile, &state)))
}
