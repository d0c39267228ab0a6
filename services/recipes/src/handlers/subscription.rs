use axum::{
    extract::{OriginalUri, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use foodgram_auth_types::identity::IdentityHeaders;
use foodgram_domain::pagination::Page;

use crate::domain::types::{RecipeSummary, SubscriptionItem};
use crate::error::RecipesServiceError;
use crate::handlers::extract::{Json, Path, Query};
use crate::handlers::{PageQuery, page_link};
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::subscription::{
    ListSubscriptionsUseCase, SubscribeUseCase, UnsubscribeUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RecipeSummaryResponse {
    pub id: i32,
    pub name: String,
    pub image: Option<String>,
    pub cooking_time: i32,
}

impl RecipeSummaryResponse {
    pub fn new(recipe: RecipeSummary, state: &AppState) -> Self {
        Self {
            id: recipe.id,
            image: recipe.image.as_deref().map(|key| state.media_link(key)),
            name: recipe.name,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// An author the caller follows, with a preview of their recipes.
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    #[serde(flatten)]
    pub author: UserResponse,
    pub recipes: Vec<RecipeSummaryResponse>,
    pub recipes_count: u64,
}

impl SubscriptionResponse {
    pub fn new(item: SubscriptionItem, state: &AppState) -> Self {
        Self {
            author: UserResponse::new(item.author, true, state),
            recipes: item
                .recipes
                .into_iter()
                .map(|recipe| RecipeSummaryResponse::new(recipe, state))
                .collect(),
            recipes_count: item.recipes_count,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RecipesLimitQuery {
    pub recipes_limit: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub recipes_limit: Option<u64>,
}

// ── GET /api/users/subscriptions ─────────────────────────────────────────────

pub async fn list_subscriptions(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<SubscriptionListQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Page<SubscriptionResponse>>, RecipesServiceError> {
    let request = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .page_request();
    let usecase = ListSubscriptionsUseCase {
        repo: state.subscription_repo(),
    };
    let (items, count) = usecase
        .execute(identity.user_id, request, query.recipes_limit)
        .await?;
    let page = Page::new(items, count, request, |n| {
        page_link(&state.public_base_url, &uri, n)
    })
    .map(|item| SubscriptionResponse::new(item, &state));
    Ok(Json(page))
}

// ── POST /api/users/{id}/subscribe ───────────────────────────────────────────

pub async fn subscribe(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(author_id): Path<i32>,
    Query(query): Query<RecipesLimitQuery>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), RecipesServiceError> {
    let usecase = SubscribeUseCase {
        repo: state.subscription_repo(),
        users: state.user_repo(),
    };
    let item = usecase
        .execute(identity.user_id, author_id, query.recipes_limit)
        .await?;
    tracing::info!(user_id = identity.user_id, author_id, "subscribed");
    Ok((
        StatusCode::CREATED,
        Json(SubscriptionResponse::new(item, &state)),
    ))
}

// ── DELETE /api/users/{id}/subscribe ─────────────────────────────────────────

pub async fn unsubscribe(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(author_id): Path<i32>,
) -> Result<StatusCode, RecipesServiceError> {
    let usecase = UnsubscribeUseCase {
        repo: state.subscription_repo(),
        users: state.user_repo(),
    };
    usecase.execute(identity.user_id, author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
