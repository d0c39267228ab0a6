use axum::{extract::State, http::StatusCode};

use foodgram_auth_types::identity::IdentityHeaders;

use crate::error::RecipesServiceError;
use crate::handlers::extract::{Json, Path};
use crate::handlers::recipe::RecipeResponse;
use crate::state::AppState;
use crate::usecase::favorite::{AddFavoriteUseCase, RemoveFavoriteUseCase};

// ── POST /api/recipes/{id}/favorite ──────────────────────────────────────────

pub async fn add_favorite(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(recipe_id): Path<i32>,
) -> Result<(StatusCode, Json<RecipeResponse>), RecipesServiceError> {
    let usecase = AddFavoriteUseCase {
        repo: state.favorite_repo(),
        recipes: state.recipe_repo(),
    };
    let recipe = usecase.execute(identity.user_id, recipe_id).await?;
    Ok((StatusCode::CREATED, Json(RecipeResponse::new(recipe, &state))))
}

// ── DELETE /api/recipes/{id}/favorite ────────────────────────────────────────

pub async fn remove_favorite(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(recipe_id): Path<i32>,
) -> Result<StatusCode, RecipesServiceError> {
    let usecase = RemoveFavoriteUseCase {
        repo: state.favorite_repo(),
        recipes: state.recipe_repo(),
    };
    usecase.execute(identity.user_id, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
