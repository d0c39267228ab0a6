use axum::{
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};

use foodgram_auth_types::identity::IdentityHeaders;

use crate::error::RecipesServiceError;
use crate::handlers::extract::{Json, Path};
use crate::handlers::recipe::RecipeResponse;
use crate::state::AppState;
use crate::usecase::shopping_cart::{
    AddToCartUseCase, DownloadShoppingListUseCase, RemoveFromCartUseCase,
};

const SHOPPING_LIST_DISPOSITION: &str = "attachment; filename=\"shopping-list.pdf\"";

// ── POST /api/recipes/{id}/shopping_cart ─────────────────────────────────────

pub async fn add_to_cart(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(recipe_id): Path<i32>,
) -> Result<(StatusCode, Json<RecipeResponse>), RecipesServiceError> {
    let usecase = AddToCartUseCase {
        repo: state.shopping_cart_repo(),
        recipes: state.recipe_repo(),
    };
    let recipe = usecase.execute(identity.user_id, recipe_id).await?;
    Ok((StatusCode::CREATED, Json(RecipeResponse::new(recipe, &state))))
}

// ── DELETE /api/recipes/{id}/shopping_cart ───────────────────────────────────

pub async fn remove_from_cart(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(recipe_id): Path<i32>,
) -> Result<StatusCode, RecipesServiceError> {
    let usecase = RemoveFromCartUseCase {
        repo: state.shopping_cart_repo(),
        recipes: state.recipe_repo(),
    };
    usecase.execute(identity.user_id, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /api/recipes/download_shopping_cart ──────────────────────────────────

pub async fn download_shopping_cart(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, RecipesServiceError> {
    let usecase = DownloadShoppingListUseCase {
        repo: state.shopping_cart_repo(),
        renderer: state.shopping_list_renderer(),
    };
    let document = usecase.execute(identity.user_id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, SHOPPING_LIST_DISPOSITION),
        ],
        document,
    ))
}
