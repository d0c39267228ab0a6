use axum::{
    extract::{OriginalUri, State},
    http::StatusCode,
};
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

use foodgram_auth_types::identity::IdentityHeaders;
use foodgram_domain::pagination::Page;

use crate::domain::types::{IngredientAmount, Recipe, RecipeFilter, RecipeIngredient};
use crate::error::RecipesServiceError;
use crate::handlers::extract::{Json, Path, Query};
use crate::handlers::{PageQuery, page_link};
use crate::handlers::tag::TagResponse;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::recipe::{
    CreateRecipeInput, CreateRecipeUseCase, DeleteRecipeUseCase, GetRecipeLinkUseCase,
    GetRecipeUseCase, ListRecipesUseCase, UpdateRecipeInput, UpdateRecipeUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RecipeIngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<RecipeIngredient> for RecipeIngredientResponse {
    fn from(item: RecipeIngredient) -> Self {
        Self {
            id: item.ingredient.id,
            name: item.ingredient.name,
            measurement_unit: item.ingredient.measurement_unit,
            amount: item.amount,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: i32,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: Option<String>,
    pub text: String,
    pub cooking_time: i32,
    #[serde(serialize_with = "foodgram_core::serde::to_rfc3339_ms")]
    pub pub_date: chrono::DateTime<chrono::Utc>,
}

impl RecipeResponse {
    pub fn new(recipe: Recipe, state: &AppState) -> Self {
        Self {
            id: recipe.id,
            tags: recipe.tags.into_iter().map(TagResponse::from).collect(),
            author: UserResponse::from_profile(recipe.author, state),
            ingredients: recipe
                .ingredients
                .into_iter()
                .map(RecipeIngredientResponse::from)
                .collect(),
            is_favorited: recipe.is_favorited,
            is_in_shopping_cart: recipe.is_in_shopping_cart,
            name: recipe.name,
            image: recipe.image.as_deref().map(|key| state.media_link(key)),
            text: recipe.text,
            cooking_time: recipe.cooking_time,
            pub_date: recipe.pub_date,
        }
    }
}

// ── Request types ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct IngredientAmountRequest {
    pub id: i32,
    pub amount: i32,
}

impl From<IngredientAmountRequest> for IngredientAmount {
    fn from(item: IngredientAmountRequest) -> Self {
        Self {
            id: item.id,
            amount: item.amount,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<i32>,
    #[serde(default)]
    pub ingredients: Vec<IngredientAmountRequest>,
}

#[derive(Deserialize)]
pub struct UpdateRecipeRequest {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub image: Option<String>,
    pub tags: Option<Vec<i32>>,
    pub ingredients: Option<Vec<IngredientAmountRequest>>,
}

/// Accepts `1`/`0`/`true`/`false`.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" | "" => Ok(false),
        _ => Err(de::Error::invalid_value(
            Unexpected::Str(&raw),
            &"one of 1, 0, true, false",
        )),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub author: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "flag")]
    pub is_favorited: bool,
    #[serde(default, deserialize_with = "flag")]
    pub is_in_shopping_cart: bool,
}

// ── GET /api/recipes ─────────────────────────────────────────────────────────

pub async fn list_recipes(
    identity: Option<IdentityHeaders>,
    State(state): State<AppState>,
    Query(query): Query<RecipeListQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Page<RecipeResponse>>, RecipesServiceError> {
    let request = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .page_request();
    let filter = RecipeFilter {
        author: query.author,
        tags: query.tags,
        is_favorited: query.is_favorited,
        is_in_shopping_cart: query.is_in_shopping_cart,
    };
    let usecase = ListRecipesUseCase {
        repo: state.recipe_repo(),
    };
    let (recipes, count) = usecase
        .execute(filter, identity.map(|i| i.user_id), request)
        .await?;
    let page = Page::new(recipes, count, request, |n| {
        page_link(&state.public_base_url, &uri, n)
    })
    .map(|recipe| RecipeResponse::new(recipe, &state));
    Ok(Json(page))
}

// ── POST /api/recipes ────────────────────────────────────────────────────────

pub async fn create_recipe(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<RecipeResponse>), RecipesServiceError> {
    let image = body
        .image
        .ok_or(RecipesServiceError::validation("image", "is required"))?;
    let usecase = CreateRecipeUseCase {
        repo: state.recipe_repo(),
        tags: state.tag_repo(),
        ingredients: state.ingredient_repo(),
        storage: state.media_storage(),
    };
    let recipe = usecase
        .execute(
            identity.user_id,
            CreateRecipeInput {
                name: body.name,
                text: body.text,
                cooking_time: body.cooking_time,
                image,
                tags: body.tags,
                ingredients: body.ingredients.into_iter().map(Into::into).collect(),
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(RecipeResponse::new(recipe, &state))))
}

// ── GET /api/recipes/{id} ────────────────────────────────────────────────────

pub async fn get_recipe(
    identity: Option<IdentityHeaders>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RecipeResponse>, RecipesServiceError> {
    let usecase = GetRecipeUseCase {
        repo: state.recipe_repo(),
    };
    let recipe = usecase.execute(id, identity.map(|i| i.user_id)).await?;
    Ok(Json(RecipeResponse::new(recipe, &state)))
}

// ── PATCH /api/recipes/{id} ──────────────────────────────────────────────────

pub async fn update_recipe(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateRecipeRequest>,
) -> Result<Json<RecipeResponse>, RecipesServiceError> {
    let usecase = UpdateRecipeUseCase {
        repo: state.recipe_repo(),
        tags: state.tag_repo(),
        ingredients: state.ingredient_repo(),
        storage: state.media_storage(),
    };
    let recipe = usecase
        .execute(
            identity.user_id,
            identity.is_staff(),
            id,
            UpdateRecipeInput {
                name: body.name,
                text: body.text,
                cooking_time: body.cooking_time,
                image: body.image,
                tags: body.tags,
                ingredients: body
                    .ingredients
                    .map(|items| items.into_iter().map(Into::into).collect()),
            },
        )
        .await?;
    Ok(Json(RecipeResponse::new(recipe, &state)))
}

// ── DELETE /api/recipes/{id} ─────────────────────────────────────────────────

pub async fn delete_recipe(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, RecipesServiceError> {
    let usecase = DeleteRecipeUseCase {
        repo: state.recipe_repo(),
        storage: state.media_storage(),
    };
    usecase
        .execute(identity.user_id, identity.is_staff(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /api/recipes/{id}/get-link ───────────────────────────────────────────

#[derive(Serialize)]
pub struct RecipeLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

pub async fn get_recipe_link(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RecipeLinkResponse>, RecipesServiceError> {
    let usecase = GetRecipeLinkUseCase {
        repo: state.recipe_repo(),
    };
    let short_link = usecase.execute(id, &state.public_base_url).await?;
    Ok(Json(RecipeLinkResponse { short_link }))
}
