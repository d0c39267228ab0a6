use foodgram_domain::pagination::PageRequest;

use crate::domain::media::DecodedImage;
use crate::domain::repository::{
    IngredientRepository, MediaStorage, RecipeRepository, TagRepository,
};
use crate::domain::types::{
    IngredientAmount, Recipe, RecipeDraft, RecipeFilter, RecipePatch, validate_cooking_time,
    validate_ingredients, validate_recipe_name, validate_recipe_text, validate_tags,
};
use crate::error::RecipesServiceError;
use crate::usecase::discard_media;

const RECIPE_IMAGE_FOLDER: &str = "recipes";

/// Check that every referenced tag exists.
async fn check_tags<T: TagRepository>(tags: &T, ids: &[i32]) -> Result<(), RecipesServiceError> {
    validate_tags(ids)?;
    if tags.count_existing(ids).await? != ids.len() as u64 {
        return Err(RecipesServiceError::InvalidTags("unknown tag id"));
    }
    Ok(())
}

/// Check shape and existence of the ingredient list.
async fn check_ingredients<I: IngredientRepository>(
    ingredients: &I,
    items: &[IngredientAmount],
) -> Result<(), RecipesServiceError> {
    validate_ingredients(items)?;
    let ids: Vec<i32> = items.iter().map(|item| item.id).collect();
    if ingredients.count_existing(&ids).await? != ids.len() as u64 {
        return Err(RecipesServiceError::InvalidIngredients("unknown ingredient id"));
    }
    Ok(())
}

fn ensure_can_edit(recipe: &Recipe, user_id: i32, is_staff: bool) -> Result<(), RecipesServiceError> {
    if recipe.author.user.id == user_id || is_staff {
        Ok(())
    } else {
        Err(RecipesServiceError::Forbidden)
    }
}

// ── GetRecipe ────────────────────────────────────────────────────────────────

pub struct GetRecipeUseCase<R: RecipeRepository> {
    pub repo: R,
}

impl<R: RecipeRepository> GetRecipeUseCase<R> {
    pub async fn execute(&self, id: i32, viewer: Option<i32>) -> Result<Recipe, RecipesServiceError> {
        self.repo
            .find(id, viewer)
            .await?
            .ok_or(RecipesServiceError::RecipeNotFound)
    }
}

// ── ListRecipes ──────────────────────────────────────────────────────────────

pub struct ListRecipesUseCase<R: RecipeRepository> {
    pub repo: R,
}

impl<R: RecipeRepository> ListRecipesUseCase<R> {
    pub async fn execute(
        &self,
        filter: RecipeFilter,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<(Vec<Recipe>, u64), RecipesServiceError> {
        match filter.resolve(viewer) {
            Some(resolved) => self.repo.list(&resolved, viewer, page.clamped()).await,
            None => Ok((Vec::new(), 0)),
        }
    }
}

// ── CreateRecipe ─────────────────────────────────────────────────────────────

pub struct CreateRecipeInput {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    /// `data:image/<ext>;base64,<payload>`
    pub image: String,
    pub tags: Vec<i32>,
    pub ingredients: Vec<IngredientAmount>,
}

pub struct CreateRecipeUseCase<R, T, I, M>
where
    R: RecipeRepository,
    T: TagRepository,
    I: IngredientRepository,
    M: MediaStorage,
{
    pub repo: R,
    pub tags: T,
    pub ingredients: I,
    pub storage: M,
}

impl<R, T, I, M> CreateRecipeUseCase<R, T, I, M>
where
    R: RecipeRepository,
    T: TagRepository,
    I: IngredientRepository,
    M: MediaStorage,
{
    pub async fn execute(
        &self,
        author_id: i32,
        input: CreateRecipeInput,
    ) -> Result<Recipe, RecipesServiceError> {
        validate_recipe_name(&input.name)?;
        validate_recipe_text(&input.text)?;
        validate_cooking_time(input.cooking_time)?;
        check_ingredients(&self.ingredients, &input.ingredients).await?;
        check_tags(&self.tags, &input.tags).await?;
        let image =
            DecodedImage::from_data_uri(&input.image).ok_or(RecipesServiceError::InvalidImage)?;

        let key = self.storage.save(RECIPE_IMAGE_FOLDER, &image).await?;
        let draft = RecipeDraft {
            name: input.name.trim().to_owned(),
            text: input.text,
            cooking_time: input.cooking_time,
            image: key,
            tags: input.tags,
            ingredients: input.ingredients,
        };
        let id = match self.repo.create(author_id, &draft).await {
            Ok(id) => id,
            Err(e) => {
                discard_media(&self.storage, Some(draft.image)).await;
                return Err(e);
            }
        };
        tracing::info!(recipe_id = id, author_id, "recipe created");

        self.repo
            .find(id, Some(author_id))
            .await?
            .ok_or(RecipesServiceError::RecipeNotFound)
    }
}

// ── UpdateRecipe ─────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct UpdateRecipeInput {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub image: Option<String>,
    pub tags: Option<Vec<i32>>,
    pub ingredients: Option<Vec<IngredientAmount>>,
}

pub struct UpdateRecipeUseCase<R, T, I, M>
where
    R: RecipeRepository,
    T: TagRepository,
    I: IngredientRepository,
    M: MediaStorage,
{
    pub repo: R,
    pub tags: T,
    pub ingredients: I,
    pub storage: M,
}

impl<R, T, I, M> UpdateRecipeUseCase<R, T, I, M>
where
    R: RecipeRepository,
    T: TagRepository,
    I: IngredientRepository,
    M: MediaStorage,
{
    pub async fn execute(
        &self,
        user_id: i32,
        is_staff: bool,
        recipe_id: i32,
        input: UpdateRecipeInput,
    ) -> Result<Recipe, RecipesServiceError> {
        let current = self
            .repo
            .find(recipe_id, Some(user_id))
            .await?
            .ok_or(RecipesServiceError::RecipeNotFound)?;
        ensure_can_edit(&current, user_id, is_staff)?;

        if let Some(name) = &input.name {
            validate_recipe_name(name)?;
        }
        if let Some(text) = &input.text {
            validate_recipe_text(text)?;
        }
        if let Some(cooking_time) = input.cooking_time {
            validate_cooking_time(cooking_time)?;
        }
        if let Some(items) = &input.ingredients {
            check_ingredients(&self.ingredients, items).await?;
        }
        if let Some(ids) = &input.tags {
            check_tags(&self.tags, ids).await?;
        }
        let image = input
            .image
            .as_deref()
            .map(|uri| DecodedImage::from_data_uri(uri).ok_or(RecipesServiceError::InvalidImage))
            .transpose()?;

        let new_key = match &image {
            Some(image) => Some(self.storage.save(RECIPE_IMAGE_FOLDER, image).await?),
            None => None,
        };
        let patch = RecipePatch {
            name: input.name.map(|n| n.trim().to_owned()),
            text: input.text,
            cooking_time: input.cooking_time,
            image: new_key.clone(),
            tags: input.tags,
            ingredients: input.ingredients,
        };
        if let Err(e) = self.repo.update(recipe_id, &patch).await {
            discard_media(&self.storage, new_key).await;
            return Err(e);
        }
        if new_key.is_some() {
            discard_media(&self.storage, current.image).await;
        }

        self.repo
            .find(recipe_id, Some(user_id))
            .await?
            .ok_or(RecipesServiceError::RecipeNotFound)
    }
}

// ── DeleteRecipe ─────────────────────────────────────────────────────────────

pub struct DeleteRecipeUseCase<R: RecipeRepository, M: MediaStorage> {
    pub repo: R,
    pub storage: M,
}

impl<R: RecipeRepository, M: MediaStorage> DeleteRecipeUseCase<R, M> {
    pub async fn execute(
        &self,
        user_id: i32,
        is_staff: bool,
        recipe_id: i32,
    ) -> Result<(), RecipesServiceError> {
        let current = self
            .repo
            .find(recipe_id, Some(user_id))
            .await?
            .ok_or(RecipesServiceError::RecipeNotFound)?;
        ensure_can_edit(&current, user_id, is_staff)?;
        if !self.repo.delete(recipe_id).await? {
            return Err(RecipesServiceError::RecipeNotFound);
        }
        discard_media(&self.storage, current.image).await;
        Ok(())
    }
}

// ── GetRecipeLink ────────────────────────────────────────────────────────────

pub struct GetRecipeLinkUseCase<R: RecipeRepository> {
    pub repo: R,
}

impl<R: RecipeRepository> GetRecipeLinkUseCase<R> {
    /// Public page URL of the recipe under `base_url`.
    pub async fn execute(&self, id: i32, base_url: &str) -> Result<String, RecipesServiceError> {
        if !self.repo.exists(id).await? {
            return Err(RecipesServiceError::RecipeNotFound);
        }
        Ok(format!("{}/recipes/{id}", base_url.trim_end_matches('/')))
    }
}
