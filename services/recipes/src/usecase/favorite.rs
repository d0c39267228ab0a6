use crate::domain::repository::{RecipeLinkRepository, RecipeRepository};
use crate::domain::types::Recipe;
use crate::error::RecipesServiceError;

// ── AddFavorite ──────────────────────────────────────────────────────────────

pub struct AddFavoriteUseCase<L: RecipeLinkRepository, R: RecipeRepository> {
    pub repo: L,
    pub recipes: R,
}

impl<L: RecipeLinkRepository, R: RecipeRepository> AddFavoriteUseCase<L, R> {
    /// Favorite the recipe and return it as the user now sees it.
    pub async fn execute(&self, user_id: i32, recipe_id: i32) -> Result<Recipe, RecipesServiceError> {
        let mut recipe = self
            .recipes
            .find(recipe_id, Some(user_id))
            .await?
            .ok_or(RecipesServiceError::RecipeNotFound)?;
        if !self.repo.add(user_id, recipe_id).await? {
            return Err(RecipesServiceError::FavoriteAlreadyExists);
        }
        recipe.is_favorited = true;
        Ok(recipe)
    }
}

// ── RemoveFavorite ───────────────────────────────────────────────────────────

pub struct RemoveFavoriteUseCase<L: RecipeLinkRepository, R: RecipeRepository> {
    pub repo: L,
    pub recipes: R,
}

impl<L: RecipeLinkRepository, R: RecipeRepository> RemoveFavoriteUseCase<L, R> {
    pub async fn execute(&self, user_id: i32, recipe_id: i32) -> Result<(), RecipesServiceError> {
        if !self.recipes.exists(recipe_id).await? {
            return Err(RecipesServiceError::RecipeNotFound);
        }
        if !self.repo.remove(user_id, recipe_id).await? {
            return Err(RecipesServiceError::FavoriteNotFound);
        }
        Ok(())
    }
}
