use crate::domain::repository::{
    RecipeLinkRepository, RecipeRepository, ShoppingListRenderer, ShoppingListRepository,
};
use crate::domain::types::Recipe;
use crate::error::RecipesServiceError;

// ── AddToCart ────────────────────────────────────────────────────────────────

pub struct AddToCartUseCase<L: RecipeLinkRepository, R: RecipeRepository> {
    pub repo: L,
    pub recipes: R,
}

impl<L: RecipeLinkRepository, R: RecipeRepository> AddToCartUseCase<L, R> {
    pub async fn execute(&self, user_id: i32, recipe_id: i32) -> Result<Recipe, RecipesServiceError> {
        let mut recipe = self
            .recipes
            .find(recipe_id, Some(user_id))
            .await?
            .ok_or(RecipesServiceError::RecipeNotFound)?;
        if !self.repo.add(user_id, recipe_id).await? {
            return Err(RecipesServiceError::CartItemAlreadyExists);
        }
        recipe.is_in_shopping_cart = true;
        Ok(recipe)
    }
}

// ── RemoveFromCart ───────────────────────────────────────────────────────────

pub struct RemoveFromCartUseCase<L: RecipeLinkRepository, R: RecipeRepository> {
    pub repo: L,
    pub recipes: R,
}

impl<L: RecipeLinkRepository, R: RecipeRepository> RemoveFromCartUseCase<L, R> {
    pub async fn execute(&self, user_id: i32, recipe_id: i32) -> Result<(), RecipesServiceError> {
        if !self.recipes.exists(recipe_id).await? {
            return Err(RecipesServiceError::RecipeNotFound);
        }
        if !self.repo.remove(user_id, recipe_id).await? {
            return Err(RecipesServiceError::CartItemNotFound);
        }
        Ok(())
    }
}

// ── DownloadShoppingList ─────────────────────────────────────────────────────

pub struct DownloadShoppingListUseCase<S: ShoppingListRepository, P: ShoppingListRenderer> {
    pub repo: S,
    pub renderer: P,
}

impl<S: ShoppingListRepository, P: ShoppingListRenderer> DownloadShoppingListUseCase<S, P> {
    /// Aggregate the user's cart and render it as a document.
    pub async fn execute(&self, user_id: i32) -> Result<Vec<u8>, RecipesServiceError> {
        let rows = self.repo.aggregate(user_id).await?;
        if rows.is_empty() {
            return Err(RecipesServiceError::EmptyCart);
        }
        tracing::debug!(user_id, rows = rows.len(), "rendering shopping list");
        self.renderer.render(&rows)
    }
}
