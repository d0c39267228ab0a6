#![allow(async_fn_in_trait)]

use foodgram_domain::pagination::PageRequest;

use crate::domain::media::DecodedImage;
use crate::domain::types::{
    Ingredient, NewUser, Recipe, RecipeDraft, RecipePatch, ResolvedRecipeFilter,
    ShoppingListRow, SubscriptionItem, Tag, User, UserProfile,
};
use crate::error::RecipesServiceError;

/// Repository for user profiles.
pub trait UserRepository: Send + Sync {
    /// Find a user, computing `is_subscribed` for `viewer`.
    async fn find(
        &self,
        id: i32,
        viewer: Option<i32>,
    ) -> Result<Option<UserProfile>, RecipesServiceError>;

    /// One page of users ordered by username, plus the total count.
    async fn list(
        &self,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<(Vec<UserProfile>, u64), RecipesServiceError>;

    /// Insert a user. Returns `None` if the email or username is taken.
    async fn create(&self, user: &NewUser) -> Result<Option<User>, RecipesServiceError>;

    /// Replace the avatar key, returning the previous one.
    async fn set_avatar(
        &self,
        id: i32,
        avatar: Option<&str>,
    ) -> Result<Option<String>, RecipesServiceError>;
}

/// Read-only tag catalog.
pub trait TagRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Tag>, RecipesServiceError>;
    async fn find(&self, id: i32) -> Result<Option<Tag>, RecipesServiceError>;
    /// How many of `ids` exist.
    async fn count_existing(&self, ids: &[i32]) -> Result<u64, RecipesServiceError>;
}

/// Read-only ingredient catalog.
pub trait IngredientRepository: Send + Sync {
    /// Ingredients ordered by name, optionally filtered by a case-insensitive
    /// substring of the name.
    async fn list(&self, name: Option<&str>) -> Result<Vec<Ingredient>, RecipesServiceError>;
    async fn find(&self, id: i32) -> Result<Option<Ingredient>, RecipesServiceError>;
    /// How many of `ids` exist.
    async fn count_existing(&self, ids: &[i32]) -> Result<u64, RecipesServiceError>;
}

/// Repository for recipes and their tag/ingredient sets.
pub trait RecipeRepository: Send + Sync {
    async fn find(
        &self,
        id: i32,
        viewer: Option<i32>,
    ) -> Result<Option<Recipe>, RecipesServiceError>;

    async fn exists(&self, id: i32) -> Result<bool, RecipesServiceError>;

    /// One page of recipes, newest first, plus the total matching count.
    async fn list(
        &self,
        filter: &ResolvedRecipeFilter,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<(Vec<Recipe>, u64), RecipesServiceError>;

    /// Insert the recipe with its tags and ingredients in one transaction.
    async fn create(&self, author_id: i32, draft: &RecipeDraft)
    -> Result<i32, RecipesServiceError>;

    /// Apply the patch in one transaction. Supplied tag and ingredient sets
    /// replace the stored ones.
    async fn update(&self, id: i32, patch: &RecipePatch) -> Result<(), RecipesServiceError>;

    /// Delete a recipe. Returns `true` if a row was deleted.
    async fn delete(&self, id: i32) -> Result<bool, RecipesServiceError>;
}

/// A (user, recipe) link such as a favorite or a shopping-cart entry.
pub trait RecipeLinkRepository: Send + Sync {
    /// Create the link. Returns `false` if it already existed.
    async fn add(&self, user_id: i32, recipe_id: i32) -> Result<bool, RecipesServiceError>;

    /// Remove the link. Returns `true` if a row was deleted.
    async fn remove(&self, user_id: i32, recipe_id: i32) -> Result<bool, RecipesServiceError>;
}

/// Sums ingredient amounts over a user's shopping cart.
pub trait ShoppingListRepository: Send + Sync {
    /// Rows grouped by (name, unit), ordered by name then unit.
    async fn aggregate(&self, user_id: i32) -> Result<Vec<ShoppingListRow>, RecipesServiceError>;
}

/// Repository for author subscriptions.
pub trait SubscriptionRepository: Send + Sync {
    /// Create the subscription. Returns `false` if it already existed.
    async fn add(&self, user_id: i32, author_id: i32) -> Result<bool, RecipesServiceError>;

    /// Remove the subscription. Returns `true` if a row was deleted.
    async fn remove(&self, user_id: i32, author_id: i32) -> Result<bool, RecipesServiceError>;

    /// Followed authors, newest subscription first, plus the total count.
    async fn list(
        &self,
        user_id: i32,
        page: PageRequest,
        recipes_limit: Option<u64>,
    ) -> Result<(Vec<SubscriptionItem>, u64), RecipesServiceError>;

    /// A single followed author, if `user_id` follows `author_id`.
    async fn get(
        &self,
        user_id: i32,
        author_id: i32,
        recipes_limit: Option<u64>,
    ) -> Result<Option<SubscriptionItem>, RecipesServiceError>;
}

/// Persists uploaded images and resolves their public URLs.
pub trait MediaStorage: Send + Sync {
    /// Store the image under `folder`, returning its media key.
    async fn save(&self, folder: &str, image: &DecodedImage)
    -> Result<String, RecipesServiceError>;

    /// Remove a stored file. Missing files are ignored.
    async fn delete(&self, key: &str) -> Result<(), RecipesServiceError>;

    fn url(&self, key: &str) -> String;
}

/// Renders aggregated rows into a downloadable document.
pub trait ShoppingListRenderer: Send + Sync {
    fn render(&self, rows: &[ShoppingListRow]) -> Result<Vec<u8>, RecipesServiceError>;
}
