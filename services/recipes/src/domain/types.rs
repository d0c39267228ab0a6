use chrono::{DateTime, Utc};

use crate::error::RecipesServiceError;

/// Lower bound shared by cooking time and ingredient amounts.
pub const MIN_QUANTITY: i32 = 1;
/// Upper bound shared by cooking time and ingredient amounts.
pub const MAX_QUANTITY: i32 = 32000;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_USERNAME_LEN: usize = 150;
pub const MAX_EMAIL_LEN: usize = 254;

// ── Users ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Media key of the stored avatar.
    pub avatar: Option<String>,
}

/// A user as seen by a particular viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user: User,
    pub is_subscribed: bool,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Usernames are 1–150 characters of letters, digits and `_ . @ + -`.
pub fn validate_username(username: &str) -> bool {
    !username.is_empty()
        && username.chars().count() <= MAX_USERNAME_LEN
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'))
}

pub fn validate_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    email.len() <= MAX_EMAIL_LEN
        && !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
}

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

// ── Recipes ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeIngredient {
    pub ingredient: Ingredient,
    pub amount: i32,
}

/// Fully expanded recipe with flags computed for the viewer.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: i32,
    pub author: UserProfile,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Short recipe form embedded in subscription listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeSummary {
    pub id: i32,
    pub name: String,
    pub image: Option<String>,
    pub cooking_time: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientAmount {
    pub id: i32,
    pub amount: i32,
}

/// Validated input for a new recipe. `image` is the stored media key.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub image: String,
    pub tags: Vec<i32>,
    pub ingredients: Vec<IngredientAmount>,
}

/// Partial recipe update. `None` leaves the field untouched; `Some` collections
/// replace the stored set entirely.
#[derive(Debug, Clone, Default)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub image: Option<String>,
    pub tags: Option<Vec<i32>>,
    pub ingredients: Option<Vec<IngredientAmount>>,
}

pub fn validate_quantity(value: i32) -> bool {
    (MIN_QUANTITY..=MAX_QUANTITY).contains(&value)
}

pub fn validate_recipe_name(name: &str) -> Result<(), RecipesServiceError> {
    if name.trim().is_empty() {
        return Err(RecipesServiceError::validation("name", "must not be blank"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(RecipesServiceError::validation(
            "name",
            "must be at most 200 characters",
        ));
    }
    Ok(())
}

pub fn validate_recipe_text(text: &str) -> Result<(), RecipesServiceError> {
    if text.trim().is_empty() {
        return Err(RecipesServiceError::validation("text", "must not be blank"));
    }
    Ok(())
}

pub fn validate_cooking_time(cooking_time: i32) -> Result<(), RecipesServiceError> {
    if !validate_quantity(cooking_time) {
        return Err(RecipesServiceError::validation(
            "cooking_time",
            "must be between 1 and 32000",
        ));
    }
    Ok(())
}

/// Reject an empty list, repeated ingredient ids, or amounts out of range.
pub fn validate_ingredients(ingredients: &[IngredientAmount]) -> Result<(), RecipesServiceError> {
    if ingredients.is_empty() {
        return Err(RecipesServiceError::InvalidIngredients(
            "at least one ingredient is required",
        ));
    }
    let mut seen = std::collections::HashSet::with_capacity(ingredients.len());
    for item in ingredients {
        if !seen.insert(item.id) {
            return Err(RecipesServiceError::InvalidIngredients(
                "ingredients must be unique",
            ));
        }
        if !validate_quantity(item.amount) {
            return Err(RecipesServiceError::InvalidIngredients(
                "amount must be between 1 and 32000",
            ));
        }
    }
    Ok(())
}

/// Reject an empty tag list or repeated tag ids.
pub fn validate_tags(tags: &[i32]) -> Result<(), RecipesServiceError> {
    if tags.is_empty() {
        return Err(RecipesServiceError::InvalidTags("at least one tag is required"));
    }
    let mut seen = std::collections::HashSet::with_capacity(tags.len());
    if !tags.iter().all(|id| seen.insert(*id)) {
        return Err(RecipesServiceError::InvalidTags("tags must be unique"));
    }
    Ok(())
}

// ── Recipe filtering ─────────────────────────────────────────────────────────

/// Recipe list filters as requested by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<i32>,
    /// Tag slugs; a recipe matches when it carries any of them.
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// Filters bound to a concrete viewer, ready for the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedRecipeFilter {
    pub author: Option<i32>,
    pub tags: Vec<String>,
    pub favorited_by: Option<i32>,
    pub in_cart_of: Option<i32>,
}

impl RecipeFilter {
    /// Bind the per-user filters to `viewer`.
    ///
    /// Returns `None` when the result is empty regardless of data: an
    /// anonymous caller asked for favorites or cart contents.
    pub fn resolve(self, viewer: Option<i32>) -> Option<ResolvedRecipeFilter> {
        let needs_viewer = self.is_favorited || self.is_in_shopping_cart;
        if needs_viewer && viewer.is_none() {
            return None;
        }
        Some(ResolvedRecipeFilter {
            author: self.author,
            tags: self.tags,
            favorited_by: viewer.filter(|_| self.is_favorited),
            in_cart_of: viewer.filter(|_| self.is_in_shopping_cart),
        })
    }
}

// ── Subscriptions ────────────────────────────────────────────────────────────

/// An author the viewer follows, with a preview of their recipes.
#[derive(Debug, Clone)]
pub struct SubscriptionItem {
    pub author: User,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: u64,
}

// ── Shopping list ────────────────────────────────────────────────────────────

/// One aggregated line of the shopping list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListRow {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}
