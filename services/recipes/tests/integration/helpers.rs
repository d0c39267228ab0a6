use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use foodgram_domain::pagination::PageRequest;
use foodgram_recipes::domain::media::DecodedImage;
use foodgram_recipes::domain::repository::{
    IngredientRepository, MediaStorage, RecipeLinkRepository, RecipeRepository,
    ShoppingListRepository, SubscriptionRepository, TagRepository, UserRepository,
};
use foodgram_recipes::domain::types::{
    Ingredient, IngredientAmount, NewUser, Recipe, RecipeDraft, RecipeIngredient, RecipePatch,
    RecipeSummary, ResolvedRecipeFilter, ShoppingListRow, SubscriptionItem, Tag, User,
    UserProfile,
};
use foodgram_recipes::error::RecipesServiceError;

/// 1x1 transparent PNG.
pub const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn test_user(id: i32) -> User {
    User {
        id,
        email: format!("cook{id}@example.com"),
        username: format!("cook{id}"),
        first_name: "Test".to_owned(),
        last_name: format!("Cook {id}"),
        avatar: None,
    }
}

pub fn test_tag(id: i32, slug: &str) -> Tag {
    Tag {
        id,
        name: slug.to_uppercase(),
        color: format!("#00000{id}"),
        slug: slug.to_owned(),
    }
}

pub fn test_ingredient(id: i32, name: &str, unit: &str) -> Ingredient {
    Ingredient {
        id,
        name: name.to_owned(),
        measurement_unit: unit.to_owned(),
    }
}

pub fn test_recipe(id: i32, author: User, tags: Vec<Tag>) -> Recipe {
    Recipe {
        id,
        author: UserProfile {
            user: author,
            is_subscribed: false,
        },
        name: format!("Recipe {id}"),
        text: "Mix and bake.".to_owned(),
        cooking_time: 30,
        image: Some(format!("recipes/{id}.png")),
        pub_date: Utc::now(),
        tags,
        ingredients: vec![],
        is_favorited: false,
        is_in_shopping_cart: false,
    }
}

pub fn shopping_row(name: &str, unit: &str, total_amount: i64) -> ShoppingListRow {
    ShoppingListRow {
        name: name.to_owned(),
        measurement_unit: unit.to_owned(),
        total_amount,
    }
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }
}

impl UserRepository for MockUserRepo {
    async fn find(
        &self,
        id: i32,
        _viewer: Option<i32>,
    ) -> Result<Option<UserProfile>, RecipesServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .map(|user| UserProfile {
                user,
                is_subscribed: false,
            }))
    }

    async fn list(
        &self,
        _viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<(Vec<UserProfile>, u64), RecipesServiceError> {
        let users = self.users.lock().unwrap();
        let results = users
            .iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .map(|user| UserProfile {
                user,
                is_subscribed: false,
            })
            .collect();
        Ok((results, users.len() as u64))
    }

    async fn create(&self, _user: &NewUser) -> Result<Option<User>, RecipesServiceError> {
        unimplemented!("not used by these tests")
    }

    async fn set_avatar(
        &self,
        id: i32,
        avatar: Option<&str>,
    ) -> Result<Option<String>, RecipesServiceError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RecipesServiceError::UserNotFound)?;
        Ok(std::mem::replace(&mut user.avatar, avatar.map(str::to_owned)))
    }
}

// ── Catalog mocks ────────────────────────────────────────────────────────────

pub struct MockTagRepo {
    pub tags: Vec<Tag>,
}

impl TagRepository for MockTagRepo {
    async fn list(&self) -> Result<Vec<Tag>, RecipesServiceError> {
        Ok(self.tags.clone())
    }

    async fn find(&self, id: i32) -> Result<Option<Tag>, RecipesServiceError> {
        Ok(self.tags.iter().find(|t| t.id == id).cloned())
    }

    async fn count_existing(&self, ids: &[i32]) -> Result<u64, RecipesServiceError> {
        Ok(self.tags.iter().filter(|t| ids.contains(&t.id)).count() as u64)
    }
}

pub struct MockIngredientRepo {
    pub ingredients: Vec<Ingredient>,
}

impl IngredientRepository for MockIngredientRepo {
    async fn list(&self, name: Option<&str>) -> Result<Vec<Ingredient>, RecipesServiceError> {
        let needle = name.map(str::to_lowercase).unwrap_or_default();
        Ok(self
            .ingredients
            .iter()
            .filter(|i| i.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn find(&self, id: i32) -> Result<Option<Ingredient>, RecipesServiceError> {
        Ok(self.ingredients.iter().find(|i| i.id == id).cloned())
    }

    async fn count_existing(&self, ids: &[i32]) -> Result<u64, RecipesServiceError> {
        Ok(self.ingredients.iter().filter(|i| ids.contains(&i.id)).count() as u64)
    }
}

// ── MockRecipeRepo ───────────────────────────────────────────────────────────

/// In-memory recipe store that expands references from its own catalog.
pub struct MockRecipeRepo {
    pub recipes: Arc<Mutex<Vec<Recipe>>>,
    pub users: Vec<User>,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
}

impl MockRecipeRepo {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self {
            recipes: Arc::new(Mutex::new(recipes)),
            users: vec![],
            tags: vec![],
            ingredients: vec![],
        }
    }

    pub fn with_catalog(users: Vec<User>, tags: Vec<Tag>, ingredients: Vec<Ingredient>) -> Self {
        Self {
            recipes: Arc::new(Mutex::new(vec![])),
            users,
            tags,
            ingredients,
        }
    }

    /// Returns a shared handle to the stored recipes for post-execution inspection.
    pub fn recipes_handle(&self) -> Arc<Mutex<Vec<Recipe>>> {
        Arc::clone(&self.recipes)
    }

    fn expand_tags(&self, ids: &[i32]) -> Vec<Tag> {
        self.tags
            .iter()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect()
    }

    fn expand_ingredients(&self, items: &[IngredientAmount]) -> Vec<RecipeIngredient> {
        items
            .iter()
            .filter_map(|item| {
                self.ingredients
                    .iter()
                    .find(|i| i.id == item.id)
                    .map(|ingredient| RecipeIngredient {
                        ingredient: ingredient.clone(),
                        amount: item.amount,
                    })
            })
            .collect()
    }
}

impl RecipeRepository for MockRecipeRepo {
    async fn find(
        &self,
        id: i32,
        _viewer: Option<i32>,
    ) -> Result<Option<Recipe>, RecipesServiceError> {
        Ok(self
            .recipes
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn exists(&self, id: i32) -> Result<bool, RecipesServiceError> {
        Ok(self.recipes.lock().unwrap().iter().any(|r| r.id == id))
    }

    async fn list(
        &self,
        filter: &ResolvedRecipeFilter,
        _viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<(Vec<Recipe>, u64), RecipesServiceError> {
        let recipes = self.recipes.lock().unwrap();
        let matching: Vec<Recipe> = recipes
            .iter()
            .filter(|r| filter.author.is_none_or(|a| r.author.user.id == a))
            .filter(|r| {
                filter.tags.is_empty() || r.tags.iter().any(|t| filter.tags.contains(&t.slug))
            })
            .cloned()
            .collect();
        let count = matching.len() as u64;
        let results = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok((results, count))
    }

    async fn create(
        &self,
        author_id: i32,
        draft: &RecipeDraft,
    ) -> Result<i32, RecipesServiceError> {
        let author = self
            .users
            .iter()
            .find(|u| u.id == author_id)
            .cloned()
            .ok_or(RecipesServiceError::UserNotFound)?;
        let mut recipes = self.recipes.lock().unwrap();
        let id = recipes.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        recipes.push(Recipe {
            id,
            author: UserProfile {
                user: author,
                is_subscribed: false,
            },
            name: draft.name.clone(),
            text: draft.text.clone(),
            cooking_time: draft.cooking_time,
            image: Some(draft.image.clone()),
            pub_date: Utc::now(),
            tags: self.expand_tags(&draft.tags),
            ingredients: self.expand_ingredients(&draft.ingredients),
            is_favorited: false,
            is_in_shopping_cart: false,
        });
        Ok(id)
    }

    async fn update(&self, id: i32, patch: &RecipePatch) -> Result<(), RecipesServiceError> {
        let tags = patch.tags.as_deref().map(|ids| self.expand_tags(ids));
        let ingredients = patch
            .ingredients
            .as_deref()
            .map(|items| self.expand_ingredients(items));
        let mut recipes = self.recipes.lock().unwrap();
        let recipe = recipes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RecipesServiceError::RecipeNotFound)?;
        if let Some(name) = &patch.name {
            recipe.name = name.clone();
        }
        if let Some(text) = &patch.text {
            recipe.text = text.clone();
        }
        if let Some(cooking_time) = patch.cooking_time {
            recipe.cooking_time = cooking_time;
        }
        if let Some(image) = &patch.image {
            recipe.image = Some(image.clone());
        }
        if let Some(tags) = tags {
            recipe.tags = tags;
        }
        if let Some(ingredients) = ingredients {
            recipe.ingredients = ingredients;
        }
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<bool, RecipesServiceError> {
        let mut recipes = self.recipes.lock().unwrap();
        let before = recipes.len();
        recipes.retain(|r| r.id != id);
        Ok(recipes.len() < before)
    }
}

// ── MockLinkRepo ─────────────────────────────────────────────────────────────

/// Favorites or shopping-cart links as `(user_id, recipe_id)` pairs.
pub struct MockLinkRepo {
    pub links: Arc<Mutex<Vec<(i32, i32)>>>,
}

impl MockLinkRepo {
    pub fn new(links: Vec<(i32, i32)>) -> Self {
        Self {
            links: Arc::new(Mutex::new(links)),
        }
    }

    pub fn links_handle(&self) -> Arc<Mutex<Vec<(i32, i32)>>> {
        Arc::clone(&self.links)
    }
}

impl RecipeLinkRepository for MockLinkRepo {
    async fn add(&self, user_id: i32, recipe_id: i32) -> Result<bool, RecipesServiceError> {
        let mut links = self.links.lock().unwrap();
        if links.contains(&(user_id, recipe_id)) {
            return Ok(false);
        }
        links.push((user_id, recipe_id));
        Ok(true)
    }

    async fn remove(&self, user_id: i32, recipe_id: i32) -> Result<bool, RecipesServiceError> {
        let mut links = self.links.lock().unwrap();
        let before = links.len();
        links.retain(|link| *link != (user_id, recipe_id));
        Ok(links.len() < before)
    }
}

// ── MockShoppingListRepo ─────────────────────────────────────────────────────

pub struct MockShoppingListRepo {
    pub rows: Vec<ShoppingListRow>,
}

impl ShoppingListRepository for MockShoppingListRepo {
    async fn aggregate(&self, _user_id: i32) -> Result<Vec<ShoppingListRow>, RecipesServiceError> {
        Ok(self.rows.clone())
    }
}

// ── MockSubscriptionRepo ─────────────────────────────────────────────────────

/// Subscriptions as `(user_id, author_id)` pairs, newest last.
pub struct MockSubscriptionRepo {
    pub links: Arc<Mutex<Vec<(i32, i32)>>>,
    pub authors: Vec<User>,
    pub recipes: HashMap<i32, Vec<RecipeSummary>>,
}

impl MockSubscriptionRepo {
    pub fn new(authors: Vec<User>) -> Self {
        Self {
            links: Arc::new(Mutex::new(vec![])),
            authors,
            recipes: HashMap::new(),
        }
    }

    pub fn links_handle(&self) -> Arc<Mutex<Vec<(i32, i32)>>> {
        Arc::clone(&self.links)
    }

    fn item(&self, author_id: i32, recipes_limit: Option<u64>) -> Option<SubscriptionItem> {
        let author = self.authors.iter().find(|u| u.id == author_id)?.clone();
        let recipes = self.recipes.get(&author_id).cloned().unwrap_or_default();
        let recipes_count = recipes.len() as u64;
        let limit = recipes_limit.map_or(recipes.len(), |l| l as usize);
        Some(SubscriptionItem {
            author,
            recipes: recipes.into_iter().take(limit).collect(),
            recipes_count,
        })
    }
}

impl SubscriptionRepository for MockSubscriptionRepo {
    async fn add(&self, user_id: i32, author_id: i32) -> Result<bool, RecipesServiceError> {
        let mut links = self.links.lock().unwrap();
        if links.contains(&(user_id, author_id)) {
            return Ok(false);
        }
        links.push((user_id, author_id));
        Ok(true)
    }

    async fn remove(&self, user_id: i32, author_id: i32) -> Result<bool, RecipesServiceError> {
        let mut links = self.links.lock().unwrap();
        let before = links.len();
        links.retain(|link| *link != (user_id, author_id));
        Ok(links.len() < before)
    }

    async fn list(
        &self,
        user_id: i32,
        page: PageRequest,
        recipes_limit: Option<u64>,
    ) -> Result<(Vec<SubscriptionItem>, u64), RecipesServiceError> {
        let authors: Vec<i32> = self
            .links
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|(user, _)| *user == user_id)
            .map(|(_, author)| *author)
            .collect();
        let count = authors.len() as u64;
        let items = authors
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .filter_map(|author| self.item(author, recipes_limit))
            .collect();
        Ok((items, count))
    }

    async fn get(
        &self,
        user_id: i32,
        author_id: i32,
        recipes_limit: Option<u64>,
    ) -> Result<Option<SubscriptionItem>, RecipesServiceError> {
        if !self.links.lock().unwrap().contains(&(user_id, author_id)) {
            return Ok(None);
        }
        Ok(self.item(author_id, recipes_limit))
    }
}

// ── MockMediaStorage ─────────────────────────────────────────────────────────

/// Records stored keys instead of touching the filesystem.
#[derive(Default)]
pub struct MockMediaStorage {
    pub files: Arc<Mutex<Vec<String>>>,
    next_id: Mutex<u32>,
}

impl MockMediaStorage {
    pub fn with_files(files: Vec<String>) -> Self {
        Self {
            files: Arc::new(Mutex::new(files)),
            next_id: Mutex::new(0),
        }
    }

    pub fn files_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.files)
    }
}

impl MediaStorage for MockMediaStorage {
    async fn save(
        &self,
        folder: &str,
        image: &DecodedImage,
    ) -> Result<String, RecipesServiceError> {
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let key = format!("{folder}/upload-{}.{}", *next_id, image.extension);
        self.files.lock().unwrap().push(key.clone());
        Ok(key)
    }

    async fn delete(&self, key: &str) -> Result<(), RecipesServiceError> {
        self.files.lock().unwrap().retain(|k| k != key);
        Ok(())
    }

    fn url(&self, key: &str) -> String {
        format!("http://media.test/{key}")
    }
}
