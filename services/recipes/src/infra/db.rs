use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr, Statement, TransactionTrait, Value,
    sea_query::{Expr, Func, OnConflict, Query},
};

use foodgram_domain::pagination::PageRequest;
use foodgram_recipes_schema::{
    favorites, ingredients, recipe_ingredients, recipe_tags, recipes, shopping_carts,
    subscriptions, tags, users,
};

use crate::domain::repository::{
    IngredientRepository, RecipeLinkRepository, RecipeRepository, ShoppingListRepository,
    SubscriptionRepository, TagRepository, UserRepository,
};
use crate::domain::types::{
    Ingredient, IngredientAmount, NewUser, Recipe, RecipeDraft, RecipeIngredient, RecipePatch,
    RecipeSummary, ResolvedRecipeFilter, ShoppingListRow, SubscriptionItem, Tag, User,
    UserProfile,
};
use crate::error::RecipesServiceError;

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: Arc<DatabaseConnection>,
}

impl UserRepository for DbUserRepository {
    async fn find(
        &self,
        id: i32,
        viewer: Option<i32>,
    ) -> Result<Option<UserProfile>, RecipesServiceError> {
        let Some(model) = users::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("find user by id")?
        else {
            return Ok(None);
        };
        let subscribed = subscribed_author_ids(self.db.as_ref(), viewer, &[id]).await?;
        Ok(Some(UserProfile {
            is_subscribed: subscribed.contains(&id),
            user: user_from_model(model),
        }))
    }

    async fn list(
        &self,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<(Vec<UserProfile>, u64), RecipesServiceError> {
        let query = users::Entity::find()
            .order_by_asc(users::Column::Username)
            .order_by_asc(users::Column::Id);
        let count = query.clone().count(self.db.as_ref()).await.context("count users")?;
        let models = query
            .offset(page.offset())
            .limit(page.limit())
            .all(self.db.as_ref())
            .await
            .context("list users")?;

        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
        let subscribed = subscribed_author_ids(self.db.as_ref(), viewer, &ids).await?;
        let profiles = models
            .into_iter()
            .map(|model| UserProfile {
                is_subscribed: subscribed.contains(&model.id),
                user: user_from_model(model),
            })
            .collect();
        Ok((profiles, count))
    }

    async fn create(&self, user: &NewUser) -> Result<Option<User>, RecipesServiceError> {
        let result = users::ActiveModel {
            email: Set(user.email.clone()),
            username: Set(user.username.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            avatar: Set(None),
            date_joined: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await;
        match result {
            Ok(model) => Ok(Some(user_from_model(model))),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }

    async fn set_avatar(
        &self,
        id: i32,
        avatar: Option<&str>,
    ) -> Result<Option<String>, RecipesServiceError> {
        let avatar = avatar.map(str::to_owned);
        let previous = self
            .db
            .transaction::<_, Option<String>, DbErr>(|txn| {
                Box::pin(async move {
                    let previous: Option<Option<String>> = users::Entity::find_by_id(id)
                        .select_only()
                        .column(users::Column::Avatar)
                        .lock_exclusive()
                        .into_tuple()
                        .one(txn)
                        .await?;
                    users::Entity::update_many()
                        .col_expr(users::Column::Avatar, Expr::value(avatar))
                        .filter(users::Column::Id.eq(id))
                        .exec(txn)
                        .await?;
                    Ok(previous.flatten())
                })
            })
            .await
            .context("set user avatar")?;
        Ok(previous)
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        username: model.username,
        first_name: model.first_name,
        last_name: model.last_name,
        avatar: model.avatar,
    }
}

/// Which of `author_ids` the viewer follows.
async fn subscribed_author_ids(
    db: &DatabaseConnection,
    viewer: Option<i32>,
    author_ids: &[i32],
) -> Result<HashSet<i32>, RecipesServiceError> {
    let Some(viewer) = viewer else {
        return Ok(HashSet::new());
    };
    if author_ids.is_empty() {
        return Ok(HashSet::new());
    }
    let ids: Vec<i32> = subscriptions::Entity::find()
        .select_only()
        .column(subscriptions::Column::AuthorId)
        .filter(subscriptions::Column::UserId.eq(viewer))
        .filter(subscriptions::Column::AuthorId.is_in(author_ids.iter().copied()))
        .into_tuple()
        .all(db)
        .await
        .context("load subscribed authors")?;
    Ok(ids.into_iter().collect())
}

// ── Tag repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTagRepository {
    pub db: Arc<DatabaseConnection>,
}

impl TagRepository for DbTagRepository {
    async fn list(&self) -> Result<Vec<Tag>, RecipesServiceError> {
        let models = tags::Entity::find()
            .order_by_asc(tags::Column::Name)
            .all(self.db.as_ref())
            .await
            .context("list tags")?;
        Ok(models.into_iter().map(tag_from_model).collect())
    }

    async fn find(&self, id: i32) -> Result<Option<Tag>, RecipesServiceError> {
        let model = tags::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("find tag by id")?;
        Ok(model.map(tag_from_model))
    }

    async fn count_existing(&self, ids: &[i32]) -> Result<u64, RecipesServiceError> {
        let count = tags::Entity::find()
            .filter(tags::Column::Id.is_in(ids.iter().copied()))
            .count(self.db.as_ref())
            .await
            .context("count tags by id")?;
        Ok(count)
    }
}

fn tag_from_model(model: tags::Model) -> Tag {
    Tag {
        id: model.id,
        name: model.name,
        color: model.color,
        slug: model.slug,
    }
}

// ── Ingredient repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbIngredientRepository {
    pub db: Arc<DatabaseConnection>,
}

impl IngredientRepository for DbIngredientRepository {
    async fn list(&self, name: Option<&str>) -> Result<Vec<Ingredient>, RecipesServiceError> {
        let mut query = ingredients::Entity::find();
        if let Some(name) = name {
            let pattern = format!("%{}%", escape_like(&name.to_lowercase()));
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(ingredients::Column::Name))).like(pattern),
            );
        }
        let models = query
            .order_by_asc(ingredients::Column::Name)
            .order_by_asc(ingredients::Column::MeasurementUnit)
            .all(self.db.as_ref())
            .await
            .context("list ingredients")?;
        Ok(models.into_iter().map(ingredient_from_model).collect())
    }

    async fn find(&self, id: i32) -> Result<Option<Ingredient>, RecipesServiceError> {
        let model = ingredients::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("find ingredient by id")?;
        Ok(model.map(ingredient_from_model))
    }

    async fn count_existing(&self, ids: &[i32]) -> Result<u64, RecipesServiceError> {
        let count = ingredients::Entity::find()
            .filter(ingredients::Column::Id.is_in(ids.iter().copied()))
            .count(self.db.as_ref())
            .await
            .context("count ingredients by id")?;
        Ok(count)
    }
}

fn ingredient_from_model(model: ingredients::Model) -> Ingredient {
    Ingredient {
        id: model.id,
        name: model.name,
        measurement_unit: model.measurement_unit,
    }
}

// ── Recipe repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRecipeRepository {
    pub db: Arc<DatabaseConnection>,
}

impl RecipeRepository for DbRecipeRepository {
    async fn find(
        &self,
        id: i32,
        viewer: Option<i32>,
    ) -> Result<Option<Recipe>, RecipesServiceError> {
        let Some(model) = recipes::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .context("find recipe by id")?
        else {
            return Ok(None);
        };
        Ok(expand_recipes(self.db.as_ref(), vec![model], viewer).await?.pop())
    }

    async fn exists(&self, id: i32) -> Result<bool, RecipesServiceError> {
        let count = recipes::Entity::find_by_id(id)
            .count(self.db.as_ref())
            .await
            .context("check recipe exists")?;
        Ok(count > 0)
    }

    async fn list(
        &self,
        filter: &ResolvedRecipeFilter,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<(Vec<Recipe>, u64), RecipesServiceError> {
        let mut query = recipes::Entity::find();
        if let Some(author) = filter.author {
            query = query.filter(recipes::Column::AuthorId.eq(author));
        }
        if !filter.tags.is_empty() {
            query = query.filter(
                recipes::Column::Id.in_subquery(
                    Query::select()
                        .column((recipe_tags::Entity, recipe_tags::Column::RecipeId))
                        .from(recipe_tags::Entity)
                        .inner_join(
                            tags::Entity,
                            Expr::col((tags::Entity, tags::Column::Id))
                                .equals((recipe_tags::Entity, recipe_tags::Column::TagId)),
                        )
                        .and_where(
                            Expr::col((tags::Entity, tags::Column::Slug))
                                .is_in(filter.tags.iter().cloned()),
                        )
                        .to_owned(),
                ),
            );
        }
        if let Some(user_id) = filter.favorited_by {
            query = query.filter(
                recipes::Column::Id.in_subquery(
                    Query::select()
                        .column(favorites::Column::RecipeId)
                        .from(favorites::Entity)
                        .and_where(favorites::Column::UserId.eq(user_id))
                        .to_owned(),
                ),
            );
        }
        if let Some(user_id) = filter.in_cart_of {
            query = query.filter(
                recipes::Column::Id.in_subquery(
                    Query::select()
                        .column(shopping_carts::Column::RecipeId)
                        .from(shopping_carts::Entity)
                        .and_where(shopping_carts::Column::UserId.eq(user_id))
                        .to_owned(),
                ),
            );
        }

        let count = query
            .clone()
            .count(self.db.as_ref())
            .await
            .context("count recipes")?;
        let models = query
            .order_by_desc(recipes::Column::PubDate)
            .order_by_desc(recipes::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.db.as_ref())
            .await
            .context("list recipes")?;
        let recipes = expand_recipes(self.db.as_ref(), models, viewer).await?;
        Ok((recipes, count))
    }

    async fn create(
        &self,
        author_id: i32,
        draft: &RecipeDraft,
    ) -> Result<i32, RecipesServiceError> {
        let draft = draft.clone();
        let id = self
            .db
            .transaction::<_, i32, DbErr>(|txn| {
                Box::pin(async move {
                    let recipe = recipes::ActiveModel {
                        author_id: Set(author_id),
                        name: Set(draft.name),
                        text: Set(draft.text),
                        cooking_time: Set(draft.cooking_time),
                        image: Set(Some(draft.image)),
                        pub_date: Set(Utc::now()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    insert_recipe_tags(txn, recipe.id, &draft.tags).await?;
                    insert_recipe_ingredients(txn, recipe.id, &draft.ingredients).await?;
                    Ok(recipe.id)
                })
            })
            .await
            .context("create recipe")?;
        Ok(id)
    }

    async fn update(&self, id: i32, patch: &RecipePatch) -> Result<(), RecipesServiceError> {
        let patch = patch.clone();
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                Box::pin(async move {
                    let mut update = recipes::Entity::update_many()
                        .filter(recipes::Column::Id.eq(id));
                    let mut changed = false;
                    if let Some(name) = patch.name {
                        update = update.col_expr(recipes::Column::Name, Expr::value(name));
                        changed = true;
                    }
                    if let Some(text) = patch.text {
                        update = update.col_expr(recipes::Column::Text, Expr::value(text));
                        changed = true;
                    }
                    if let Some(cooking_time) = patch.cooking_time {
                        update = update
                            .col_expr(recipes::Column::CookingTime, Expr::value(cooking_time));
                        changed = true;
                    }
                    if let Some(image) = patch.image {
                        update = update.col_expr(recipes::Column::Image, Expr::value(image));
                        changed = true;
                    }
                    if changed {
                        update.exec(txn).await?;
                    }

                    if let Some(tag_ids) = patch.tags {
                        recipe_tags::Entity::delete_many()
                            .filter(recipe_tags::Column::RecipeId.eq(id))
                            .exec(txn)
                            .await?;
                        insert_recipe_tags(txn, id, &tag_ids).await?;
                    }
                    if let Some(items) = patch.ingredients {
                        recipe_ingredients::Entity::delete_many()
                            .filter(recipe_ingredients::Column::RecipeId.eq(id))
                            .exec(txn)
                            .await?;
                        insert_recipe_ingredients(txn, id, &items).await?;
                    }
                    Ok(())
                })
            })
            .await
            .context("update recipe")?;
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<bool, RecipesServiceError> {
        let result = recipes::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .context("delete recipe")?;
        Ok(result.rows_affected > 0)
    }
}

async fn insert_recipe_tags(
    txn: &DatabaseTransaction,
    recipe_id: i32,
    tag_ids: &[i32],
) -> Result<(), DbErr> {
    if tag_ids.is_empty() {
        return Ok(());
    }
    let rows = tag_ids.iter().map(|tag_id| recipe_tags::ActiveModel {
        recipe_id: Set(recipe_id),
        tag_id: Set(*tag_id),
    });
    recipe_tags::Entity::insert_many(rows)
        .exec_without_returning(txn)
        .await?;
    Ok(())
}

async fn insert_recipe_ingredients(
    txn: &DatabaseTransaction,
    recipe_id: i32,
    items: &[IngredientAmount],
) -> Result<(), DbErr> {
    if items.is_empty() {
        return Ok(());
    }
    let rows = items.iter().map(|item| recipe_ingredients::ActiveModel {
        recipe_id: Set(recipe_id),
        ingredient_id: Set(item.id),
        amount: Set(item.amount),
    });
    recipe_ingredients::Entity::insert_many(rows)
        .exec_without_returning(txn)
        .await?;
    Ok(())
}

/// Attach authors, tags, ingredients and viewer flags to recipe rows,
/// preserving their order.
async fn expand_recipes(
    db: &DatabaseConnection,
    models: Vec<recipes::Model>,
    viewer: Option<i32>,
) -> Result<Vec<Recipe>, RecipesServiceError> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let recipe_ids: Vec<i32> = models.iter().map(|m| m.id).collect();
    let mut author_ids: Vec<i32> = models.iter().map(|m| m.author_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();

    let authors: HashMap<i32, users::Model> = users::Entity::find()
        .filter(users::Column::Id.is_in(author_ids.iter().copied()))
        .all(db)
        .await
        .context("load recipe authors")?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let subscribed = subscribed_author_ids(db, viewer, &author_ids).await?;

    let mut tags_by_recipe: HashMap<i32, Vec<Tag>> = HashMap::new();
    let tag_rows = recipe_tags::Entity::find()
        .filter(recipe_tags::Column::RecipeId.is_in(recipe_ids.iter().copied()))
        .find_also_related(tags::Entity)
        .order_by_asc(tags::Column::Name)
        .all(db)
        .await
        .context("load recipe tags")?;
    for (link, tag) in tag_rows {
        if let Some(tag) = tag {
            tags_by_recipe
                .entry(link.recipe_id)
                .or_default()
                .push(tag_from_model(tag));
        }
    }

    let mut ingredients_by_recipe: HashMap<i32, Vec<RecipeIngredient>> = HashMap::new();
    let ingredient_rows = recipe_ingredients::Entity::find()
        .filter(recipe_ingredients::Column::RecipeId.is_in(recipe_ids.iter().copied()))
        .find_also_related(ingredients::Entity)
        .order_by_asc(ingredients::Column::Name)
        .all(db)
        .await
        .context("load recipe ingredients")?;
    for (link, ingredient) in ingredient_rows {
        if let Some(ingredient) = ingredient {
            ingredients_by_recipe
                .entry(link.recipe_id)
                .or_default()
                .push(RecipeIngredient {
                    ingredient: ingredient_from_model(ingredient),
                    amount: link.amount,
                });
        }
    }

    let (favorited, in_cart) = match viewer {
        Some(user_id) => {
            let favorited: Vec<i32> = favorites::Entity::find()
                .select_only()
                .column(favorites::Column::RecipeId)
                .filter(favorites::Column::UserId.eq(user_id))
                .filter(favorites::Column::RecipeId.is_in(recipe_ids.iter().copied()))
                .into_tuple()
                .all(db)
                .await
                .context("load favorite flags")?;
            let in_cart: Vec<i32> = shopping_carts::Entity::find()
                .select_only()
                .column(shopping_carts::Column::RecipeId)
                .filter(shopping_carts::Column::UserId.eq(user_id))
                .filter(shopping_carts::Column::RecipeId.is_in(recipe_ids.iter().copied()))
                .into_tuple()
                .all(db)
                .await
                .context("load shopping cart flags")?;
            (
                favorited.into_iter().collect::<HashSet<_>>(),
                in_cart.into_iter().collect::<HashSet<_>>(),
            )
        }
        None => (HashSet::new(), HashSet::new()),
    };

    let recipes = models
        .into_iter()
        .filter_map(|model| {
            let author = authors.get(&model.author_id)?.clone();
            Some(Recipe {
                id: model.id,
                author: UserProfile {
                    is_subscribed: subscribed.contains(&author.id),
                    user: user_from_model(author),
                },
                tags: tags_by_recipe.remove(&model.id).unwrap_or_default(),
                ingredients: ingredients_by_recipe.remove(&model.id).unwrap_or_default(),
                is_favorited: favorited.contains(&model.id),
                is_in_shopping_cart: in_cart.contains(&model.id),
                name: model.name,
                text: model.text,
                cooking_time: model.cooking_time,
                image: model.image,
                pub_date: model.pub_date,
            })
        })
        .collect();
    Ok(recipes)
}

// ── Favorite / shopping-cart repositories ────────────────────────────────────

#[derive(Clone)]
pub struct DbFavoriteRepository {
    pub db: Arc<DatabaseConnection>,
}

impl RecipeLinkRepository for DbFavoriteRepository {
    async fn add(&self, user_id: i32, recipe_id: i32) -> Result<bool, RecipesServiceError> {
        let inserted = favorites::Entity::insert(favorites::ActiveModel {
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
            created_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::columns([favorites::Column::UserId, favorites::Column::RecipeId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(self.db.as_ref())
        .await
        .context("add favorite")?;
        Ok(inserted > 0)
    }

    async fn remove(&self, user_id: i32, recipe_id: i32) -> Result<bool, RecipesServiceError> {
        let result = favorites::Entity::delete_many()
            .filter(favorites::Column::UserId.eq(user_id))
            .filter(favorites::Column::RecipeId.eq(recipe_id))
            .exec(self.db.as_ref())
            .await
            .context("remove favorite")?;
        Ok(result.rows_affected > 0)
    }
}

#[derive(Clone)]
pub struct DbShoppingCartRepository {
    pub db: Arc<DatabaseConnection>,
}

impl RecipeLinkRepository for DbShoppingCartRepository {
    async fn add(&self, user_id: i32, recipe_id: i32) -> Result<bool, RecipesServiceError> {
        let inserted = shopping_carts::Entity::insert(shopping_carts::ActiveModel {
            user_id: Set(user_id),
            recipe_id: Set(recipe_id),
            created_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::columns([
                shopping_carts::Column::UserId,
                shopping_carts::Column::RecipeId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(self.db.as_ref())
        .await
        .context("add shopping cart item")?;
        Ok(inserted > 0)
    }

    async fn remove(&self, user_id: i32, recipe_id: i32) -> Result<bool, RecipesServiceError> {
        let result = shopping_carts::Entity::delete_many()
            .filter(shopping_carts::Column::UserId.eq(user_id))
            .filter(shopping_carts::Column::RecipeId.eq(recipe_id))
            .exec(self.db.as_ref())
            .await
            .context("remove shopping cart item")?;
        Ok(result.rows_affected > 0)
    }
}

/// Ingredient totals over every recipe in the cart of user `$1`.
const SHOPPING_LIST_SQL: &str = r#"
SELECT i.name, i.measurement_unit, SUM(ri.amount)::BIGINT AS total_amount
    FROM recipe_ingredients AS ri
    JOIN ingredients AS i ON i.id = ri.ingredient_id
    WHERE ri.recipe_id IN (
        SELECT recipe_id FROM shopping_carts WHERE user_id = $1
    )
    GROUP BY i.name, i.measurement_unit
    ORDER BY i.name, i.measurement_unit
"#;

impl ShoppingListRepository for DbShoppingCartRepository {
    async fn aggregate(&self, user_id: i32) -> Result<Vec<ShoppingListRow>, RecipesServiceError> {
        #[derive(Debug, FromQueryResult)]
        struct AggregateRow {
            name: String,
            measurement_unit: String,
            total_amount: i64,
        }

        let rows = AggregateRow::find_by_statement(Statement::from_sql_and_values(
            self.db.get_database_backend(),
            SHOPPING_LIST_SQL,
            [user_id.into()],
        ))
        .all(self.db.as_ref())
        .await
        .context("aggregate shopping list")?;

        Ok(rows
            .into_iter()
            .map(|row| ShoppingListRow {
                name: row.name,
                measurement_unit: row.measurement_unit,
                total_amount: row.total_amount,
            })
            .collect())
    }
}

// ── Subscription repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSubscriptionRepository {
    pub db: Arc<DatabaseConnection>,
}

impl SubscriptionRepository for DbSubscriptionRepository {
    async fn add(&self, user_id: i32, author_id: i32) -> Result<bool, RecipesServiceError> {
        let inserted = subscriptions::Entity::insert(subscriptions::ActiveModel {
            user_id: Set(user_id),
            author_id: Set(author_id),
            subscribed_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::columns([
                subscriptions::Column::UserId,
                subscriptions::Column::AuthorId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(self.db.as_ref())
        .await
        .context("add subscription")?;
        Ok(inserted > 0)
    }

    async fn remove(&self, user_id: i32, author_id: i32) -> Result<bool, RecipesServiceError> {
        let result = subscriptions::Entity::delete_many()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(subscriptions::Column::AuthorId.eq(author_id))
            .exec(self.db.as_ref())
            .await
            .context("remove subscription")?;
        Ok(result.rows_affected > 0)
    }

    async fn list(
        &self,
        user_id: i32,
        page: PageRequest,
        recipes_limit: Option<u64>,
    ) -> Result<(Vec<SubscriptionItem>, u64), RecipesServiceError> {
        let query = subscriptions::Entity::find().filter(subscriptions::Column::UserId.eq(user_id));
        let count = query
            .clone()
            .count(self.db.as_ref())
            .await
            .context("count subscriptions")?;
        let author_ids: Vec<i32> = query
            .select_only()
            .column(subscriptions::Column::AuthorId)
            .order_by_desc(subscriptions::Column::SubscribedAt)
            .order_by_desc(subscriptions::Column::AuthorId)
            .offset(page.offset())
            .limit(page.limit())
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .context("list subscriptions")?;
        let items = subscription_items(self.db.as_ref(), &author_ids, recipes_limit).await?;
        Ok((items, count))
    }

    async fn get(
        &self,
        user_id: i32,
        author_id: i32,
        recipes_limit: Option<u64>,
    ) -> Result<Option<SubscriptionItem>, RecipesServiceError> {
        let subscribed = subscriptions::Entity::find_by_id((user_id, author_id))
            .count(self.db.as_ref())
            .await
            .context("find subscription")?;
        if subscribed == 0 {
            return Ok(None);
        }
        Ok(subscription_items(self.db.as_ref(), &[author_id], recipes_limit)
            .await?
            .pop())
    }
}

/// Build subscription items for `author_ids`, in the given order.
async fn subscription_items(
    db: &DatabaseConnection,
    author_ids: &[i32],
    recipes_limit: Option<u64>,
) -> Result<Vec<SubscriptionItem>, RecipesServiceError> {
    if author_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut authors: HashMap<i32, users::Model> = users::Entity::find()
        .filter(users::Column::Id.is_in(author_ids.iter().copied()))
        .all(db)
        .await
        .context("load subscribed authors")?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();
    let mut previews = recipe_previews(db, author_ids, recipes_limit).await?;

    Ok(author_ids
        .iter()
        .filter_map(|id| {
            let author = authors.remove(id)?;
            let (recipes, recipes_count) = previews.remove(id).unwrap_or_default();
            Some(SubscriptionItem {
                author: user_from_model(author),
                recipes,
                recipes_count,
            })
        })
        .collect())
}

/// Newest recipes per author (at most `limit` each) with each author's total.
async fn recipe_previews(
    db: &DatabaseConnection,
    author_ids: &[i32],
    limit: Option<u64>,
) -> Result<HashMap<i32, (Vec<RecipeSummary>, u64)>, RecipesServiceError> {
    #[derive(Debug, FromQueryResult)]
    struct PreviewRow {
        id: i32,
        author_id: i32,
        name: String,
        image: Option<String>,
        cooking_time: i32,
        total: i64,
    }

    let placeholders = (1..=author_ids.len())
        .map(|n| format!("${n}"))
        .collect::<Vec<_>>()
        .join(", ");
    let limit_param = author_ids.len() + 1;
    let sql = format!(
        r#"
        SELECT id, author_id, name, image, cooking_time, total FROM (
            SELECT id, author_id, name, image, cooking_time,
                ROW_NUMBER() OVER (PARTITION BY author_id ORDER BY pub_date DESC, id DESC) AS position,
                COUNT(*) OVER (PARTITION BY author_id) AS total
            FROM recipes
            WHERE author_id IN ({placeholders})
        ) AS ranked
        WHERE ${limit_param}::BIGINT IS NULL OR position <= ${limit_param}::BIGINT
        ORDER BY author_id, position
        "#,
    );
    let mut values: Vec<Value> = author_ids.iter().map(|id| (*id).into()).collect();
    values.push(Value::BigInt(limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX))));

    let rows = PreviewRow::find_by_statement(Statement::from_sql_and_values(
        db.get_database_backend(),
        &sql,
        values,
    ))
    .all(db)
    .await
    .context("load recipe previews")?;

    let mut previews: HashMap<i32, (Vec<RecipeSummary>, u64)> = HashMap::new();
    for row in rows {
        let entry = previews.entry(row.author_id).or_default();
        entry.1 = u64::try_from(row.total).unwrap_or_default();
        entry.0.push(RecipeSummary {
            id: row.id,
            name: row.name,
            image: row.image,
            cooking_time: row.cooking_time,
        });
    }

    // Authors whose recipes were all cut by a zero limit still need a count.
    if limit == Some(0) {
        let counts: Vec<(i32, i64)> = recipes::Entity::find()
            .select_only()
            .column(recipes::Column::AuthorId)
            .column_as(recipes::Column::Id.count(), "total")
            .filter(recipes::Column::AuthorId.is_in(author_ids.iter().copied()))
            .group_by(recipes::Column::AuthorId)
            .into_tuple()
            .all(db)
            .await
            .context("count author recipes")?;
        for (author_id, total) in counts {
            previews.entry(author_id).or_default().1 = u64::try_from(total).unwrap_or_default();
        }
    }
    Ok(previews)
}
