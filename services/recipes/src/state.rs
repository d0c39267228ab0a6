use std::path::PathBuf;
use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::RecipesConfig;
use crate::domain::repository::MediaStorage as _;
use crate::infra::db::{
    DbFavoriteRepository, DbIngredientRepository, DbRecipeRepository, DbShoppingCartRepository,
    DbSubscriptionRepository, DbTagRepository, DbUserRepository,
};
use crate::infra::media::LocalMediaStorage;
use crate::infra::pdf::PdfShoppingListRenderer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub media_root: PathBuf,
    /// Absolute base URL for media files.
    pub media_url: String,
    /// Router path media is served under, if served locally.
    pub media_mount: Option<String>,
    pub public_base_url: String,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: &RecipesConfig) -> Self {
        Self {
            db: Arc::new(db),
            media_root: config.media_root.clone(),
            media_url: config.media_base_url(),
            media_mount: config.media_mount_path(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: Arc::clone(&self.db),
        }
    }

    pub fn tag_repo(&self) -> DbTagRepository {
        DbTagRepository {
            db: Arc::clone(&self.db),
        }
    }

    pub fn ingredient_repo(&self) -> DbIngredientRepository {
        DbIngredientRepository {
            db: Arc::clone(&self.db),
        }
    }

    pub fn recipe_repo(&self) -> DbRecipeRepository {
        DbRecipeRepository {
            db: Arc::clone(&self.db),
        }
    }

    pub fn favorite_repo(&self) -> DbFavoriteRepository {
        DbFavoriteRepository {
            db: Arc::clone(&self.db),
        }
    }

    pub fn shopping_cart_repo(&self) -> DbShoppingCartRepository {
        DbShoppingCartRepository {
            db: Arc::clone(&self.db),
        }
    }

    pub fn subscription_repo(&self) -> DbSubscriptionRepository {
        DbSubscriptionRepository {
            db: Arc::clone(&self.db),
        }
    }

    pub fn media_storage(&self) -> LocalMediaStorage {
        LocalMediaStorage {
            root: self.media_root.clone(),
            base_url: self.media_url.clone(),
        }
    }

    pub fn shopping_list_renderer(&self) -> PdfShoppingListRenderer {
        PdfShoppingListRenderer::default()
    }

    /// Public URL of a stored media key.
    pub fn media_link(&self, key: &str) -> String {
        self.media_storage().url(key)
    }
}
