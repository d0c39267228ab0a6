use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::QueryRejection;

/// Recipes service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum RecipesServiceError {
    #[error("recipe not found")]
    RecipeNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("tag not found")]
    TagNotFound,
    #[error("ingredient not found")]
    IngredientNotFound,
    #[error("recipe is not in favorites")]
    FavoriteNotFound,
    #[error("recipe is not in the shopping cart")]
    CartItemNotFound,
    #[error("not subscribed to this author")]
    SubscriptionNotFound,
    #[error("recipe is already in favorites")]
    FavoriteAlreadyExists,
    #[error("recipe is already in the shopping cart")]
    CartItemAlreadyExists,
    #[error("already subscribed to this author")]
    SubscriptionAlreadyExists,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("cannot subscribe to yourself")]
    SelfSubscription,
    #[error("invalid ingredients: {0}")]
    InvalidIngredients(&'static str),
    #[error("invalid tags: {0}")]
    InvalidTags(&'static str),
    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },
    #[error("invalid avatar")]
    InvalidAvatar,
    #[error("invalid image")]
    InvalidImage,
    #[error("shopping cart is empty")]
    EmptyCart,
    #[error("forbidden")]
    Forbidden,
    /// Body, query string or path segment that could not be parsed.
    #[error("{message}")]
    InvalidRequest { status: StatusCode, message: String },
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl RecipesServiceError {
    pub fn validation(field: &'static str, reason: &'static str) -> Self {
        Self::Validation { field, reason }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::RecipeNotFound => "RECIPE_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::TagNotFound => "TAG_NOT_FOUND",
            Self::IngredientNotFound => "INGREDIENT_NOT_FOUND",
            Self::FavoriteNotFound => "FAVORITE_NOT_FOUND",
            Self::CartItemNotFound => "CART_ITEM_NOT_FOUND",
            Self::SubscriptionNotFound => "SUBSCRIPTION_NOT_FOUND",
            Self::FavoriteAlreadyExists => "FAVORITE_ALREADY_EXISTS",
            Self::CartItemAlreadyExists => "CART_ITEM_ALREADY_EXISTS",
            Self::SubscriptionAlreadyExists => "SUBSCRIPTION_ALREADY_EXISTS",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::SelfSubscription => "SELF_SUBSCRIPTION",
            Self::InvalidIngredients(_) => "INVALID_INGREDIENTS",
            Self::InvalidTags(_) => "INVALID_TAGS",
            Self::Validation { .. } => "VALIDATION",
            Self::InvalidAvatar => "INVALID_AVATAR",
            Self::InvalidImage => "INVALID_IMAGE",
            Self::EmptyCart => "EMPTY_CART",
            Self::Forbidden => "FORBIDDEN",
            Self::InvalidRequest { .. } => "INVALID_REQUEST",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Request field the error refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidIngredients(_) => Some("ingredients"),
            Self::InvalidTags(_) => Some("tags"),
            Self::Validation { field, .. } => Some(field),
            Self::InvalidAvatar => Some("avatar"),
            Self::InvalidImage => Some("image"),
            _ => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::RecipeNotFound
            | Self::UserNotFound
            | Self::TagNotFound
            | Self::IngredientNotFound => StatusCode::NOT_FOUND,
            Self::FavoriteNotFound
            | Self::CartItemNotFound
            | Self::SubscriptionNotFound
            | Self::FavoriteAlreadyExists
            | Self::CartItemAlreadyExists
            | Self::SubscriptionAlreadyExists
            | Self::UserAlreadyExists
            | Self::SelfSubscription
            | Self::InvalidIngredients(_)
            | Self::InvalidTags(_)
            | Self::Validation { .. }
            | Self::InvalidAvatar
            | Self::InvalidImage
            | Self::EmptyCart => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InvalidRequest { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for RecipesServiceError {
    fn from(rejection: JsonRejection) -> Self {
        // Well-formed JSON of the wrong shape is a plain validation failure.
        let status = match rejection.status() {
            StatusCode::UNPROCESSABLE_ENTITY => StatusCode::BAD_REQUEST,
            status => status,
        };
        Self::InvalidRequest {
            status,
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for RecipesServiceError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidRequest {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

// Path rejections are always reported as client errors; routes only take ids.
impl From<PathRejection> for RecipesServiceError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidRequest {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for RecipesServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Some(field) = self.field() {
            body["field"] = serde_json::Value::from(field);
        }
        (status, axum::Json(body)).into_response()
    }
}
