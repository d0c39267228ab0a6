use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use foodgram_core::error::not_found;
use foodgram_core::health::healthz;
use foodgram_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    avatar::{delete_avatar, set_avatar},
    favorite::{add_favorite, remove_favorite},
    health::readyz,
    ingredient::{get_ingredient, list_ingredients},
    recipe::{
        create_recipe, delete_recipe, get_recipe, get_recipe_link, list_recipes, update_recipe,
    },
    shopping_cart::{add_to_cart, download_shopping_cart, remove_from_cart},
    subscription::{list_subscriptions, subscribe, unsubscribe},
    tag::{get_tag, list_tags},
    user::{create_user, get_me, get_user, list_users},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Users
        .route("/users", get(list_users).post(create_user))
        .route("/users/me", get(get_me))
        .route(
            "/users/me/avatar",
            put(set_avatar)
                .post(set_avatar)
                .patch(set_avatar)
                .delete(delete_avatar),
        )
        .route("/users/subscriptions", get(list_subscriptions))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/subscribe", post(subscribe).delete(unsubscribe))
        // Tags
        .route("/tags", get(list_tags))
        .route("/tags/{id}", get(get_tag))
        // Ingredients
        .route("/ingredients", get(list_ingredients))
        .route("/ingredients/{id}", get(get_ingredient))
        // Recipes
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route("/recipes/download_shopping_cart", get(download_shopping_cart))
        .route(
            "/recipes/{id}",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route("/recipes/{id}/get-link", get(get_recipe_link))
        .route("/recipes/{id}/favorite", post(add_favorite).delete(remove_favorite))
        .route(
            "/recipes/{id}/shopping_cart",
            post(add_to_cart).delete(remove_from_cart),
        );

    let mut router = Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api", api);

    if let Some(mount) = &state.media_mount {
        router = router.nest_service(mount, ServeDir::new(&state.media_root));
    }

    router
        .fallback(not_found)
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
