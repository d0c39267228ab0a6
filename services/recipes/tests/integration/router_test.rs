use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::{Value, json};

use foodgram_core::config::Config;
use foodgram_recipes::config::RecipesConfig;
use foodgram_recipes::router::build_router;
use foodgram_recipes::state::AppState;
use foodgram_recipes_schema::users;
use foodgram_testing::auth::MockAuth;

fn server_with(db: DatabaseConnection) -> TestServer {
    let config = RecipesConfig::from_iter([(
        "DATABASE_URL".to_owned(),
        "postgres://localhost/foodgram".to_owned(),
    )])
    .unwrap();
    let state = AppState::new(db, &config);
    TestServer::new(build_router(state)).unwrap()
}

/// Server over a disconnected database: only paths that never reach it succeed.
fn server() -> TestServer {
    server_with(DatabaseConnection::Disconnected)
}

fn with_identity(request: axum_test::TestRequest, auth: MockAuth) -> axum_test::TestRequest {
    auth.header_pairs()
        .into_iter()
        .fold(request, |request, (name, value)| request.add_header(name, value))
}

#[tokio::test]
async fn should_answer_liveness_check() {
    server().get("/healthz").await.assert_status_ok();
}

#[tokio::test]
async fn should_report_not_ready_without_database() {
    server()
        .get("/readyz")
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn should_require_identity_for_protected_routes() {
    let server = server();
    for path in [
        "/api/users/me",
        "/api/users/subscriptions",
        "/api/recipes/download_shopping_cart",
    ] {
        server
            .get(path)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
    server
        .post("/api/recipes/1/favorite")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_malformed_identity_on_optional_routes() {
    server()
        .get("/api/recipes")
        .add_header(
            HeaderName::from_static("x-foodgram-user-id"),
            HeaderValue::from_static("abc"),
        )
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_malformed_avatar_payload() {
    let server = server();
    let response = with_identity(server.put("/api/users/me/avatar"), MockAuth::user(1))
        .json(&json!({"avatar": "not-a-data-uri"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INVALID_AVATAR");
}

#[tokio::test]
async fn should_reject_missing_avatar_field() {
    let server = server();
    with_identity(server.post("/api/users/me/avatar"), MockAuth::user(1))
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_return_empty_page_for_anonymous_favorites_filter() {
    let response = server().get("/api/recipes?is_favorited=1").await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "count": 0,
        "next": null,
        "previous": null,
        "results": [],
    }));
}

#[tokio::test]
async fn should_accept_repeated_tags_with_word_flags() {
    server()
        .get("/api/recipes?tags=breakfast&tags=dinner&is_in_shopping_cart=true&limit=3")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn should_reject_unknown_boolean_filter_value() {
    let response = server().get("/api/recipes?is_favorited=maybe").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INVALID_REQUEST");
    assert!(body["message"].as_str().is_some());
}

#[tokio::test]
async fn should_wrap_malformed_recipe_body_in_error_envelope() {
    let server = server();
    let response = with_identity(server.post("/api/recipes"), MockAuth::user(1))
        .content_type("application/json")
        .bytes("{\"name\": ".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INVALID_REQUEST");
}

#[tokio::test]
async fn should_wrap_non_numeric_id_in_error_envelope() {
    let response = server().get("/api/recipes/soup").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "INVALID_REQUEST");
}

#[tokio::test]
async fn should_return_json_not_found_for_unknown_route() {
    let response = server().get("/api/unknown").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["kind"], "NOT_FOUND");
}

#[tokio::test]
async fn should_stamp_request_id_on_responses() {
    let response = server().get("/healthz").await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn should_keep_api_prefix_in_page_links() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[maplit::btreemap! {
            "num_items" => sea_orm::Value::BigInt(Some(3)),
        }]])
        .append_query_results([[users::Model {
            id: 2,
            email: "chef@example.com".into(),
            username: "chef".into(),
            first_name: "Chef".into(),
            last_name: "Cook".into(),
            avatar: None,
            date_joined: chrono::Utc::now(),
        }]])
        .into_connection();

    let response = server_with(db).get("/api/users?limit=1&page=2").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["count"], 3);
    assert_eq!(
        body["next"],
        "http://localhost:8000/api/users?limit=1&page=3"
    );
    assert_eq!(
        body["previous"],
        "http://localhost:8000/api/users?limit=1&page=1"
    );
    assert_eq!(body["results"][0]["username"], "chef");
}
