use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use jamazon_api::{
    routes::{build_app, health::health_check},
    state::AppState,
};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

mod common;

#[tokio::test]
async fn health_check_returns_ok() {
    let response = health_check().await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
}

// A lazy pool never connects, so these only exercise paths that stay off the database.
fn offline_state() -> AppState {
    let url = "postgres://nobody@127.0.0.1:1/none";
    let pool = PgPoolOptions::new()
        .connect_lazy(url)
        .expect("lazy pool");
    AppState::new(pool, &common::test_config(url))
}

#[tokio::test]
async fn unknown_path_is_not_found_with_request_id() {
    let app = build_app(offline_state());
    let response = app
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn cart_requires_bearer_token() {
    let app = build_app(offline_state());
    let response = app
        .oneshot(Request::get("/cart/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["message"], "Unauthorized Missing Authorization header");
}

#[tokio::test]
async fn admin_routes_reject_non_admin_before_touching_storage() {
    let state = offline_state();
    let token = jamazon_api::services::auth_service::issue_token(
        uuid::Uuid::new_v4(),
        "user",
        &state.auth,
    )
    .unwrap();
    let app = build_app(state);

    let response = app
        .oneshot(
            Request::post("/admin/categories/")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name":"Mugs","slug":"mugs"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
