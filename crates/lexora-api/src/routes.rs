use axum::{
    Json, Router, middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::middleware::require_auth;
use crate::{chats, messages, opportunities, users};

/// Full HTTP surface: public auth and signup helpers, everything else behind
/// a bearer token.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/users/check-username", get(users::check_username))
        .route("/health", get(health))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/users/search", get(users::search_users))
        .route("/users/{user_id}", get(users::public_profile))
        .route("/profile", put(users::update_profile))
        .route(
            "/opportunities",
            get(opportunities::browse_opportunities).post(opportunities::post_opportunity),
        )
        .route("/messages", post(messages::send_message))
        .route("/messages/{other_user_id}", get(messages::get_conversation))
        .route("/recent-chats/{user_id}", get(chats::recent_chats))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
