// ============================================================================
// SOCIAL FEED REST API
// ============================================================================

// - User registration and bcrypt password hashing
// - Bearer-token (JWT) sessions
// - Posts feed with like/unlike
// - Avatar and post image uploads served from local disk

pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod errors;
pub mod models;
pub mod routes;
pub mod states;
pub mod uploads;

pub use states::AppState;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
};
use routes::{health, post as posts, session, user};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

/// Build the full application router
pub fn app(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Protected routes (auth required)
    let private = Router::new()
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route("/posts/{id}", get(posts::get_post).delete(posts::delete_post))
        .route("/posts/{id}/image", put(posts::update_image))
        .route(
            "/posts/like/{id}",
            put(posts::like_post).delete(posts::unlike_post),
        )
        .route("/users", get(user::list_users).put(user::update_user))
        .route("/users/{id}", get(user::get_user).delete(user::delete_user))
        .route("/users/avatar", put(user::update_avatar))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    // Public routes (no auth required)
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/users", post(user::register))
        .route("/sessions", post(session::login))
        .nest_service("/file", ServeDir::new(&state.config.uploads_dir));

    Router::new()
        .merge(public)
        .merge(private)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
