use social_api::{AppState, app, config::Config};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("social_api=info,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    tokio::fs::create_dir_all(&config.uploads_dir).await?;

    let addr = config.addr();
    let uploads_dir = config.uploads_dir.display().to_string();
    let state = AppState::new(config);
    state.spawn_limiter_pruning(Duration::from_secs(60));
    let app = app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Serving uploads from {}", uploads_dir);
    info!("API Endpoints:");
    info!("  GET    /health              - Health check");
    info!("  POST   /users               - Create account");
    info!("  POST   /sessions            - Login");
    info!("  GET    /file/:path          - Uploaded file");
    info!("  GET    /users               - Other users (auth)");
    info!("  GET    /users/:id           - User by id (auth)");
    info!("  PUT    /users               - Update own profile (auth)");
    info!("  DELETE /users/:id           - Delete own account (auth)");
    info!("  PUT    /users/avatar        - Upload avatar (auth)");
    info!("  GET    /posts               - Feed, ?myLikes=true (auth)");
    info!("  POST   /posts               - Create post (auth)");
    info!("  GET    /posts/:id           - Post by id (auth)");
    info!("  DELETE /posts/:id           - Delete post (auth)");
    info!("  PUT    /posts/:id/image     - Upload post image (auth)");
    info!("  PUT    /posts/like/:id      - Like (auth)");
    info!("  DELETE /posts/like/:id      - Unlike (auth)");

    axum::serve(listener, app).await?;

    Ok(())
}
