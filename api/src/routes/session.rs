use crate::{
    AppState,
    auth::create_token,
    dto::{AuthResponse, LoginRequest, UserResponse},
    errors::ApiError,
};
use axum::{Json, extract::State};
use bcrypt::verify;
use tracing::{info, warn};

/// POST /sessions
/// Body: { "user": "...", "password": "..." }
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .db
        .find_user_by_handle(&payload.user)
        .ok_or(ApiError::NotFound)?;

    // Keyed by account id so unknown handles never grow the limiter
    if state.login_limiter.check_key(&user.id).is_err() {
        warn!("Login throttled for {}", user.user);
        return Err(ApiError::TooManyAttempts);
    }

    // Verify password
    let valid = verify(&payload.password, &user.hashed_password)
        .map_err(|e| ApiError::InternalError(format!("Password verification failed: {}", e)))?;

    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    let token = create_token(
        &user.id,
        &state.config.jwt_secret,
        state.config.session_lifetime,
    )?;

    info!("User logged in: {}", user.user);

    Ok(Json(AuthResponse {
        token,
        user: UserResponse::new(user, &state.config),
    }))
}
