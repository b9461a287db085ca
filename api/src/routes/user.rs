use crate::{
    AppState,
    auth::{Session, create_token},
    db::HandleTaken,
    dto::{AuthResponse, RegisterRequest, UpdateUserRequest, UserResponse},
    errors::ApiError,
    models::User,
    uploads,
};
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use bcrypt::hash;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// POST /users
/// Body: { "name", "user", "biography"?, "password", "password_confirmation" }
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.validate()?;

    if state.db.find_user_by_handle(&payload.user).is_some() {
        return Err(ApiError::field("user", "User already used"));
    }

    if payload.password != payload.password_confirmation {
        return Err(ApiError::field(
            "password_confirmation",
            "Passwords must match",
        ));
    }

    let hashed_password = hash(&payload.password, state.config.bcrypt_cost)
        .map_err(|e| ApiError::InternalError(format!("Password hashing failed: {}", e)))?;

    // The index insert is the real uniqueness check; the lookup above only
    // orders the error messages.
    let user = state
        .db
        .insert_user(User::new(
            payload.name,
            payload.user,
            payload.biography,
            hashed_password,
        ))
        .map_err(|HandleTaken| ApiError::field("user", "User already used"))?;

    let token = create_token(
        &user.id,
        &state.config.jwt_secret,
        state.config.session_lifetime,
    )?;

    info!("New user registered: {}", user.user);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserResponse::new(user, &state.config),
        }),
    ))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.db.find_user(&id).ok_or(ApiError::NotFound)?;

    Ok(Json(UserResponse::new(user, &state.config)))
}

/// GET /users
/// Everyone except the caller
pub async fn list_users(
    State(state): State<AppState>,
    session: Session,
) -> Json<Vec<UserResponse>> {
    let users = state
        .db
        .list_users_except(&session.user_id)
        .into_iter()
        .map(|u| UserResponse::new(u, &state.config))
        .collect();

    Json(users)
}

/// PUT /users
/// Body: { "name"?, "biography"? }
pub async fn update_user(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    payload.validate()?;

    let user = state
        .db
        .update_user(&session.user_id, |user| {
            if let Some(name) = payload.name {
                user.name = name;
            }
            if let Some(biography) = payload.biography {
                user.biography = biography;
            }
        })
        .ok_or(ApiError::NotFound)?;

    info!("User updated: {}", user.user);

    Ok(Json(UserResponse::new(user, &state.config)))
}

/// DELETE /users/{id}
/// Only the account owner may delete it
pub async fn delete_user(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if id != session.user_id {
        return Err(ApiError::Forbidden);
    }

    let user = state.db.delete_user(&id).ok_or(ApiError::NotFound)?;

    if let Some(avatar) = &user.avatar {
        uploads::remove_file(&state.config.uploads_dir, avatar).await;
    }

    info!("User deleted: {}", user.user);

    Ok(Json(serde_json::json!({})))
}

/// PUT /users/avatar
/// Multipart field: avatar
pub async fn update_avatar(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Json<UserResponse>, ApiError> {
    if state.db.find_user(&session.user_id).is_none() {
        return Err(ApiError::NotFound);
    }

    let dir = &state.config.uploads_dir;
    let filename = uploads::save_field(multipart, "avatar", dir).await?;

    let mut previous = None;
    let updated = state.db.update_user(&session.user_id, |user| {
        previous = user.avatar.replace(filename.clone());
    });

    let Some(user) = updated else {
        // Account vanished while the file was being written
        uploads::remove_file(dir, &filename).await;
        return Err(ApiError::NotFound);
    };

    if let Some(old) = previous.filter(|old| *old != filename) {
        uploads::remove_file(dir, &old).await;
    }

    info!("Avatar updated for {}: {}", user.user, filename);

    Ok(Json(UserResponse::new(user, &state.config)))
}
