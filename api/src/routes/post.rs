use crate::{
    AppState,
    auth::Session,
    dto::{CreatePostRequest, ListPostsParams, PostResponse},
    errors::ApiError,
    models::Post,
    uploads,
};
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

fn populate(state: &AppState, post: Post) -> PostResponse {
    let author = state.db.find_user(&post.created_by);
    PostResponse::populated(post, author, &state.config)
}

/// GET /posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state.db.find_post(&id).ok_or(ApiError::NotFound)?;

    Ok(Json(populate(&state, post)))
}

/// GET /posts?myLikes=true
/// Newest first
pub async fn list_posts(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ListPostsParams>,
) -> Json<Vec<PostResponse>> {
    let liked_by = params.only_liked().then_some(&session.user_id);

    let posts = state
        .db
        .list_posts(liked_by)
        .into_iter()
        .map(|post| populate(&state, post))
        .collect();

    Json(posts)
}

/// POST /posts
/// Body: { "description": "..." }
pub async fn create_post(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    payload.validate()?;

    let post = state
        .db
        .insert_post(Post::new(payload.description, session.user_id));

    info!("Post created: {} by user {}", post.id, session.user_id);

    Ok((
        StatusCode::CREATED,
        Json(PostResponse::new(post, &state.config)),
    ))
}

/// DELETE /posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let post = state.db.delete_post(&id).ok_or(ApiError::NotFound)?;

    if let Some(image) = &post.image {
        uploads::remove_file(&state.config.uploads_dir, image).await;
    }

    info!("Post deleted: {} by user {}", id, session.user_id);

    Ok(Json(serde_json::json!({})))
}

/// PUT /posts/like/{id}
pub async fn like_post(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .db
        .set_like(&id, session.user_id, true)
        .ok_or(ApiError::NotFound)?;

    info!("Post {} liked by {}", id, session.user_id);

    Ok(Json(serde_json::json!({})))
}

/// DELETE /posts/like/{id}
pub async fn unlike_post(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .db
        .set_like(&id, session.user_id, false)
        .ok_or(ApiError::NotFound)?;

    info!("Post {} unliked by {}", id, session.user_id);

    Ok(Json(serde_json::json!({})))
}

/// PUT /posts/{id}/image
/// Multipart field: image
pub async fn update_image(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<PostResponse>, ApiError> {
    if state.db.find_post(&id).is_none() {
        return Err(ApiError::NotFound);
    }

    let dir = &state.config.uploads_dir;
    let filename = uploads::save_field(multipart, "image", dir).await?;

    let mut previous = None;
    let updated = state.db.update_post(&id, |post| {
        previous = post.image.replace(filename.clone());
        post.updated_by = session.user_id;
    });

    let Some(post) = updated else {
        uploads::remove_file(dir, &filename).await;
        return Err(ApiError::NotFound);
    };

    if let Some(old) = previous.filter(|old| *old != filename) {
        uploads::remove_file(dir, &old).await;
    }

    info!("Image updated for post {}: {}", id, filename);

    Ok(Json(PostResponse::new(post, &state.config)))
}
