use serde::Deserialize;
use validator::Validate;

// Missing strings default to empty so they surface as 422 field errors
// instead of a deserialization failure.

#[derive(Debug, Validate, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 30, message = "User must be 1-30 characters"))]
    pub user: String,
    #[serde(default)]
    #[validate(length(max = 500, message = "Biography must be at most 500 characters"))]
    pub biography: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Password must be 1-100 characters"))]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Validate, Deserialize)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "Biography must be at most 500 characters"))]
    pub biography: Option<String>,
}

#[derive(Debug, Validate, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 5000, message = "Description is required"))]
    pub description: String,
}

/// GET /posts?myLikes=true
#[derive(Debug, Default, Deserialize)]
pub struct ListPostsParams {
    #[serde(rename = "myLikes")]
    pub my_likes: Option<String>,
}

impl ListPostsParams {
    pub fn only_liked(&self) -> bool {
        self.my_likes.as_deref() == Some("true")
    }
}
