use crate::{
    config::Config,
    models::{Post, User},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// A user as clients see it: no password, plus a public avatar URL
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub user: String,
    pub biography: String,
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn new(user: User, config: &Config) -> Self {
        Self {
            avatar_url: user.avatar.as_deref().map(|a| config.files_url_for(a)),
            id: user.id,
            name: user.name,
            user: user.user,
            biography: user.biography,
            avatar: user.avatar,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// `created_by` is either the raw id or, in feed reads, the populated
/// author (`null` when the author no longer exists)
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Author {
    Id(Uuid),
    Populated(Option<UserResponse>),
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub description: String,
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub likes: BTreeSet<Uuid>,
    pub created_by: Author,
    pub updated_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostResponse {
    pub fn new(post: Post, config: &Config) -> Self {
        Self::with_author(post, Author::Id, config)
    }

    pub fn populated(post: Post, author: Option<User>, config: &Config) -> Self {
        let author = author.map(|u| UserResponse::new(u, config));
        Self::with_author(post, |_| Author::Populated(author), config)
    }

    fn with_author(post: Post, author: impl FnOnce(Uuid) -> Author, config: &Config) -> Self {
        Self {
            image_url: post.image.as_deref().map(|i| config.files_url_for(i)),
            id: post.id,
            description: post.description,
            image: post.image,
            likes: post.likes,
            created_by: author(post.created_by),
            updated_by: post.updated_by,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}
