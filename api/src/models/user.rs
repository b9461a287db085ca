use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Unique handle used to log in
    pub user: String,
    pub biography: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    /// Stored filename inside the uploads directory
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, user: String, biography: String, hashed_password: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            user,
            biography,
            hashed_password,
            avatar: None,
            created_at: now,
            updated_at: now,
        }
    }
}
