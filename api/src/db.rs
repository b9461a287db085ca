use crate::models::{Post, User};
use chrono::Utc;
use dashmap::{DashMap, mapref::entry::Entry};
use std::sync::Arc;
use uuid::Uuid;

/// Returned by [`Db::insert_user`] when the handle already belongs to someone
#[derive(Debug, PartialEq, Eq)]
pub struct HandleTaken;

/// In-memory document store
///
/// Every operation touches a single document. `DashMap` shards its locks, so
/// readers and writers of different documents never block each other. Refs
/// returned by `get` are never held across a second call into the same map.
#[derive(Clone, Default)]
pub struct Db {
    users: Arc<DashMap<Uuid, User>>,
    posts: Arc<DashMap<Uuid, Post>>,
    handle_index: Arc<DashMap<String, Uuid>>, // Quick lookup by handle
}

impl Db {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- users ------------------------------------------------------------

    pub fn insert_user(&self, user: User) -> Result<User, HandleTaken> {
        match self.handle_index.entry(user.user.clone()) {
            Entry::Occupied(_) => Err(HandleTaken),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
                self.users.insert(user.id, user.clone());
                Ok(user)
            }
        }
    }

    pub fn find_user(&self, id: &Uuid) -> Option<User> {
        self.users.get(id).map(|u| u.clone())
    }

    pub fn find_user_by_handle(&self, handle: &str) -> Option<User> {
        let id = *self.handle_index.get(handle)?;
        self.find_user(&id)
    }

    /// Every user except `id`, oldest account first
    pub fn list_users_except(&self, id: &Uuid) -> Vec<User> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|entry| entry.key() != id)
            .map(|entry| entry.value().clone())
            .collect();

        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        users
    }

    /// Apply `f` to the stored user and bump `updated_at`
    pub fn update_user(&self, id: &Uuid, f: impl FnOnce(&mut User)) -> Option<User> {
        let mut user = self.users.get_mut(id)?;
        f(&mut *user);
        user.updated_at = Utc::now();
        Some(user.clone())
    }

    /// Remove a user and free its handle. Posts referencing it are left as is.
    pub fn delete_user(&self, id: &Uuid) -> Option<User> {
        let (_, user) = self.users.remove(id)?;
        self.handle_index
            .remove_if(&user.user, |_, owner| *owner == user.id);
        Some(user)
    }

    // ---- posts ------------------------------------------------------------

    pub fn insert_post(&self, post: Post) -> Post {
        self.posts.insert(post.id, post.clone());
        post
    }

    pub fn find_post(&self, id: &Uuid) -> Option<Post> {
        self.posts.get(id).map(|p| p.clone())
    }

    /// Newest first. With `liked_by`, only posts that user liked.
    pub fn list_posts(&self, liked_by: Option<&Uuid>) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|entry| liked_by.is_none_or(|u| entry.likes.contains(u)))
            .map(|entry| entry.value().clone())
            .collect();

        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }

    pub fn update_post(&self, id: &Uuid, f: impl FnOnce(&mut Post)) -> Option<Post> {
        let mut post = self.posts.get_mut(id)?;
        f(&mut *post);
        post.updated_at = Utc::now();
        Some(post.clone())
    }

    /// Add or remove `user_id` from the likes of a post. Returns `None` when
    /// the post does not exist. Does not touch `updated_at`.
    pub fn set_like(&self, post_id: &Uuid, user_id: Uuid, liked: bool) -> Option<()> {
        let mut post = self.posts.get_mut(post_id)?;
        if liked {
            post.likes.insert(user_id);
        } else {
            post.likes.remove(&user_id);
        }
        Some(())
    }

    pub fn delete_post(&self, id: &Uuid) -> Option<Post> {
        self.posts.remove(id).map(|(_, post)| post)
    }
}
