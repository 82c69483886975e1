// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store.
//!
//! Mirrors the Firestore collections with one `DashMap` per collection.
//! Documents are cloned in and out, so no shard lock is ever held across
//! an `.await` by a caller.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::models::{Post, User};

/// Memory-backed store. Cheap to clone; clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryDb {
    users: Arc<DashMap<Uuid, User>>,
    posts: Arc<DashMap<Uuid, Post>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── User Operations ─────────────────────────────────────────

    pub fn get_user(&self, user_id: Uuid) -> Option<User> {
        self.users.get(&user_id).map(|u| u.value().clone())
    }

    pub fn get_user_by_username(&self, username: &str) -> Option<User> {
        self.users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.value().clone())
    }

    pub fn get_user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.value().clone())
    }

    pub fn upsert_user(&self, user: &User) {
        self.users.insert(user.id, user.clone());
    }

    pub fn delete_user(&self, user_id: Uuid) {
        self.users.remove(&user_id);
    }

    // ─── Post Operations ─────────────────────────────────────────

    pub fn get_post(&self, post_id: Uuid) -> Option<Post> {
        self.posts.get(&post_id).map(|p| p.value().clone())
    }

    pub fn upsert_post(&self, post: &Post) {
        self.posts.insert(post.id, post.clone());
    }

    pub fn delete_post(&self, post_id: Uuid) {
        self.posts.remove(&post_id);
    }

    pub fn get_posts_by_authors(&self, authors: &[Uuid]) -> Vec<Post> {
        self.posts
            .iter()
            .filter(|p| authors.contains(&p.posted_by))
            .map(|p| p.value().clone())
            .collect()
    }

    pub fn get_posts_replied_by(&self, user_id: Uuid) -> Vec<Post> {
        self.posts
            .iter()
            .filter(|p| p.reply_user_ids.contains(&user_id))
            .map(|p| p.value().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_documents() {
        let db = MemoryDb::new();
        let other = db.clone();
        let user = User::new(
            "Ann".to_string(),
            "ann".to_string(),
            "ann@example.com".to_string(),
            "hash".to_string(),
        );

        db.upsert_user(&user);

        assert_eq!(other.get_user(user.id).unwrap().username, "ann");
        assert_eq!(other.get_user_by_email("ann@example.com").unwrap().id, user.id);
        assert!(other.get_user_by_username("Ann").is_none());
    }

    #[test]
    fn test_posts_by_authors_filters_owner() {
        let db = MemoryDb::new();
        let ann = Uuid::new_v4();
        let ben = Uuid::new_v4();
        db.upsert_post(&Post::new(ann, "from ann".to_string(), None));
        db.upsert_post(&Post::new(ben, "from ben".to_string(), None));

        let posts = db.get_posts_by_authors(&[ann]);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].posted_by, ann);
        assert!(db.get_posts_by_authors(&[]).is_empty());
    }
}
