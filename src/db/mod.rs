// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! [`Database`] is the handle the rest of the crate uses. It dispatches to
//! Firestore in production or to the in-process [`MemoryDb`] for local runs
//! and tests. Every operation is a single document read or write; nothing
//! here spans a transaction.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use self::memory::MemoryDb;

use crate::config::{Config, StorageBackend};
use crate::error::AppError;
use crate::models::{Post, User};
use uuid::Uuid;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const POSTS: &str = "posts";
}

/// Document store handle.
#[derive(Clone)]
pub enum Database {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl Database {
    /// Open the backend selected in `config`.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        match config.storage {
            StorageBackend::Firestore => Ok(Database::Firestore(
                FirestoreDb::new(&config.gcp_project_id).await?,
            )),
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Ok(Database::memory())
            }
        }
    }

    /// Fresh, empty in-memory store.
    pub fn memory() -> Self {
        Database::Memory(MemoryDb::new())
    }

    // ─── User Operations ─────────────────────────────────────────

    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        match self {
            Database::Firestore(db) => db.get_user(user_id).await,
            Database::Memory(db) => Ok(db.get_user(user_id)),
        }
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        match self {
            Database::Firestore(db) => db.get_user_by_username(username).await,
            Database::Memory(db) => Ok(db.get_user_by_username(username)),
        }
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        match self {
            Database::Firestore(db) => db.get_user_by_email(email).await,
            Database::Memory(db) => Ok(db.get_user_by_email(email)),
        }
    }

    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        match self {
            Database::Firestore(db) => db.upsert_user(user).await,
            Database::Memory(db) => {
                db.upsert_user(user);
                Ok(())
            }
        }
    }

    /// Remove a user document. No route deletes accounts; this exists for
    /// test fixtures that need a session whose user has gone away.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), AppError> {
        match self {
            Database::Firestore(db) => db.delete_user(user_id).await,
            Database::Memory(db) => {
                db.delete_user(user_id);
                Ok(())
            }
        }
    }

    // ─── Post Operations ─────────────────────────────────────────

    pub async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>, AppError> {
        match self {
            Database::Firestore(db) => db.get_post(post_id).await,
            Database::Memory(db) => Ok(db.get_post(post_id)),
        }
    }

    pub async fn upsert_post(&self, post: &Post) -> Result<(), AppError> {
        match self {
            Database::Firestore(db) => db.upsert_post(post).await,
            Database::Memory(db) => {
                db.upsert_post(post);
                Ok(())
            }
        }
    }

    pub async fn delete_post(&self, post_id: Uuid) -> Result<(), AppError> {
        match self {
            Database::Firestore(db) => db.delete_post(post_id).await,
            Database::Memory(db) => {
                db.delete_post(post_id);
                Ok(())
            }
        }
    }

    /// Posts owned by any of `authors`, newest first.
    pub async fn get_posts_by_authors(&self, authors: &[Uuid]) -> Result<Vec<Post>, AppError> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }

        let mut posts = match self {
            Database::Firestore(db) => db.get_posts_by_authors(authors).await?,
            Database::Memory(db) => db.get_posts_by_authors(authors),
        };
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    pub async fn get_posts_replied_by(&self, user_id: Uuid) -> Result<Vec<Post>, AppError> {
        match self {
            Database::Firestore(db) => db.get_posts_replied_by(user_id).await,
            Database::Memory(db) => Ok(db.get_posts_replied_by(user_id)),
        }
    }

    /// Rewrite the reply snapshots of `user` on every post they replied to.
    ///
    /// Each post is written independently; a failure part way through
    /// leaves earlier posts updated and later ones stale until the next
    /// profile edit. Returns the number of posts rewritten.
    pub async fn refresh_reply_snapshots(&self, user: &User) -> Result<usize, AppError> {
        let mut updated = 0;
        for mut post in self.get_posts_replied_by(user.id).await? {
            if post.refresh_reply_snapshots(user.id, &user.username, &user.profile_pic) {
                self.upsert_post(&post).await?;
                updated += 1;
            }
        }

        tracing::debug!(user_id = %user.id, updated, "Refreshed reply snapshots");
        Ok(updated)
    }
}
