// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profiles, credentials, follow sets)
//! - Posts (with embedded likes and replies)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Post, User};
use futures_util::{stream, StreamExt};
use uuid::Uuid;

const MAX_CONCURRENT_DB_OPS: usize = 50;
// Firestore caps `in` filters at 30 values.
const IN_FILTER_LIMIT: usize = 30;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: firestore::FirestoreDb,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by ID.
    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(&user_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the user with an exact username match.
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.find_user_by_field("username", username).await
    }

    /// Find the user with an exact email match.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.find_user_by_field("email", email).await
    }

    async fn find_user_by_field(&self, field: &str, value: &str) -> Result<Option<User>, AppError> {
        let users: Vec<User> = self
            .client
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.for_all([q.field(field).eq(value)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(user.id.to_string())
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a user document. Posts are left in place.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), AppError> {
        self.client
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(user_id.to_string())
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Post Operations ─────────────────────────────────────────

    /// Get a post by ID.
    pub async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::POSTS)
            .obj()
            .one(&post_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or replace a post.
    pub async fn upsert_post(&self, post: &Post) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::POSTS)
            .document_id(post.id.to_string())
            .object(post)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a post.
    pub async fn delete_post(&self, post_id: Uuid) -> Result<(), AppError> {
        self.client
            .fluent()
            .delete()
            .from(collections::POSTS)
            .document_id(post_id.to_string())
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get every post owned by any of `authors`.
    ///
    /// Queries run in chunks to stay under the `in` filter limit; the
    /// result is unordered.
    pub async fn get_posts_by_authors(&self, authors: &[Uuid]) -> Result<Vec<Post>, AppError> {
        let chunks: Vec<Vec<String>> = authors
            .chunks(IN_FILTER_LIMIT)
            .map(|chunk| chunk.iter().map(Uuid::to_string).collect())
            .collect();

        let client = &self.client;
        let results = stream::iter(chunks)
            .map(|chunk| async move {
                client
                    .fluent()
                    .select()
                    .from(collections::POSTS)
                    .filter(move |q| q.for_all([q.field("posted_by").is_in(chunk.clone())]))
                    .obj::<Post>()
                    .query()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<Vec<Post>, AppError>>>()
            .await;

        let mut posts = Vec::new();
        for result in results {
            posts.extend(result?);
        }
        Ok(posts)
    }

    /// Get every post carrying at least one reply by `user_id`.
    pub async fn get_posts_replied_by(&self, user_id: Uuid) -> Result<Vec<Post>, AppError> {
        let user_id = user_id.to_string();
        self.client
            .fluent()
            .select()
            .from(collections::POSTS)
            .filter(move |q| {
                q.for_all([q.field("reply_user_ids").array_contains(user_id.clone())])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
