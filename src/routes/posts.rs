// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Post routes: create, read, delete, likes, replies and the follow feed.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Post, PostResponse, Reply, MAX_POST_LENGTH};
use crate::routes::{parse_id, MessageResponse};
use crate::AppState;

/// Routes reachable without a session.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/posts/{id}", get(get_post))
}

/// Routes that need a session.
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/posts/create", post(create_post))
        .route("/api/posts/feed", get(get_feed))
        .route("/api/posts/{id}", axum::routing::delete(delete_post))
        .route("/api/posts/like/{id}", put(like_unlike_post))
        .route("/api/posts/reply/{id}", put(reply_to_post))
}

fn post_not_found() -> AppError {
    AppError::NotFound("Post not found".to_string())
}

async fn load_post(state: &AppState, raw_id: &str) -> Result<Post> {
    let post_id = parse_id(raw_id, post_not_found)?;
    state.db.get_post(post_id).await?.ok_or_else(post_not_found)
}

// ─── Create ──────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatePostRequest {
    posted_by: Option<String>,
    text: Option<String>,
    img: Option<String>,
}

/// Create a post owned by the caller.
///
/// `postedBy` is checked against the session, so a client can only post as
/// itself.
async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    WithRejection(Json(req), _): WithRejection<Json<CreatePostRequest>, AppError>,
) -> Result<(StatusCode, Json<PostResponse>)> {
    let (posted_by, text) = match (req.posted_by, req.text) {
        (Some(posted_by), Some(text)) if !posted_by.is_empty() && !text.is_empty() => {
            (posted_by, text)
        }
        _ => {
            return Err(AppError::BadRequest(
                "postedBy and text fields are required".to_string(),
            ))
        }
    };

    let user_not_found = || AppError::NotFound("User not found".to_string());
    let owner_id = parse_id(&posted_by, user_not_found)?;
    let owner = state
        .db
        .get_user(owner_id)
        .await?
        .ok_or_else(user_not_found)?;

    if owner.id != auth.user.id {
        tracing::warn!(
            user_id = %auth.user.id,
            posted_by = %owner.id,
            "Attempt to post as another user"
        );
        return Err(AppError::NotOwner("Unauthorized to create post".to_string()));
    }

    if text.chars().count() > MAX_POST_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Text must be at most {MAX_POST_LENGTH} characters"
        )));
    }

    let post = Post::new(owner.id, text, req.img);
    state.db.upsert_post(&post).await?;
    tracing::info!(post_id = %post.id, user_id = %owner.id, "Post created");

    Ok((StatusCode::CREATED, Json(PostResponse::from(post))))
}

// ─── Read / Delete ───────────────────────────────────────────

async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PostResponse>> {
    let post = load_post(&state, &id).await?;
    Ok(Json(PostResponse::from(post)))
}

/// Delete a post. Only its owner may do so.
async fn delete_post(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let post = load_post(&state, &id).await?;

    if post.posted_by != auth.user.id {
        tracing::warn!(
            user_id = %auth.user.id,
            post_id = %post.id,
            "Attempt to delete another user's post"
        );
        return Err(AppError::NotOwner("Unauthorized to delete post".to_string()));
    }

    state.db.delete_post(post.id).await?;
    tracing::info!(post_id = %post.id, "Post deleted");

    Ok(MessageResponse::new("Post deleted successfully"))
}

// ─── Likes ───────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct LikeResponse {
    pub message: String,
    /// Whether the caller likes the post after this request
    pub liked: bool,
    /// Like count after this request
    pub likes: usize,
}

/// Toggle the caller's like. Any signed-in user may like any post.
async fn like_unlike_post(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<LikeResponse>> {
    let mut post = load_post(&state, &id).await?;

    let liked = post.toggle_like(auth.user.id);
    state.db.upsert_post(&post).await?;

    tracing::debug!(post_id = %post.id, user_id = %auth.user.id, liked, "Like toggled");

    let message = if liked {
        "Post liked successfully"
    } else {
        "Post unliked successfully"
    };

    Ok(Json(LikeResponse {
        message: message.to_string(),
        liked,
        likes: post.likes.len(),
    }))
}

// ─── Replies ─────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ReplyRequest {
    text: Option<String>,
}

/// Append a reply carrying a snapshot of the caller's username and picture.
async fn reply_to_post(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<ReplyRequest>, AppError>,
) -> Result<Json<Reply>> {
    let text = req
        .text
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Text field is required".to_string()))?;

    let mut post = load_post(&state, &id).await?;

    let reply = Reply {
        user_id: auth.user.id,
        text,
        username: auth.user.username.clone(),
        user_profile_pic: auth.user.profile_pic.clone(),
    };
    post.add_reply(reply.clone());
    state.db.upsert_post(&post).await?;

    tracing::debug!(post_id = %post.id, user_id = %auth.user.id, "Reply added");

    Ok(Json(reply))
}

// ─── Feed ────────────────────────────────────────────────────

/// Posts from everyone the caller follows, newest first.
async fn get_feed(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<PostResponse>>> {
    let posts = state.db.get_posts_by_authors(&auth.user.following).await?;

    tracing::debug!(
        user_id = %auth.user.id,
        following = auth.user.following.len(),
        posts = posts.len(),
        "Feed assembled"
    );

    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}
