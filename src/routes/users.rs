// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account routes: signup, login, logout, profiles, follows.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{User, UserProfile};
use crate::routes::{parse_id, MessageResponse};
use crate::services::{hash_password, verify_password, MIN_PASSWORD_LENGTH};
use crate::AppState;

/// Routes reachable without a session.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/signup", post(signup))
        .route("/api/users/login", post(login))
        .route("/api/users/logout", post(logout))
        .route("/api/users/profile/{username}", get(get_profile_by_username))
        .route("/api/users/profile/id/{id}", get(get_profile_by_id))
}

/// Routes that need a session.
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/follow/{id}", post(follow_unfollow))
        .route("/api/users/update/{id}", put(update_user))
}

// ─── Signup / Login / Logout ─────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct SignupRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "email is required"))]
    email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "username is required"))]
    username: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    password: String,
}

/// Create an account and start a session.
async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(req), _): WithRejection<Json<SignupRequest>, AppError>,
) -> Result<(StatusCode, CookieJar, Json<UserProfile>)> {
    req.validate()?;

    let email_taken = state.db.get_user_by_email(&req.email).await?.is_some();
    if email_taken || state.db.get_user_by_username(&req.username).await?.is_some() {
        tracing::info!(username = %req.username, "Signup rejected: account exists");
        return Err(AppError::BadRequest("User already exists".to_string()));
    }

    let password_hash = hash_password(req.password, state.config.bcrypt_cost).await?;
    let user = User::new(req.name, req.username, req.email, password_hash);
    state.db.upsert_user(&user).await?;

    let token = state.tokens.issue(user.id)?;
    tracing::info!(user_id = %user.id, username = %user.username, "User signed up");

    Ok((
        StatusCode::CREATED,
        jar.add(state.tokens.session_cookie(token)),
        Json(UserProfile::from(user)),
    ))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Check credentials and start a session.
///
/// Unknown usernames and wrong passwords produce the same response.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<(CookieJar, Json<UserProfile>)> {
    let user = state.db.get_user_by_username(&req.username).await?;
    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());

    let password_ok = verify_password(req.password, stored_hash).await?;
    let user = match user {
        Some(user) if password_ok => user,
        _ => {
            tracing::info!(username = %req.username, "Login rejected");
            return Err(AppError::InvalidCredentials);
        }
    };

    let token = state.tokens.issue(user.id)?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok((
        jar.add(state.tokens.session_cookie(token)),
        Json(UserProfile::from(user)),
    ))
}

/// End the session on this client.
///
/// Only the cookie is cleared; the token itself stays valid until expiry.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    (
        jar.add(state.tokens.cleared_cookie()),
        MessageResponse::new("User logged out successfully"),
    )
}

// ─── Profiles ────────────────────────────────────────────────

async fn get_profile_by_username(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>> {
    let user = state
        .db
        .get_user_by_username(&username)
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Json(UserProfile::from(user)))
}

async fn get_profile_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserProfile>> {
    let user_id = parse_id(&id, user_not_found)?;
    let user = state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(user_not_found)?;

    Ok(Json(UserProfile::from(user)))
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

// ─── Follow / Unfollow ───────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct FollowResponse {
    pub message: String,
    /// Whether the caller follows the target after this request
    pub following: bool,
}

/// Toggle whether the caller follows `id`.
///
/// The caller's `following` and the target's `followers` are two separate
/// writes. A failure between them leaves the relationship one-sided until
/// the next toggle repairs it.
async fn follow_unfollow(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<FollowResponse>> {
    let not_found = || AppError::BadRequest("User not found".to_string());

    let target_id = parse_id(&id, not_found)?;
    if target_id == auth.user.id {
        return Err(AppError::BadRequest(
            "You cannot follow/unfollow yourself".to_string(),
        ));
    }

    let mut target = state.db.get_user(target_id).await?.ok_or_else(not_found)?;
    let mut current = state
        .db
        .get_user(auth.user.id)
        .await?
        .ok_or_else(not_found)?;

    let following = current.toggle_following(target.id);
    target.set_follower(current.id, following);

    state.db.upsert_user(&current).await?;
    state.db.upsert_user(&target).await?;

    tracing::info!(
        user_id = %current.id,
        target_id = %target.id,
        following,
        "Follow state changed"
    );

    let message = if following {
        "User followed successfully"
    } else {
        "User unfollowed successfully"
    };

    Ok(Json(FollowResponse {
        message: message.to_string(),
        following,
    }))
}

// ─── Profile Update ──────────────────────────────────────────

/// Profile edit. Absent or empty fields keep their current value.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUserRequest {
    name: Option<String>,
    email: Option<String>,
    username: Option<String>,
    password: Option<String>,
    bio: Option<String>,
    profile_pic: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Update the caller's own profile.
///
/// Reply snapshots on existing posts are refreshed afterwards. That pass is
/// best effort: if it fails the profile change still stands and the
/// snapshots catch up on the next edit.
async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateUserRequest>, AppError>,
) -> Result<Json<UserProfile>> {
    let mut user = state
        .db
        .get_user(auth.user.id)
        .await?
        .ok_or_else(|| AppError::BadRequest("User not found".to_string()))?;

    if Uuid::parse_str(&id).ok() != Some(user.id) {
        tracing::warn!(user_id = %user.id, target = %id, "Attempt to edit another profile");
        return Err(AppError::BadRequest(
            "You cannot update other user's profile".to_string(),
        ));
    }

    if let Some(password) = non_empty(req.password) {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::BadRequest(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        user.password_hash = hash_password(password, state.config.bcrypt_cost).await?;
    }

    if let Some(username) = non_empty(req.username) {
        if username != user.username {
            ensure_unclaimed(state.db.get_user_by_username(&username).await?, user.id, "Username")?;
            user.username = username;
        }
    }

    if let Some(email) = non_empty(req.email) {
        if email != user.email {
            ensure_unclaimed(state.db.get_user_by_email(&email).await?, user.id, "Email")?;
            user.email = email;
        }
    }

    if let Some(name) = non_empty(req.name) {
        user.name = name;
    }
    if let Some(bio) = non_empty(req.bio) {
        user.bio = bio;
    }
    if let Some(profile_pic) = non_empty(req.profile_pic) {
        user.profile_pic = profile_pic;
    }

    user.updated_at = chrono::Utc::now();
    state.db.upsert_user(&user).await?;
    tracing::info!(user_id = %user.id, "Profile updated");

    if let Err(e) = state.db.refresh_reply_snapshots(&user).await {
        tracing::warn!(user_id = %user.id, error = %e, "Failed to refresh reply snapshots");
    }

    Ok(Json(UserProfile::from(user)))
}

/// Fail if `existing` belongs to someone other than `owner`.
fn ensure_unclaimed(existing: Option<User>, owner: Uuid, what: &str) -> Result<()> {
    match existing {
        Some(other) if other.id != owner => {
            Err(AppError::BadRequest(format!("{what} already taken")))
        }
        _ => Ok(()),
    }
}
