// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT session middleware.

use crate::error::AppError;
use crate::models::UserProfile;
use crate::services::SESSION_COOKIE;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Authenticated user resolved from the session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: UserProfile,
}

/// Middleware that requires a valid session.
///
/// Rejects with 401 when the token is missing, fails verification, or names
/// a user that no longer exists. On success the caller's profile is stored
/// in request extensions as [`AuthUser`].
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = match jar.get(SESSION_COOKIE).map(|c| c.value()) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => {
            let auth_header = request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok());

            match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
                Some(token) => token.to_string(),
                None => return Err(AppError::Unauthorized),
            }
        }
    };

    let claims = state.tokens.verify(&token)?;
    let user_id = claims.user_id()?;

    let user = state.db.get_user(user_id).await?.ok_or_else(|| {
        tracing::warn!(user_id = %user_id, "Valid token for a user that no longer exists");
        AppError::Unauthorized
    })?;

    request.extensions_mut().insert(AuthUser {
        user: UserProfile::from(user),
    });

    Ok(next.run(request).await)
}
