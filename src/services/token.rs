// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying the user ID as `sub`. They are stateless:
//! the server keeps no session table, so a token stays valid until it
//! expires even after the client logs out.

use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "jwt";

/// Session lifetime.
pub const SESSION_TTL_DAYS: i64 = 15;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::InvalidToken)
    }
}

/// Issues and checks session tokens with the server secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    secure_cookies: bool,
}

impl TokenService {
    pub fn new(signing_key: &[u8], secure_cookies: bool) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(signing_key),
            decoding_key: DecodingKey::from_secret(signing_key),
            secure_cookies,
        }
    }

    /// Create a token for `user_id` expiring [`SESSION_TTL_DAYS`] from now.
    pub fn issue(&self, user_id: Uuid) -> Result<String> {
        self.issue_at(user_id, chrono::Utc::now())
    }

    /// Create a token as if issued at `issued_at`.
    pub fn issue_at(&self, user_id: Uuid, issued_at: chrono::DateTime<chrono::Utc>) -> Result<String> {
        let iat = issued_at.timestamp();
        let exp = (issued_at + chrono::Duration::days(SESSION_TTL_DAYS)).timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            iat: iat.max(0) as usize,
            exp: exp.max(0) as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))
    }

    /// Check signature and expiry. Expiry is exact, with no clock leeway.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::warn!(error = %e, "Rejected session token");
                AppError::InvalidToken
            })
    }

    /// Cookie carrying a freshly issued token.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.secure_cookies)
            .max_age(time::Duration::days(SESSION_TTL_DAYS))
            .build()
    }

    /// Cookie that overwrites the session cookie with an empty, already
    /// expired value. The token itself is not revoked.
    pub fn cleared_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.secure_cookies)
            .max_age(time::Duration::ZERO)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

    #[test]
    fn test_issue_verify_roundtrip() {
        let service = TokenService::new(KEY, false);
        let user_id = Uuid::new_v4();

        let token = service.issue(user_id).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(
            claims.exp - claims.iat,
            (SESSION_TTL_DAYS * 24 * 60 * 60) as usize
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = TokenService::new(KEY, false);
        let issued = chrono::Utc::now() - chrono::Duration::days(SESSION_TTL_DAYS + 1);
        let token = service.issue_at(Uuid::new_v4(), issued).unwrap();

        assert!(matches!(service.verify(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_token_rejected_just_after_expiry() {
        let service = TokenService::new(KEY, false);
        let issued = chrono::Utc::now()
            - chrono::Duration::days(SESSION_TTL_DAYS)
            - chrono::Duration::seconds(5);
        let token = service.issue_at(Uuid::new_v4(), issued).unwrap();

        assert!(matches!(service.verify(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_token_from_other_key_rejected() {
        let issuer = TokenService::new(b"another_key_that_is_long_enough!", false);
        let verifier = TokenService::new(KEY, false);
        let token = issuer.issue(Uuid::new_v4()).unwrap();

        assert!(matches!(verifier.verify(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let service = TokenService::new(KEY, false);
        let cookie = service.session_cookie("abc".to_string()).to_string();

        assert!(cookie.starts_with("jwt=abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=1296000"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_cleared_cookie_attributes() {
        let service = TokenService::new(KEY, true);
        let cookie = service.cleared_cookie().to_string();

        assert!(cookie.starts_with("jwt=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("Secure"));
    }
}
