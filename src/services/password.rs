// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password hashing (bcrypt).
//!
//! bcrypt is deliberately slow, so both directions run on the blocking
//! thread pool instead of the async workers.

use crate::error::{AppError, Result};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Valid bcrypt hash of a random string. Checked against when the user does
/// not exist, so unknown usernames cost the same as wrong passwords.
const DUMMY_HASH: &str = "$2b$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";

/// Hash `password` with a fresh salt at the given cost.
pub async fn hash_password(password: String, cost: u32) -> Result<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))
}

/// Check `password` against `hash`.
///
/// A missing hash always fails, after doing the same amount of work as a
/// real comparison.
pub async fn verify_password(password: String, hash: Option<String>) -> Result<bool> {
    let known = hash.is_some();
    let hash = hash.unwrap_or_else(|| DUMMY_HASH.to_string());

    let matched = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Verification task failed: {}", e)))?
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Stored password hash is malformed");
            false
        });

    Ok(known && matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("hunter22".to_string(), 4)
            .await
            .unwrap();

        assert_ne!(hash, "hunter22");
        assert!(verify_password("hunter22".to_string(), Some(hash.clone()))
            .await
            .unwrap());
        assert!(!verify_password("hunter23".to_string(), Some(hash))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_salt_differs_per_hash() {
        let a = hash_password("same-password".to_string(), 4).await.unwrap();
        let b = hash_password("same-password".to_string(), 4).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_missing_hash_never_matches() {
        assert!(!verify_password("anything".to_string(), None).await.unwrap());
    }
}
