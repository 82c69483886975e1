// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The JWT secret is supplied out-of-band (environment or `.env` file) and
//! held in memory for the life of the process.

use std::env;

/// bcrypt cost used for stored passwords.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Where user and post documents live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Google Cloud Firestore (or its emulator).
    Firestore,
    /// Process-local store, lost on restart.
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StorageBackend::Firestore),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::Invalid("STORAGE_BACKEND", other.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend origin (CORS, and whether cookies are marked Secure)
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Document store backend
    pub storage: StorageBackend,
    /// bcrypt work factor for password hashes
    pub bcrypt_cost: u32,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 5000,
            storage: StorageBackend::Memory,
            // Minimum bcrypt cost keeps test suites fast.
            bcrypt_cost: 4,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let jwt_signing_key = env::var("JWT_SECRET")
            .map_err(|_| ConfigError::Missing("JWT_SECRET"))?
            .trim()
            .to_string();
        if jwt_signing_key.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }

        let storage = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::Firestore,
        };

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
            storage,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            jwt_signing_key: jwt_signing_key.into_bytes(),
        })
    }

    /// Whether session cookies must carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.frontend_url.starts_with("https://")
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SECRET", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("STORAGE_BACKEND", "memory");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.jwt_signing_key, b"test_jwt_key_32_bytes_minimum!!");
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.bcrypt_cost, DEFAULT_BCRYPT_COST);
    }

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!(
            "Firestore".parse::<StorageBackend>().unwrap(),
            StorageBackend::Firestore
        );
        assert!("mongodb".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_secure_cookies_follow_frontend_scheme() {
        let mut config = Config::default();
        assert!(!config.secure_cookies());

        config.frontend_url = "https://threads.example.com".to_string();
        assert!(config.secure_cookies());
    }
}
