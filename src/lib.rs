// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Threadline: a small social-media backend.
//!
//! This crate provides the JSON API for accounts, follows, posts, likes,
//! replies and a follow feed, authenticated with stateless JWT cookies.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::Database;
use services::TokenService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Self {
        let tokens = TokenService::new(&config.jwt_signing_key, config.secure_cookies());
        Self { config, db, tokens }
    }
}
