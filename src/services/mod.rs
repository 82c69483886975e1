// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - credential and session logic.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password, MIN_PASSWORD_LENGTH};
pub use token::{Claims, TokenService, SESSION_COOKIE, SESSION_TTL_DAYS};
