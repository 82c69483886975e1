// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod post;
pub mod user;

pub use post::{Post, PostResponse, Reply, MAX_POST_LENGTH};
pub use user::{User, UserProfile};
