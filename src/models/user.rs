// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

/// User document as stored.
///
/// Holds the password hash, so it never goes out over the wire directly;
/// responses use [`UserProfile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User ID (also used as document ID)
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Unique handle
    pub username: String,
    /// Unique email address
    pub email: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    /// Profile picture reference (empty if unset)
    #[serde(default)]
    pub profile_pic: String,
    #[serde(default)]
    pub bio: String,
    /// Users following this user
    #[serde(default)]
    pub followers: Vec<Uuid>,
    /// Users this user follows
    #[serde(default)]
    pub following: Vec<Uuid>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            username,
            email,
            password_hash,
            profile_pic: String::new(),
            bio: String::new(),
            followers: Vec::new(),
            following: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[cfg(test)]
    pub fn is_following(&self, other: Uuid) -> bool {
        self.following.contains(&other)
    }

    /// Flip whether this user follows `target`.
    ///
    /// Returns `true` if the user follows `target` afterwards.
    pub fn toggle_following(&mut self, target: Uuid) -> bool {
        toggle_membership(&mut self.following, target)
    }

    /// Make `follower`'s presence in this user's follower set match `present`.
    pub fn set_follower(&mut self, follower: Uuid, present: bool) {
        set_membership(&mut self.followers, follower, present);
    }
}

/// Public view of a user, without credential material.
///
/// This is the identity the session resolver attaches to requests and the
/// shape every user-returning endpoint responds with.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub profile_pic: String,
    pub bio: String,
    pub followers: Vec<Uuid>,
    pub following: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            email: user.email,
            profile_pic: user.profile_pic,
            bio: user.bio,
            followers: user.followers,
            following: user.following,
            created_at: user.created_at,
        }
    }
}

/// Add `id` if absent, remove it if present. Returns whether it is present afterwards.
pub(crate) fn toggle_membership(set: &mut Vec<Uuid>, id: Uuid) -> bool {
    if set.contains(&id) {
        set.retain(|existing| *existing != id);
        false
    } else {
        set.push(id);
        true
    }
}

pub(crate) fn set_membership(set: &mut Vec<Uuid>, id: Uuid, present: bool) {
    set.retain(|existing| *existing != id);
    if present {
        set.push(id);
    }
}
