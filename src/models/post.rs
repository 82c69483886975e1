// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Post and reply models for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;

use crate::models::user::{set_membership, toggle_membership};

/// Maximum post length, in characters.
pub const MAX_POST_LENGTH: usize = 500;

/// Post document as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Post ID (also used as document ID)
    pub id: Uuid,
    /// Owning user
    pub posted_by: Uuid,
    pub text: String,
    /// Image reference, if any
    #[serde(default)]
    pub img: Option<String>,
    /// Users who liked this post
    #[serde(default)]
    pub likes: Vec<Uuid>,
    /// Replies in the order they were made
    #[serde(default)]
    pub replies: Vec<Reply>,
    /// Everyone with a reply on this post; lets profile edits find the
    /// snapshots they need to refresh.
    #[serde(default)]
    pub reply_user_ids: Vec<Uuid>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Reply embedded in a post.
///
/// `username` and `user_profile_pic` are a snapshot of the author taken when
/// the reply was written. They are rewritten when the author edits their
/// profile, not looked up on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct Reply {
    pub user_id: Uuid,
    pub text: String,
    pub username: String,
    #[serde(default)]
    pub user_profile_pic: String,
}

impl Post {
    pub fn new(posted_by: Uuid, text: String, img: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            posted_by,
            text,
            img: img.filter(|i| !i.is_empty()),
            likes: Vec::new(),
            replies: Vec::new(),
            reply_user_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[cfg(test)]
    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.likes.contains(&user_id)
    }

    /// Flip `user_id`'s like. Returns `true` if the post is liked afterwards.
    pub fn toggle_like(&mut self, user_id: Uuid) -> bool {
        toggle_membership(&mut self.likes, user_id)
    }

    pub fn add_reply(&mut self, reply: Reply) {
        set_membership(&mut self.reply_user_ids, reply.user_id, true);
        self.replies.push(reply);
    }

    /// Rewrite the author snapshot on every reply by `user_id`.
    ///
    /// Returns `true` if any reply changed.
    pub fn refresh_reply_snapshots(
        &mut self,
        user_id: Uuid,
        username: &str,
        profile_pic: &str,
    ) -> bool {
        let mut changed = false;
        for reply in self.replies.iter_mut().filter(|r| r.user_id == user_id) {
            if reply.username != username || reply.user_profile_pic != profile_pic {
                reply.username = username.to_string();
                reply.user_profile_pic = profile_pic.to_string();
                changed = true;
            }
        }
        changed
    }
}

/// Post as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct PostResponse {
    pub id: Uuid,
    pub posted_by: Uuid,
    pub text: String,
    pub img: Option<String>,
    pub likes: Vec<Uuid>,
    pub replies: Vec<Reply>,
    pub created_at: DateTime<Utc>,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            posted_by: post.posted_by,
            text: post.text,
            img: post.img,
            likes: post.likes,
            replies: post.replies,
            created_at: post.created_at,
        }
    }
}
