// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running and are skipped
//! when FIRESTORE_EMULATOR_HOST is not set.

use threadline::db::Database;
use threadline::models::{Post, Reply, User};
use uuid::Uuid;

mod common;
use common::test_db;

fn unique_user(prefix: &str) -> User {
    let tag = Uuid::new_v4().simple().to_string();
    User::new(
        format!("{prefix} Test"),
        format!("{prefix}_{tag}"),
        format!("{prefix}_{tag}@example.com"),
        "$2b$04$placeholderplaceholderplaceholderplaceholderplacehold".to_string(),
    )
}

#[tokio::test]
async fn test_user_roundtrip_and_lookup() {
    require_emulator!();
    let db = test_db().await;
    let user = unique_user("roundtrip");

    db.upsert_user(&user).await.unwrap();

    let by_id = db.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(by_id.username, user.username);

    let by_name = db
        .get_user_by_username(&user.username)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_name.id, user.id);

    let by_email = db.get_user_by_email(&user.email).await.unwrap().unwrap();
    assert_eq!(by_email.id, user.id);

    db.delete_user(user.id).await.unwrap();
    assert!(db.get_user(user.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_feed_query_across_authors() {
    require_emulator!();
    let db = Database::Firestore(test_db().await);
    let author = unique_user("author");
    let other = unique_user("other");

    let older = Post::new(author.id, "older".to_string(), None);
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let newer = Post::new(author.id, "newer".to_string(), None);
    let unrelated = Post::new(other.id, "unrelated".to_string(), None);
    for post in [&older, &newer, &unrelated] {
        db.upsert_post(post).await.unwrap();
    }

    let feed = db.get_posts_by_authors(&[author.id]).await.unwrap();
    let ids: Vec<Uuid> = feed.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);

    for post in [&older, &newer, &unrelated] {
        db.delete_post(post.id).await.unwrap();
    }
}

#[tokio::test]
async fn test_reply_snapshot_refresh() {
    require_emulator!();
    let db = Database::Firestore(test_db().await);
    let author = unique_user("poster");
    let mut replier = unique_user("replier");

    let mut post = Post::new(author.id, "question".to_string(), None);
    post.add_reply(Reply {
        user_id: replier.id,
        text: "answer".to_string(),
        username: replier.username.clone(),
        user_profile_pic: String::new(),
    });
    db.upsert_post(&post).await.unwrap();

    replier.profile_pic = "new.png".to_string();
    let updated = db.refresh_reply_snapshots(&replier).await.unwrap();
    assert_eq!(updated, 1);

    let stored = db.get_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored.replies[0].user_profile_pic, "new.png");

    db.delete_post(post.id).await.unwrap();
}
