use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use threadline::models::Post;
use threadline::services::TokenService;
use uuid::Uuid;

fn benchmark_session_tokens(c: &mut Criterion) {
    let service = TokenService::new(b"bench_signing_key_32_bytes_long!", true);
    let user_id = Uuid::new_v4();
    let token = service.issue(user_id).expect("Failed to issue token");

    let mut group = c.benchmark_group("session_tokens");

    group.bench_function("issue", |b| b.iter(|| service.issue(black_box(user_id))));

    group.bench_function("verify", |b| b.iter(|| service.verify(black_box(&token))));

    group.finish();
}

fn benchmark_like_toggle(c: &mut Criterion) {
    // A popular post: toggling is a linear scan of the like list
    let mut post = Post::new(Uuid::new_v4(), "popular".to_string(), None);
    for _ in 0..10_000 {
        post.toggle_like(Uuid::new_v4());
    }
    let liker = Uuid::new_v4();

    c.bench_function("toggle_like_10k", |b| {
        b.iter(|| post.toggle_like(black_box(liker)))
    });
}

criterion_group!(benches, benchmark_session_tokens, benchmark_like_toggle);
criterion_main!(benches);
