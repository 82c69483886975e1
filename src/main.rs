// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Threadline API Server
//!
//! Accounts, follows, posts and a follow feed behind cookie sessions.

use std::sync::Arc;
use threadline::{config::Config, db::Database, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        storage = ?config.storage,
        "Starting Threadline API"
    );

    let db = Database::connect(&config).await?;

    let port = config.port;
    let state = Arc::new(AppState::new(config, db));

    // Build router
    let app = threadline::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("threadline=debug,info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
