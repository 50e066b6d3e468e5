// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Clarity API Server
//!
//! Wellness tracking backend: entries, goals, challenges and premium
//! subscriptions on top of Firestore.

use clarity::{config::Config, db::FirestoreDb, services::StripeClient, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Clarity API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id).await?;

    let stripe = StripeClient::new(&config);
    tracing::info!(price_id = %config.stripe_price_id, "Stripe client initialized");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        stripe,
    });

    // Build router
    let app = clarity::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clarity=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
