// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Clarity: personal wellness tracking
//!
//! This crate provides the backend API for logging workouts, water intake,
//! meditation sessions and diary notes, tracking progress against goals,
//! gamified challenges and the Stripe-backed premium subscription.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::StripeClient;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub stripe: StripeClient,
}
