// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod challenges;
pub mod goals;
pub mod password;
pub mod rewards;
pub mod stripe;

pub use stripe::StripeClient;
