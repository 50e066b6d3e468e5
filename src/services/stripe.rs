// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stripe API client and webhook signature verification.
//!
//! Handles:
//! - Checkout session creation for the premium subscription
//! - `Stripe-Signature` header verification for webhook events

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::collections::HashMap;
use subtle::ConstantTimeEq;

use crate::config::Config;
use crate::error::AppError;
use crate::models::User;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed webhook timestamp, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Event type that upgrades a user to premium.
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
    price_id: String,
    frontend_url: String,
}

impl StripeClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://api.stripe.com/v1".to_string(),
            secret_key: config.stripe_secret_key.clone(),
            price_id: config.stripe_price_id.clone(),
            frontend_url: config.frontend_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a subscription-mode Checkout session for `user`.
    ///
    /// The user id travels as `client_reference_id` and `metadata[userId]`
    /// so the completion webhook can find the account.
    pub async fn create_checkout_session(&self, user: &User) -> Result<CheckoutSession, AppError> {
        let url = format!("{}/checkout/sessions", self.base_url);
        let success_url = format!(
            "{}/subscription?status=success&session_id={{CHECKOUT_SESSION_ID}}",
            self.frontend_url
        );
        let cancel_url = format!("{}/subscription?status=cancelled", self.frontend_url);

        let mut form = vec![
            ("mode", "subscription".to_string()),
            ("line_items[0][price]", self.price_id.clone()),
            ("line_items[0][quantity]", "1".to_string()),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
            ("client_reference_id", user.id.clone()),
            ("metadata[userId]", user.id.clone()),
        ];
        match &user.stripe_customer_id {
            Some(customer) => form.push(("customer", customer.clone())),
            None => form.push(("customer_email", user.email.clone())),
        }

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Stripe(format!("Checkout request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Stripe(format!("HTTP {}: {}", status, body)));
        }

        let session: CheckoutSession = response
            .json()
            .await
            .map_err(|e| AppError::Stripe(format!("JSON parse error: {}", e)))?;

        tracing::info!(user_id = %user.id, session_id = %session.id, "Checkout session created");
        Ok(session)
    }
}

/// Checkout session as returned by Stripe (fields we use).
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

/// Webhook event envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

/// `checkout.session` object carried by a completion event.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletedCheckout {
    pub id: String,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CompletedCheckout {
    /// User id from metadata, falling back to `client_reference_id`.
    pub fn user_id(&self) -> Option<&str> {
        self.metadata
            .get("userId")
            .map(String::as_str)
            .or(self.client_reference_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

/// Why a webhook signature was rejected.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("malformed Stripe-Signature header")]
    Malformed,
    #[error("timestamp outside tolerance")]
    Expired,
    #[error("no matching v1 signature")]
    Mismatch,
}

fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::Malformed)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Compute a `Stripe-Signature` header value for `payload`.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, SignatureError> {
    Ok(format!(
        "t={},v1={}",
        timestamp,
        hex::encode(sign(secret, timestamp, payload)?)
    ))
}

/// Verify a `Stripe-Signature` header (`t=...,v1=...[,v1=...]`).
///
/// Any `v1` entry matching HMAC-SHA256(secret, "{t}.{payload}") is accepted,
/// provided `t` is within [`SIGNATURE_TOLERANCE_SECS`] of `now`.
pub fn verify_webhook_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<Vec<u8>> = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => {
                if let Ok(sig) = hex::decode(value) {
                    signatures.push(sig);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    if signatures.is_empty() {
        return Err(SignatureError::Malformed);
    }
    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(SignatureError::Expired);
    }

    let expected = sign(secret, timestamp, payload)?;
    if signatures
        .iter()
        .any(|sig| bool::from(sig.as_slice().ct_eq(expected.as_slice())))
    {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}
