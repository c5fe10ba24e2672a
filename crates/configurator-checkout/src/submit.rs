//! # Configuration Submission
//!
//! Gate check, payload build and the (retried) POST, in that order.

use std::time::Duration;

use backoff::ExponentialBackoff;
use chrono::{DateTime, Utc};
use configurator_core::{CartPayload, Configurator, Money};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::client::CommerceBackend;
use crate::config::RetrySettings;
use crate::error::{CheckoutError, CheckoutResult};

/// What was handed to the commerce backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    /// Bundle id shared by every line of this configuration.
    pub bundle_id: String,
    pub item_count: usize,
    pub total_quantity: u64,
    pub total_price: Money,
    pub formatted_total: String,
    pub submitted_at: DateTime<Utc>,
}

/// Submits the current configuration to the cart.
///
/// ## Errors
/// - `NotReady` when the checkout gate is closed (nothing is sent)
/// - `Core` when the payload cannot be built
/// - Transport and backend errors from the last attempt
///
/// The configurator is only read; on any error its selections are unchanged.
pub async fn submit_configuration(
    configurator: &Configurator,
    backend: &dyn CommerceBackend,
    retry: &RetrySettings,
) -> CheckoutResult<SubmissionReceipt> {
    let snapshot = configurator.snapshot()?;
    if !snapshot.can_checkout {
        warn!(label = %snapshot.checkout_label, "Submission refused by checkout gate");
        return Err(CheckoutError::NotReady {
            label: snapshot.checkout_label,
        });
    }

    let (bundle_id, payload) = configurator.cart_payload()?;
    info!(
        bundle_id = %bundle_id,
        items = payload.len(),
        total = %snapshot.formatted_total,
        "Submitting configuration"
    );

    if let Err(e) = send_with_retry(backend, &payload, retry).await {
        error!(bundle_id = %bundle_id, error = %e, "Cart submission failed");
        return Err(e);
    }

    info!(bundle_id = %bundle_id, "Configuration added to cart");
    Ok(SubmissionReceipt {
        item_count: payload.len(),
        total_quantity: payload.total_quantity(),
        total_price: snapshot.total_price,
        formatted_total: snapshot.formatted_total,
        submitted_at: Utc::now(),
        bundle_id,
    })
}

/// Posts `payload`, retrying only errors marked retryable.
async fn send_with_retry(
    backend: &dyn CommerceBackend,
    payload: &CartPayload,
    retry: &RetrySettings,
) -> CheckoutResult<()> {
    let policy = create_backoff(retry);

    backoff::future::retry(policy, move || async move {
        backend.add_to_cart(payload).await.map_err(|e| {
            if e.is_retryable() {
                warn!(error = %e, "Transient submission failure, retrying");
                backoff::Error::transient(e)
            } else {
                backoff::Error::permanent(e)
            }
        })
    })
    .await
}

/// Creates the exponential backoff configuration.
fn create_backoff(retry: &RetrySettings) -> ExponentialBackoff {
    ExponentialBackoff {
        initial_interval: Duration::from_millis(retry.initial_backoff_ms),
        max_interval: Duration::from_millis(retry.max_backoff_ms),
        multiplier: 2.0,
        max_elapsed_time: Some(Duration::from_secs(retry.max_elapsed_secs)),
        ..Default::default()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
