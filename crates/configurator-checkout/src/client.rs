//! # Commerce Backend Client
//!
//! The seam between a finished configuration and the store's cart.
//!
//! ## Request / Response
//! ```text
//! POST {base_url}{add_path}            (default: /cart/add.js)
//! Content-Type: application/json
//!
//! { "items": [ { "id": 1, "quantity": 1, "properties": { ... } }, ... ] }
//!
//! 2xx            → accepted
//! 4xx            → CheckoutError::Rejected   (message from body)
//! 5xx            → CheckoutError::ServerError (message from body)
//!
//! Error bodies look like { "status": 422, "description": "...", "message": "..." };
//! `description` is preferred, then `message`, then the raw body.
//! ```

use async_trait::async_trait;
use configurator_core::CartPayload;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::config::BackendSettings;
use crate::error::{CheckoutError, CheckoutResult};

/// Longest raw body echoed back in an error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

// =============================================================================
// Backend Trait
// =============================================================================

/// Anything that can accept a cart submission.
#[async_trait]
pub trait CommerceBackend: Send + Sync {
    /// Adds every line of `payload` to the buyer's cart in one request.
    async fn add_to_cart(&self, payload: &CartPayload) -> CheckoutResult<()>;
}

// =============================================================================
// HTTP Implementation
// =============================================================================

/// `CommerceBackend` over a JSON POST to the storefront.
#[derive(Debug, Clone)]
pub struct HttpCommerceBackend {
    client: Client,
    add_url: Url,
}

impl HttpCommerceBackend {
    /// Builds a client for the configured endpoint.
    pub fn new(settings: &BackendSettings) -> CheckoutResult<Self> {
        let add_url = settings.add_url()?;
        let client = Client::builder()
            .user_agent(concat!("configurator/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout())
            .build()?;

        Ok(HttpCommerceBackend { client, add_url })
    }

    pub fn add_url(&self) -> &Url {
        &self.add_url
    }
}

#[async_trait]
impl CommerceBackend for HttpCommerceBackend {
    async fn add_to_cart(&self, payload: &CartPayload) -> CheckoutResult<()> {
        debug!(url = %self.add_url, items = payload.len(), "POST cart payload");

        let response = self
            .client
            .post(self.add_url.clone())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        warn!(status = status.as_u16(), %message, "Commerce backend refused cart");

        if status.is_server_error() {
            Err(CheckoutError::ServerError {
                status: status.as_u16(),
                message,
            })
        } else {
            Err(CheckoutError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Picks the most useful human-readable text out of an error body.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["description", "message"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                if !text.trim().is_empty() {
                    return text.trim().to_string();
                }
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::post;
    use axum::{Json, Router};
    use configurator_core::CartLineItem;
    use serde_json::{json, Value};

    /// In-process storefront: fails the first `failures` requests with
    /// `failure_status`, then accepts and records every body.
    #[derive(Clone, Default)]
    pub(crate) struct MockStore {
        pub received: Arc<Mutex<Vec<Value>>>,
        pub attempts: Arc<AtomicUsize>,
        pub failures: usize,
        pub failure_status: u16,
        pub failure_body: Value,
    }

    async fn add_handler(
        State(store): State<MockStore>,
        Json(body): Json<Value>,
    ) -> (AxumStatus, Json<Value>) {
        let attempt = store.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < store.failures {
            let status =
                AxumStatus::from_u16(store.failure_status).unwrap_or(AxumStatus::BAD_REQUEST);
            return (status, Json(store.failure_body.clone()));
        }
        store.received.lock().unwrap().push(body.clone());
        (AxumStatus::OK, Json(body))
    }

    /// Serves `store` on an ephemeral port and returns matching settings.
    pub(crate) async fn spawn_mock_store(store: MockStore) -> BackendSettings {
        let app = Router::new()
            .route("/cart/add.js", post(add_handler))
            .with_state(store);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        BackendSettings {
            base_url: format!("http://{}", addr),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    fn payload() -> CartPayload {
        CartPayload {
            items: vec![CartLineItem {
                id: 11,
                quantity: 2,
                properties: None,
            }],
        }
    }

    #[tokio::test]
    async fn test_successful_post_sends_items() {
        let store = MockStore::default();
        let settings = spawn_mock_store(store.clone()).await;
        let backend = HttpCommerceBackend::new(&settings).unwrap();

        backend.add_to_cart(&payload()).await.unwrap();

        let received = store.received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0], json!({ "items": [{ "id": 11, "quantity": 2 }] }));
    }

    #[tokio::test]
    async fn test_rejection_uses_description() {
        let store = MockStore {
            failures: 1,
            failure_status: 422,
            failure_body: json!({
                "status": 422,
                "message": "Cart Error",
                "description": "All 1 Solder PCB are in your cart."
            }),
            ..Default::default()
        };
        let settings = spawn_mock_store(store).await;
        let backend = HttpCommerceBackend::new(&settings).unwrap();

        let err = backend.add_to_cart(&payload()).await.unwrap_err();
        match err {
            CheckoutError::Rejected { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "All 1 Solder PCB are in your cart.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_retryable() {
        let store = MockStore {
            failures: 1,
            failure_status: 503,
            failure_body: json!({ "message": "Down for maintenance" }),
            ..Default::default()
        };
        let settings = spawn_mock_store(store).await;
        let backend = HttpCommerceBackend::new(&settings).unwrap();

        let err = backend.add_to_cart(&payload()).await.unwrap_err();
        assert!(matches!(err, CheckoutError::ServerError { status: 503, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let settings = BackendSettings {
            // Port 9 (discard) is closed on test machines.
            base_url: "http://127.0.0.1:9".into(),
            timeout_secs: 2,
            ..Default::default()
        };
        let backend = HttpCommerceBackend::new(&settings).unwrap();

        let err = backend.add_to_cart(&payload()).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message": "Bad quantity"}"#),
            "Bad quantity"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream died"),
            "upstream died"
        );
        assert_eq!(error_message(StatusCode::NOT_FOUND, ""), "Not Found");
    }
}
