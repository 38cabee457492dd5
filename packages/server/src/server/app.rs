//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::domains::reconciliation::Reconciler;
use crate::server::routes::{crm_webhook_handler, health_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub reconciler: Arc<Reconciler>,
    /// Expected `X-Webhook-Token`; webhooks are unauthenticated when unset.
    pub webhook_token: Option<String>,
}

/// Build the Axum application router
pub fn build_app(reconciler: Arc<Reconciler>, webhook_token: Option<String>) -> Router {
    let state = AppState {
        reconciler,
        webhook_token,
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/webhooks/crm", post(crm_webhook_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
