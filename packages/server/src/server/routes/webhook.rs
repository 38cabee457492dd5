//! CRM webhook ingestion.
//!
//! The CRM retries anything that is not a 2xx, so every well-authenticated
//! request gets 200 with an empty body. Reconciliation runs in the background
//! and its failures are only logged.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use chrono::Utc;

use crate::domains::reconciliation::CrmEvent;
use crate::server::app::AppState;

pub const WEBHOOK_TOKEN_HEADER: &str = "x-webhook-token";

pub async fn crm_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(expected) = &state.webhook_token {
        let provided = headers
            .get(WEBHOOK_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());
        if provided != Some(expected.as_str()) {
            tracing::warn!("Rejected CRM webhook with missing or wrong token");
            return StatusCode::UNAUTHORIZED;
        }
    }

    let event: CrmEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring CRM webhook with unreadable body");
            return StatusCode::OK;
        }
    };

    let reconciler = state.reconciler.clone();
    tokio::spawn(async move {
        match reconciler.handle_event(&event, Utc::now()).await {
            Ok(Some(report)) => tracing::debug!(
                run_id = %report.run_id,
                warnings = report.warning_count(),
                "Webhook reconciliation finished"
            ),
            Ok(None) => {}
            Err(e) => tracing::error!(
                kind = ?event.kind,
                error = %e,
                "Webhook reconciliation failed"
            ),
        }
    });

    StatusCode::OK
}
