use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::Instrument;

use super::state::AppState;
use crate::types::{RouteResponse, Severity};

const DEFAULT_LIST_LIMIT: usize = 50;
const MAX_LIST_LIMIT: usize = 1000;

/// POST /logs - Route one log event.
///
/// The body is parsed here rather than by the `Json` extractor so that
/// malformed JSON and a missing content type still get a `RouteResponse`.
pub async fn ingest(State(state): State<AppState>, body: Bytes) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("ingest", %request_id);

    let raw = match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(raw) => raw,
        Err(e) => {
            span.in_scope(|| tracing::warn!(error = %e, "Log event body is not JSON"));
            return reply(RouteResponse::rejected(format!("Invalid JSON body: {}", e)));
        }
    };

    match state.router.handle(&raw).instrument(span).await {
        Ok(response) => reply(response),
        Err(e) => e.into(),
    }
}

fn reply(response: RouteResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub severity: Option<String>,
    pub limit: Option<usize>,
}

/// GET /logs - Most recent stored records.
pub async fn list(State(state): State<AppState>, Query(params): Query<ListParams>) -> Response {
    let severity = match params.severity.as_deref().map(str::parse::<Severity>).transpose() {
        Ok(severity) => severity,
        Err(e) => return e.into(),
    };
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);

    match state.router.store().list(severity, limit).await {
        Ok(records) => Json(serde_json::json!({ "records": records })).into_response(),
        Err(e) => e.into(),
    }
}

/// GET /health - Backend status.
pub async fn health(State(state): State<AppState>) -> Response {
    let router = &state.router;
    let publisher_ok = match router.publisher().health().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!(error = %e, "Publisher health check failed");
            false
        }
    };

    let (status, label) = if publisher_ok {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    let body = serde_json::json!({
        "status": label,
        "publisher": router.publisher().name(),
        "store": router.store().name(),
        "alerts": router.alerts_enabled(),
    });
    (status, Json(body)).into_response()
}
