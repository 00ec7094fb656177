//! Lambda-style entry point
//!
//! The invocation payload is the log record itself. API-gateway proxy
//! events, which carry the record as a JSON string under `body`, are
//! unwrapped first. Rejections are normal responses with `statusCode: 400`;
//! downstream failures fail the invocation.

use std::sync::Arc;

use lambda_runtime::{service_fn, Error, LambdaEvent};

use crate::router::SeverityRouter;
use crate::types::RouteResponse;

/// Handle one invocation
pub async fn handle_event(
    router: &SeverityRouter,
    event: LambdaEvent<serde_json::Value>,
) -> Result<RouteResponse, Error> {
    let (payload, context) = event.into_parts();
    let payload = unwrap_proxy_body(payload);

    tracing::info!(request_id = %context.request_id, "Log event received");

    router
        .handle(&payload)
        .await
        .map_err(|e| Error::from(e.to_string()))
}

/// Run the Lambda runtime loop until the runtime shuts down
pub async fn run(router: SeverityRouter) -> Result<(), Error> {
    let router = Arc::new(router);
    lambda_runtime::run(service_fn(move |event| {
        let router = Arc::clone(&router);
        async move { handle_event(&router, event).await }
    }))
    .await
}

/// Replace a proxy event with the JSON carried in its `body` string
fn unwrap_proxy_body(payload: serde_json::Value) -> serde_json::Value {
    if payload.get("log_level").is_some() {
        return payload;
    }
    match payload.get("body").and_then(|b| b.as_str()) {
        Some(body) => match serde_json::from_str(body) {
            Ok(inner) => inner,
            Err(e) => {
                tracing::warn!(error = %e, "Proxy body is not JSON");
                payload
            }
        },
        None => payload,
    }
}
