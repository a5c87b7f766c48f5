use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::app::errors;
use crate::app::services::AppServices;

/// Liveness plus a store ping.
pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.invoices.health().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(e) => {
            error!(error = %e, "health check failed");
            errors::json_error(StatusCode::SERVICE_UNAVAILABLE, e.code(), "store unreachable")
        }
    }
}
