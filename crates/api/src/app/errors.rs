use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{debug, error};

use invoicer_core::InvoiceError;

/// `{ "error": { "code": ..., "message": ... } }`
pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": {
                "code": code,
                "message": message.into(),
            }
        })),
    )
        .into_response()
}

pub fn status_for(err: &InvoiceError) -> StatusCode {
    match err {
        InvoiceError::Validation(_) | InvoiceError::ForeignKeyViolation(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        InvoiceError::UniqueViolation(_) => StatusCode::CONFLICT,
        InvoiceError::InvalidLiteral(_) | InvoiceError::NotNull(_) => StatusCode::BAD_REQUEST,
        InvoiceError::NotFound => StatusCode::NOT_FOUND,
        InvoiceError::Storage(_) | InvoiceError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a service error to its HTTP response. Server-side details are logged,
/// not returned.
pub fn invoice_error_to_response(err: InvoiceError) -> Response {
    let status = status_for(&err);
    let message = match &err {
        InvoiceError::NotFound => "invoice not found".to_string(),
        InvoiceError::Storage(_) => "internal database error".to_string(),
        InvoiceError::Config(_) => "server is misconfigured".to_string(),
        other => other.to_string(),
    };

    if status.is_server_error() {
        error!(code = err.code(), error = %err, "request failed");
    } else {
        debug!(code = err.code(), error = %err, "request rejected");
    }
    json_error(status, err.code(), message)
}

/// Unreadable request bodies are reported like any other bad literal.
pub fn json_rejection_to_response(rejection: JsonRejection) -> Response {
    invoice_error_to_response(InvoiceError::invalid_literal(rejection.body_text()))
}
