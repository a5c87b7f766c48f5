use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use invoicer_core::{InvoiceError, InvoiceId};
use invoicer_infra::WriteOutcome;
use invoicer_invoicing::{InvoiceInput, ListParams};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::app::dto;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route(
            "/:id",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
}

fn parse_id(raw: &str) -> Result<InvoiceId, Response> {
    raw.parse::<InvoiceId>()
        .map_err(errors::invoice_error_to_response)
}

fn write_outcome_response(outcome: WriteOutcome) -> Response {
    match outcome {
        WriteOutcome::Applied => Json(dto::SuccessResponse::ok()).into_response(),
        WriteOutcome::NotFound => errors::invoice_error_to_response(InvoiceError::NotFound),
    }
}

pub async fn list_invoices(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ListQuery>, QueryRejection>,
) -> Response {
    // Listing never rejects: an unreadable query string means defaults.
    let query = query.map(|Query(q)| q).unwrap_or_default();
    let params = ListParams::normalize(
        query.page.as_deref(),
        query.per_page.as_deref(),
        query.q.as_deref(),
    );

    match services.invoices.list(params).await {
        Ok(page) => Json(dto::InvoiceListResponse::from(page)).into_response(),
        Err(e) => errors::invoice_error_to_response(e),
    }
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.invoices.get(id).await {
        Ok(full) => Json(dto::InvoiceResponse::from(full)).into_response(),
        Err(e) => errors::invoice_error_to_response(e),
    }
}

pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::InvoiceRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let input = match InvoiceInput::try_from(body) {
        Ok(input) => input,
        Err(e) => return errors::invoice_error_to_response(e),
    };

    match services.invoices.create(input).await {
        Ok(invoice) => (StatusCode::CREATED, Json(dto::InvoiceResponse::from(invoice))).into_response(),
        Err(e) => errors::invoice_error_to_response(e),
    }
}

pub async fn update_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<dto::InvoiceRequest>, JsonRejection>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let input = match InvoiceInput::try_from(body) {
        Ok(input) => input,
        Err(e) => return errors::invoice_error_to_response(e),
    };

    match services.invoices.update(id, input).await {
        Ok(outcome) => write_outcome_response(outcome),
        Err(e) => errors::invoice_error_to_response(e),
    }
}

pub async fn delete_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match services.invoices.delete(id).await {
        Ok(outcome) => write_outcome_response(outcome),
        Err(e) => errors::invoice_error_to_response(e),
    }
}
