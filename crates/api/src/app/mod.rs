//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the invoice service
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs and JSON mapping
//! - `errors.rs`: the single error body shape

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use invoicer_core::InvoiceResult;

use crate::config::AppConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> InvoiceResult<Router> {
    let services = services::build_services(&config.store).await?;
    Ok(router(Arc::new(services)))
}

/// Router over already-built services.
pub fn router(services: Arc<AppServices>) -> Router {
    routes::router().layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(Extension(services)),
    )
}

pub use services::AppServices;
