use axum::{Router, routing::get};

pub mod invoices;
pub mod system;

/// Router for every endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .nest("/invoices", invoices::router())
}
