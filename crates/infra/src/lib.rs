//! Infrastructure layer: invoice persistence and the application service that
//! drives it.

pub mod service;
pub mod store;

pub use service::InvoiceService;
pub use store::{InMemoryInvoiceStore, InvoiceStore, NewInvoice, PostgresInvoiceStore, WriteOutcome};
