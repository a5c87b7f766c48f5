//! Invoicing domain module.
//!
//! This crate contains the business rules for invoices and their line items,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage):
//! request validation into typed drafts, total computation, invoice-number
//! generation and list-query normalization.

pub mod draft;
pub mod invoice;
pub mod number;
pub mod query;

pub use draft::{InvoiceDraft, InvoiceInput, LineItemDraft, LineItemInput};
pub use invoice::{Invoice, InvoiceStatus, InvoiceWithItems, LineItem};
pub use number::{InvoiceNumberGenerator, TimestampTokenGenerator};
pub use query::{ListParams, Page, PageMeta};
