//! Invoice persistence.
//!
//! [`InvoiceStore`] is the single seam between the application service and
//! storage. Two implementations exist:
//!
//! - [`PostgresInvoiceStore`]: production storage (`invoices` + `invoice_items`).
//! - [`InMemoryInvoiceStore`]: dev/test storage with the same observable semantics.
//!
//! ## Atomicity
//!
//! Every write that touches an invoice and its items is one unit: either the
//! invoice row and the whole item set are visible, or none of the change is.
//! No reader observes a total that disagrees with the items.
//!
//! ## Error Mapping
//!
//! Implementations map their native failures into [`InvoiceError`] before
//! returning, so callers never see driver errors.
//!
//! [`InvoiceError`]: invoicer_core::InvoiceError

use std::sync::Arc;

use async_trait::async_trait;

use invoicer_core::{InvoiceId, InvoiceResult};
use invoicer_invoicing::{Invoice, InvoiceDraft, InvoiceWithItems, ListParams, Page};

mod in_memory;
mod pg_error;
mod postgres;
pub mod schema;

pub use in_memory::InMemoryInvoiceStore;
pub use postgres::PostgresInvoiceStore;

/// A validated invoice about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub draft: InvoiceDraft,
}

/// Result of an update or delete addressed by id.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The invoice existed and the change was committed.
    Applied,
    /// No invoice has this id; nothing was written.
    NotFound,
}

/// Storage for invoices and their line items.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Insert the invoice and all of its items atomically.
    ///
    /// A duplicate invoice number fails with `InvoiceError::UniqueViolation`.
    async fn insert(&self, invoice: &NewInvoice) -> InvoiceResult<Invoice>;

    /// Overwrite the invoice fields and replace its entire item set atomically.
    ///
    /// `draft.status == None` keeps the stored status.
    async fn replace(&self, id: InvoiceId, draft: &InvoiceDraft) -> InvoiceResult<WriteOutcome>;

    /// Delete the invoice; its items go with it.
    async fn delete(&self, id: InvoiceId) -> InvoiceResult<WriteOutcome>;

    /// Invoice with its items in insertion order.
    async fn get(&self, id: InvoiceId) -> InvoiceResult<Option<InvoiceWithItems>>;

    /// Newest-first page of invoice headers matching `params.search`.
    async fn list(&self, params: &ListParams) -> InvoiceResult<Page<Invoice>>;

    /// Cheap liveness check.
    async fn ping(&self) -> InvoiceResult<()>;
}

#[async_trait]
impl<S> InvoiceStore for Arc<S>
where
    S: InvoiceStore + ?Sized,
{
    async fn insert(&self, invoice: &NewInvoice) -> InvoiceResult<Invoice> {
        (**self).insert(invoice).await
    }

    async fn replace(&self, id: InvoiceId, draft: &InvoiceDraft) -> InvoiceResult<WriteOutcome> {
        (**self).replace(id, draft).await
    }

    async fn delete(&self, id: InvoiceId) -> InvoiceResult<WriteOutcome> {
        (**self).delete(id).await
    }

    async fn get(&self, id: InvoiceId) -> InvoiceResult<Option<InvoiceWithItems>> {
        (**self).get(id).await
    }

    async fn list(&self, params: &ListParams) -> InvoiceResult<Page<Invoice>> {
        (**self).list(params).await
    }

    async fn ping(&self) -> InvoiceResult<()> {
        (**self).ping().await
    }
}
