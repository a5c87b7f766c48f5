//! Invoice application service.
//!
//! Validates untyped input into drafts, assigns identity and invoice numbers,
//! and drives an [`InvoiceStore`]. The HTTP layer only translates.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use invoicer_core::{InvoiceError, InvoiceId, InvoiceResult};
use invoicer_invoicing::{
    Invoice, InvoiceDraft, InvoiceInput, InvoiceNumberGenerator, InvoiceWithItems, ListParams,
    Page, TimestampTokenGenerator,
};

use crate::store::{InvoiceStore, NewInvoice, WriteOutcome};

/// Total attempts (first try included) at inserting with a fresh number.
pub const MAX_NUMBER_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct InvoiceService {
    store: Arc<dyn InvoiceStore>,
    numbers: Arc<dyn InvoiceNumberGenerator>,
}

impl InvoiceService {
    pub fn new(store: Arc<dyn InvoiceStore>) -> Self {
        Self::with_number_generator(store, Arc::new(TimestampTokenGenerator::new()))
    }

    pub fn with_number_generator(
        store: Arc<dyn InvoiceStore>,
        numbers: Arc<dyn InvoiceNumberGenerator>,
    ) -> Self {
        Self { store, numbers }
    }

    #[instrument(skip(self, params), fields(page = params.page, per_page = params.per_page))]
    pub async fn list(&self, params: ListParams) -> InvoiceResult<Page<Invoice>> {
        self.store.list(&params).await
    }

    pub async fn get(&self, id: InvoiceId) -> InvoiceResult<InvoiceWithItems> {
        self.store
            .get(id)
            .await?
            .ok_or_else(InvoiceError::not_found)
    }

    /// Create an invoice. On an invoice-number collision a fresh number is
    /// drawn, up to [`MAX_NUMBER_ATTEMPTS`] tries in total.
    #[instrument(skip(self, input), fields(invoice_id = tracing::field::Empty), err)]
    pub async fn create(&self, input: InvoiceInput) -> InvoiceResult<Invoice> {
        let draft = InvoiceDraft::parse(input)?;
        let id = InvoiceId::new();
        tracing::Span::current().record("invoice_id", tracing::field::display(id));

        let mut new = NewInvoice {
            id,
            invoice_number: self.numbers.next_number(),
            draft,
        };
        let mut attempt = 1;
        loop {
            match self.store.insert(&new).await {
                Ok(invoice) => {
                    info!(
                        invoice_number = %invoice.invoice_number,
                        total = %invoice.total_amount,
                        "invoice created"
                    );
                    return Ok(invoice);
                }
                Err(InvoiceError::UniqueViolation(msg)) if attempt < MAX_NUMBER_ATTEMPTS => {
                    warn!(
                        attempt,
                        invoice_number = %new.invoice_number,
                        error = %msg,
                        "invoice number collision; regenerating"
                    );
                    new.invoice_number = self.numbers.next_number();
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    #[instrument(skip(self, input), fields(invoice_id = %id), err)]
    pub async fn update(&self, id: InvoiceId, input: InvoiceInput) -> InvoiceResult<WriteOutcome> {
        let draft = InvoiceDraft::parse(input)?;
        let outcome = self.store.replace(id, &draft).await?;
        if outcome == WriteOutcome::Applied {
            info!(total = %draft.total_amount, items = draft.items.len(), "invoice updated");
        }
        Ok(outcome)
    }

    #[instrument(skip(self), fields(invoice_id = %id), err)]
    pub async fn delete(&self, id: InvoiceId) -> InvoiceResult<WriteOutcome> {
        let outcome = self.store.delete(id).await?;
        if outcome == WriteOutcome::Applied {
            info!("invoice deleted");
        }
        Ok(outcome)
    }

    pub async fn health(&self) -> InvoiceResult<()> {
        self.store.ping().await
    }
}
