//! In-memory invoice store for dev/test.
//!
//! One `RwLock` guards the whole table, so every write is atomic and readers
//! never see a half-replaced item set.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use invoicer_core::{Entity, InvoiceError, InvoiceId, InvoiceResult, LineItemId};
use invoicer_invoicing::{
    Invoice, InvoiceDraft, InvoiceWithItems, LineItem, LineItemDraft, ListParams, Page, PageMeta,
};

use super::{InvoiceStore, NewInvoice, WriteOutcome};

#[derive(Debug, Clone)]
struct StoredInvoice {
    invoice: Invoice,
    items: Vec<LineItem>,
}

/// In-memory [`InvoiceStore`]. Rows are kept in creation order.
#[derive(Debug, Default)]
pub struct InMemoryInvoiceStore {
    rows: RwLock<Vec<StoredInvoice>>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> InvoiceResult<RwLockReadGuard<'_, Vec<StoredInvoice>>> {
        self.rows
            .read()
            .map_err(|_| InvoiceError::storage("in-memory invoice store lock poisoned"))
    }

    fn write(&self) -> InvoiceResult<RwLockWriteGuard<'_, Vec<StoredInvoice>>> {
        self.rows
            .write()
            .map_err(|_| InvoiceError::storage("in-memory invoice store lock poisoned"))
    }
}

fn materialize(items: &[LineItemDraft]) -> Vec<LineItem> {
    items
        .iter()
        .map(|d| LineItem {
            id: LineItemId::new(),
            description: d.description.clone(),
            quantity: d.quantity,
            unit_price: d.unit_price,
            line_total: d.line_total,
        })
        .collect()
}

#[async_trait]
impl InvoiceStore for InMemoryInvoiceStore {
    async fn insert(&self, new: &NewInvoice) -> InvoiceResult<Invoice> {
        let mut rows = self.write()?;
        if rows
            .iter()
            .any(|r| r.invoice.invoice_number == new.invoice_number)
        {
            return Err(InvoiceError::unique("invoice number already exists"));
        }
        if rows.iter().any(|r| r.invoice.id == new.id) {
            return Err(InvoiceError::unique(format!("invoice id {} already exists", new.id)));
        }

        let now = Utc::now();
        let draft = &new.draft;
        let invoice = Invoice {
            id: new.id,
            invoice_number: new.invoice_number.clone(),
            client_name: draft.client_name.clone(),
            client_address: draft.client_address.clone(),
            issue_date: draft.issue_date,
            due_date: draft.due_date,
            status: draft.status_or_default(),
            total_amount: draft.total_amount,
            created_at: now,
            updated_at: now,
        };
        rows.push(StoredInvoice {
            invoice: invoice.clone(),
            items: materialize(&draft.items),
        });
        Ok(invoice)
    }

    async fn replace(&self, id: InvoiceId, draft: &InvoiceDraft) -> InvoiceResult<WriteOutcome> {
        let mut rows = self.write()?;
        let Some(row) = rows.iter_mut().find(|r| r.invoice.id() == &id) else {
            return Ok(WriteOutcome::NotFound);
        };

        let invoice = &mut row.invoice;
        invoice.client_name = draft.client_name.clone();
        invoice.client_address = draft.client_address.clone();
        invoice.issue_date = draft.issue_date;
        invoice.due_date = draft.due_date;
        if let Some(status) = draft.status {
            invoice.status = status;
        }
        invoice.total_amount = draft.total_amount;
        invoice.updated_at = Utc::now();
        row.items = materialize(&draft.items);
        Ok(WriteOutcome::Applied)
    }

    async fn delete(&self, id: InvoiceId) -> InvoiceResult<WriteOutcome> {
        let mut rows = self.write()?;
        let before = rows.len();
        rows.retain(|r| r.invoice.id() != &id);
        Ok(if rows.len() == before {
            WriteOutcome::NotFound
        } else {
            WriteOutcome::Applied
        })
    }

    async fn get(&self, id: InvoiceId) -> InvoiceResult<Option<InvoiceWithItems>> {
        let rows = self.read()?;
        Ok(rows
            .iter()
            .find(|r| r.invoice.id() == &id)
            .map(|r| InvoiceWithItems {
                invoice: r.invoice.clone(),
                items: r.items.clone(),
            }))
    }

    async fn list(&self, params: &ListParams) -> InvoiceResult<Page<Invoice>> {
        let rows = self.read()?;
        let matching: Vec<&Invoice> = rows
            .iter()
            .rev()
            .map(|r| &r.invoice)
            .filter(|inv| params.matches(&inv.invoice_number, &inv.client_name))
            .collect();

        let meta = PageMeta::new(params, matching.len() as u64);
        let offset = usize::try_from(params.offset()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(params.per_page as usize)
            .cloned()
            .collect();
        Ok(Page { items, meta })
    }

    async fn ping(&self) -> InvoiceResult<()> {
        self.read().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invoicer_invoicing::{InvoiceInput, InvoiceStatus, LineItemInput};

    fn draft(client: &str, status: Option<&str>) -> InvoiceDraft {
        InvoiceDraft::parse(InvoiceInput {
            client_name: Some(client.to_string()),
            client_address: Some("1 Main St".to_string()),
            issue_date: Some("2024-03-01".to_string()),
            due_date: Some("2024-03-31".to_string()),
            status: status.map(str::to_string),
            items: Some(vec![LineItemInput {
                description: Some("Consulting".to_string()),
                quantity: Some("2".to_string()),
                unit_price: Some("10.005".to_string()),
            }]),
        })
        .unwrap()
    }

    fn new_invoice(number: &str, client: &str) -> NewInvoice {
        NewInvoice {
            id: InvoiceId::new(),
            invoice_number: number.to_string(),
            draft: draft(client, None),
        }
    }

    #[tokio::test]
    async fn insert_then_get_returns_items_and_default_status() {
        let store = InMemoryInvoiceStore::new();
        let new = new_invoice("INV-1", "Acme");
        let created = store.insert(&new).await.unwrap();
        assert_eq!(created.status, InvoiceStatus::Draft);
        assert_eq!(created.total_amount.cents(), 2001);

        let loaded = store.get(new.id).await.unwrap().unwrap();
        assert_eq!(loaded.invoice, created);
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items_total().unwrap(), created.total_amount);
    }

    #[tokio::test]
    async fn duplicate_number_is_a_unique_violation() {
        let store = InMemoryInvoiceStore::new();
        store.insert(&new_invoice("INV-1", "Acme")).await.unwrap();
        let err = store.insert(&new_invoice("INV-1", "Globex")).await.unwrap_err();
        assert_eq!(err.code(), "UNIQUE_VIOLATION");
    }

    #[tokio::test]
    async fn replace_without_status_keeps_stored_status() {
        let store = InMemoryInvoiceStore::new();
        let mut new = new_invoice("INV-1", "Acme");
        new.draft = draft("Acme", Some("Sent"));
        store.insert(&new).await.unwrap();

        let outcome = store.replace(new.id, &draft("Acme Ltd", None)).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Applied);

        let loaded = store.get(new.id).await.unwrap().unwrap();
        assert_eq!(loaded.invoice.status, InvoiceStatus::Sent);
        assert_eq!(loaded.invoice.client_name, "Acme Ltd");
        assert!(loaded.invoice.updated_at >= loaded.invoice.created_at);
    }

    #[tokio::test]
    async fn writes_to_missing_ids_report_not_found() {
        let store = InMemoryInvoiceStore::new();
        let id = InvoiceId::new();
        assert_eq!(
            store.replace(id, &draft("Acme", None)).await.unwrap(),
            WriteOutcome::NotFound
        );
        assert_eq!(store.delete(id).await.unwrap(), WriteOutcome::NotFound);
        assert!(store.get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_newest_first_and_filtered() {
        let store = InMemoryInvoiceStore::new();
        store.insert(&new_invoice("INV-1", "Acme")).await.unwrap();
        store.insert(&new_invoice("INV-2", "Globex")).await.unwrap();
        store.insert(&new_invoice("INV-3", "acme west")).await.unwrap();

        let page = store.list(&ListParams::default()).await.unwrap();
        let numbers: Vec<_> = page.items.iter().map(|i| i.invoice_number.as_str()).collect();
        assert_eq!(numbers, ["INV-3", "INV-2", "INV-1"]);
        assert_eq!(page.meta.total, 3);

        let params = ListParams::normalize(None, None, Some("ACME"));
        let page = store.list(&params).await.unwrap();
        assert_eq!(page.meta.total, 2);
        assert_eq!(page.meta.q.as_deref(), Some("ACME"));
    }
}
