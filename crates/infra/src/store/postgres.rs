//! Postgres-backed invoice store.
//!
//! ## Transactions
//!
//! - `insert`: one transaction wraps the invoice row and every item row.
//! - `replace`: one transaction updates the invoice row, deletes the old item
//!   set and inserts the new one. Zero affected invoice rows rolls back and
//!   reports [`WriteOutcome::NotFound`].
//! - `delete`: a single statement; `ON DELETE CASCADE` removes the items.
//! - `get`: a read-only `REPEATABLE READ` transaction so the header and the
//!   items come from the same snapshot.
//! - `list`: the count and the page query are independent and run
//!   concurrently on separate pool connections.
//!
//! ## Thread Safety
//!
//! `PostgresInvoiceStore` is `Send + Sync`; the SQLx pool handles connection
//! management.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{debug, instrument};
use uuid::Uuid;

use invoicer_core::{InvoiceError, InvoiceId, InvoiceResult, LineItemId, Money, UnitPrice};
use invoicer_invoicing::{
    Invoice, InvoiceDraft, InvoiceStatus, InvoiceWithItems, LineItem, LineItemDraft, ListParams,
    Page, PageMeta,
};

use super::pg_error::map_sqlx_error;
use super::{InvoiceStore, NewInvoice, WriteOutcome};

const INVOICE_COLUMNS: &str = r#"
    id,
    invoice_number,
    client_name,
    client_address,
    issue_date,
    due_date,
    total_amount,
    status,
    created_at,
    updated_at
"#;

/// Postgres-backed [`InvoiceStore`].
#[derive(Debug, Clone)]
pub struct PostgresInvoiceStore {
    pool: Arc<PgPool>,
}

impl PostgresInvoiceStore {
    /// Wrap an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> InvoiceResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl InvoiceStore for PostgresInvoiceStore {
    #[instrument(
        skip(self, invoice),
        fields(invoice_id = %invoice.id, invoice_number = %invoice.invoice_number, item_count = invoice.draft.items.len()),
        err
    )]
    async fn insert(&self, invoice: &NewInvoice) -> InvoiceResult<Invoice> {
        let draft = &invoice.draft;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let sql = format!(
            r#"
            INSERT INTO invoices (
                id,
                invoice_number,
                client_name,
                client_address,
                issue_date,
                due_date,
                total_amount,
                status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {INVOICE_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(invoice.id.as_uuid())
            .bind(&invoice.invoice_number)
            .bind(&draft.client_name)
            .bind(&draft.client_address)
            .bind(draft.issue_date)
            .bind(draft.due_date)
            .bind(draft.total_amount.to_decimal())
            .bind(draft.status_or_default().as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_invoice", e))?;
        let created = invoice_from_row(&row)?;

        insert_items(&mut tx, invoice.id, &draft.items).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(created)
    }

    #[instrument(skip(self, draft), fields(invoice_id = %id, item_count = draft.items.len()), err)]
    async fn replace(&self, id: InvoiceId, draft: &InvoiceDraft) -> InvoiceResult<WriteOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let updated = sqlx::query(
            r#"
            UPDATE invoices
            SET
                client_name = $2,
                client_address = $3,
                issue_date = $4,
                due_date = $5,
                status = COALESCE($6, status),
                total_amount = $7,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(&draft.client_name)
        .bind(&draft.client_address)
        .bind(draft.issue_date)
        .bind(draft.due_date)
        .bind(draft.status.map(|s| s.as_str()))
        .bind(draft.total_amount.to_decimal())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_invoice", e))?;

        if updated.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Ok(WriteOutcome::NotFound);
        }

        let removed = sqlx::query("DELETE FROM invoice_items WHERE invoice_id = $1")
            .bind(id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_items", e))?;
        debug!(removed = removed.rows_affected(), "previous items removed");

        insert_items(&mut tx, id, &draft.items).await?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(WriteOutcome::Applied)
    }

    #[instrument(skip(self), fields(invoice_id = %id), err)]
    async fn delete(&self, id: InvoiceId) -> InvoiceResult<WriteOutcome> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_invoice", e))?;

        Ok(if result.rows_affected() == 0 {
            WriteOutcome::NotFound
        } else {
            WriteOutcome::Applied
        })
    }

    #[instrument(skip(self), fields(invoice_id = %id), err)]
    async fn get(&self, id: InvoiceId) -> InvoiceResult<Option<InvoiceWithItems>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("set_isolation", e))?;

        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("get_invoice", e))?;

        let Some(row) = row else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Ok(None);
        };
        let invoice = invoice_from_row(&row)?;

        let item_rows = sqlx::query(
            r#"
            SELECT
                id,
                description,
                quantity,
                unit_price,
                line_total
            FROM invoice_items
            WHERE invoice_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("get_items", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        let items = item_rows
            .iter()
            .map(item_from_row)
            .collect::<InvoiceResult<Vec<_>>>()?;
        Ok(Some(InvoiceWithItems { invoice, items }))
    }

    #[instrument(
        skip(self, params),
        fields(page = params.page, per_page = params.per_page, search = ?params.search),
        err
    )]
    async fn list(&self, params: &ListParams) -> InvoiceResult<Page<Invoice>> {
        let pattern = params.like_pattern();
        let filter = "($1::text IS NULL OR invoice_number ILIKE $1 OR client_name ILIKE $1)";

        let count_sql = format!("SELECT COUNT(*) FROM invoices WHERE {filter}");
        let page_sql = format!(
            r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE {filter}
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        );

        let count = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(pattern.as_deref())
            .fetch_one(&*self.pool);
        let rows = sqlx::query(&page_sql)
            .bind(pattern.as_deref())
            .bind(to_i64(params.limit()))
            .bind(to_i64(params.offset()))
            .fetch_all(&*self.pool);

        let (total, rows) = tokio::try_join!(count, rows).map_err(|e| map_sqlx_error("list_invoices", e))?;

        let items = rows
            .iter()
            .map(invoice_from_row)
            .collect::<InvoiceResult<Vec<_>>>()?;
        let meta = PageMeta::new(params, total.max(0) as u64);
        Ok(Page { items, meta })
    }

    async fn ping(&self) -> InvoiceResult<()> {
        sqlx::query("SELECT 1")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ping", e))?;
        Ok(())
    }
}

async fn insert_items(
    tx: &mut Transaction<'_, Postgres>,
    invoice_id: InvoiceId,
    items: &[LineItemDraft],
) -> InvoiceResult<()> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO invoice_items (
                id,
                invoice_id,
                position,
                description,
                quantity,
                unit_price,
                line_total
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::from(LineItemId::new()))
        .bind(invoice_id.as_uuid())
        .bind(position as i32)
        .bind(&item.description)
        .bind(item.quantity as i32)
        .bind(item.unit_price.as_decimal())
        .bind(item.line_total.to_decimal())
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("insert_item", e))?;
    }
    Ok(())
}

fn to_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

fn invoice_from_row(row: &PgRow) -> InvoiceResult<Invoice> {
    let decode = |e| map_sqlx_error("decode_invoice", e);

    let status: String = row.try_get("status").map_err(decode)?;
    let status = status.parse::<InvoiceStatus>().map_err(|_| {
        InvoiceError::storage(format!("stored invoice status '{status}' is not recognized"))
    })?;
    let total_amount: Decimal = row.try_get("total_amount").map_err(decode)?;

    Ok(Invoice {
        id: InvoiceId::from_uuid(row.try_get::<Uuid, _>("id").map_err(decode)?),
        invoice_number: row.try_get("invoice_number").map_err(decode)?,
        client_name: row.try_get("client_name").map_err(decode)?,
        client_address: row.try_get("client_address").map_err(decode)?,
        issue_date: row.try_get::<NaiveDate, _>("issue_date").map_err(decode)?,
        due_date: row.try_get::<NaiveDate, _>("due_date").map_err(decode)?,
        status,
        total_amount: Money::from_decimal(total_amount)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(decode)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(decode)?,
    })
}

fn item_from_row(row: &PgRow) -> InvoiceResult<LineItem> {
    let decode = |e| map_sqlx_error("decode_item", e);

    let quantity: i32 = row.try_get("quantity").map_err(decode)?;
    let quantity = u32::try_from(quantity)
        .map_err(|_| InvoiceError::storage(format!("stored quantity {quantity} is negative")))?;
    let unit_price: Decimal = row.try_get("unit_price").map_err(decode)?;
    let line_total: Decimal = row.try_get("line_total").map_err(decode)?;

    Ok(LineItem {
        id: LineItemId::from_uuid(row.try_get::<Uuid, _>("id").map_err(decode)?),
        description: row.try_get("description").map_err(decode)?,
        quantity,
        unit_price: UnitPrice::from_decimal(unit_price)?,
        line_total: Money::from_decimal(line_total)?,
    })
}
