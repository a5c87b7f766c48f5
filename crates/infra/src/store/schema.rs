//! Schema bootstrap for the Postgres store.

use sqlx::PgPool;
use tracing::info;

use invoicer_core::InvoiceResult;

use super::pg_error::map_sqlx_error;

/// DDL for `invoices` and `invoice_items`; every statement is `IF NOT EXISTS`.
pub const SCHEMA_SQL: &str = include_str!("../../migrations/0001_invoices.sql");

/// Create the tables and indexes when they are missing.
pub async fn ensure_schema(pool: &PgPool) -> InvoiceResult<()> {
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    info!("invoice schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_cascades_items_and_guards_invariants() {
        assert!(SCHEMA_SQL.contains("ON DELETE CASCADE"));
        assert!(SCHEMA_SQL.contains("UNIQUE (invoice_number)"));
        assert!(SCHEMA_SQL.contains("due_date >= issue_date"));
        for status in ["Draft", "Sent", "Paid", "Overdue", "Cancelled"] {
            assert!(SCHEMA_SQL.contains(&format!("'{status}'")), "{status}");
        }
    }
}
