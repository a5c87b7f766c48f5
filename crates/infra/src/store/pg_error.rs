//! SQLx → [`InvoiceError`] mapping.
//!
//! | SQLSTATE | meaning | InvoiceError |
//! |----------|---------|--------------|
//! | `23505` | unique violation | `UniqueViolation` |
//! | `23503` | foreign key violation | `ForeignKeyViolation` |
//! | `22P02`, `22007`, `22008`, `22003` | malformed literal / out of range | `InvalidLiteral` |
//! | `23502` | not null violation | `NotNull` |
//! | `23514` | check constraint violation | `Validation` |
//! | anything else, pool/IO errors | | `Storage` |
//!
//! Client-facing variants carry a fixed message; the driver text, constraint
//! and table names are only logged.

use tracing::debug;

use invoicer_core::InvoiceError;

const INVOICE_NUMBER_KEY: &str = "invoices_invoice_number_key";

pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> InvoiceError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.into_owned());
            debug!(
                operation,
                sqlstate = code.as_deref(),
                constraint = db_err.constraint(),
                table = db_err.table(),
                detail = db_err.message(),
                "database error"
            );
            match code.as_deref() {
                Some("23505") if db_err.constraint() == Some(INVOICE_NUMBER_KEY) => {
                    InvoiceError::unique("invoice number already exists")
                }
                Some("23505") => InvoiceError::unique("a record with the same key already exists"),
                Some("23503") => {
                    InvoiceError::ForeignKeyViolation("referenced record does not exist".to_string())
                }
                Some("22P02" | "22007" | "22008" | "22003") => {
                    InvoiceError::invalid_literal("a value is malformed or out of range")
                }
                Some("23502") => InvoiceError::NotNull("a required value is missing".to_string()),
                Some("23514") => InvoiceError::validation("a value breaks a stored constraint"),
                _ => InvoiceError::Storage(format!(
                    "database error in {}: {}",
                    operation,
                    db_err.message()
                )),
            }
        }
        sqlx::Error::PoolClosed => {
            InvoiceError::Storage(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::PoolTimedOut => {
            InvoiceError::Storage(format!("timed out acquiring a connection in {}", operation))
        }
        other => InvoiceError::Storage(format!("sqlx error in {}: {}", operation, other)),
    }
}
