//! Error taxonomy shared by every layer.

use thiserror::Error;

/// Result type used across the invoicing crates.
pub type InvoiceResult<T> = Result<T, InvoiceError>;

/// Invoicing error.
///
/// Storage failures are mapped into this taxonomy exactly once, at the store
/// boundary. The HTTP layer maps each variant to a status code and a stable
/// machine-readable code (see [`InvoiceError::code`]).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvoiceError {
    /// Client input is incomplete or breaks a business rule.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A uniqueness constraint was violated (e.g. duplicate invoice number).
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A referenced row does not exist.
    #[error("foreign key violated: {0}")]
    ForeignKeyViolation(String),

    /// A literal (UUID, number, date) could not be parsed.
    #[error("invalid literal: {0}")]
    InvalidLiteral(String),

    /// A required column was null.
    #[error("not null violated: {0}")]
    NotNull(String),

    /// The requested invoice does not exist.
    #[error("not found")]
    NotFound,

    /// Any other storage failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// The process is misconfigured (e.g. missing connection string).
    #[error("configuration error: {0}")]
    Config(String),
}

impl InvoiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unique(msg: impl Into<String>) -> Self {
        Self::UniqueViolation(msg.into())
    }

    pub fn invalid_literal(msg: impl Into<String>) -> Self {
        Self::InvalidLiteral(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Stable error code exposed to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::UniqueViolation(_) => "UNIQUE_VIOLATION",
            Self::ForeignKeyViolation(_) => "FK_VIOLATION",
            Self::InvalidLiteral(_) => "INVALID_LITERAL",
            Self::NotNull(_) => "NOT_NULL",
            Self::NotFound => "NOT_FOUND",
            Self::Storage(_) => "DB_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}
