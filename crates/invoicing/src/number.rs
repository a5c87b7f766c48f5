//! Invoice-number generation.
//!
//! Numbers only need to be unique and human-readable. Uniqueness is enforced
//! by the store (unique constraint); generators merely make collisions
//! unlikely so that the bounded regeneration in the write path rarely runs.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;

/// Source of candidate invoice numbers.
pub trait InvoiceNumberGenerator: Send + Sync {
    fn next_number(&self) -> String;
}

/// `INV-<YYYYMMDDHHMMSSmmm>-<4 random uppercase alphanumerics>`.
#[derive(Debug, Clone, Default)]
pub struct TimestampTokenGenerator;

impl TimestampTokenGenerator {
    pub const PREFIX: &'static str = "INV";
    const TOKEN_LEN: usize = 4;

    pub fn new() -> Self {
        Self
    }

    fn format_at(now: DateTime<Utc>, token: &str) -> String {
        format!("{}-{}-{}", Self::PREFIX, now.format("%Y%m%d%H%M%S%3f"), token)
    }

    fn random_token() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::TOKEN_LEN)
            .map(|b| char::from(b).to_ascii_uppercase())
            .collect()
    }
}

impl InvoiceNumberGenerator for TimestampTokenGenerator {
    fn next_number(&self) -> String {
        Self::format_at(Utc::now(), &Self::random_token())
    }
}
