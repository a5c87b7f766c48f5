//! `invoicer-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the error taxonomy, fixed-point money and calendar-date helpers.

pub mod date;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;

pub use date::{format_ymd, parse_ymd};
pub use entity::Entity;
pub use error::{InvoiceError, InvoiceResult};
pub use id::{InvoiceId, LineItemId};
pub use money::{line_total, Money, UnitPrice};
