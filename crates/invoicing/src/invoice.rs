use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use invoicer_core::{Entity, InvoiceError, InvoiceId, InvoiceResult, LineItemId, Money, UnitPrice};

/// Invoice status.
///
/// The enumeration is the only authority; no transition rules are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 5] = [
        InvoiceStatus::Draft,
        InvoiceStatus::Sent,
        InvoiceStatus::Paid,
        InvoiceStatus::Overdue,
        InvoiceStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "Draft",
            InvoiceStatus::Sent => "Sent",
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Overdue => "Overdue",
            InvoiceStatus::Cancelled => "Cancelled",
        }
    }
}

impl core::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for InvoiceStatus {
    type Err = InvoiceError;

    /// Case-insensitive; the canonical spelling is capitalized.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                InvoiceError::validation(format!(
                    "status must be one of: Draft, Sent, Paid, Overdue, Cancelled (got '{s}')"
                ))
            })
    }
}

/// One billable row of an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub id: LineItemId,
    pub description: String,
    pub quantity: u32,
    pub unit_price: UnitPrice,
    /// `quantity × unit_price`, rounded to cents.
    pub line_total: Money,
}

impl Entity for LineItem {
    type Id = LineItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Invoice header as persisted (items are loaded separately).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub client_name: String,
    pub client_address: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: InvoiceStatus,
    /// Always equals the sum of the invoice's line totals.
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Invoice together with its line items in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceWithItems {
    pub invoice: Invoice,
    pub items: Vec<LineItem>,
}

impl InvoiceWithItems {
    /// Sum of the line totals; matches `invoice.total_amount` for stored invoices.
    pub fn items_total(&self) -> InvoiceResult<Money> {
        Money::try_sum(self.items.iter().map(|i| i.line_total))
    }
}
