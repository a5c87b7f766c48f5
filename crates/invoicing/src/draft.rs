//! Boundary validation: untyped request fields → fully validated drafts.
//!
//! Nothing downstream of [`InvoiceDraft::parse`] re-checks input. Missing or
//! blank fields and broken business rules are [`InvoiceError::Validation`];
//! values that are present but cannot be parsed (dates, numbers) are
//! [`InvoiceError::InvalidLiteral`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use invoicer_core::{InvoiceError, InvoiceResult, Money, UnitPrice, line_total, parse_ymd};

use crate::invoice::InvoiceStatus;

/// Column limits of the `invoices`/`invoice_items` tables.
pub const MAX_NAME_LEN: usize = 255;
pub const MAX_DESCRIPTION_LEN: usize = 255;
/// `NUMERIC(12,2)`: 9999999999.99, in cents.
pub const MAX_AMOUNT_CENTS: i64 = 999_999_999_999;
/// `NUMERIC(14,4)`: 9999999999.9999.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 4);

/// Raw invoice fields as received. Numbers arrive as their textual form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceInput {
    pub client_name: Option<String>,
    pub client_address: Option<String>,
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
    pub items: Option<Vec<LineItemInput>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineItemInput {
    pub description: Option<String>,
    pub quantity: Option<String>,
    pub unit_price: Option<String>,
}

/// A validated line item with its total already computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemDraft {
    pub description: String,
    pub quantity: u32,
    pub unit_price: UnitPrice,
    pub line_total: Money,
}

/// A validated create/update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    pub client_name: String,
    pub client_address: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    /// `None` when the request did not name a status.
    pub status: Option<InvoiceStatus>,
    /// Never empty.
    pub items: Vec<LineItemDraft>,
    /// Sum of `items[*].line_total`.
    pub total_amount: Money,
}

impl InvoiceDraft {
    pub fn parse(input: InvoiceInput) -> InvoiceResult<Self> {
        let client_name = non_blank(input.client_name);
        let client_address = non_blank(input.client_address);
        let issue_date = non_blank(input.issue_date);
        let due_date = non_blank(input.due_date);
        let items = input.items.filter(|items| !items.is_empty());

        let mut missing = Vec::new();
        if client_name.is_none() {
            missing.push("clientName");
        }
        if client_address.is_none() {
            missing.push("clientAddress");
        }
        if issue_date.is_none() {
            missing.push("issueDate");
        }
        if due_date.is_none() {
            missing.push("dueDate");
        }
        if items.is_none() {
            missing.push("items");
        }

        let (Some(client_name), Some(client_address), Some(issue_date), Some(due_date), Some(items)) =
            (client_name, client_address, issue_date, due_date, items)
        else {
            return Err(InvoiceError::validation(format!(
                "missing required fields or empty items: {}",
                missing.join(", ")
            )));
        };

        if client_name.chars().count() > MAX_NAME_LEN {
            return Err(InvoiceError::validation(format!(
                "clientName must be at most {MAX_NAME_LEN} characters"
            )));
        }

        let issue_date = parse_ymd(&issue_date)?;
        let due_date = parse_ymd(&due_date)?;
        if due_date < issue_date {
            return Err(InvoiceError::validation("dueDate must not be before issueDate"));
        }

        let status = non_blank(input.status)
            .map(|s| s.parse::<InvoiceStatus>())
            .transpose()?;

        let items = items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| LineItemDraft::parse(idx, item))
            .collect::<InvoiceResult<Vec<_>>>()?;
        let total_amount = Money::try_sum(items.iter().map(|i| i.line_total))?;
        if total_amount.cents() > MAX_AMOUNT_CENTS {
            return Err(InvoiceError::validation(format!(
                "invoice total must be at most {}",
                Money::from_cents(MAX_AMOUNT_CENTS)
            )));
        }

        Ok(Self {
            client_name,
            client_address,
            issue_date,
            due_date,
            status,
            items,
            total_amount,
        })
    }

    /// Status to use when creating: an omitted status means `Draft`.
    pub fn status_or_default(&self) -> InvoiceStatus {
        self.status.unwrap_or_default()
    }
}

impl LineItemDraft {
    fn parse(idx: usize, input: LineItemInput) -> InvoiceResult<Self> {
        let description = non_blank(input.description)
            .ok_or_else(|| InvoiceError::validation(format!("items[{idx}].description is required")))?;
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(InvoiceError::validation(format!(
                "items[{idx}].description must be at most {MAX_DESCRIPTION_LEN} characters"
            )));
        }

        let quantity = non_blank(input.quantity)
            .ok_or_else(|| InvoiceError::validation(format!("items[{idx}].quantity is required")))?;
        let quantity = parse_quantity(idx, &quantity)?;

        let unit_price = non_blank(input.unit_price)
            .ok_or_else(|| InvoiceError::validation(format!("items[{idx}].unitPrice is required")))?;
        let unit_price = UnitPrice::parse(&unit_price).map_err(|e| at_item(idx, "unitPrice", e))?;
        if unit_price.as_decimal() > MAX_UNIT_PRICE {
            return Err(InvoiceError::validation(format!(
                "items[{idx}].unitPrice must be at most {MAX_UNIT_PRICE}"
            )));
        }

        let line_total = line_total(quantity, &unit_price).map_err(|e| at_item(idx, "lineTotal", e))?;
        if line_total.cents() > MAX_AMOUNT_CENTS {
            return Err(InvoiceError::validation(format!(
                "items[{idx}] line total must be at most {}",
                Money::from_cents(MAX_AMOUNT_CENTS)
            )));
        }

        Ok(Self {
            description,
            quantity,
            unit_price,
            line_total,
        })
    }
}

/// A positive whole number that fits the `INT` column.
fn parse_quantity(idx: usize, text: &str) -> InvoiceResult<u32> {
    let value = text
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| {
            InvoiceError::invalid_literal(format!("items[{idx}].quantity '{text}' is not a number"))
        })?;
    if !value.fract().is_zero() {
        return Err(InvoiceError::validation(format!(
            "items[{idx}].quantity must be a whole number"
        )));
    }
    match value.to_i64() {
        Some(q) if q >= 1 && q <= i32::MAX as i64 => Ok(q as u32),
        Some(q) if q < 1 => Err(InvoiceError::validation(format!(
            "items[{idx}].quantity must be at least 1"
        ))),
        _ => Err(InvoiceError::validation(format!(
            "items[{idx}].quantity is too large"
        ))),
    }
}

fn at_item(idx: usize, field: &str, err: InvoiceError) -> InvoiceError {
    match err {
        InvoiceError::Validation(msg) => InvoiceError::Validation(format!("items[{idx}].{field}: {msg}")),
        InvoiceError::InvalidLiteral(msg) => {
            InvoiceError::InvalidLiteral(format!("items[{idx}].{field}: {msg}"))
        }
        other => other,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(description: &str, quantity: &str, unit_price: &str) -> LineItemInput {
        LineItemInput {
            description: Some(description.to_string()),
            quantity: Some(quantity.to_string()),
            unit_price: Some(unit_price.to_string()),
        }
    }

    fn valid_input() -> InvoiceInput {
        InvoiceInput {
            client_name: Some("Acme Corp".to_string()),
            client_address: Some("1 Main St\nSpringfield".to_string()),
            issue_date: Some("2024-03-01".to_string()),
            due_date: Some("2024-03-31".to_string()),
            status: None,
            items: Some(vec![item("Design", "2", "10.005"), item("Hosting", "1", "5")]),
        }
    }

    #[test]
    fn computes_line_and_invoice_totals_in_cents() {
        let draft = InvoiceDraft::parse(valid_input()).unwrap();
        assert_eq!(draft.items[0].line_total, Money::from_cents(2001));
        assert_eq!(draft.items[1].line_total, Money::from_cents(500));
        assert_eq!(draft.total_amount, Money::from_cents(2501));
        assert_eq!(draft.status, None);
        assert_eq!(draft.status_or_default(), InvoiceStatus::Draft);
    }

    #[test]
    fn reports_every_missing_field() {
        let err = InvoiceDraft::parse(InvoiceInput::default()).unwrap_err();
        match err {
            InvoiceError::Validation(msg) => {
                for field in ["clientName", "clientAddress", "issueDate", "dueDate", "items"] {
                    assert!(msg.contains(field), "{msg}");
                }
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let mut input = valid_input();
        input.client_name = Some("   ".to_string());
        let err = InvoiceDraft::parse(input).unwrap_err();
        assert!(matches!(err, InvoiceError::Validation(ref m) if m.contains("clientName")));
    }

    #[test]
    fn empty_items_are_rejected() {
        let mut input = valid_input();
        input.items = Some(vec![]);
        let err = InvoiceDraft::parse(input).unwrap_err();
        assert!(matches!(err, InvoiceError::Validation(ref m) if m.contains("items")));
    }

    #[test]
    fn due_date_before_issue_date_is_rejected() {
        let mut input = valid_input();
        input.due_date = Some("2024-02-28".to_string());
        let err = InvoiceDraft::parse(input).unwrap_err();
        assert!(matches!(err, InvoiceError::Validation(_)));
    }

    #[test]
    fn due_date_equal_to_issue_date_is_fine() {
        let mut input = valid_input();
        input.due_date = Some("2024-03-01".to_string());
        assert!(InvoiceDraft::parse(input).is_ok());
    }

    #[test]
    fn malformed_date_is_invalid_literal() {
        let mut input = valid_input();
        input.issue_date = Some("01/03/2024".to_string());
        let err = InvoiceDraft::parse(input).unwrap_err();
        assert_eq!(err.code(), "INVALID_LITERAL");
    }

    #[test]
    fn quantity_rules() {
        let cases = [
            ("0", "VALIDATION_ERROR"),
            ("-3", "VALIDATION_ERROR"),
            ("2.5", "VALIDATION_ERROR"),
            ("99999999999", "VALIDATION_ERROR"),
            ("two", "INVALID_LITERAL"),
        ];
        for (quantity, code) in cases {
            let mut input = valid_input();
            input.items = Some(vec![item("X", quantity, "1")]);
            let err = InvoiceDraft::parse(input).unwrap_err();
            assert_eq!(err.code(), code, "quantity {quantity:?}");
        }

        let mut input = valid_input();
        input.items = Some(vec![item("X", "3.0", "1")]);
        assert_eq!(InvoiceDraft::parse(input).unwrap().items[0].quantity, 3);
    }

    #[test]
    fn unit_price_rules() {
        let mut input = valid_input();
        input.items = Some(vec![item("X", "1", "-0.01")]);
        assert_eq!(InvoiceDraft::parse(input).unwrap_err().code(), "VALIDATION_ERROR");

        let mut input = valid_input();
        input.items = Some(vec![item("X", "1", "ten")]);
        let err = InvoiceDraft::parse(input).unwrap_err();
        assert_eq!(err.code(), "INVALID_LITERAL");
        assert!(err.to_string().contains("items[0].unitPrice"));

        let mut input = valid_input();
        input.items = Some(vec![item("Free sample", "4", "0")]);
        assert_eq!(InvoiceDraft::parse(input).unwrap().total_amount, Money::ZERO);
    }

    #[test]
    fn amount_limits_match_the_numeric_columns() {
        assert_eq!(MAX_UNIT_PRICE.to_string(), "9999999999.9999");
        assert_eq!(Money::from_cents(MAX_AMOUNT_CENTS).to_string(), "9999999999.99");
    }

    #[test]
    fn unit_price_above_column_limit_is_rejected() {
        let mut input = valid_input();
        input.items = Some(vec![item("X", "1", "123456789012")]);
        let err = InvoiceDraft::parse(input).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("items[0].unitPrice"), "{err}");

        let mut input = valid_input();
        input.items = Some(vec![item("X", "1", "9999999999.9999")]);
        let err = InvoiceDraft::parse(input).unwrap_err();
        assert!(err.to_string().contains("line total"), "{err}");

        let mut input = valid_input();
        input.items = Some(vec![item("X", "1", "9999999999.99")]);
        let draft = InvoiceDraft::parse(input).unwrap();
        assert_eq!(draft.total_amount.cents(), MAX_AMOUNT_CENTS);
    }

    #[test]
    fn line_total_above_column_limit_is_rejected() {
        let mut input = valid_input();
        input.items = Some(vec![item("X", "1000", "10000000")]);
        let err = InvoiceDraft::parse(input).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("items[0] line total"), "{err}");
    }

    #[test]
    fn invoice_total_above_column_limit_is_rejected() {
        let mut input = valid_input();
        input.items = Some(vec![
            item("X", "1", "6000000000"),
            item("Y", "1", "6000000000"),
        ]);
        let err = InvoiceDraft::parse(input).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("invoice total"), "{err}");
    }

    #[test]
    fn item_description_is_required() {
        let mut input = valid_input();
        input.items = Some(vec![item(" ", "1", "1")]);
        let err = InvoiceDraft::parse(input).unwrap_err();
        assert!(matches!(err, InvoiceError::Validation(ref m) if m.contains("items[0].description")));
    }

    #[test]
    fn explicit_status_is_kept() {
        let mut input = valid_input();
        input.status = Some("sent".to_string());
        assert_eq!(InvoiceDraft::parse(input).unwrap().status, Some(InvoiceStatus::Sent));

        let mut input = valid_input();
        input.status = Some("Archived".to_string());
        assert_eq!(InvoiceDraft::parse(input).unwrap_err().code(), "VALIDATION_ERROR");
    }

    #[test]
    fn overlong_client_name_is_rejected() {
        let mut input = valid_input();
        input.client_name = Some("x".repeat(MAX_NAME_LEN + 1));
        assert_eq!(InvoiceDraft::parse(input).unwrap_err().code(), "VALIDATION_ERROR");
    }
}
