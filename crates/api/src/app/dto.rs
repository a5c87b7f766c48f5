use serde::{Deserialize, Serialize};

use invoicer_core::{InvoiceError, InvoiceId, LineItemId, Money, UnitPrice, format_ymd};
use invoicer_invoicing::{
    Invoice, InvoiceInput, InvoiceStatus, InvoiceWithItems, LineItem, LineItemInput, Page, PageMeta,
};

// -------------------------
// Request DTOs
// -------------------------

/// Query string of `GET /invoices`. Values stay textual; the listing
/// normalizes them instead of rejecting.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    #[serde(rename = "perPage")]
    pub per_page: Option<String>,
    pub q: Option<String>,
}

/// Body of `POST /invoices` and `PUT /invoices/:id`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    pub client_name: Option<String>,
    pub client_address: Option<String>,
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
    /// Kept untyped so a non-list is reported as a validation failure.
    pub items: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    pub description: Option<String>,
    pub quantity: Option<NumberOrString>,
    pub unit_price: Option<NumberOrString>,
}

/// `2`, `10.005` and `"10.005"` are all accepted for numeric item fields.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(serde_json::Number),
    Text(String),
}

impl NumberOrString {
    fn into_text(self) -> String {
        match self {
            NumberOrString::Number(n) => n.to_string(),
            NumberOrString::Text(s) => s,
        }
    }
}

impl TryFrom<InvoiceRequest> for InvoiceInput {
    type Error = InvoiceError;

    fn try_from(req: InvoiceRequest) -> Result<Self, Self::Error> {
        let items = match req.items {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::Array(items)) => Some(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(idx, item)| line_item_from_json(idx, item))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Some(_) => return Err(InvoiceError::validation("items must be a list")),
        };

        Ok(InvoiceInput {
            client_name: req.client_name,
            client_address: req.client_address,
            issue_date: req.issue_date,
            due_date: req.due_date,
            status: req.status,
            items,
        })
    }
}

fn line_item_from_json(idx: usize, item: serde_json::Value) -> Result<LineItemInput, InvoiceError> {
    if !item.is_object() {
        return Err(InvoiceError::validation(format!("items[{idx}] must be an object")));
    }
    serde_json::from_value::<LineItemRequest>(item)
        .map(LineItemInput::from)
        .map_err(|e| InvoiceError::invalid_literal(format!("items[{idx}]: {e}")))
}

impl From<LineItemRequest> for LineItemInput {
    fn from(req: LineItemRequest) -> Self {
        LineItemInput {
            description: req.description,
            quantity: req.quantity.map(NumberOrString::into_text),
            unit_price: req.unit_price.map(NumberOrString::into_text),
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub client_name: String,
    pub client_address: String,
    pub issue_date: String,
    pub due_date: String,
    pub total_amount: Money,
    pub status: InvoiceStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<LineItemResponse>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemResponse {
    pub id: LineItemId,
    pub description: String,
    pub quantity: u32,
    pub unit_price: UnitPrice,
    pub line_total: Money,
}

#[derive(Debug, Serialize)]
pub struct InvoiceListResponse {
    pub data: Vec<InvoiceResponse>,
    pub meta: PageMeta,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

impl From<Invoice> for InvoiceResponse {
    fn from(inv: Invoice) -> Self {
        InvoiceResponse {
            id: inv.id,
            invoice_number: inv.invoice_number,
            client_name: inv.client_name,
            client_address: inv.client_address,
            issue_date: format_ymd(inv.issue_date),
            due_date: format_ymd(inv.due_date),
            total_amount: inv.total_amount,
            status: inv.status,
            created_at: inv.created_at,
            updated_at: inv.updated_at,
            items: None,
        }
    }
}

impl From<InvoiceWithItems> for InvoiceResponse {
    fn from(full: InvoiceWithItems) -> Self {
        let items = full.items.into_iter().map(LineItemResponse::from).collect();
        InvoiceResponse {
            items: Some(items),
            ..InvoiceResponse::from(full.invoice)
        }
    }
}

impl From<LineItem> for LineItemResponse {
    fn from(item: LineItem) -> Self {
        LineItemResponse {
            id: item.id,
            description: item.description,
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total,
        }
    }
}

impl From<Page<Invoice>> for InvoiceListResponse {
    fn from(page: Page<Invoice>) -> Self {
        InvoiceListResponse {
            data: page.items.into_iter().map(InvoiceResponse::from).collect(),
            meta: page.meta,
        }
    }
}
