//! Listing parameters and page metadata.
//!
//! Listing never rejects input: anything malformed falls back to a default.

use serde::Serialize;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

/// Normalized listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: u32,
    pub per_page: u32,
    /// Trimmed search text; `None` when empty.
    pub search: Option<String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            search: None,
        }
    }
}

impl ListParams {
    /// Coerce raw query-string values.
    ///
    /// Numbers must be finite and positive; fractions are floored. `per_page`
    /// is clamped to `1..=100`.
    pub fn normalize(page: Option<&str>, per_page: Option<&str>, search: Option<&str>) -> Self {
        let page = coerce_positive(page).unwrap_or(DEFAULT_PAGE);
        let per_page = coerce_positive(per_page)
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Self {
            page,
            per_page,
            search,
        }
    }

    pub fn limit(&self) -> u64 {
        self.per_page as u64
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }

    /// Case-insensitive substring match used by stores without `ILIKE`.
    pub fn matches(&self, invoice_number: &str, client_name: &str) -> bool {
        match &self.search {
            None => true,
            Some(q) => {
                let q = q.to_lowercase();
                invoice_number.to_lowercase().contains(&q) || client_name.to_lowercase().contains(&q)
            }
        }
    }

    /// `%q%` with LIKE metacharacters escaped (escape character `\`).
    pub fn like_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|q| {
            let mut pattern = String::with_capacity(q.len() + 2);
            pattern.push('%');
            for c in q.chars() {
                if matches!(c, '%' | '_' | '\\') {
                    pattern.push('\\');
                }
                pattern.push(c);
            }
            pattern.push('%');
            pattern
        })
    }
}

fn coerce_positive(raw: Option<&str>) -> Option<u32> {
    let value: f64 = raw?.trim().parse().ok()?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    Some(value.floor().clamp(1.0, u32::MAX as f64) as u32)
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_prev: bool,
    pub has_next: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

impl PageMeta {
    /// Pages past the end are not clamped: they report `has_next = false`
    /// and the caller gets an empty page.
    pub fn new(params: &ListParams, total: u64) -> Self {
        let per_page = params.per_page.max(1) as u64;
        let total_pages = total.div_ceil(per_page).max(1);
        Self {
            page: params.page,
            per_page: params.per_page,
            total,
            total_pages,
            has_prev: params.page > 1,
            has_next: (params.page as u64) < total_pages,
            q: params.search.clone(),
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}
