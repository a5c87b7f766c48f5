//! Fixed-point money.
//!
//! Amounts are held as integer minor units (cents) so that totals never drift
//! under repeated summation. Decimals only appear at the edges: parsing user
//! input, binding `NUMERIC` columns and rendering JSON strings.

use core::fmt;
use core::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};

use crate::error::{InvoiceError, InvoiceResult};

/// Maximum number of fraction digits kept on a unit price.
pub const UNIT_PRICE_SCALE: u32 = 4;

/// An amount of money in minor units (cents).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Round an exact decimal to the nearest cent (midpoint away from zero).
    pub fn from_decimal(value: Decimal) -> InvoiceResult<Self> {
        let cents = value
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or_else(|| InvoiceError::validation("amount out of range"))?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        cents
            .to_i64()
            .map(Self)
            .ok_or_else(|| InvoiceError::validation("amount out of range"))
    }

    /// Decimal representation with scale 2 (for `NUMERIC(12,2)` columns).
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    pub fn checked_add(self, other: Money) -> InvoiceResult<Money> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| InvoiceError::validation("invoice total overflow"))
    }

    /// Sum amounts, failing on overflow instead of wrapping.
    pub fn try_sum<I>(amounts: I) -> InvoiceResult<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, m| acc.checked_add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_decimal(), f)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Price of a single unit. Non-negative; may carry sub-cent precision.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UnitPrice(Decimal);

impl UnitPrice {
    /// Validate an exact decimal as a unit price.
    pub fn from_decimal(value: Decimal) -> InvoiceResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(InvoiceError::validation("unit price must not be negative"));
        }
        Ok(Self(
            value.round_dp_with_strategy(UNIT_PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero),
        ))
    }

    /// Parse a decimal literal such as `"10.005"` or `"1e-2"`.
    pub fn parse(text: &str) -> InvoiceResult<Self> {
        let text = text.trim();
        let value = Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map_err(|_| InvoiceError::invalid_literal(format!("unit price '{text}' is not a number")))?;
        Self::from_decimal(value)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for UnitPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = self.0.normalize();
        if d.scale() < 2 {
            d.rescale(2);
        }
        fmt::Display::fmt(&d, f)
    }
}

impl Serialize for UnitPrice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `quantity × unit price`, computed exactly and rounded once to cents.
pub fn line_total(quantity: u32, unit_price: &UnitPrice) -> InvoiceResult<Money> {
    let exact = Decimal::from(quantity)
        .checked_mul(unit_price.as_decimal())
        .ok_or_else(|| InvoiceError::validation("line total out of range"))?;
    Money::from_decimal(exact)
}
