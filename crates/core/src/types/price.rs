//! Service price representation using decimal arithmetic.
//!
//! Service records store their price as free text entered by the provider
//! ("25", "25.5", "$40"). [`Price::parse_lenient`] recovers a decimal amount
//! when there is one so the admin can show a consistent format; anything
//! else is displayed verbatim by the caller.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Parse a provider-entered price string in the default currency.
    ///
    /// Accepts an optional leading currency symbol and surrounding
    /// whitespace. Returns `None` for empty, negative or non-numeric input.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let trimmed = raw.trim().trim_start_matches(['$', '€', '£']).trim();
        let amount = Decimal::from_str(trimmed).ok()?;
        if amount.is_sign_negative() {
            return None;
        }
        Some(Self::new(amount, CurrencyCode::default()))
    }

    /// Format for display (e.g., "$19.99").
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{}{:.2}",
            self.currency_code.symbol(),
            self.amount.round_dp(2)
        )
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}
