//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog prices are whole Naira amounts. Formatting follows the `en-NG`
//! currency style the storefront has always displayed: a `₦` prefix, comma
//! thousands grouping, and no fraction digits unless the amount has them.
//!
//! ```rust
//! use aioko_core::{CurrencyCode, Price, format_price};
//! use rust_decimal::Decimal;
//!
//! let price = Price::new(Decimal::new(45_000, 0), CurrencyCode::NGN);
//! assert_eq!(price.display(), "₦45,000");
//! assert_eq!(format_price(Decimal::new(12_345, 1)), "₦1,234.5");
//! ```

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Maximum number of fraction digits shown when formatting.
const MAX_FRACTION_DIGITS: u32 = 2;

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (Naira, not kobo).
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

    /// Create a price in the store currency.
    #[must_use]
    pub const fn ngn(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::NGN)
    }

    /// Format for display (e.g., "₦45,000").
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(MAX_FRACTION_DIGITS, RoundingStrategy::MidpointAwayFromZero)
            .normalize();
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let digits = rounded.abs().to_string();
        let (whole, fraction) = digits
            .split_once('.')
            .map_or((digits.as_str(), None), |(whole, fraction)| {
                (whole, Some(fraction))
            });

        let mut out = String::with_capacity(digits.len() + 8);
        if negative {
            out.push('-');
        }
        out.push_str(self.currency_code.symbol());
        out.push_str(&group_thousands(whole));
        if let Some(fraction) = fraction {
            out.push('.');
            out.push_str(fraction);
        }
        out
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Format an amount in the store currency.
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    Price::ngn(amount).display()
}

/// Insert a comma between every group of three integer digits.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// ISO 4217 currency codes.
///
/// The store sells in a single currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    NGN,
}

impl CurrencyCode {
    /// Display symbol placed before the amount.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::NGN => "₦",
        }
    }

    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NGN => "NGN",
        }
    }
}
