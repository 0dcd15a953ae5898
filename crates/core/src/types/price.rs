//! Type-safe price representation using decimal arithmetic.
//!
//! Commerce amounts arrive as integer minor units (cents). They are turned
//! into a [`Price`] and rendered the way `Intl.NumberFormat` renders the
//! `currency` style for the supported locales:
//!
//! ```rust
//! use medusa_storefront_core::{FormatPriceOptions, format_price};
//!
//! assert_eq!(format_price(Some(123_456), FormatPriceOptions::default()), "$1,234.56");
//! assert_eq!(format_price(None, FormatPriceOptions::default()), "$0.00");
//! ```

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Currency used for every price shown by the storefront.
///
/// Not yet selectable per shopper.
pub const REGION_CURRENCY: CurrencyCode = CurrencyCode::USD;

/// Locale used for every price shown by the storefront.
///
/// Not yet detected from the shopper's browser.
pub const DEFAULT_LOCALE: Locale = Locale::EnUs;

const NO_BREAK_SPACE: char = '\u{a0}';

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

    /// Create a price from an amount in minor units (cents).
    #[must_use]
    pub fn from_minor_units(amount: i64, currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::new(amount, 2), currency_code)
    }

    /// Multiply the price by a quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }

    /// Render the price for a locale, e.g. `$19.99` or `19,99 €`.
    #[must_use]
    pub fn display(&self, locale: Locale) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = format!("{:.2}", rounded.abs());
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));
        let grouped = group_thousands(whole, locale.group_separator());
        let number = format!("{grouped}{}{fraction}", locale.decimal_separator());
        let symbol = self.currency_code.symbol(locale);

        match locale {
            Locale::EnUs => format!("{sign}{symbol}{number}"),
            Locale::DeDe => format!("{sign}{number}{NO_BREAK_SPACE}{symbol}"),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display(DEFAULT_LOCALE))
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Lowercase code as used by the commerce backend (`usd`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::USD => "usd",
            Self::EUR => "eur",
            Self::GBP => "gbp",
            Self::CAD => "cad",
            Self::AUD => "aud",
        }
    }

    /// Whether a backend currency code names this currency.
    #[must_use]
    pub fn matches(&self, code: &str) -> bool {
        code.eq_ignore_ascii_case(self.as_str())
    }

    /// Currency symbol as rendered in the given locale.
    #[must_use]
    pub const fn symbol(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::USD, _) => "$",
            (Self::EUR, _) => "€",
            (Self::GBP, _) => "£",
            (Self::CAD, _) => "CA$",
            (Self::AUD, Locale::EnUs) => "A$",
            (Self::AUD, Locale::DeDe) => "AU$",
        }
    }
}

/// Returned when a currency code is not one the storefront can render.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported currency code: {0}")]
pub struct UnknownCurrency(pub String);

impl FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::USD, Self::EUR, Self::GBP, Self::CAD, Self::AUD]
            .into_iter()
            .find(|code| code.matches(s))
            .ok_or_else(|| UnknownCurrency(s.to_string()))
    }
}

/// Locales prices can be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    /// `en-US`: `$1,234.56`
    #[default]
    EnUs,
    /// `de-DE`: `1.234,56 $`
    DeDe,
}

impl Locale {
    /// BCP 47 tag.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::DeDe => "de-DE",
        }
    }

    const fn group_separator(self) -> char {
        match self {
            Self::EnUs => ',',
            Self::DeDe => '.',
        }
    }

    const fn decimal_separator(self) -> char {
        match self {
            Self::EnUs => '.',
            Self::DeDe => ',',
        }
    }
}

/// Options for [`format_price`]. Unset fields fall back to the region
/// currency and a quantity of one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatPriceOptions {
    pub currency: Option<CurrencyCode>,
    pub quantity: Option<u32>,
}

impl FormatPriceOptions {
    /// Options with only a quantity set.
    #[must_use]
    pub const fn with_quantity(quantity: u32) -> Self {
        Self {
            currency: None,
            quantity: Some(quantity),
        }
    }
}

/// Format a minor-unit amount as a currency string in the default locale.
///
/// A missing amount is rendered as zero. The quantity multiplier is applied
/// before formatting.
#[must_use]
pub fn format_price(amount: Option<i64>, options: FormatPriceOptions) -> String {
    let currency = options.currency.unwrap_or(REGION_CURRENCY);
    let quantity = options.quantity.unwrap_or(1);

    Price::from_minor_units(amount.unwrap_or(0), currency)
        .times(quantity)
        .display(DEFAULT_LOCALE)
}

fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}
