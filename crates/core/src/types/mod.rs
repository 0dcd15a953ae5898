//! Core types for the storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;

pub use id::*;
pub use price::{
    CurrencyCode, DEFAULT_LOCALE, FormatPriceOptions, Locale, Price, REGION_CURRENCY,
    UnknownCurrency, format_price,
};
