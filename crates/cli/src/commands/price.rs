//! Price formatting command.

use medusa_storefront_core::{CurrencyCode, Locale, Price, REGION_CURRENCY};

use super::CliError;

/// Print `amount` (minor units) in the given currency and locale.
///
/// # Errors
///
/// Returns an error for currencies the storefront cannot render.
#[allow(clippy::print_stdout)]
pub fn print(
    amount: Option<i64>,
    currency: Option<&str>,
    quantity: Option<u32>,
    locale: Locale,
) -> Result<(), CliError> {
    println!("{}", format(amount, currency, quantity, locale)?);
    Ok(())
}

fn format(
    amount: Option<i64>,
    currency: Option<&str>,
    quantity: Option<u32>,
    locale: Locale,
) -> Result<String, CliError> {
    let currency = currency
        .map(str::parse::<CurrencyCode>)
        .transpose()?
        .unwrap_or(REGION_CURRENCY);

    Ok(Price::from_minor_units(amount.unwrap_or(0), currency)
        .times(quantity.unwrap_or(1))
        .display(locale))
}
