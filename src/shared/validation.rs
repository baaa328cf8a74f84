use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

lazy_static! {
    /// Regex for price fields: digits, a dot, exactly two decimal digits
    /// - Valid: "10.99", "0.50", "010.00"
    /// - Invalid: "10", "10.9", "10.999", ".99", "-1.00", "1,00"
    pub static ref PRICE_REGEX: Regex = Regex::new(r"^[0-9]+\.[0-9]{2}$").unwrap();

    /// Regex for whole, non-negative numbers; leading zeros are tolerated
    /// - Valid: "0", "103", "007"
    /// - Invalid: "-1", "1.0", "1e3", ""
    pub static ref WHOLE_NUMBER_REGEX: Regex = Regex::new(r"^[0-9]+$").unwrap();
}

pub const PRICE_FORMAT_MESSAGE: &str = "Price must have exactly two decimal places";
pub const PRICE_POSITIVE_MESSAGE: &str = "Price must be greater than 0";
pub const PRICE_MAX_MESSAGE: &str = "Price must be less than 100000000.00";
pub const QUANTITY_MESSAGE: &str = "Must be a whole number";
pub const NAME_MAX_MESSAGE: &str = "Name must be at most 100 characters";

/// Widest name the `VARCHAR(100)` name columns accept
pub const NAME_MAX_CHARS: usize = 100;

/// Smallest price that no longer fits `NUMERIC(10, 2)`
const PRICE_LIMIT: i64 = 100_000_000;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Parse a price that has exactly two decimal digits and is above zero.
pub fn parse_price(value: &str) -> Result<Decimal, ValidationError> {
    if !PRICE_REGEX.is_match(value) {
        return Err(error("price_format", PRICE_FORMAT_MESSAGE));
    }

    let price = value
        .parse::<Decimal>()
        .map_err(|_| error("price_format", PRICE_FORMAT_MESSAGE))?;

    if price <= Decimal::ZERO {
        return Err(error("price_positive", PRICE_POSITIVE_MESSAGE));
    }
    if price >= Decimal::from(PRICE_LIMIT) {
        return Err(error("price_max", PRICE_MAX_MESSAGE));
    }

    Ok(price)
}

/// Parse a stock quantity: a whole number, zero or more.
pub fn parse_quantity(value: &str) -> Result<i32, ValidationError> {
    if !WHOLE_NUMBER_REGEX.is_match(value) {
        return Err(error("quantity", QUANTITY_MESSAGE));
    }

    // Leading zeros are fine, values past i32 are not
    value
        .parse::<i32>()
        .map_err(|_| error("quantity", QUANTITY_MESSAGE))
}

/// Names are stored in `VARCHAR(100)` columns, counted in characters
pub fn validate_name_length(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() > NAME_MAX_CHARS {
        return Err(error("name_max", NAME_MAX_MESSAGE));
    }
    Ok(())
}

pub fn validate_price(value: &str) -> Result<(), ValidationError> {
    parse_price(value).map(|_| ())
}

pub fn validate_quantity(value: &str) -> Result<(), ValidationError> {
    parse_quantity(value).map(|_| ())
}

/// Flatten validator errors into display messages, following `fields` order.
pub fn error_messages(errors: &ValidationErrors, fields: &[&str]) -> Vec<String> {
    let by_field = errors.field_errors();

    fields
        .iter()
        .filter_map(|field| by_field.get(*field))
        .flat_map(|errs| errs.iter())
        .map(|e| {
            e.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid value ({})", e.code))
        })
        .collect()
}
