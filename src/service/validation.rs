//! Field rules shared by request shapes. Every failure is an `AppError::Validation`.

use crate::error::AppError;
use rust_decimal::Decimal;
use url::Url;

pub fn max_length(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

pub fn not_blank(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be blank", field)));
    }
    Ok(())
}

/// At most `max_digits` significant digits, `decimal_places` of them after the point.
pub fn decimal(field: &str, value: &Decimal, max_digits: u32, decimal_places: u32) -> Result<(), AppError> {
    let normalized = value.normalize();
    if normalized.scale() > decimal_places {
        return Err(AppError::Validation(format!(
            "{} must have at most {} decimal places",
            field, decimal_places
        )));
    }
    let integer_digits = normalized.trunc().abs().to_string().trim_start_matches('0').len() as u32;
    if integer_digits > max_digits - decimal_places {
        return Err(AppError::Validation(format!(
            "{} must have at most {} digits",
            field, max_digits
        )));
    }
    Ok(())
}

pub fn http_url(field: &str, value: &Url, max: usize) -> Result<(), AppError> {
    if !matches!(value.scheme(), "http" | "https") {
        return Err(AppError::Validation(format!("{} must be an http(s) URL", field)));
    }
    max_length(field, value.as_str(), max)
}

pub fn required<T>(field: &str, value: &Option<T>) -> Result<(), AppError> {
    if value.is_none() {
        return Err(AppError::Validation(format!("{} may not be null", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn decimal_places_and_digits() {
        assert!(decimal("price", &dec("10.00"), 12, 2).is_ok());
        assert!(decimal("price", &dec("10.500"), 12, 2).is_ok());
        assert!(decimal("price", &dec("9999999999.99"), 12, 2).is_ok());
        assert!(decimal("price", &dec("10.001"), 12, 2).is_err());
        assert!(decimal("price", &dec("10000000000"), 12, 2).is_err());
        assert!(decimal("price", &dec("0.5"), 12, 2).is_ok());
    }

    #[test]
    fn urls_must_be_http() {
        let ok = Url::parse("https://example.com/a.png").unwrap();
        let ftp = Url::parse("ftp://example.com/a.png").unwrap();
        assert!(http_url("image", &ok, 1024).is_ok());
        assert!(http_url("image", &ftp, 1024).is_err());
        assert!(http_url("image", &ok, 10).is_err());
    }

    #[test]
    fn lengths_count_characters() {
        assert!(max_length("name", "żółw", 4).is_ok());
        assert!(max_length("name", "żółwie", 4).is_err());
        assert!(not_blank("name", "  ").is_err());
    }
}
