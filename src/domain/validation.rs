//! Field validators shared by the submission wizard and the services.

use url::Url;

use super::errors::FieldError;

/// Trimmed non-empty text no longer than `max_len` characters.
pub fn required_text(field: &str, raw: Option<&str>, max_len: usize) -> Result<String, FieldError> {
    let value = raw.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(FieldError::new(field, "This field is required."));
    }
    if value.chars().count() > max_len {
        return Err(FieldError::new(
            field,
            format!("Ensure this value has at most {} characters.", max_len),
        ));
    }
    Ok(value.to_string())
}

/// Absolute http(s) URL.
pub fn http_url(field: &str, raw: &str) -> Result<String, FieldError> {
    let raw = raw.trim();
    match Url::parse(raw) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(url.to_string()),
        _ => Err(FieldError::new(field, "Enter a valid URL.")),
    }
}

/// Like [`http_url`], but blank input means "not provided".
pub fn optional_http_url(field: &str, raw: Option<&str>) -> Result<Option<String>, FieldError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => http_url(field, value).map(Some),
    }
}

/// Largest price that fits ten digits with two decimals.
pub const MAX_PRICE: f64 = 99_999_999.99;

/// Strictly positive price with at most ten digits, two of them decimals.
pub fn price(field: &str, raw: f64) -> Result<f64, FieldError> {
    if !raw.is_finite() || raw <= 0.0 {
        return Err(FieldError::new(field, "Enter a price greater than zero."));
    }
    if raw > MAX_PRICE {
        return Err(FieldError::new(
            field,
            "Ensure that there are no more than 10 digits in total.",
        ));
    }
    let cents = raw * 100.0;
    if (cents - cents.round()).abs() > 1e-6 {
        return Err(FieldError::new(
            field,
            "Ensure that there are no more than 2 decimal places.",
        ));
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims_and_bounds() {
        assert_eq!(required_text("title", Some("  Dune "), 10).unwrap(), "Dune");
        assert!(required_text("title", Some("   "), 10).is_err());
        assert!(required_text("title", None, 10).is_err());
        let err = required_text("asin", Some("B0123456789"), 10).unwrap_err();
        assert_eq!(err.field, "asin");
    }

    #[test]
    fn urls_must_be_web_links() {
        assert!(http_url("link", "https://www.goodreads.com/book/show/1").is_ok());
        assert!(http_url("link", "ftp://example.com/file").is_err());
        assert!(http_url("link", "not a url").is_err());
        assert_eq!(optional_http_url("link", Some("  ")).unwrap(), None);
    }

    #[test]
    fn prices() {
        assert_eq!(price("book_price", 2.99).unwrap(), 2.99);
        assert!(price("book_price", 0.0).is_err());
        assert!(price("book_price", -1.0).is_err());
        assert!(price("book_price", 1.999).is_err());
        assert_eq!(price("book_price", MAX_PRICE).unwrap(), MAX_PRICE);
        let err = price("book_price", 100_000_000.0).unwrap_err();
        assert!(err.message.contains("10 digits"));
    }
}
