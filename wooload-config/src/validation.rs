//! Per-domain validation

use crate::error::{ConfigError, ConfigResult};
use std::fmt::Display;

/// Implemented by every configuration domain
pub trait Validatable {
    fn validate(&self) -> ConfigResult<()>;

    /// Dotted path of the domain used in error messages, e.g. `site.credentials`
    fn domain_name(&self) -> &'static str;

    fn validation_error(&self, message: impl Into<String>) -> ConfigError {
        domain_error(self.domain_name(), message)
    }
}

fn domain_error(domain: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::DomainError {
        domain: domain.to_string(),
        message: message.into(),
    }
}

pub fn validate_required_string(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(domain_error(domain, format!("{} cannot be empty", field_name)));
    }
    Ok(())
}

/// `value` must be strictly greater than the type's default (zero)
pub fn validate_positive<T>(value: T, field_name: &str, domain: &str) -> ConfigResult<()>
where
    T: PartialOrd + Default + Display,
{
    if value <= T::default() {
        return Err(domain_error(
            domain,
            format!("{} must be greater than 0, got {}", field_name, value),
        ));
    }
    Ok(())
}

/// `min <= max`, equal bounds allowed
pub fn validate_ordered<T>(min: T, max: T, field_name: &str, domain: &str) -> ConfigResult<()>
where
    T: PartialOrd + Display,
{
    if min > max {
        return Err(domain_error(
            domain,
            format!("{} minimum {} is greater than maximum {}", field_name, min, max),
        ));
    }
    Ok(())
}

/// An absolute http(s) URL with a host
pub fn validate_http_url(url: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if url.trim().is_empty() {
        return Err(domain_error(domain, format!("{} cannot be empty", field_name)));
    }

    let parsed = url::Url::parse(url.trim())
        .map_err(|e| domain_error(domain, format!("{} '{}' is not a URL: {}", field_name, url, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(domain_error(
            domain,
            format!("{} must use http or https, got '{}'", field_name, parsed.scheme()),
        ));
    }
    if parsed.host_str().is_none() {
        return Err(domain_error(domain, format!("{} has no host", field_name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_http_url() {
        assert!(validate_http_url("https://shop.example.com", "url", "site").is_ok());
        assert!(validate_http_url("http://localhost:8080/shop/", "url", "site").is_ok());
        assert!(validate_http_url("", "url", "site").is_err());
        assert!(validate_http_url("/my-account/", "url", "site").is_err());

        let err = validate_http_url("ftp://example.com", "url", "site").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid site configuration: url must use http or https, got 'ftp'"
        );
    }

    #[test]
    fn test_validate_ordered() {
        assert!(validate_ordered(3, 8, "pause", "scenario").is_ok());
        assert!(validate_ordered(5, 5, "pause", "scenario").is_ok());

        let err = validate_ordered(9, 2, "pause", "scenario").unwrap_err();
        assert!(err.to_string().contains("pause minimum 9"));
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(1u64, "vus", "scenario.executor").is_ok());
        assert!(validate_positive(0u64, "vus", "scenario.executor").is_err());
        assert!(validate_positive(0.5f64, "ratio", "x").is_ok());
    }
}
