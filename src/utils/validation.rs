use crate::utils::error::{Result, ScannerError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> ScannerError {
    ScannerError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// 只接受 http / https
pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    let url = Url::parse(url_str)
        .map_err(|e| invalid(field_name, url_str, format!("Invalid URL format: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(
            field_name,
            url_str,
            format!("Unsupported URL scheme: {}", scheme),
        )),
    }
}

/// 端點模板必須包含一個 `{}` 佔位符，用來放入 IP 位址
pub fn validate_endpoint_template(field_name: &str, template: &str) -> Result<()> {
    if template.matches("{}").count() != 1 {
        return Err(invalid(
            field_name,
            template,
            "Template must contain exactly one '{}' placeholder",
        ));
    }
    validate_url(field_name, &template.replace("{}", "8.8.8.8"))
}

/// `host:port`，IPv6 需加中括號
pub fn validate_bind_address(field_name: &str, address: &str) -> Result<()> {
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| invalid(field_name, address, "Expected host:port"))?;

    if host.trim().is_empty() {
        return Err(invalid(field_name, address, "Host cannot be empty"));
    }
    port.parse::<u16>()
        .map_err(|_| invalid(field_name, address, format!("Invalid port: '{}'", port)))?;
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("rdap.endpoints.RIPE", "https://rdap.db.ripe.net/ip/").is_ok());
        assert!(validate_url("rdap.endpoints.RIPE", "http://localhost:8080/ip/").is_ok());
        assert!(validate_url("rdap.endpoints.RIPE", "").is_err());
        assert!(validate_url("rdap.endpoints.RIPE", "invalid-url").is_err());
        assert!(validate_url("rdap.endpoints.RIPE", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_endpoint_template() {
        let field = "geolocation.endpoint";
        assert!(validate_endpoint_template(field, "http://ipinfo.io/{}/json").is_ok());
        assert!(validate_endpoint_template(field, "http://ipinfo.io/json").is_err());
        assert!(validate_endpoint_template(field, "{}/{}").is_err());
    }

    #[test]
    fn test_validate_bind_address() {
        let field = "server.bind_address";
        assert!(validate_bind_address(field, "0.0.0.0:5000").is_ok());
        assert!(validate_bind_address(field, "[::1]:8080").is_ok());
        assert!(validate_bind_address(field, "localhost:80").is_ok());
        assert!(validate_bind_address(field, "   ").is_err());
        assert!(validate_bind_address(field, ":5000").is_err());
        assert!(validate_bind_address(field, "0.0.0.0:http").is_err());
        assert!(validate_bind_address(field, "0.0.0.0:70000").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("rdap.timeout_seconds", 10, 1, 120).is_ok());
        assert!(validate_range("rdap.timeout_seconds", 0, 1, 120).is_err());
        assert!(validate_path("output.path", "").is_err());
    }
}
