use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("{service} lookup failed: {source}")]
    LookupFailed {
        service: String,
        source: reqwest::Error,
    },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("{message}")]
    InvalidInput { message: String },

    #[error("{service} service returned status {status}")]
    UpstreamStatus { service: String, status: u16 },

    #[error("Unsupported export format: {format}")]
    UnsupportedFormat { format: String },

    #[error("{message}")]
    NotFound { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Upstream,
    Configuration,
    Storage,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScannerError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 標記是哪個查詢服務的傳輸錯誤
    pub fn lookup_failed(service: &str, source: reqwest::Error) -> Self {
        Self::LookupFailed {
            service: service.to_string(),
            source,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } | Self::UnsupportedFormat { .. } | Self::NotFound { .. } => {
                ErrorCategory::Input
            }
            Self::HttpError(_) | Self::LookupFailed { .. } => ErrorCategory::Network,
            Self::UpstreamStatus { .. } => ErrorCategory::Upstream,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::ZipError(_) => ErrorCategory::Storage,
            Self::CsvError(_) | Self::SerializationError(_) => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Upstream => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => {
                "Check the IP address, network prefix or export format and try again"
            }
            ErrorCategory::Network => "Check network connectivity and try again later",
            ErrorCategory::Upstream => {
                "The registry or enrichment service rejected the request; try again later"
            }
            ErrorCategory::Configuration => "Review the configuration file and command line flags",
            ErrorCategory::Storage => "Check that the output path exists and is writable",
            ErrorCategory::Data => {
                "The upstream response could not be processed; rerun with --verbose for details"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::HttpError(e) if e.is_timeout() => "The lookup timed out".to_string(),
            Self::HttpError(_) => "Unable to reach the lookup service".to_string(),
            Self::LookupFailed { service, source } if source.is_timeout() => {
                format!("The {} lookup timed out", service)
            }
            Self::LookupFailed { service, .. } => {
                format!("Unable to reach the {} service", service)
            }
            Self::UpstreamStatus { service, status } => {
                format!("{} lookup failed (HTTP {})", service, status)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_is_low_severity() {
        let err = ScannerError::invalid_input("Invalid IP address or network: bad");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.to_string(), "Invalid IP address or network: bad");
    }

    #[test]
    fn test_upstream_status_message() {
        let err = ScannerError::UpstreamStatus {
            service: "Geolocation".to_string(),
            status: 503,
        };
        assert_eq!(err.to_string(), "Geolocation service returned status 503");
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.user_friendly_message(), "Geolocation lookup failed (HTTP 503)");
    }

    #[test]
    fn test_config_errors_are_critical() {
        let err = ScannerError::MissingConfigError {
            field: "server.bind_address".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
