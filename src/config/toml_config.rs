use crate::core::asn::DEFAULT_ASN_ENDPOINT;
use crate::core::geolocation::DEFAULT_GEOLOCATION_ENDPOINT;
use crate::core::rdap::DEFAULT_ENDPOINTS;
use crate::domain::model::Rir;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, ScannerError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub server: ServerConfig,
    pub rdap: RdapConfig,
    pub geolocation: EndpointConfig,
    pub asn: EndpointConfig,
    pub batch: BatchConfig,
    pub history: HistoryConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RdapConfig {
    pub timeout_seconds: u64,
    /// 以 RIR 名稱為鍵覆寫預設端點，例如 `RIPE = "https://..."`
    pub endpoints: HashMap<String, String>,
}

impl Default for RdapConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            endpoints: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub max_ips: usize,
    pub display_limit: usize,
    pub concurrent_requests: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_ips: 100,
            display_limit: 50,
            concurrent_requests: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_entries: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./output".to_string(),
        }
    }
}

impl ScannerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScannerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScannerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RDAP_PROXY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScannerError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_bind_address("server.bind_address", &self.server.bind_address)?;
        validation::validate_range("rdap.timeout_seconds", self.rdap.timeout_seconds, 1, 300)?;

        for (name, url) in &self.rdap.endpoints {
            if Rir::from_name(name).is_none() {
                return Err(ScannerError::InvalidConfigValueError {
                    field: "rdap.endpoints".to_string(),
                    value: name.clone(),
                    reason: "Unknown RIR. Valid names: ARIN, RIPE, APNIC, LACNIC, AFRINIC"
                        .to_string(),
                });
            }
            validation::validate_url(&format!("rdap.endpoints.{}", name), url)?;
        }

        validation::validate_endpoint_template(
            "geolocation.endpoint",
            self.geolocation_endpoint(),
        )?;
        validation::validate_endpoint_template("asn.endpoint", self.asn_endpoint())?;

        validation::validate_range("batch.max_ips", self.batch.max_ips, 1, 10_000)?;
        validation::validate_range("batch.display_limit", self.batch.display_limit, 1, 10_000)?;
        validation::validate_range(
            "batch.concurrent_requests",
            self.batch.concurrent_requests,
            1,
            64,
        )?;

        validation::validate_path("output.path", &self.output.path)?;

        Ok(())
    }

    pub fn display_limit(&self) -> usize {
        self.batch.display_limit
    }

    pub fn history_limit(&self) -> usize {
        self.history.max_entries
    }

    pub fn output_path(&self) -> &str {
        &self.output.path
    }

    pub fn bind_address(&self) -> &str {
        &self.server.bind_address
    }
}

impl ConfigProvider for ScannerConfig {
    fn rdap_endpoint(&self, rir: Rir) -> &str {
        self.rdap
            .endpoints
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(rir.as_str()))
            .map(|(_, url)| url.as_str())
            .or_else(|| {
                DEFAULT_ENDPOINTS
                    .iter()
                    .find(|(candidate, _)| *candidate == rir)
                    .map(|(_, url)| *url)
            })
            .unwrap_or_default()
    }

    fn geolocation_endpoint(&self) -> &str {
        self.geolocation
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_GEOLOCATION_ENDPOINT)
    }

    fn asn_endpoint(&self) -> &str {
        self.asn.endpoint.as_deref().unwrap_or(DEFAULT_ASN_ENDPOINT)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.rdap.timeout_seconds)
    }

    fn concurrent_requests(&self) -> usize {
        self.batch.concurrent_requests
    }

    fn max_batch_size(&self) -> usize {
        self.batch.max_ips
    }
}

impl Validate for ScannerConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_without_any_sections() {
        let config = ScannerConfig::from_toml_str("").unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert_eq!(config.rdap_endpoint(Rir::Ripe), "https://rdap.db.ripe.net/ip/");
        assert_eq!(config.geolocation_endpoint(), "http://ipinfo.io/{}/json");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.display_limit(), 50);
        assert_eq!(config.history_limit(), 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
bind_address = "127.0.0.1:8080"

[rdap]
timeout_seconds = 5

[rdap.endpoints]
ripe = "http://localhost:9000/ripe/ip/"

[geolocation]
endpoint = "http://localhost:9000/geo/{}"

[batch]
max_ips = 20
concurrent_requests = 2

[history]
max_entries = 3
"#;

        let config = ScannerConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.rdap_endpoint(Rir::Ripe), "http://localhost:9000/ripe/ip/");
        assert_eq!(config.rdap_endpoint(Rir::Arin), "https://rdap.arin.net/registry/ip/");
        assert_eq!(config.geolocation_endpoint(), "http://localhost:9000/geo/{}");
        assert_eq!(config.max_batch_size(), 20);
        assert_eq!(config.concurrent_requests(), 2);
        assert_eq!(config.display_limit(), 50);
        assert_eq!(config.history_limit(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("RIPESCANNER_TEST_ASN", "http://asn.internal/lookup?q={}");

        let toml_content = r#"
[asn]
endpoint = "${RIPESCANNER_TEST_ASN}"
"#;

        let config = ScannerConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.asn_endpoint(), "http://asn.internal/lookup?q={}");

        std::env::remove_var("RIPESCANNER_TEST_ASN");
    }

    #[test]
    fn test_config_validation() {
        let unknown_rir = r#"
[rdap.endpoints]
IANA = "https://rdap.iana.org/ip/"
"#;
        let config = ScannerConfig::from_toml_str(unknown_rir).unwrap();
        assert!(config.validate().is_err());

        let bad_template = r#"
[geolocation]
endpoint = "http://ipinfo.io/json"
"#;
        let config = ScannerConfig::from_toml_str(bad_template).unwrap();
        assert!(config.validate().is_err());

        let zero_concurrency = r#"
[batch]
concurrent_requests = 0
"#;
        let config = ScannerConfig::from_toml_str(zero_concurrency).unwrap();
        assert!(config.validate().is_err());

        let missing_port = r#"
[server]
bind_address = "127.0.0.1"
"#;
        let config = ScannerConfig::from_toml_str(missing_port).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = ScannerConfig::from_toml_str("[server\nbind_address = 1").unwrap_err();
        assert!(matches!(err, ScannerError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[output]
path = "/tmp/ripescanner-exports"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = ScannerConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output_path(), "/tmp/ripescanner-exports");
    }
}
