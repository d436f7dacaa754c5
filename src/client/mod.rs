//! Typed client for the scanner HTTP API, mirroring what the lookup form does:
//! live validation, batch submission, export downloads and analytics.

pub mod live;

pub use live::{LiveValidator, ValidationState, Validator};

use crate::domain::model::{AnalyticsSnapshot, BatchReport, ValidationResult};
use crate::utils::error::{Result, ScannerError};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// 表單上「載入範例」使用的批次輸入
pub const SAMPLE_IP_LIST: &str = "# Sample IP addresses for testing
8.8.8.8
1.1.1.1
208.67.222.222
139.191.0.0/24
# Google DNS
8.8.4.4
# Cloudflare DNS
1.0.0.1";

/// 送出前的空白檢查
pub fn check_submission(text: &str) -> Result<&str> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ScannerError::invalid_input(
            "Please enter an IP address or network",
        ));
    }
    Ok(text)
}

pub struct ScannerClient {
    client: Client,
    base_url: String,
}

impl ScannerClient {
    pub fn new(base_url: &str) -> Result<Self> {
        validate_url("base_url", base_url)?;
        let client = Client::builder().timeout(Duration::from_secs(120)).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn validate(&self, ip_address: &str) -> Result<ValidationResult> {
        #[derive(Serialize)]
        struct Body<'a> {
            ip_address: &'a str,
        }

        let response = self
            .client
            .post(self.url("/validate"))
            .json(&Body { ip_address })
            .send()
            .await?;
        Ok(response.json().await?)
    }

    /// 伺服器在拒絕時也回傳 JSON，所以不檢查狀態碼
    pub async fn batch_lookup(&self, ip_list: &str) -> Result<BatchReport> {
        let ip_list = check_submission(ip_list).map_err(|_| {
            ScannerError::invalid_input("Please enter IP addresses to process")
        })?;

        let response = self
            .client
            .post(self.url("/batch_lookup"))
            .form(&[("ip_list", ip_list)])
            .send()
            .await?;
        tracing::debug!("Batch lookup response status: {}", response.status());
        Ok(response.json().await?)
    }

    pub async fn export(&self, format: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(self.url(&format!("/export/{}", format)))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ScannerError::UpstreamStatus {
                service: "Export".to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn analytics(&self) -> Result<AnalyticsSnapshot> {
        let response = self.client.get(self.url("/analytics")).send().await?;
        if !response.status().is_success() {
            return Err(ScannerError::UpstreamStatus {
                service: "Analytics".to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Validator for ScannerClient {
    async fn check(&self, ip_address: &str) -> Result<ValidationResult> {
        self.validate(ip_address).await
    }
}

/// 結果表格的一列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRow {
    pub ip: String,
    pub rir: String,
    pub organization: String,
    pub country: String,
    pub asn: String,
}

impl BatchReport {
    /// 成功筆數佔全部的百分比
    pub fn success_percentage(&self) -> f64 {
        if self.total_processed == 0 {
            return 0.0;
        }
        let total = self.total_processed + self.total_errors;
        self.total_processed as f64 / total as f64 * 100.0
    }

    pub fn rows(&self) -> Vec<BatchRow> {
        const UNKNOWN: &str = "Unknown";

        self.results
            .iter()
            .map(|item| {
                let rdap = item.rdap.found();
                let geo = item.geolocation.found();
                let country = geo
                    .map(|g| {
                        if g.country_name.is_empty() {
                            g.country.clone()
                        } else {
                            g.country_name.clone()
                        }
                    })
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| UNKNOWN.to_string());

                BatchRow {
                    ip: item.ip.clone(),
                    rir: rdap
                        .map(|r| r.rir.to_string())
                        .unwrap_or_else(|| UNKNOWN.to_string()),
                    organization: rdap
                        .and_then(|r| r.organization.clone())
                        .unwrap_or_else(|| UNKNOWN.to_string()),
                    country,
                    asn: item
                        .asn
                        .found()
                        .map(|a| a.asn_number.clone())
                        .unwrap_or_else(|| UNKNOWN.to_string()),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::batch::parse_ip_list;
    use crate::domain::model::{BatchItem, GeoLocation, Outcome};

    #[test]
    fn test_check_submission() {
        assert_eq!(check_submission("  8.8.8.8 ").unwrap(), "8.8.8.8");
        let err = check_submission(" \n ").unwrap_err();
        assert_eq!(err.to_string(), "Please enter an IP address or network");
    }

    #[test]
    fn test_sample_list_parses_to_six_entries() {
        let ips = parse_ip_list(SAMPLE_IP_LIST);
        assert_eq!(ips.len(), 6);
        assert_eq!(ips[3], "139.191.0.0/24");
    }

    #[test]
    fn test_success_percentage() {
        let mut report = BatchReport::default();
        assert_eq!(report.success_percentage(), 0.0);

        report.total_processed = 3;
        report.total_errors = 1;
        assert_eq!(report.success_percentage(), 75.0);
    }

    #[test]
    fn test_rows_fall_back_to_unknown_and_country_code() {
        let item = BatchItem {
            ip: "41.0.0.1".to_string(),
            rdap: Outcome::failed("timeout"),
            geolocation: Outcome::Found(GeoLocation {
                ip: "41.0.0.1".to_string(),
                city: "Unknown".to_string(),
                region: "Unknown".to_string(),
                country: "ZA".to_string(),
                country_name: String::new(),
                timezone: "Unknown".to_string(),
                coordinates: None,
                postal: "Unknown".to_string(),
                asn: "Unknown".to_string(),
                success: true,
            }),
            asn: Outcome::failed("ASN not found for this IP"),
            processed_at: "2024-01-01T00:00:00+00:00".to_string(),
        };
        let report = BatchReport::new(vec![item], vec![]);

        let rows = report.rows();
        assert_eq!(
            rows[0],
            BatchRow {
                ip: "41.0.0.1".to_string(),
                rir: "Unknown".to_string(),
                organization: "Unknown".to_string(),
                country: "ZA".to_string(),
                asn: "Unknown".to_string(),
            }
        );
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        assert!(ScannerClient::new("localhost:5000").is_err());
        assert!(ScannerClient::new("http://localhost:5000/").is_ok());
    }
}
