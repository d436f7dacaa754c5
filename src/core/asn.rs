use crate::core::geolocation::strip_prefix;
use crate::domain::model::AsnInfo;
use crate::domain::ports::{AsnLookup, ConfigProvider};
use crate::utils::error::{Result, ScannerError};
use async_trait::async_trait;
use reqwest::Client;

pub const DEFAULT_ASN_ENDPOINT: &str = "https://api.hackertarget.com/aslookup/?q={}";

const SERVICE: &str = "ASN";

pub struct AsnService {
    client: Client,
    endpoint: String,
}

impl AsnService {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self {
            client,
            endpoint: config.asn_endpoint().to_string(),
        })
    }

    pub async fn get_asn_data(&self, ip_address: &str) -> Result<AsnInfo> {
        let clean_ip = strip_prefix(ip_address)?;
        let url = self.endpoint.replace("{}", &clean_ip);
        tracing::debug!("Querying ASN: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ScannerError::lookup_failed(SERVICE, e))?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(ScannerError::UpstreamStatus {
                service: SERVICE.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScannerError::lookup_failed(SERVICE, e))?;
        parse_asn_response(&clean_ip, &body)
            .ok_or_else(|| ScannerError::NotFound {
                message: "ASN not found for this IP".to_string(),
            })
    }
}

#[async_trait]
impl AsnLookup for AsnService {
    async fn resolve(&self, ip: &str) -> Result<AsnInfo> {
        self.get_asn_data(ip).await.map_err(|e| {
            tracing::error!("ASN error for {}: {}", ip, e);
            e
        })
    }
}

/// 支援兩種格式：`AS15169 GOOGLE` 以及 `"8.8.8.8","15169","8.8.8.0/24","GOOGLE, US"`
pub fn parse_asn_response(ip: &str, body: &str) -> Option<AsnInfo> {
    let text = body.trim();
    if text.is_empty() || text.to_lowercase().contains("error") {
        return None;
    }

    if text.starts_with('"') {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());
        let record = reader.records().next()?.ok()?;
        let number = record.get(1)?.trim();
        if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let name = record.get(3).map(str::trim).filter(|n| !n.is_empty()).unwrap_or("Unknown");
        return Some(AsnInfo {
            ip: ip.to_string(),
            asn_number: format!("AS{}", number),
            asn_name: name.to_string(),
            asn_full: format!("AS{} {}", number, name),
            success: true,
        });
    }

    if !text.contains("AS") {
        return None;
    }

    let (number, name) = match text.split_once(' ') {
        Some((number, name)) => (number, name.trim()),
        None => (text, "Unknown"),
    };

    Some(AsnInfo {
        ip: ip.to_string(),
        asn_number: number.to_string(),
        asn_name: name.to_string(),
        asn_full: text.to_string(),
        success: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_format() {
        let info = parse_asn_response("8.8.8.8", "AS15169 GOOGLE - Google LLC\n").unwrap();
        assert_eq!(info.asn_number, "AS15169");
        assert_eq!(info.asn_name, "GOOGLE - Google LLC");
        assert_eq!(info.asn_full, "AS15169 GOOGLE - Google LLC");
    }

    #[test]
    fn test_parse_csv_format() {
        let body = r#""8.8.8.8","15169","8.8.8.0/24","GOOGLE, US""#;
        let info = parse_asn_response("8.8.8.8", body).unwrap();
        assert_eq!(info.asn_number, "AS15169");
        assert_eq!(info.asn_name, "GOOGLE, US");
    }

    #[test]
    fn test_number_only() {
        let info = parse_asn_response("1.1.1.1", "AS13335").unwrap();
        assert_eq!(info.asn_name, "Unknown");
    }

    #[test]
    fn test_rejects_errors_and_noise() {
        assert!(parse_asn_response("8.8.8.8", "error check your api query").is_none());
        let quota = "API count exceeded - Increase Quota with Membership";
        assert!(parse_asn_response("8.8.8.8", quota).is_none());
        assert!(parse_asn_response("8.8.8.8", "").is_none());
        assert!(parse_asn_response("10.0.0.1", r#""10.0.0.1","","","""#).is_none());
    }
}
