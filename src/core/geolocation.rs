use crate::domain::model::{Coordinates, GeoLocation};
use crate::domain::ports::{ConfigProvider, GeoLookup};
use crate::utils::error::{Result, ScannerError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::net::IpAddr;

pub const DEFAULT_GEOLOCATION_ENDPOINT: &str = "http://ipinfo.io/{}/json";

const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("US", "United States"), ("CA", "Canada"), ("GB", "United Kingdom"),
    ("DE", "Germany"), ("FR", "France"), ("JP", "Japan"), ("CN", "China"),
    ("IN", "India"), ("BR", "Brazil"), ("AU", "Australia"), ("RU", "Russia"),
    ("IT", "Italy"), ("ES", "Spain"), ("KR", "South Korea"), ("NL", "Netherlands"),
    ("SE", "Sweden"), ("NO", "Norway"), ("DK", "Denmark"), ("FI", "Finland"),
    ("PL", "Poland"), ("CH", "Switzerland"), ("AT", "Austria"), ("BE", "Belgium"),
    ("IE", "Ireland"), ("PT", "Portugal"), ("GR", "Greece"), ("CZ", "Czech Republic"),
    ("HU", "Hungary"), ("RO", "Romania"), ("BG", "Bulgaria"), ("HR", "Croatia"),
    ("SK", "Slovakia"), ("SI", "Slovenia"), ("EE", "Estonia"), ("LV", "Latvia"),
    ("LT", "Lithuania"), ("LU", "Luxembourg"), ("MT", "Malta"), ("CY", "Cyprus"),
];

/// 國碼轉國名，未收錄的國碼原樣回傳
pub fn country_name(code: &str) -> String {
    COUNTRY_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| code.to_string())
}

const SERVICE: &str = "Geolocation";

pub struct GeolocationService {
    client: Client,
    endpoint: String,
}

impl GeolocationService {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self {
            client,
            endpoint: config.geolocation_endpoint().to_string(),
        })
    }

    pub async fn get_location_data(&self, ip_address: &str) -> Result<GeoLocation> {
        let clean_ip = strip_prefix(ip_address)?;
        let url = self.endpoint.replace("{}", &clean_ip);
        tracing::debug!("Querying geolocation: {}", url);

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

        let data: Value = response
            .json()
            .await
            .map_err(|e| ScannerError::lookup_failed(SERVICE, e))?;
        Ok(parse_location(&clean_ip, &data))
    }
}

#[async_trait]
impl GeoLookup for GeolocationService {
    async fn locate(&self, ip: &str) -> Result<GeoLocation> {
        self.get_location_data(ip).await.map_err(|e| {
            tracing::error!("Geolocation error for {}: {}", ip, e);
            e
        })
    }
}

/// 去掉 `/prefix` 並確認剩下的是合法位址
pub(crate) fn strip_prefix(ip_address: &str) -> Result<String> {
    let clean = ip_address.trim().split('/').next().unwrap_or_default();
    let parsed: IpAddr = clean.parse().map_err(|_| {
        ScannerError::invalid_input(format!(
            "'{}' does not appear to be an IPv4 or IPv6 address",
            clean
        ))
    })?;
    Ok(parsed.to_string())
}

fn parse_location(ip: &str, data: &Value) -> GeoLocation {
    let field = |name: &str| {
        data.get(name)
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string()
    };

    let coordinates = data
        .get("loc")
        .and_then(Value::as_str)
        .and_then(|loc| loc.split_once(','))
        .and_then(|(lat, lon)| {
            Some(Coordinates {
                latitude: lat.trim().parse().ok()?,
                longitude: lon.trim().parse().ok()?,
            })
        });

    let country_code = data.get("country").and_then(Value::as_str).unwrap_or("");

    GeoLocation {
        ip: ip.to_string(),
        city: field("city"),
        region: field("region"),
        country: field("country"),
        country_name: country_name(country_code),
        timezone: field("timezone"),
        coordinates,
        postal: field("postal"),
        asn: field("org"),
        success: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_country_name_lookup() {
        assert_eq!(country_name("DE"), "Germany");
        assert_eq!(country_name("ZA"), "ZA");
        assert_eq!(country_name(""), "");
    }

    #[test]
    fn test_strip_prefix() {
        assert_eq!(strip_prefix("8.8.8.0/24").unwrap(), "8.8.8.0");
        assert_eq!(strip_prefix(" 2001:db8::1 ").unwrap(), "2001:db8::1");
        assert!(strip_prefix("nope/24").is_err());
    }

    #[test]
    fn test_parse_location_defaults() {
        let geo = parse_location("1.1.1.1", &json!({"country": "AU", "loc": "-33.49,143.21"}));
        assert_eq!(geo.city, "Unknown");
        assert_eq!(geo.country_name, "Australia");
        assert_eq!(
            geo.coordinates,
            Some(Coordinates {
                latitude: -33.49,
                longitude: 143.21
            })
        );
    }

    #[test]
    fn test_parse_location_bad_coordinates() {
        let geo = parse_location("1.1.1.1", &json!({"loc": "north,east"}));
        assert!(geo.coordinates.is_none());
        assert_eq!(geo.country, "Unknown");
        assert_eq!(geo.country_name, "");
    }
}
