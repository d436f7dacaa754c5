use crate::core::address::parse_input;
use crate::core::rir::RirTable;
use crate::core::validation::validate_ip;
use crate::domain::model::{Contact, RdapSummary, Rir, VcardInfo};
use crate::domain::ports::{ConfigProvider, RegistryLookup};
use crate::utils::error::{Result, ScannerError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;

pub const DEFAULT_ENDPOINTS: [(Rir, &str); 5] = [
    (Rir::Arin, "https://rdap.arin.net/registry/ip/"),
    (Rir::Ripe, "https://rdap.db.ripe.net/ip/"),
    (Rir::Apnic, "https://rdap.apnic.net/ip/"),
    (Rir::Lacnic, "https://rdap.lacnic.net/rdap/ip/"),
    (Rir::Afrinic, "https://rdap.afrinic.net/rdap/ip/"),
];

pub struct RdapService {
    client: Client,
    endpoints: BTreeMap<Rir, String>,
    table: RirTable,
}

impl RdapService {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("ripescanner/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let endpoints = Rir::ALL
            .into_iter()
            .map(|rir| (rir, config.rdap_endpoint(rir).to_string()))
            .collect();

        Ok(Self {
            client,
            endpoints,
            table: RirTable::new(),
        })
    }

    pub fn detect_rir(&self, input: &str) -> Rir {
        self.table.detect(input)
    }

    /// 向指定 RIR 的 RDAP 伺服器查詢；網段使用其網路位址
    pub async fn query_rdap(&self, input: &str, rir: Rir) -> Result<Value> {
        let parsed = parse_input(input.trim()).map_err(ScannerError::invalid_input)?;
        let base_url = self
            .endpoints
            .get(&rir)
            .ok_or_else(|| ScannerError::ConfigError {
                message: format!("Unknown RIR: {}", rir),
            })?;

        let url = format!("{}{}", base_url, parsed.address);
        tracing::info!("Querying RDAP: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!("RDAP request failed: {}", e);
            e
        })?;

        let status = response.status();
        tracing::debug!("RDAP response status: {}", status);
        if !status.is_success() {
            tracing::error!("RDAP request to {} returned {}", url, status);
            return Err(ScannerError::UpstreamStatus {
                service: format!("RDAP ({})", rir),
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl RegistryLookup for RdapService {
    async fn lookup(&self, input: &str) -> Result<RdapSummary> {
        let validation = validate_ip(input);
        if !validation.valid {
            return Err(ScannerError::invalid_input(validation.message));
        }

        let rir = self.detect_rir(input);
        let data = self.query_rdap(input, rir).await?;
        Ok(format_rdap_response(data, rir))
    }
}

/// 從原始 RDAP 回應中擷取顯示用欄位，原始資料保留在 `raw_data`
pub fn format_rdap_response(data: Value, rir: Rir) -> RdapSummary {
    let network_name = data.get("name").and_then(Value::as_str).map(str::to_string);

    let ip_range = match (data.get("startAddress"), data.get("endAddress")) {
        (Some(start), Some(end)) => Some(format!("{} - {}", text_of(start), text_of(end))),
        _ => None,
    };

    let cidr_blocks = data.get("cidr0_cidrs").cloned();

    let entities = data
        .get("entities")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let organization = entities
        .iter()
        .find(|entity| has_role(entity, "registrant"))
        .and_then(|entity| entity.get("vcardArray"))
        .map(parse_vcard)
        .and_then(|vcard| vcard.display_name().map(str::to_string));

    let contacts = entities
        .iter()
        .filter_map(|entity| {
            let roles = entity.get("roles")?.as_array()?;
            Some(Contact {
                roles: roles.iter().map(text_of).collect(),
                handle: entity
                    .get("handle")
                    .map(text_of)
                    .unwrap_or_else(|| "N/A".to_string()),
                vcard: entity.get("vcardArray").map(parse_vcard).unwrap_or_default(),
            })
        })
        .collect();

    RdapSummary {
        rir,
        timestamp: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        network_name,
        ip_range,
        cidr_blocks,
        organization,
        contacts,
        raw_data: data,
    }
}

/// 解析 jCard（RFC 7095）陣列：`["vcard", [[name, params, type, value], ...]]`
pub fn parse_vcard(vcard_array: &Value) -> VcardInfo {
    let mut info = VcardInfo::default();

    let Some(properties) = vcard_array
        .as_array()
        .filter(|parts| parts.len() >= 2)
        .and_then(|parts| parts[1].as_array())
    else {
        return info;
    };

    for property in properties {
        let Some(item) = property.as_array().filter(|item| item.len() >= 4) else {
            continue;
        };
        let field_name = text_of(&item[0]).to_lowercase();
        let value = &item[3];

        match field_name.as_str() {
            "fn" => info.name = Some(text_of(value)),
            "org" => info.organization = Some(text_of(value)),
            "email" => info.email = Some(text_of(value)),
            "tel" => info.phone = Some(text_of(value)),
            "adr" => {
                info.address = Some(match value.as_array() {
                    Some(parts) => parts
                        .iter()
                        .map(text_of)
                        .filter(|part| !part.is_empty())
                        .collect::<Vec<_>>()
                        .join(", "),
                    None => text_of(value),
                })
            }
            _ => {}
        }
    }

    info
}

fn has_role(entity: &Value, role: &str) -> bool {
    entity
        .get("roles")
        .and_then(Value::as_array)
        .is_some_and(|roles| roles.iter().any(|r| r.as_str() == Some(role)))
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(text_of)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}
