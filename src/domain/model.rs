use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Address,
    Network,
}

/// 使用者輸入解析後的結果；網段會被正規化為網路位址
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpInput {
    pub kind: InputKind,
    pub address: IpAddr,
    pub prefix_len: Option<u8>,
}

impl IpInput {
    pub fn version(&self) -> u8 {
        match self.address {
            IpAddr::V4(_) => 4,
            IpAddr::V6(_) => 6,
        }
    }
}

impl fmt::Display for IpInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix_len {
            Some(len) => write!(f, "{}/{}", self.address, len),
            None => write!(f, "{}", self.address),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub kind: Option<InputKind>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<u8>,
    pub message: String,
}

impl ValidationResult {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            kind: None,
            version: None,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rir {
    Arin,
    Ripe,
    Apnic,
    Lacnic,
    Afrinic,
}

impl Rir {
    pub const ALL: [Rir; 5] = [Rir::Arin, Rir::Ripe, Rir::Apnic, Rir::Lacnic, Rir::Afrinic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rir::Arin => "ARIN",
            Rir::Ripe => "RIPE",
            Rir::Apnic => "APNIC",
            Rir::Lacnic => "LACNIC",
            Rir::Afrinic => "AFRINIC",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Rir::ALL
            .into_iter()
            .find(|rir| rir.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Rir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VcardInfo {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub address: Option<String>,
}

impl VcardInfo {
    pub fn is_empty(&self) -> bool {
        self == &VcardInfo::default()
    }

    /// 顯示用的名稱：優先 fn，其次 org
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.organization.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub roles: Vec<String>,
    pub handle: String,
    #[serde(flatten)]
    pub vcard: VcardInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RdapSummary {
    pub rir: Rir,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub network_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ip_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cidr_blocks: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub raw_data: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub ip: String,
    pub city: String,
    pub region: String,
    pub country: String,
    pub country_name: String,
    pub timezone: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub coordinates: Option<Coordinates>,
    pub postal: String,
    pub asn: String,
    #[serde(default = "found_flag")]
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsnInfo {
    pub ip: String,
    pub asn_number: String,
    pub asn_name: String,
    pub asn_full: String,
    #[serde(default = "found_flag")]
    pub success: bool,
}

fn found_flag() -> bool {
    true
}

/// 富化查詢的結果：成功時是資料本身，失敗時是 `{success: false, error}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Found(T),
    Failed(Failure),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    #[serde(default)]
    pub success: bool,
    pub error: String,
}

impl<T> Outcome<T> {
    pub fn failed(error: impl Into<String>) -> Self {
        Outcome::Failed(Failure {
            success: false,
            error: error.into(),
        })
    }

    pub fn found(&self) -> Option<&T> {
        match self {
            Outcome::Found(value) => Some(value),
            Outcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Found(_) => None,
            Outcome::Failed(failure) => Some(&failure.error),
        }
    }
}

impl<T> From<crate::utils::error::Result<T>> for Outcome<T> {
    fn from(result: crate::utils::error::Result<T>) -> Self {
        match result {
            Ok(value) => Outcome::Found(value),
            Err(e) => Outcome::failed(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    pub ip: String,
    pub rdap: Outcome<RdapSummary>,
    pub geolocation: Outcome<GeoLocation>,
    pub asn: Outcome<AsnInfo>,
    pub processed_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchReport {
    pub success: bool,
    pub total_processed: usize,
    pub total_errors: usize,
    pub results: Vec<BatchItem>,
    pub errors: Vec<String>,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchReport {
    pub fn new(results: Vec<BatchItem>, errors: Vec<String>) -> Self {
        let error = results
            .is_empty()
            .then(|| "No valid IP addresses were processed".to_string());
        Self {
            success: !results.is_empty(),
            total_processed: results.len(),
            total_errors: errors.len(),
            results,
            errors,
            has_more: false,
            error,
        }
    }

    /// 回傳只保留前 `limit` 筆結果的副本，計數維持不變
    pub fn truncated(&self, limit: usize) -> Self {
        let mut view = self.clone();
        view.has_more = view.results.len() > limit;
        view.results.truncate(limit);
        view
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub ip: String,
    pub rir: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub started_at: String,
    pub uptime_seconds: i64,
    pub total_validations: u64,
    pub total_lookups: u64,
    pub failed_lookups: u64,
    pub total_batches: u64,
    pub total_batch_ips: u64,
    pub total_batch_errors: u64,
    pub rir_distribution: BTreeMap<String, u64>,
    pub country_distribution: BTreeMap<String, u64>,
    pub asn_distribution: BTreeMap<String, u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_activity: Option<String>,
}
