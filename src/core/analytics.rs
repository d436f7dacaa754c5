use crate::domain::model::{AnalyticsSnapshot, BatchReport, RdapSummary};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// 使用量統計
#[derive(Debug, Clone)]
pub struct UsageAnalytics {
    started_at: DateTime<Utc>,
    last_activity: Option<DateTime<Utc>>,
    total_validations: u64,
    total_lookups: u64,
    failed_lookups: u64,
    total_batches: u64,
    total_batch_ips: u64,
    total_batch_errors: u64,
    rir_distribution: BTreeMap<String, u64>,
    country_distribution: BTreeMap<String, u64>,
    asn_distribution: BTreeMap<String, u64>,
}

impl UsageAnalytics {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            last_activity: None,
            total_validations: 0,
            total_lookups: 0,
            failed_lookups: 0,
            total_batches: 0,
            total_batch_ips: 0,
            total_batch_errors: 0,
            rir_distribution: BTreeMap::new(),
            country_distribution: BTreeMap::new(),
            asn_distribution: BTreeMap::new(),
        }
    }

    pub fn record_validation(&mut self) {
        self.total_validations += 1;
        self.touch();
    }

    pub fn record_lookup(&mut self, summary: &RdapSummary) {
        self.total_lookups += 1;
        *self.rir_distribution.entry(summary.rir.to_string()).or_default() += 1;
        self.touch();
    }

    pub fn record_failed_lookup(&mut self) {
        self.total_lookups += 1;
        self.failed_lookups += 1;
        self.touch();
    }

    pub fn record_batch(&mut self, report: &BatchReport) {
        self.total_batches += 1;
        self.total_batch_ips += (report.total_processed + report.total_errors) as u64;
        self.total_batch_errors += report.total_errors as u64;

        for item in &report.results {
            if let Some(rdap) = item.rdap.found() {
                *self.rir_distribution.entry(rdap.rir.to_string()).or_default() += 1;
            }
            if let Some(geo) = item.geolocation.found() {
                *self
                    .country_distribution
                    .entry(geo.country_name.clone())
                    .or_default() += 1;
            }
            if let Some(asn) = item.asn.found() {
                *self.asn_distribution.entry(asn.asn_number.clone()).or_default() += 1;
            }
        }
        self.touch();
    }

    pub fn snapshot(&self) -> AnalyticsSnapshot {
        AnalyticsSnapshot {
            started_at: self.started_at.to_rfc3339(),
            uptime_seconds: (Utc::now() - self.started_at).num_seconds(),
            total_validations: self.total_validations,
            total_lookups: self.total_lookups,
            failed_lookups: self.failed_lookups,
            total_batches: self.total_batches,
            total_batch_ips: self.total_batch_ips,
            total_batch_errors: self.total_batch_errors,
            rir_distribution: self.rir_distribution.clone(),
            country_distribution: self.country_distribution.clone(),
            asn_distribution: self.asn_distribution.clone(),
            last_activity: self.last_activity.map(|t| t.to_rfc3339()),
        }
    }

    fn touch(&mut self) {
        self.last_activity = Some(Utc::now());
    }
}

impl Default for UsageAnalytics {
    fn default() -> Self {
        Self::new()
    }
}
