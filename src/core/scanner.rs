use crate::config::ScannerConfig;
use crate::core::analytics::UsageAnalytics;
use crate::core::asn::AsnService;
use crate::core::batch::BatchService;
use crate::core::export::{export_results, ExportFile, ExportFormat};
use crate::core::geolocation::GeolocationService;
use crate::core::history::SearchHistory;
use crate::core::rdap::RdapService;
use crate::core::validation::validate_ip;
use crate::domain::model::{
    AnalyticsSnapshot, AsnInfo, BatchItem, BatchReport, GeoLocation, HistoryEntry, RdapSummary,
    ValidationResult,
};
use crate::domain::ports::{AsnLookup, ConfigProvider, GeoLookup, RegistryLookup};
use crate::utils::error::{Result, ScannerError};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// CLI 與 HTTP 伺服器共用的查詢入口
pub struct Scanner {
    rdap: Arc<dyn RegistryLookup>,
    geo: Arc<dyn GeoLookup>,
    asn: Arc<dyn AsnLookup>,
    batch: BatchService,
    history: Mutex<SearchHistory>,
    analytics: Mutex<UsageAnalytics>,
    last_batch: RwLock<Option<BatchReport>>,
    display_limit: usize,
}

impl Scanner {
    pub fn from_config(config: &ScannerConfig) -> Result<Self> {
        let rdap = Arc::new(RdapService::new(config)?);
        let geo = Arc::new(GeolocationService::new(config)?);
        let asn = Arc::new(AsnService::new(config)?);
        Ok(Self::with_services(rdap, geo, asn, config))
    }

    pub fn with_services(
        rdap: Arc<dyn RegistryLookup>,
        geo: Arc<dyn GeoLookup>,
        asn: Arc<dyn AsnLookup>,
        config: &ScannerConfig,
    ) -> Self {
        let batch = BatchService::new(rdap.clone(), geo.clone(), asn.clone())
            .with_limits(config.concurrent_requests(), config.max_batch_size());

        Self {
            rdap,
            geo,
            asn,
            batch,
            history: Mutex::new(SearchHistory::new(config.history_limit())),
            analytics: Mutex::new(UsageAnalytics::new()),
            last_batch: RwLock::new(None),
            display_limit: config.display_limit(),
        }
    }

    pub fn display_limit(&self) -> usize {
        self.display_limit
    }

    pub async fn validate(&self, input: &str) -> ValidationResult {
        self.analytics.lock().await.record_validation();
        validate_ip(input)
    }

    /// 單筆 RDAP 查詢；成功時寫入查詢紀錄
    pub async fn lookup(&self, input: &str) -> Result<RdapSummary> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ScannerError::invalid_input(
                "Please enter an IP address or network prefix",
            ));
        }

        match self.rdap.lookup(input).await {
            Ok(summary) => {
                self.history.lock().await.record(input, &summary);
                self.analytics.lock().await.record_lookup(&summary);
                Ok(summary)
            }
            Err(e) => {
                tracing::error!("Error during RDAP lookup for {}: {}", input, e);
                self.analytics.lock().await.record_failed_lookup();
                Err(e)
            }
        }
    }

    pub async fn locate(&self, ip: &str) -> Result<GeoLocation> {
        self.geo.locate(ip).await
    }

    pub async fn resolve_asn(&self, ip: &str) -> Result<AsnInfo> {
        self.asn.resolve(ip).await
    }

    pub async fn enhanced_lookup(&self, ip: &str) -> Result<BatchItem> {
        let item = self.batch.enrich(ip.trim()).await?;
        if let Some(summary) = item.rdap.found() {
            self.analytics.lock().await.record_lookup(summary);
        }
        Ok(item)
    }

    /// 執行批次查詢並保留完整結果供匯出
    pub async fn batch(&self, text: &str) -> Result<BatchReport> {
        let report = self.batch.process_text(text).await?;
        self.analytics.lock().await.record_batch(&report);
        *self.last_batch.write().await = Some(report.clone());
        Ok(report)
    }

    pub async fn export_last(&self, format: ExportFormat) -> Result<ExportFile> {
        let guard = self.last_batch.read().await;
        let report = guard.as_ref().ok_or_else(|| ScannerError::NotFound {
            message: "No batch results available for export".to_string(),
        })?;
        export_results(report, format)
    }

    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.history.lock().await.entries()
    }

    pub async fn clear_history(&self) {
        self.history.lock().await.clear();
    }

    pub async fn analytics(&self) -> AnalyticsSnapshot {
        self.analytics.lock().await.snapshot()
    }
}
