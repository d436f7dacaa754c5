use crate::core::validation::validate_ip;
use crate::domain::model::{BatchItem, BatchReport};
use crate::domain::ports::{AsnLookup, GeoLookup, RegistryLookup};
use crate::utils::error::{Result, ScannerError};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// 逐行拆解批次輸入；略過空行與 `#` 註解
pub fn parse_ip_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub struct BatchService {
    rdap: Arc<dyn RegistryLookup>,
    geo: Arc<dyn GeoLookup>,
    asn: Arc<dyn AsnLookup>,
    concurrency: usize,
    max_ips: usize,
}

impl BatchService {
    pub fn new(
        rdap: Arc<dyn RegistryLookup>,
        geo: Arc<dyn GeoLookup>,
        asn: Arc<dyn AsnLookup>,
    ) -> Self {
        Self {
            rdap,
            geo,
            asn,
            concurrency: 5,
            max_ips: 100,
        }
    }

    pub fn with_limits(mut self, concurrency: usize, max_ips: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self.max_ips = max_ips;
        self
    }

    /// 批次查詢；結果順序與輸入相同
    pub async fn process_batch(&self, ips: &[String]) -> Result<BatchReport> {
        if ips.len() > self.max_ips {
            return Err(ScannerError::invalid_input(format!(
                "Batch contains {} entries, the limit is {}",
                ips.len(),
                self.max_ips
            )));
        }

        tracing::info!(
            "Processing batch of {} entries (concurrency {})",
            ips.len(),
            self.concurrency
        );

        let pending: Vec<_> = ips.iter().map(|ip| self.process_one(ip.trim())).collect();
        let outcomes: Vec<std::result::Result<BatchItem, String>> = stream::iter(pending)
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut results = Vec::new();
        let mut errors = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(item) => results.push(item),
                Err(message) => errors.push(message),
            }
        }

        tracing::info!(
            "Batch finished: {} processed, {} errors",
            results.len(),
            errors.len()
        );
        Ok(BatchReport::new(results, errors))
    }

    pub async fn process_text(&self, text: &str) -> Result<BatchReport> {
        self.process_batch(&parse_ip_list(text)).await
    }

    /// 單筆富化查詢：RDAP、地理位置與 ASN 同時進行
    pub async fn enrich(&self, ip: &str) -> Result<BatchItem> {
        let validation = validate_ip(ip);
        if !validation.valid {
            return Err(ScannerError::invalid_input(validation.message));
        }

        let (rdap, geolocation, asn) = tokio::join!(
            self.rdap.lookup(ip),
            self.geo.locate(ip),
            self.asn.resolve(ip)
        );

        Ok(BatchItem {
            ip: ip.to_string(),
            rdap: rdap.into(),
            geolocation: geolocation.into(),
            asn: asn.into(),
            processed_at: chrono::Utc::now().to_rfc3339(),
        })
    }

    async fn process_one(&self, ip: &str) -> std::result::Result<BatchItem, String> {
        self.enrich(ip).await.map_err(|e| {
            tracing::debug!("Skipping batch entry {}: {}", ip, e);
            format!("{}: {}", ip, e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AsnInfo, GeoLocation, RdapSummary, Rir};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockRegistry {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RegistryLookup for MockRegistry {
        async fn lookup(&self, input: &str) -> Result<RdapSummary> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if input.starts_with("203.") {
                return Err(ScannerError::UpstreamStatus {
                    service: "RDAP (APNIC)".to_string(),
                    status: 503,
                });
            }
            Ok(RdapSummary {
                rir: Rir::Arin,
                timestamp: "2024-01-01 00:00:00 UTC".to_string(),
                network_name: Some(format!("NET-{}", input)),
                ip_range: None,
                cidr_blocks: None,
                organization: Some("Example Org".to_string()),
                contacts: vec![],
                raw_data: serde_json::Value::Null,
            })
        }
    }

    struct MockGeo;

    #[async_trait]
    impl GeoLookup for MockGeo {
        async fn locate(&self, ip: &str) -> Result<GeoLocation> {
            Ok(GeoLocation {
                ip: ip.to_string(),
                city: "Mountain View".to_string(),
                region: "California".to_string(),
                country: "US".to_string(),
                country_name: "United States".to_string(),
                timezone: "America/Los_Angeles".to_string(),
                coordinates: None,
                postal: "94043".to_string(),
                asn: "AS15169 Google LLC".to_string(),
                success: true,
            })
        }
    }

    struct MissingAsn;

    #[async_trait]
    impl AsnLookup for MissingAsn {
        async fn resolve(&self, _ip: &str) -> Result<AsnInfo> {
            Err(ScannerError::NotFound {
                message: "ASN not found for this IP".to_string(),
            })
        }
    }

    fn service(registry: Arc<MockRegistry>) -> BatchService {
        BatchService::new(registry, Arc::new(MockGeo), Arc::new(MissingAsn))
    }

    #[test]
    fn test_parse_ip_list_skips_comments_and_blanks() {
        let text = "# Sample\n8.8.8.8\n\n  1.1.1.1  \n# Google DNS\n8.8.4.4\n";
        assert_eq!(parse_ip_list(text), vec!["8.8.8.8", "1.1.1.1", "8.8.4.4"]);
        assert!(parse_ip_list("\n# only comments\n").is_empty());
    }

    #[tokio::test]
    async fn test_process_batch_collects_results_and_errors() {
        let registry = Arc::new(MockRegistry {
            calls: AtomicUsize::new(0),
        });
        let batch = service(registry.clone());
        let ips = vec![
            "8.8.8.8".to_string(),
            "not-an-ip".to_string(),
            "203.0.113.5".to_string(),
            "139.191.0.0/24".to_string(),
        ];

        let report = batch.process_batch(&ips).await.unwrap();

        assert!(report.success);
        assert_eq!(report.total_processed, 3);
        assert_eq!(report.total_errors, 1);
        assert!(report.errors[0].starts_with("not-an-ip: Invalid IP address or network"));
        // invalid input never reaches the registry
        assert_eq!(registry.calls.load(Ordering::SeqCst), 3);

        let ips_in_order: Vec<&str> = report.results.iter().map(|r| r.ip.as_str()).collect();
        assert_eq!(ips_in_order, vec!["8.8.8.8", "203.0.113.5", "139.191.0.0/24"]);

        // enrichment failures stay on the item
        assert_eq!(
            report.results[1].rdap.error(),
            Some("RDAP (APNIC) service returned status 503")
        );
        assert_eq!(report.results[0].asn.error(), Some("ASN not found for this IP"));
        assert_eq!(
            report.results[0].geolocation.found().unwrap().country_name,
            "United States"
        );
    }

    #[tokio::test]
    async fn test_empty_batch_is_unsuccessful() {
        let batch = service(Arc::new(MockRegistry {
            calls: AtomicUsize::new(0),
        }));
        let report = batch.process_text("# nothing here\n\nbogus\n").await.unwrap();
        assert!(!report.success);
        assert_eq!(report.total_errors, 1);
        assert!(report.error.is_some());
    }

    #[tokio::test]
    async fn test_oversize_batch_is_rejected() {
        let batch = service(Arc::new(MockRegistry {
            calls: AtomicUsize::new(0),
        }))
        .with_limits(2, 2);
        let ips: Vec<String> = (1..=3).map(|i| format!("8.8.8.{}", i)).collect();
        let err = batch.process_batch(&ips).await.unwrap_err();
        assert_eq!(err.to_string(), "Batch contains 3 entries, the limit is 2");
    }

    /// 記錄同時進行中的查詢數量
    struct SlowRegistry {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl RegistryLookup for SlowRegistry {
        async fn lookup(&self, input: &str) -> Result<RdapSummary> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            Err(ScannerError::NotFound {
                message: format!("no record for {}", input),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_is_bounded() {
        let registry = Arc::new(SlowRegistry {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let batch = BatchService::new(registry.clone(), Arc::new(MockGeo), Arc::new(MissingAsn))
            .with_limits(3, 100);
        let ips: Vec<String> = (1..=10).map(|i| format!("8.8.8.{}", i)).collect();

        let report = batch.process_batch(&ips).await.unwrap();

        assert_eq!(report.total_processed, 10);
        assert_eq!(registry.peak.load(Ordering::SeqCst), 3);
        assert_eq!(registry.in_flight.load(Ordering::SeqCst), 0);
        assert_eq!(report.results[9].ip, "8.8.8.10");
    }
}
