use crate::domain::model::{AsnInfo, GeoLocation, RdapSummary};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn rdap_endpoint(&self, rir: crate::domain::model::Rir) -> &str;
    fn geolocation_endpoint(&self) -> &str;
    fn asn_endpoint(&self) -> &str;
    fn request_timeout(&self) -> std::time::Duration;
    fn concurrent_requests(&self) -> usize;
    fn max_batch_size(&self) -> usize;
}

/// RDAP 註冊資料查詢
#[async_trait]
pub trait RegistryLookup: Send + Sync {
    async fn lookup(&self, input: &str) -> Result<RdapSummary>;
}

#[async_trait]
pub trait GeoLookup: Send + Sync {
    async fn locate(&self, ip: &str) -> Result<GeoLocation>;
}

#[async_trait]
pub trait AsnLookup: Send + Sync {
    async fn resolve(&self, ip: &str) -> Result<AsnInfo>;
}
