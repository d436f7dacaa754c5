pub mod address;
pub mod analytics;
pub mod asn;
pub mod batch;
pub mod export;
pub mod geolocation;
pub mod history;
pub mod rdap;
pub mod rir;
pub mod scanner;
pub mod validation;

pub use crate::domain::model::{BatchItem, BatchReport, RdapSummary, Rir};
pub use crate::domain::ports::{AsnLookup, ConfigProvider, GeoLookup, RegistryLookup, Storage};
pub use crate::utils::error::Result;
