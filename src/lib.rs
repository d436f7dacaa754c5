pub mod client;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use client::{LiveValidator, ScannerClient, ValidationState};
pub use config::{cli::LocalStorage, ScannerConfig};
pub use core::{export::ExportFormat, scanner::Scanner};
pub use server::create_router;
pub use utils::error::{Result, ScannerError};
