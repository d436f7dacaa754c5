pub mod cli;
pub mod toml_config;

pub use toml_config::ScannerConfig;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "ripescanner")]
#[command(about = "RDAP registry scanner with geolocation and ASN enrichment")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log CPU and memory usage during batch runs")]
    pub monitor: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check whether the input is a valid IP address or network
    Validate { ip: String },

    /// RDAP lookup against the responsible registry
    Lookup {
        ip: String,
        /// Print the unprocessed RDAP response as well
        #[arg(long)]
        raw: bool,
    },

    /// Geolocation lookup
    Geo { ip: String },

    /// Autonomous system lookup
    Asn { ip: String },

    /// Enrich a newline-separated list of addresses and export the results
    Batch {
        /// File with one IP address or network per line
        #[arg(short, long)]
        input: String,

        /// json, csv or zip
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output directory (overrides output.path)
        #[arg(short, long)]
        output: Option<String>,

        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Run the HTTP API
    Serve {
        /// Listen address (overrides server.bind_address)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入設定檔（若有），再套用命令列覆寫
    pub fn load_config(&self) -> Result<ScannerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                ScannerConfig::from_file(path)?
            }
            None => ScannerConfig::default(),
        };

        match &self.command {
            Command::Batch {
                output,
                concurrency,
                ..
            } => {
                if let Some(output) = output {
                    config.output.path = output.clone();
                }
                if let Some(concurrency) = concurrency {
                    config.batch.concurrent_requests = *concurrency;
                }
            }
            Command::Serve { bind: Some(bind) } => {
                config.server.bind_address = bind.clone();
            }
            _ => {}
        }

        Ok(config)
    }
}
