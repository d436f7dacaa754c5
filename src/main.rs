use clap::Parser;
use ripescanner::config::{Command, ScannerConfig};
use ripescanner::core::export::{export_results, ExportFormat};
use ripescanner::core::scanner::Scanner;
use ripescanner::domain::ports::Storage;
use ripescanner::utils::error::{ErrorSeverity, ScannerError};
use ripescanner::utils::monitor::BatchMonitor;
use ripescanner::utils::{logger, validation::Validate};
use ripescanner::{CliConfig, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    match cli.command {
        Command::Serve { .. } => logger::init_server_logger(cli.verbose),
        _ => logger::init_cli_logger(cli.verbose),
    }

    tracing::info!("Starting ripescanner");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    if let Command::Serve { .. } = cli.command {
        return ripescanner::server::serve(&config).await;
    }

    if let Err(e) = run(&cli, &config).await {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        exit_with(&e);
    }

    Ok(())
}

async fn run(cli: &CliConfig, config: &ScannerConfig) -> Result<(), ScannerError> {
    let scanner = Scanner::from_config(config)?;

    match &cli.command {
        Command::Validate { ip } => {
            let result = scanner.validate(ip).await;
            println!("{}", if result.valid { "✅" } else { "❌" });
            println!("{}", result.message);
            if !result.valid {
                std::process::exit(1);
            }
        }
        Command::Lookup { ip, raw } => {
            let mut summary = scanner.lookup(ip).await?;
            if !raw {
                summary.raw_data = serde_json::Value::Null;
            }
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Geo { ip } => {
            let location = scanner.locate(ip).await?;
            println!("{}", serde_json::to_string_pretty(&location)?);
        }
        Command::Asn { ip } => {
            let asn = scanner.resolve_asn(ip).await?;
            println!("{}", serde_json::to_string_pretty(&asn)?);
        }
        Command::Batch { input, format, .. } => {
            let format: ExportFormat = format.parse()?;
            let text = tokio::fs::read_to_string(input).await?;

            let monitor = BatchMonitor::new(cli.monitor);
            if monitor.is_enabled() {
                tracing::info!("🔍 System monitoring enabled");
            }
            monitor.log_phase("Before batch");

            let report = scanner.batch(&text).await?;
            monitor.log_phase("After lookups");

            let file = export_results(&report, format)?;
            let storage = LocalStorage::new(config.output_path().to_string());
            storage.write_file(&file.filename, &file.data).await?;
            monitor.log_phase("After export");
            monitor.log_summary(report.total_processed + report.total_errors);

            for error in &report.errors {
                tracing::warn!("{}", error);
            }
            println!(
                "✅ Processed {} addresses ({} errors)",
                report.total_processed, report.total_errors
            );
            println!("📁 Output saved to: {}", storage.full_path(&file.filename));
        }
        Command::Serve { .. } => {}
    }

    Ok(())
}

fn exit_with(e: &ScannerError) -> ! {
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
