use crate::domain::model::BatchReport;
use crate::utils::error::{Result, ScannerError};
use std::io::Write;
use std::str::FromStr;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const CSV_HEADER: [&str; 9] = [
    "IP", "RIR", "Network", "Organization", "Country", "ASN", "ASN_Name", "City", "Region",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Zip,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Zip => "zip",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Zip => "application/zip",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ScannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "zip" => Ok(ExportFormat::Zip),
            _ => Err(ScannerError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// 匯出檔案內容與下載用的中繼資料
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub format: ExportFormat,
    pub filename: String,
    pub data: Vec<u8>,
}

pub fn export_results(report: &BatchReport, format: ExportFormat) -> Result<ExportFile> {
    let data = match format {
        ExportFormat::Json => to_json(report)?.into_bytes(),
        ExportFormat::Csv => to_csv(report)?.into_bytes(),
        ExportFormat::Zip => to_zip(report)?,
    };

    Ok(ExportFile {
        format,
        filename: format!("ripescanner_results.{}", format.extension()),
        data,
    })
}

pub fn to_json(report: &BatchReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn to_csv(report: &BatchReport) -> Result<String> {
    if report.results.is_empty() {
        return Ok("No results to export".to_string());
    }

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for item in &report.results {
        let rdap = item.rdap.found();
        let geo = item.geolocation.found();
        let asn = item.asn.found();

        let row = [
            item.ip.clone(),
            rdap.map(|r| r.rir.to_string()).unwrap_or_default(),
            rdap.and_then(|r| r.network_name.clone()).unwrap_or_default(),
            rdap.and_then(|r| r.organization.clone()).unwrap_or_default(),
            geo.map(|g| g.country_name.clone()).unwrap_or_default(),
            asn.map(|a| a.asn_number.clone()).unwrap_or_default(),
            asn.map(|a| a.asn_name.clone()).unwrap_or_default(),
            geo.map(|g| g.city.clone()).unwrap_or_default(),
            geo.map(|g| g.region.clone()).unwrap_or_default(),
        ];
        writer.write_record(row.iter().map(|field| clean_field(field)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ScannerError::IoError(e.into_error()))?;
    let mut csv = String::from_utf8_lossy(&bytes).into_owned();
    // 最後一行不加換行
    if csv.ends_with('\n') {
        csv.pop();
    }
    Ok(csv)
}

/// 打包 CSV 與 JSON 兩份結果
pub fn to_zip(report: &BatchReport) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    zip.start_file("results.csv", SimpleFileOptions::default())?;
    zip.write_all(to_csv(report)?.as_bytes())?;

    zip.start_file("results.json", SimpleFileOptions::default())?;
    zip.write_all(to_json(report)?.as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn clean_field(field: &str) -> String {
    field.replace(',', ";").replace(['\n', '\r'], " ")
}
