//! Report writers: records (CSV or JSON) and the numbered error log.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use billrec_core::invoice::rules::format_amount;
use billrec_core::BatchReport;

/// Output format for the records report.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// CSV, one row per record
    Csv,
    /// JSON with records, errors, verification and reconciliation
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Write the records report and return its path.
pub fn write_records(
    dir: &Path,
    stem: &str,
    format: OutputFormat,
    report: &BatchReport,
) -> anyhow::Result<PathBuf> {
    let path = dir.join(format!("{}.{}", stem, format.extension()));
    match format {
        OutputFormat::Csv => fs::write(&path, format_records_csv(report)?)?,
        OutputFormat::Json => fs::write(&path, serde_json::to_string_pretty(report)?)?,
    }
    Ok(path)
}

/// Write the numbered error log, if there are errors.
pub fn write_error_log(dir: &Path, file_name: &str, report: &BatchReport) -> anyhow::Result<Option<PathBuf>> {
    if report.errors.is_empty() {
        return Ok(None);
    }

    let path = dir.join(file_name);
    let mut file = fs::File::create(&path)?;
    writeln!(
        file,
        "--- Extraction error log ({}) ---",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(file)?;
    for (i, err) in report.errors.iter().enumerate() {
        writeln!(file, "{}. {}", i + 1, err)?;
    }
    Ok(Some(path))
}

pub fn format_records_csv(report: &BatchReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "UC",
        "Cod de Reg",
        "Nome",
        "Valor Energia (R$)",
        "COSIP (R$)",
        "Valor Bruto (R$)",
        "Tributos Retidos (R$)",
        "Valor Líquido (R$)",
        "Arquivo",
        "Página",
    ])?;

    for record in &report.records {
        wtr.write_record([
            record.account_id.as_str(),
            record.cost_center.as_str(),
            record.account_name.as_str(),
            &format_amount(record.energy_amount),
            &format_amount(record.cosip_amount),
            &format_amount(record.gross_amount),
            &format_amount(record.retained_tax_amount),
            &format_amount(record.net_amount),
            record.source.document.as_str(),
            &record.source.page.map(|p| p.to_string()).unwrap_or_default(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}
