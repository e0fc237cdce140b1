//! Process command - extract records from bill files and reconcile the batch.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use billrec_core::invoice::rules::format_amount;
use billrec_core::pdf::read_pages;
use billrec_core::{BatchReport, DocumentReport, Engine, ExtractionError, Severity, SourceLocation};

use crate::directory;
use crate::output::{self, OutputFormat};

use super::{document_name, load_config};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Account directory CSV (columns: UC, Cod de Reg, Nome)
    #[arg(short, long)]
    accounts: PathBuf,

    /// Output directory for the reports
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Format of the records report
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Number of documents processed in parallel
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files = expand_inputs(&args.inputs)?;
    println!("{} Found {} files to process", style("ℹ").blue(), files.len());

    let accounts = directory::load(&args.accounts)?;
    println!(
        "{} Loaded {} accounts from {}",
        style("ℹ").blue(),
        accounts.len(),
        args.accounts.display()
    );

    let engine = Arc::new(Engine::from_config(&config)?);
    let max_pages = config.pdf.max_pages;
    let worker = {
        let engine = engine.clone();
        move |path: &Path, name: &str| engine.process_document(name, read_pages(path, max_pages), &accounts)
    };

    let reports = process_files(files, args.jobs, worker).await?;
    let report = BatchReport::from_documents(reports, engine.tolerance());

    fs::create_dir_all(&args.output_dir)?;
    let records_path = output::write_records(&args.output_dir, &config.output.records_file, args.format, &report)?;
    let errors_path = output::write_error_log(&args.output_dir, &config.output.errors_file, &report)?;

    print_summary(&report);

    println!();
    println!("{} Records written to {}", style("✓").green(), records_path.display());
    if let Some(path) = errors_path {
        println!("{} Error log written to {}", style("✓").green(), path.display());
    }
    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Expand globs and plain paths into the list of PDF files, in argument order.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let path = PathBuf::from(input);
        if path.is_file() {
            files.push(path);
            continue;
        }

        let mut matched: Vec<PathBuf> = glob(input)?
            .filter_map(|r| r.ok())
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
            })
            .collect();
        matched.sort();
        files.extend(matched);
    }

    if files.is_empty() {
        anyhow::bail!("No matching files found for: {}", inputs.join(" "));
    }
    Ok(files)
}

/// Process documents on blocking workers, at most `jobs` at a time.
///
/// Reports come back in input order regardless of completion order. A worker that
/// panics yields an `UnreadableDocument` error for its document; the others go on.
async fn process_files<F>(files: Vec<PathBuf>, jobs: usize, process: F) -> anyhow::Result<Vec<DocumentReport>>
where
    F: Fn(&Path, &str) -> DocumentReport + Send + Sync + 'static,
{
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let process = Arc::new(process);
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mut handles = Vec::with_capacity(files.len());

    for path in files {
        let permit = semaphore.clone().acquire_owned().await?;
        let process = process.clone();
        let pb = pb.clone();

        let name = document_name(&path);
        let worker_name = name.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            info!("Processing file: {}", path.display());
            let report = process(&path, &worker_name);
            pb.inc(1);
            report
        });
        handles.push((name, handle));
    }

    let mut reports = Vec::with_capacity(handles.len());
    for (name, handle) in handles {
        let report = match handle.await {
            Ok(report) => report,
            Err(join_err) => {
                error!("Worker for {} failed: {}", name, join_err);
                pb.inc(1);
                DocumentReport::failed(ExtractionError::unreadable_document(
                    SourceLocation::document(&name),
                    join_err,
                ))
            }
        };
        reports.push(report);
    }

    pb.finish_and_clear();
    Ok(reports)
}

fn print_summary(report: &BatchReport) {
    let summary = report.error_summary();
    let reconciliation = &report.reconciliation;

    println!();
    println!(
        "{} Extracted {} records, {} errors ({} distinct)",
        style("✓").green(),
        style(report.records.len()).green(),
        style(summary.total).red(),
        summary.distinct_messages.len()
    );

    if !summary.distinct_messages.is_empty() {
        println!();
        println!("{}", style("Errors:").red());
        for message in &summary.distinct_messages {
            println!("  - {}", message);
        }
    }

    let warnings = report.diagnostics.count_at_least(Severity::Warning);
    if warnings > 0 {
        println!();
        println!("{} {} warnings (run with -v for details)", style("⚠").yellow(), warnings);
    }

    println!();
    println!("Calculated total: R$ {}", format_amount(reconciliation.calculated_total));
    println!("Verified total:   R$ {}", format_amount(reconciliation.verified_total));
    if reconciliation.mismatched {
        println!(
            "{} Totals differ by R$ {}",
            style("✗").red(),
            format_amount(reconciliation.difference)
        );
    } else {
        println!("{} Totals match", style("✓").green());
    }

    if !reconciliation.unconfirmed_documents.is_empty() {
        println!();
        println!("{}", style("Charged amount not confirmed for:").yellow());
        for document in &reconciliation.unconfirmed_documents {
            println!("  - {}", document);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use billrec_core::reconcile::DEFAULT_TOLERANCE;
    use billrec_core::{AccountInfo, ExtractionErrorKind};
    use std::collections::HashMap;

    #[test]
    fn test_expand_inputs_filters_pdf() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.pdf"), b"").unwrap();
        fs::write(dir.path().join("a.PDF"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let pattern = format!("{}/*", dir.path().display());
        let files = expand_inputs(&[pattern]).unwrap();

        let names: Vec<String> = files.iter().map(|p| document_name(p)).collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn test_expand_inputs_nothing_found() {
        let err = expand_inputs(&["/nonexistent/*.pdf".to_string()]).unwrap_err();
        assert!(err.to_string().contains("No matching files"));
    }

    fn engine_worker() -> impl Fn(&Path, &str) -> DocumentReport + Send + Sync + 'static {
        let engine = Engine::from_config(&Default::default()).unwrap();
        let accounts: HashMap<String, AccountInfo> = HashMap::new();
        move |path: &Path, name: &str| engine.process_document(name, read_pages(path, 0), &accounts)
    }

    #[tokio::test]
    async fn test_unreadable_files_become_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, b"not a pdf").unwrap();

        let reports = process_files(vec![path.clone(), path], 2, engine_worker()).await.unwrap();

        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.records.is_empty() && r.errors.len() == 1));
        assert_eq!(reports[0].document, "broken.pdf");
    }

    #[tokio::test]
    async fn test_panicking_worker_does_not_stop_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a.pdf");
        let bad = dir.path().join("b.pdf");
        let last = dir.path().join("c.pdf");

        let worker = |path: &Path, name: &str| {
            if name == "b.pdf" {
                panic!("font table corrupted in {}", path.display());
            }
            DocumentReport::new(name)
        };

        let reports = process_files(vec![good, bad, last], 2, worker).await.unwrap();

        let names: Vec<&str> = reports.iter().map(|r| r.document.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf", "c.pdf"]);
        assert!(reports[0].errors.is_empty() && reports[2].errors.is_empty());
        assert_eq!(reports[1].errors.len(), 1);
        assert_eq!(reports[1].errors[0].kind, ExtractionErrorKind::UnreadableDocument);
        assert_eq!(reports[1].errors[0].location, SourceLocation::document("b.pdf"));

        let batch = BatchReport::from_documents(reports, DEFAULT_TOLERANCE);
        assert_eq!(batch.errors.len(), 1);
    }
}
