//! Inspect command - show how one document is read, to diagnose template drift.

use std::path::PathBuf;

use clap::Args;
use console::style;

use billrec_core::invoice::rules::{account::extract_account_id, format_amount};
use billrec_core::pdf::read_pages;
use billrec_core::Engine;

use super::{document_name, load_config};

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Print the full text of every page
    #[arg(long)]
    text: bool,
}

pub async fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let engine = Engine::from_config(&config)?;
    let name = document_name(&args.input);
    let pages = read_pages(&args.input, config.pdf.max_pages)?;

    println!("{} {} ({} pages)", style("ℹ").blue(), name, pages.len());

    for (page_index, page_text) in pages.iter().enumerate() {
        println!();
        println!("{}", style(format!("Page {}", page_index + 1)).bold());

        if args.text {
            println!("{}", page_text);
            println!("{}", style("-".repeat(40)).dim());
        }

        let blocks = engine.segmenter().segment(page_text, &name, page_index);
        if blocks.is_empty() {
            println!("  {}", style("no account blocks").yellow());
            continue;
        }

        for block in &blocks {
            let account = extract_account_id(&block.raw_text).unwrap_or_else(|| "-".to_string());
            let first_line = block.raw_text.lines().next().unwrap_or("").trim();
            println!(
                "  UC {:<12} {:>6} chars  {}",
                account,
                block.raw_text.chars().count(),
                style(first_line).dim()
            );
        }
    }

    println!();
    let verified = match pages.first() {
        Some(first) => engine.verifier().verify(&name, first),
        None => return Ok(()),
    };
    match verified.amount {
        Some(amount) if verified.duplicate_confirmed => println!(
            "{} Charged amount R$ {} confirmed ({} occurrences)",
            style("✓").green(),
            format_amount(amount),
            verified.occurrences
        ),
        _ => println!(
            "{} {}",
            style("⚠").yellow(),
            verified
                .inconclusive_reason()
                .unwrap_or_else(|| "charged amount not confirmed".to_string())
        ),
    }

    Ok(())
}
