//! Extract command: run the pipeline on one PDF and emit the result.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::info;

use ledgerlens_core::{CancelToken, PdfiumStatement, StatementExtractor};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input statement PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Print a human summary instead of JSON
    #[arg(long)]
    summary: bool,
}

pub fn run(args: ExtractArgs) -> anyhow::Result<()> {
    let started = Instant::now();

    let pdf = PdfiumStatement::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;

    // No model backends wired: the deterministic tiers carry the CLI.
    let extractor = StatementExtractor::new();
    let cancel = CancelToken::new();
    let result = extractor.extract(&pdf, None, &cancel)?;

    info!(elapsed_ms = started.elapsed().as_millis() as u64, "extraction finished");

    if args.summary {
        println!("{}", style("Extraction summary").bold());
        println!("  Bank:         {}", result.bank);
        println!(
            "  Account:      {}",
            result.account_info.account_number.as_deref().unwrap_or("-")
        );
        println!(
            "  Holder:       {}",
            result.account_info.account_holder.as_deref().unwrap_or("-")
        );
        println!("  Method:       {:?}", result.extraction_method);
        println!("  Transactions: {}", result.transactions.len());
        println!("  Currencies:   {}", result.currencies.join(", "));
        println!(
            "  Chain:        {}/{} valid ({}%)",
            result.balance_chain.valid_links,
            result.balance_chain.total_links,
            result.balance_chain.chain_accuracy_pct
        );
        let grade = &result.accuracy.grade;
        let line = format!("  Accuracy:     {}/100 ({grade})", result.accuracy.overall_score);
        if grade.starts_with('A') {
            println!("{}", style(line).green());
        } else {
            println!("{}", style(line).yellow());
        }
        return Ok(());
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };

    match args.output {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
