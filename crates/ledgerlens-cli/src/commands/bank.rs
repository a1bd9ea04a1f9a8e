//! Bank command: run bank detection only.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use ledgerlens_core::{BankDetector, CancelToken, PdfiumStatement};

/// Arguments for the bank command.
#[derive(Args)]
pub struct BankArgs {
    /// Input statement PDF
    #[arg(required = true)]
    input: PathBuf,
}

pub fn run(args: BankArgs) -> anyhow::Result<()> {
    let pdf = PdfiumStatement::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;

    let layout = BankDetector::new().detect(&pdf, &CancelToken::new())?;
    println!(
        "{} (confidence {:.2}, source {:?})",
        layout.bank.name(),
        layout.confidence,
        layout.source
    );
    Ok(())
}
