use std::process::ExitCode;
use std::sync::Arc;

use tickwatch_core::{RuleSet, StockDataProvider, Symbol};

use crate::cli::CheckArgs;
use crate::error::CliError;
use crate::report::ConsoleReporter;

/// One tick without the loop: fetch, evaluate, print, exit.
pub async fn run(
    args: &CheckArgs,
    provider: Arc<dyn StockDataProvider>,
) -> Result<ExitCode, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;

    println!("checking on {symbol}");
    let snapshot = provider.fetch(&symbol).await?;
    println!("snapshot as of {}", snapshot.fetched_at_rfc3339());

    let decision = RuleSet::default().evaluate(&snapshot);
    ConsoleReporter::print_decision(&symbol, &decision);

    Ok(ExitCode::SUCCESS)
}
