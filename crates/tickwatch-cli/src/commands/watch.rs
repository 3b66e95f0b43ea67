use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tickwatch_core::{monitor, Monitor, PollInterval, RuleSet, StockDataProvider, Symbol};

use crate::cli::WatchArgs;
use crate::error::CliError;
use crate::report::ConsoleReporter;

pub async fn run(
    args: &WatchArgs,
    provider: Arc<dyn StockDataProvider>,
) -> Result<ExitCode, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    // Refuse a too-tight cadence before any background work starts.
    let interval = PollInterval::new(Duration::from_secs(args.interval))?;

    let monitor =
        Monitor::new(provider, RuleSet::default()).with_observer(Arc::new(ConsoleReporter));

    println!("watching {symbol}, polling every {}s", interval.as_secs());
    let handle = monitor::spawn(monitor, symbol, interval);

    println!("press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;

    println!("stopping, waiting for the monitor to finish...");
    handle
        .shutdown()
        .await
        .map_err(|error| CliError::Monitor(error.to_string()))?;
    println!("done");

    Ok(ExitCode::SUCCESS)
}
