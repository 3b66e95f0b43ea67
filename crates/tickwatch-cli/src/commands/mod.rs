mod check;
mod watch;

use std::process::ExitCode;
use std::sync::Arc;

use tickwatch_core::{ReqwestHttpClient, StockDataProvider, YahooProvider};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let provider = build_provider(cli.mock);

    match &cli.command {
        Command::Watch(args) => watch::run(args, provider).await,
        Command::Check(args) => check::run(args, provider).await,
    }
}

fn build_provider(mock: bool) -> Arc<dyn StockDataProvider> {
    if mock {
        Arc::new(YahooProvider::default())
    } else {
        Arc::new(YahooProvider::with_http_client(Arc::new(
            ReqwestHttpClient::new(),
        )))
    }
}
