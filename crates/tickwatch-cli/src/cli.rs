//! CLI argument definitions for tickwatch.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `watch` | Poll a ticker on an interval and print buy verdicts |
//! | `check` | Fetch one snapshot, print one verdict, exit |
//!
//! # Examples
//!
//! ```bash
//! # Watch a ticker, polling every 30 seconds
//! tickwatch watch tsla --interval 30
//!
//! # One-shot verdict for scripting
//! tickwatch check msft
//!
//! # Deterministic offline run
//! tickwatch watch tsla --mock
//! ```

use clap::{Args, Parser, Subcommand};

/// Tickwatch - poll a stock ticker and print buy verdicts
///
/// Fetches a market snapshot for one ticker from Yahoo Finance on a fixed
/// interval, runs the configured buy rules against it, and prints BUY or
/// DON'T BUY. Stop with ctrl-c; shutdown waits for the background poller to
/// exit cleanly.
#[derive(Debug, Parser)]
#[command(
    name = "tickwatch",
    author,
    version,
    about = "Poll a stock ticker and print buy verdicts"
)]
pub struct Cli {
    /// Use the deterministic offline transport instead of the live Yahoo API.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll a ticker on an interval and print a verdict per tick.
    ///
    /// Runs until interrupted with ctrl-c. A fetch failure skips that tick
    /// and the loop keeps going at the configured cadence.
    ///
    /// # Examples
    ///
    ///   tickwatch watch tsla
    ///   tickwatch watch msft --interval 60
    Watch(WatchArgs),

    /// Fetch one snapshot, print one verdict, exit.
    ///
    /// # Examples
    ///
    ///   tickwatch check tsla
    Check(CheckArgs),
}

/// Arguments for the `watch` command.
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Ticker symbol to monitor (e.g. tsla). Case-insensitive.
    pub symbol: String,

    /// Seconds between polls (minimum 10).
    #[arg(long, default_value_t = 10)]
    pub interval: u64,
}

/// Arguments for the `check` command.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Ticker symbol to check. Case-insensitive.
    pub symbol: String,
}
