//! # Tickwatch Core
//!
//! Core contracts and the polling engine for the tickwatch stock monitor.
//!
//! ## Overview
//!
//! This crate provides the foundational components for tickwatch:
//!
//! - **Canonical domain types** for ticker symbols and market snapshots
//! - **Provider contract** for pluggable market-data sources
//! - **Yahoo adapter** with cookie/crumb authentication and a mock mode
//! - **Buy-rule evaluator** composing ordered predicate rules
//! - **Polling monitor** with a cancellable bounded-wait loop
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Yahoo) |
//! | [`data_source`] | Provider trait and source error types |
//! | [`domain`] | Domain types (Symbol, Snapshot) |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`monitor`] | Polling loop, cancellation token, lifecycle |
//! | [`rules`] | Buy rules and rule-set evaluation |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickwatch_core::{Monitor, PollInterval, RuleSet, Symbol, YahooProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = Arc::new(YahooProvider::default());
//!     let monitor = Monitor::new(provider, RuleSet::default());
//!
//!     let symbol = Symbol::parse("tsla")?;
//!     let interval = PollInterval::new(std::time::Duration::from_secs(30))?;
//!
//!     let handle = tickwatch_core::monitor::spawn(monitor, symbol, interval);
//!     tokio::signal::ctrl_c().await?;
//!     handle.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! Exactly two lines of control exist at runtime: the caller (interrupt
//! waiting, shutdown orchestration) and one background polling task. The only
//! shared mutable state is the [`CancelToken`], set once by the caller and
//! observed by the loop at its bounded-wait point.

pub mod adapters;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod monitor;
pub mod rules;

// Re-export commonly used types at crate root for convenience

// Adapter implementations
pub use adapters::YahooProvider;

// Provider trait and types
pub use data_source::{ProviderId, SourceError, SourceErrorKind, StockDataProvider};

// Domain types
pub use domain::{FieldError, Snapshot, Symbol};

// Error types
pub use error::ValidationError;

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};

// Monitor types
pub use monitor::{
    CancelToken, ConfigError, Monitor, MonitorHandle, PollInterval, TickObserver, WaitOutcome,
    MIN_POLL_INTERVAL,
};

// Rule types
pub use rules::{BuyRule, Decision, FiftyTwoWeekTrend, IntradayDip, RuleSet, RuleVerdict};
