//! Polling loop, cancellation token, and lifecycle control.
//!
//! The monitor repeats fetch → evaluate → report on a fixed interval until
//! its [`CancelToken`] is set. Cancellation is cooperative: the loop notices
//! it at the bounded-wait point, so worst-case shutdown latency is one
//! in-flight fetch plus an immediate wait check. Ticker, rules, token, and
//! interval are explicit parameters of the spawned task — nothing lives in
//! process-global state, so independent monitors could coexist with their own
//! tokens.

mod cancel;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};

use crate::data_source::{SourceError, StockDataProvider};
use crate::rules::{Decision, RuleSet};
use crate::Symbol;

pub use cancel::{CancelToken, WaitOutcome};

/// Floor on the polling cadence. Startup is refused below this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Monitor configuration errors, all fatal before any background work starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("poll interval {requested_secs}s is below the {floor_secs}s minimum")]
    IntervalBelowFloor { requested_secs: u64, floor_secs: u64 },
}

/// Poll cadence validated against [`MIN_POLL_INTERVAL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollInterval(Duration);

impl PollInterval {
    pub fn new(interval: Duration) -> Result<Self, ConfigError> {
        if interval < MIN_POLL_INTERVAL {
            return Err(ConfigError::IntervalBelowFloor {
                requested_secs: interval.as_secs(),
                floor_secs: MIN_POLL_INTERVAL.as_secs(),
            });
        }
        Ok(Self(interval))
    }

    /// The lowest permitted cadence, also the default.
    pub const fn minimum() -> Self {
        Self(MIN_POLL_INTERVAL)
    }

    pub const fn as_duration(self) -> Duration {
        self.0
    }

    pub const fn as_secs(self) -> u64 {
        self.0.as_secs()
    }
}

impl Default for PollInterval {
    fn default() -> Self {
        Self::minimum()
    }
}

/// Receiver for per-tick events.
///
/// The core never prints; the CLI renders these as console lines and tests
/// record them. All methods default to no-ops.
pub trait TickObserver: Send + Sync {
    /// A poll attempt is starting.
    fn on_tick(&self, symbol: &Symbol) {
        let _ = symbol;
    }

    /// The provider could not produce a snapshot; the tick is skipped.
    fn on_no_data(&self, symbol: &Symbol, error: &SourceError) {
        let _ = (symbol, error);
    }

    /// The rule set reached a decision for this tick.
    fn on_decision(&self, symbol: &Symbol, decision: &Decision) {
        let _ = (symbol, decision);
    }

    /// The loop observed cancellation and is exiting.
    fn on_stopped(&self, symbol: &Symbol) {
        let _ = symbol;
    }
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl TickObserver for NoopObserver {}

/// The polling loop: provider + rules + observer.
pub struct Monitor {
    provider: Arc<dyn StockDataProvider>,
    rules: RuleSet,
    observer: Arc<dyn TickObserver>,
}

impl Monitor {
    pub fn new(provider: Arc<dyn StockDataProvider>, rules: RuleSet) -> Self {
        Self {
            provider,
            rules,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn TickObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Run the polling loop until the token is set.
    ///
    /// Each tick fetches a snapshot, evaluates it (or reports "no data" on a
    /// fetch failure), then waits out the interval or the token, whichever
    /// comes first. Provider failures never terminate the loop — they are
    /// assumed transient and the next tick retries. The floor on `interval`
    /// is the controller's concern ([`PollInterval`]), not this loop's.
    pub async fn run(self, symbol: Symbol, cancel: CancelToken, interval: Duration) {
        loop {
            self.tick(&symbol).await;

            if cancel.wait_for(interval).await == WaitOutcome::Cancelled {
                self.observer.on_stopped(&symbol);
                return;
            }
        }
    }

    async fn tick(&self, symbol: &Symbol) {
        self.observer.on_tick(symbol);

        match self.provider.fetch(symbol).await {
            Ok(snapshot) => {
                let decision = self.rules.evaluate(&snapshot);
                self.observer.on_decision(symbol, &decision);
            }
            Err(error) => {
                self.observer.on_no_data(symbol, &error);
            }
        }
    }
}

/// Handle to a spawned monitor: the cancellation token plus the join handle.
pub struct MonitorHandle {
    cancel: CancelToken,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// A clone of the task's cancellation token.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Set the token and wait for the loop to acknowledge and exit.
    ///
    /// After this returns no background work survives.
    pub async fn shutdown(self) -> Result<(), JoinError> {
        self.cancel.cancel();
        self.task.await
    }
}

/// Start the polling loop as an independent task.
///
/// The interval has already passed the floor check by construction of
/// [`PollInterval`]; no provider call happens before this point.
pub fn spawn(monitor: Monitor, symbol: Symbol, interval: PollInterval) -> MonitorHandle {
    let cancel = CancelToken::new();
    let task_cancel = cancel.clone();
    let task = tokio::spawn(monitor.run(symbol, task_cancel, interval.as_duration()));

    MonitorHandle { cancel, task }
}
