//! Console rendering of monitor events.

use tickwatch_core::{Decision, SourceError, Symbol, TickObserver};

/// Prints one human-readable line per monitor event.
///
/// Output here is advisory, not a stable contract.
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn print_decision(symbol: &Symbol, decision: &Decision) {
        match decision {
            Decision::Buy { rule, rationale } => {
                println!("{symbol}: rule {rule} fired: {rationale}");
                println!("{symbol}: BUY");
            }
            Decision::Hold => {
                println!("{symbol}: DON'T BUY");
            }
            Decision::Aborted { rule, error } => {
                println!("{symbol}: problem reading snapshot in rule {rule}: {error}");
                println!("{symbol}: DON'T BUY");
            }
        }
    }
}

impl TickObserver for ConsoleReporter {
    fn on_tick(&self, symbol: &Symbol) {
        println!("checking on {symbol}");
    }

    fn on_no_data(&self, symbol: &Symbol, error: &SourceError) {
        println!("{symbol}: no data ({error}), skipping this tick");
    }

    fn on_decision(&self, symbol: &Symbol, decision: &Decision) {
        Self::print_decision(symbol, decision);
    }

    fn on_stopped(&self, symbol: &Symbol) {
        println!("{symbol}: monitor stopped");
    }
}
