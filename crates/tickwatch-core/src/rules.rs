//! Buy rules and rule-set evaluation.
//!
//! A [`BuyRule`] is a named predicate over a [`Snapshot`]. Rules compose into
//! an ordered [`RuleSet`]; evaluation is a logical OR with first-match-wins
//! short-circuiting. A rule that fails to read its fields terminates the
//! whole evaluation as a definitive non-buy.

use crate::domain::{
    FieldError, Snapshot, FIELD_FIFTY_TWO_WEEK_CHANGE, FIELD_REGULAR_MARKET_OPEN,
    FIELD_REGULAR_MARKET_PRICE,
};

/// A single rule's opinion on one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleVerdict {
    /// The rule signals a buy, with a human-readable rationale. The rationale
    /// is advisory output only, never part of the decision contract.
    Buy { rationale: String },
    /// The rule has no buy opinion for this snapshot.
    Pass,
}

/// A buy-signal predicate over a market snapshot.
///
/// Implementations must be pure with respect to the snapshot: same snapshot,
/// same verdict. Reading an absent or mistyped field fails with
/// [`FieldError`], which the rule set treats as a definitive non-buy.
pub trait BuyRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, snapshot: &Snapshot) -> Result<RuleVerdict, FieldError>;
}

/// Outcome of evaluating a full rule set against one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Some rule fired; rules after it were not consulted.
    Buy {
        rule: &'static str,
        rationale: String,
    },
    /// Every rule passed.
    Hold,
    /// A rule failed to read the snapshot; evaluation stopped there and the
    /// tick is a non-buy.
    Aborted {
        rule: &'static str,
        error: FieldError,
    },
}

impl Decision {
    pub const fn is_buy(&self) -> bool {
        matches!(self, Self::Buy { .. })
    }
}

/// Ordered list of buy rules evaluated with short-circuit OR semantics.
pub struct RuleSet {
    rules: Vec<Box<dyn BuyRule>>,
}

impl RuleSet {
    pub fn new(rules: Vec<Box<dyn BuyRule>>) -> Self {
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate rules in order against one snapshot.
    ///
    /// The first `Buy` verdict wins and later rules are not invoked. A
    /// [`FieldError`] from any rule aborts the evaluation immediately —
    /// later rules are not consulted either.
    //
    // TODO: a single failing rule currently vetoes every rule after it;
    // confirm with the product owner whether the remaining rules should
    // still get a vote before anyone relies on rule order here.
    pub fn evaluate(&self, snapshot: &Snapshot) -> Decision {
        for rule in &self.rules {
            match rule.evaluate(snapshot) {
                Ok(RuleVerdict::Buy { rationale }) => {
                    return Decision::Buy {
                        rule: rule.name(),
                        rationale,
                    }
                }
                Ok(RuleVerdict::Pass) => {}
                Err(error) => {
                    return Decision::Aborted {
                        rule: rule.name(),
                        error,
                    }
                }
            }
        }
        Decision::Hold
    }
}

impl Default for RuleSet {
    /// The stock default: positive 52-week trend, then intraday dip.
    fn default() -> Self {
        Self::new(vec![
            Box::new(FiftyTwoWeekTrend),
            Box::new(IntradayDip),
        ])
    }
}

/// Buys when the trailing 52-week percent change is positive.
pub struct FiftyTwoWeekTrend;

impl BuyRule for FiftyTwoWeekTrend {
    fn name(&self) -> &'static str {
        "52-week-trend"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> Result<RuleVerdict, FieldError> {
        let change = snapshot.number(FIELD_FIFTY_TWO_WEEK_CHANGE)?;
        if change > 0.0 {
            return Ok(RuleVerdict::Buy {
                rationale: format!("52 week change of {change} is positive"),
            });
        }
        Ok(RuleVerdict::Pass)
    }
}

/// Buys when the current price has dipped below today's open.
pub struct IntradayDip;

impl BuyRule for IntradayDip {
    fn name(&self) -> &'static str {
        "intraday-dip"
    }

    fn evaluate(&self, snapshot: &Snapshot) -> Result<RuleVerdict, FieldError> {
        let open = snapshot.number(FIELD_REGULAR_MARKET_OPEN)?;
        let price = snapshot.number(FIELD_REGULAR_MARKET_PRICE)?;
        if price < open {
            return Ok(RuleVerdict::Buy {
                rationale: format!("current price {price} is below the open of {open}"),
            });
        }
        Ok(RuleVerdict::Pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Symbol;
    use serde_json::{json, Map};
    use time::OffsetDateTime;

    fn snapshot(entries: &[(&str, f64)]) -> Snapshot {
        let mut fields = Map::new();
        for (name, value) in entries {
            fields.insert((*name).to_owned(), json!(value));
        }
        Snapshot::new(
            Symbol::parse("tsla").expect("valid symbol"),
            OffsetDateTime::UNIX_EPOCH,
            fields,
        )
    }

    #[test]
    fn positive_week_change_fires_trend_rule() {
        let snapshot = snapshot(&[(FIELD_FIFTY_TWO_WEEK_CHANGE, 0.1)]);
        let verdict = FiftyTwoWeekTrend
            .evaluate(&snapshot)
            .expect("field is present");
        assert!(matches!(verdict, RuleVerdict::Buy { .. }));
    }

    #[test]
    fn flat_week_change_passes_trend_rule() {
        let snapshot = snapshot(&[(FIELD_FIFTY_TWO_WEEK_CHANGE, 0.0)]);
        let verdict = FiftyTwoWeekTrend
            .evaluate(&snapshot)
            .expect("field is present");
        assert_eq!(verdict, RuleVerdict::Pass);
    }

    #[test]
    fn price_below_open_fires_dip_rule() {
        let snapshot = snapshot(&[
            (FIELD_REGULAR_MARKET_OPEN, 100.0),
            (FIELD_REGULAR_MARKET_PRICE, 90.0),
        ]);
        let verdict = IntradayDip.evaluate(&snapshot).expect("fields are present");
        assert!(matches!(verdict, RuleVerdict::Buy { .. }));
    }

    #[test]
    fn dip_rule_errors_without_open_price() {
        let snapshot = snapshot(&[(FIELD_REGULAR_MARKET_PRICE, 90.0)]);
        let error = IntradayDip
            .evaluate(&snapshot)
            .expect_err("open price is missing");
        assert!(matches!(error, FieldError::MissingField { .. }));
    }

    #[test]
    fn default_rule_set_keeps_the_documented_order() {
        let rules = RuleSet::default();
        assert_eq!(rules.len(), 2);

        // Rule 1 fires on positive trend even though rule 2 would pass.
        let decision = rules.evaluate(&snapshot(&[
            (FIELD_FIFTY_TWO_WEEK_CHANGE, 0.1),
            (FIELD_REGULAR_MARKET_OPEN, 100.0),
            (FIELD_REGULAR_MARKET_PRICE, 105.0),
        ]));
        assert_eq!(
            decision,
            Decision::Buy {
                rule: "52-week-trend",
                rationale: String::from("52 week change of 0.1 is positive"),
            }
        );
    }
}
