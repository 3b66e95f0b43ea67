use serde_json::{Map, Value};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::Symbol;

/// Canonical field name for the trailing 52-week percent change (a fraction,
/// e.g. `0.12` for +12%).
pub const FIELD_FIFTY_TWO_WEEK_CHANGE: &str = "52WeekChange";
/// Canonical field name for today's opening price.
pub const FIELD_REGULAR_MARKET_OPEN: &str = "regularMarketOpen";
/// Canonical field name for the current regular-market price.
pub const FIELD_REGULAR_MARKET_PRICE: &str = "regularMarketPrice";

/// Error raised when a rule reads a field the snapshot does not carry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("snapshot has no field '{field}'")]
    MissingField { field: String },
    #[error("snapshot field '{field}' is not numeric")]
    NotNumeric { field: String },
    #[error("snapshot field '{field}' is not text")]
    NotText { field: String },
}

/// Point-in-time bundle of market-data fields for one ticker.
///
/// Produced fresh on every poll and discarded after evaluation; never
/// mutated. Field names follow the provider's wire names (see the `FIELD_*`
/// constants for the ones the default rules read).
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    symbol: Symbol,
    fetched_at: OffsetDateTime,
    fields: Map<String, Value>,
}

impl Snapshot {
    pub fn new(symbol: Symbol, fetched_at: OffsetDateTime, fields: Map<String, Value>) -> Self {
        Self {
            symbol,
            fetched_at,
            fields,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn fetched_at(&self) -> OffsetDateTime {
        self.fetched_at
    }

    pub fn fetched_at_rfc3339(&self) -> String {
        self.fetched_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| String::from("<unformattable>"))
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Read a numeric field.
    ///
    /// Accepts plain JSON numbers as well as the provider's `{"raw": n}`
    /// wrapper objects.
    pub fn number(&self, field: &str) -> Result<f64, FieldError> {
        let value = self.fields.get(field).ok_or_else(|| {
            FieldError::MissingField {
                field: field.to_owned(),
            }
        })?;

        match value {
            Value::Number(number) => number.as_f64().ok_or_else(|| FieldError::NotNumeric {
                field: field.to_owned(),
            }),
            Value::Object(object) => object
                .get("raw")
                .and_then(Value::as_f64)
                .ok_or_else(|| FieldError::NotNumeric {
                    field: field.to_owned(),
                }),
            _ => Err(FieldError::NotNumeric {
                field: field.to_owned(),
            }),
        }
    }

    /// Read a text field.
    pub fn text(&self, field: &str) -> Result<&str, FieldError> {
        let value = self.fields.get(field).ok_or_else(|| {
            FieldError::MissingField {
                field: field.to_owned(),
            }
        })?;

        value.as_str().ok_or_else(|| FieldError::NotText {
            field: field.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot_with(fields: Map<String, Value>) -> Snapshot {
        let symbol = Symbol::parse("tsla").expect("valid symbol");
        Snapshot::new(symbol, OffsetDateTime::UNIX_EPOCH, fields)
    }

    #[test]
    fn reads_plain_numbers() {
        let mut fields = Map::new();
        fields.insert(FIELD_REGULAR_MARKET_PRICE.to_owned(), json!(101.5));
        let snapshot = snapshot_with(fields);

        assert_eq!(snapshot.number(FIELD_REGULAR_MARKET_PRICE), Ok(101.5));
    }

    #[test]
    fn unwraps_raw_value_objects() {
        let mut fields = Map::new();
        fields.insert(
            FIELD_FIFTY_TWO_WEEK_CHANGE.to_owned(),
            json!({ "raw": 0.25, "fmt": "25.00%" }),
        );
        let snapshot = snapshot_with(fields);

        assert_eq!(snapshot.number(FIELD_FIFTY_TWO_WEEK_CHANGE), Ok(0.25));
    }

    #[test]
    fn missing_field_is_an_error() {
        let snapshot = snapshot_with(Map::new());

        assert_eq!(
            snapshot.number(FIELD_FIFTY_TWO_WEEK_CHANGE),
            Err(FieldError::MissingField {
                field: FIELD_FIFTY_TWO_WEEK_CHANGE.to_owned()
            })
        );
    }

    #[test]
    fn non_numeric_field_is_an_error() {
        let mut fields = Map::new();
        fields.insert("currency".to_owned(), json!("USD"));
        let snapshot = snapshot_with(fields);

        assert!(matches!(
            snapshot.number("currency"),
            Err(FieldError::NotNumeric { .. })
        ));
        assert_eq!(snapshot.text("currency"), Ok("USD"));
    }
}
