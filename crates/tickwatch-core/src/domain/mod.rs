//! Domain types shared across the crate.

mod snapshot;
mod symbol;

pub use snapshot::{
    FieldError, Snapshot, FIELD_FIFTY_TWO_WEEK_CHANGE, FIELD_REGULAR_MARKET_OPEN,
    FIELD_REGULAR_MARKET_PRICE,
};
pub use symbol::Symbol;
