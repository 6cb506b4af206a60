//! Value objects shared across aggregates.

mod money;

pub use money::{Currency, Money, MoneyError};
