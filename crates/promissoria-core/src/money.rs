use chrono::{Months, NaiveDate};
use rust_decimal::RoundingStrategy;

use crate::error::LedgerError;
use crate::types::Money;
use crate::LedgerResult;

/// Truncate to the lower cent (drop everything past two decimal places).
pub fn truncate_to_cent(value: Money) -> Money {
    value.round_dp_with_strategy(2, RoundingStrategy::ToZero)
}

/// Round half-up to two decimal places.
pub fn round_to_cent(value: Money) -> Money {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Advance a date by whole calendar months. Day-of-month is preserved when
/// the target month has that day, otherwise clamped to the month's last day
/// (2024-01-31 + 1 month = 2024-02-29).
pub fn add_months(date: NaiveDate, months: u32) -> LedgerResult<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| LedgerError::DateOutOfRange(format!("{date} + {months} months overflows")))
}

/// Rescale to exactly two decimal places without changing the value,
/// so 100 and 100.00 serialise identically.
pub fn normalize_cents(value: Money) -> Money {
    let mut v = value;
    v.rescale(2);
    v
}
