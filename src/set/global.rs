//! The canonical infinite sets.
//!
//! Each set is built once, on first use, and shared by the whole process.
//!
//! # Examples
//! ```
//! use index_sets::global::{INTEGERS, POSITIVE_INTEGERS, REALS};
//!
//! assert!(REALS.contains(&0.5.into()));
//! assert!(INTEGERS.contains(&(-3).into()));
//! assert!(!POSITIVE_INTEGERS.contains(&0.into()));
//! assert!(POSITIVE_INTEGERS.issubset(&INTEGERS));
//! assert!(INTEGERS.issubset(&REALS));
//! assert!(!REALS.issubset(&INTEGERS));
//! ```

use lazy_static::lazy_static;

use super::Set;
use crate::{Number, NumericRange, Range};

fn continuous(start: Option<i32>, end: Option<i32>, closed: (bool, bool)) -> Range {
    Range::Numeric(NumericRange::raw(start.map(Number::from), end.map(Number::from), 0, closed))
}

fn progression(start: i32, end: Option<i32>, step: i64) -> Range {
    Range::Numeric(NumericRange::raw(
        Some(Number::from(start)),
        end.map(Number::from),
        step,
        (true, true),
    ))
}

lazy_static! {
    /// All real numbers.
    pub static ref REALS: Set = Set::named("Reals", [continuous(None, None, (true, true))]);
    /// The real numbers `x >= 0`.
    pub static ref NON_NEGATIVE_REALS: Set =
        Set::named("NonNegativeReals", [continuous(Some(0), None, (true, true))]);
    /// The real numbers `x <= 0`.
    pub static ref NON_POSITIVE_REALS: Set =
        Set::named("NonPositiveReals", [continuous(None, Some(0), (true, true))]);
    /// The real numbers `x > 0`.
    pub static ref POSITIVE_REALS: Set = Set::named("PositiveReals", [continuous(Some(0), None, (false, true))]);
    /// The real numbers `x < 0`.
    pub static ref NEGATIVE_REALS: Set = Set::named("NegativeReals", [continuous(None, Some(0), (true, false))]);
    /// All integers, as a descending and an ascending progression from `0`.
    pub static ref INTEGERS: Set = Set::named("Integers", [progression(0, None, -1), progression(0, None, 1)]);
    /// The integers `1, 2, 3, ...`.
    pub static ref POSITIVE_INTEGERS: Set = Set::named("PositiveIntegers", [progression(1, None, 1)]);
    /// The integers `0, 1, 2, ...`.
    pub static ref NON_NEGATIVE_INTEGERS: Set = Set::named("NonNegativeIntegers", [progression(0, None, 1)]);
    /// The integers `-1, -2, -3, ...`.
    pub static ref NEGATIVE_INTEGERS: Set = Set::named("NegativeIntegers", [progression(-1, None, -1)]);
    /// The integers `0, -1, -2, ...`.
    pub static ref NON_POSITIVE_INTEGERS: Set = Set::named("NonPositiveIntegers", [progression(0, None, -1)]);
    /// The set `{0, 1}`.
    pub static ref BINARY: Set = Set::named("Binary", [progression(0, Some(1), 1)]);
    /// The set of all values.
    pub static ref ANY: Set = Set::named("Any", [Range::Any]);
}
