//! Errors raised by range construction, range algebra and the set API.

use thiserror::Error;

use crate::{Number, Value};

/// Errors raised when constructing ranges or computing their algebra.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RangeError {
    #[error("step must be int (got {0})")]
    NonIntegralStep(Number),
    #[error("step must lie between -2^63 and 2^63 exclusive (got {0})")]
    StepOutOfRange(Number),
    #[error("range bounds must be finite numbers (got {0})")]
    NonFiniteBound(Number),
    #[error("start must not be None for discrete ranges (step {0})")]
    UngroundedDiscrete(i64),
    #[error("start must be <= end for continuous ranges (start {start}, end {end})")]
    ContinuousOrder { start: Number, end: Number },
    #[error("start, end ordering incompatible with step direction (start {start}, end {end}, step {step})")]
    StepDirection { start: Number, end: Number, step: i64 },
    #[error("{range} is discrete, but passed closed=({lo}, {hi})")]
    DiscreteBrackets { range: String, lo: bool, hi: bool },
    #[error("the interval at {0} contains no values unless it is closed on both sides")]
    EmptyInterval(Number),
    /// Removing infinitely many points from a continuous range leaves a set that no finite list of ranges
    /// can represent.
    #[error("cannot remove the infinite range {other} from the continuous range {range}")]
    InfinitePuncture { range: String, other: String },
    /// Removing a progression from another one whose steps share almost no common factor leaves more
    /// sub-progressions than are listed.
    #[error("removing {other} from {range} leaves too many pieces to list")]
    TooManyPieces { range: String, other: String },
}

/// Errors raised by the set API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetError {
    #[error("valid index values for sets are 1 .. len(set) or -1 .. -len(set)")]
    ZeroIndex,
    #[error("cannot index a set past the last element (index {index}, length {len})")]
    IndexPastEnd { index: isize, len: usize },
    #[error("cannot index a set before the first element (index {index}, length {len})")]
    IndexBeforeStart { index: isize, len: usize },
    #[error("cannot identify position of {value} in set {set}")]
    NotAMember { value: Value, set: String },
    #[error("cannot advance past the end of the set")]
    AdvancePastEnd,
    #[error("cannot advance before the beginning of the set")]
    AdvanceBeforeStart,
    #[error("{operation} is only defined for finite sets, but {set} is infinite")]
    NotFinite { operation: &'static str, set: String },
    #[error("{operation} is only defined for ordered sets, but {set} is not ordered")]
    NotOrdered { operation: &'static str, set: String },
    #[error(transparent)]
    Range(#[from] RangeError),
}
