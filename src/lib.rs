//! Exact algebra over index sets.
//!
//! Sets may be finite lists of values, possibly infinite unions of [Range]s, or lazy combinations of other sets.
//! Membership, subset and disjointness questions are answered exactly, including for infinite sets such as
//! the integers or the non-negative reals, by reasoning about their range decompositions.
//!
//! # Examples
//! ```
//! use index_sets::{global::{INTEGERS, REALS}, Range, Set, UNBOUNDED};
//!
//! let evens = Set::from_ranges([Range::numeric(0, UNBOUNDED, 2).unwrap()]);
//! let odds = Set::from_ranges([Range::numeric(1, UNBOUNDED, 2).unwrap()]);
//! assert!(evens.isdisjoint(&odds));
//! assert!((&evens | &odds).issubset(&INTEGERS));
//! assert!(!(&*REALS - &evens).contains(&4.into()));
//! ```

mod error;
pub mod range;
pub mod set;
mod value;

pub use error::{RangeError, SetError};
pub use range::{NumberIter, NumericRange, Range};
pub use set::{global, Container, Set};
pub use value::{Endpoint, Number, Value, UNBOUNDED};
