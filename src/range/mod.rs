//! Ranges are the atomic building blocks from which the members of infinite sets are described.
//!
//! A [NumericRange] is either a continuous interval of the real line (step `0`) or a discrete arithmetic
//! progression with an integral, non-zero step.
//! A [Range] additionally covers single non-numeric values and the universal range that contains everything.
//! The algebra on ranges (intersection, difference, disjointness and subset tests) lives in the `algebra` submodule.

mod algebra;

use std::{fmt::Display, hash::Hash};

use num_integer::Integer;
use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Endpoint, Number, RangeError, Value};

/// A numeric range.
///
/// With step `0` the range is the continuous interval between `start` and `end`. Each side may be open or closed
/// and a missing bound means the interval is unbounded on that side.
/// With a non-zero step the range is the progression `start, start + step, start + 2 * step, ...` which stops
/// at `end` or runs forever if `end` is unbounded. Discrete ranges always have a bounded start.
///
/// Ranges are normalized on construction:
/// - the end of a discrete range is moved to the last member of the progression,
/// - a discrete range with a single member becomes the point range `[x]`,
/// - unbounded sides of continuous intervals are closed.
///
/// Two ranges are equal if they contain the same values, regardless of the direction of discrete progressions.
///
/// # Examples
/// ```
/// use index_sets::{NumericRange, UNBOUNDED};
///
/// let r = NumericRange::new(1, 11, 3).unwrap();
/// assert_eq!(r.to_string(), "[1:10:3]");
/// assert_eq!(r.end(), Some(10.into()));
/// assert_eq!(r, NumericRange::new(10, 1, -3).unwrap());
///
/// let positive = NumericRange::with_brackets(0, UNBOUNDED, 0, (false, true)).unwrap();
/// assert_eq!(positive.to_string(), "(0,inf]");
/// assert!(NumericRange::new(0, 1, 1.5).is_err());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "NumericRangeRepr", into = "NumericRangeRepr")
)]
pub struct NumericRange {
    start: Option<Number>,
    end: Option<Number>,
    step: i64,
    closed: (bool, bool),
}

impl NumericRange {
    /// Creates a new numeric range that is closed on both sides.
    pub fn new(
        start: impl Into<Endpoint>,
        end: impl Into<Endpoint>,
        step: impl Into<Number>,
    ) -> Result<Self, RangeError> {
        Self::with_brackets(start, end, step, (true, true))
    }

    /// Creates a new numeric range with the given closedness of the (lower, upper) side.
    ///
    /// Only continuous ranges may have open sides.
    ///
    /// # Errors
    /// Fails if the step is not integral, a bound is not finite, a discrete range has no start, a continuous range
    /// has `start > end`, the end lies behind the start in step direction, a discrete range is not closed on both
    /// sides or a single-point interval is not closed on both sides.
    pub fn with_brackets(
        start: impl Into<Endpoint>,
        end: impl Into<Endpoint>,
        step: impl Into<Number>,
        closed: (bool, bool),
    ) -> Result<Self, RangeError> {
        let (start, end, step) = (start.into().get(), end.into().get(), step.into());
        let step = match step.to_i64() {
            Some(i64::MIN) => return Err(RangeError::StepOutOfRange(step)),
            Some(step) => step,
            None if step.is_integral() => return Err(RangeError::StepOutOfRange(step)),
            None => return Err(RangeError::NonIntegralStep(step)),
        };
        if let Some(bound) = [start, end].into_iter().flatten().find(|b| !b.is_finite()) {
            return Err(RangeError::NonFiniteBound(bound));
        }
        if step == 0 {
            Self::new_continuous(start, end, closed)
        } else {
            Self::new_discrete(start, end, step, closed)
        }
    }

    /// Creates the continuous interval between `start` and `end`, closed on both sides.
    pub fn continuous(start: impl Into<Endpoint>, end: impl Into<Endpoint>) -> Result<Self, RangeError> {
        Self::new(start, end, 0)
    }

    /// Creates the range containing exactly the given number.
    pub fn point(x: impl Into<Number>) -> Self {
        let x = x.into();
        Self::raw(Some(x), Some(x), 0, (true, true))
    }

    fn new_continuous(start: Option<Number>, end: Option<Number>, closed: (bool, bool)) -> Result<Self, RangeError> {
        let closed = (closed.0 || start.is_none(), closed.1 || end.is_none());
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(RangeError::ContinuousOrder { start: s, end: e });
            }
            if s == e && closed != (true, true) {
                return Err(RangeError::EmptyInterval(s));
            }
        }
        Ok(Self::raw(start, end, 0, closed))
    }

    fn new_discrete(
        start: Option<Number>,
        end: Option<Number>,
        step: i64,
        closed: (bool, bool),
    ) -> Result<Self, RangeError> {
        let start = start.ok_or(RangeError::UngroundedDiscrete(step))?;
        if closed != (true, true) {
            return Err(RangeError::DiscreteBrackets {
                range: Self::raw(Some(start), end, step, (true, true)).to_string(),
                lo: closed.0,
                hi: closed.1,
            });
        }
        let Some(end) = end else {
            return Ok(Self::raw(Some(start), None, step, closed));
        };
        let steps = (end.get() - start.get()) / step as f64;
        if steps < 0.0 {
            return Err(RangeError::StepDirection { start, end, step });
        }
        let end = Number::new(start.get() + step as f64 * steps.floor());
        if end == start {
            Ok(Self::point(start))
        } else {
            Ok(Self::raw(Some(start), Some(end), step, closed))
        }
    }

    /// Creates a range without validating or normalizing it.
    /// Callers must only pass values that `with_brackets` would produce.
    pub(crate) fn raw(start: Option<Number>, end: Option<Number>, step: i64, closed: (bool, bool)) -> Self {
        NumericRange {
            start,
            end,
            step,
            closed,
        }
    }

    /// Returns the start of the range, `None` if unbounded.
    pub fn start(&self) -> Option<Number> {
        self.start
    }

    /// Returns the end of the range, `None` if unbounded.
    pub fn end(&self) -> Option<Number> {
        self.end
    }

    /// Returns the step of the range. The step is `0` for continuous ranges and point ranges.
    pub fn step(&self) -> i64 {
        self.step
    }

    /// Returns whether the (lower, upper) side is closed.
    pub fn closed(&self) -> (bool, bool) {
        self.closed
    }

    /// Returns true if the range contains exactly one number.
    pub fn is_point(&self) -> bool {
        self.start.is_some() && self.start == self.end
    }

    /// Returns true if the range is a continuous interval that contains more than one number.
    pub fn is_continuous(&self) -> bool {
        self.step == 0 && !self.is_point()
    }

    /// Returns true if the range is a progression or a single point.
    pub fn is_discrete(&self) -> bool {
        !self.is_continuous()
    }

    /// Returns true if the range contains finitely many numbers.
    pub fn is_finite(&self) -> bool {
        if self.step == 0 {
            self.is_point()
        } else {
            self.end.is_some()
        }
    }

    /// The smallest value of the range, `None` if unbounded below.
    pub fn lower(&self) -> Option<Number> {
        if self.step < 0 {
            self.end
        } else {
            self.start
        }
    }

    /// The largest value of the range, `None` if unbounded above.
    pub fn upper(&self) -> Option<Number> {
        if self.step < 0 {
            self.start
        } else {
            self.end
        }
    }

    /// Checks whether the given value is a member of the range. Non-numeric values are never members.
    ///
    /// # Examples
    /// ```
    /// use index_sets::NumericRange;
    ///
    /// let r = NumericRange::new(0, 10, 2).unwrap();
    /// assert!(r.contains(&4.into()));
    /// assert!(!r.contains(&5.into()));
    /// assert!(!r.contains(&"4".into()));
    ///
    /// let half_open = NumericRange::with_brackets(0, 1, 0, (true, false)).unwrap();
    /// assert!(half_open.contains(&0.5.into()));
    /// assert!(!half_open.contains(&1.into()));
    /// ```
    pub fn contains(&self, value: &Value) -> bool {
        value.as_number().is_some_and(|x| self.contains_number(x))
    }

    /// Checks whether the given number is a member of the range.
    pub fn contains_number(&self, x: Number) -> bool {
        if !self.span().contains(x) {
            return false;
        }
        match self.start {
            Some(start) if self.step != 0 => (x.get() - start.get()) % self.step as f64 == 0.0,
            _ => true,
        }
    }

    /// Returns an iterator over the members of the range in ascending order, or `None` if the range is infinite.
    ///
    /// # Examples
    /// ```
    /// use index_sets::{Number, NumericRange};
    ///
    /// let r = NumericRange::new(7, 1, -3).unwrap();
    /// let members: Vec<Number> = r.iter().unwrap().collect();
    /// assert_eq!(members, vec![1.into(), 4.into(), 7.into()]);
    /// assert!(NumericRange::continuous(0, 1).unwrap().iter().is_none());
    /// ```
    pub fn iter(&self) -> Option<NumberIter> {
        if !self.is_finite() {
            return None;
        }
        match (self.lower(), self.upper()) {
            (Some(lo), Some(hi)) => Some(NumberIter {
                current: lo.get(),
                last: hi.get(),
                step: self.unit(),
            }),
            _ => None,
        }
    }

    /// The number of members of a finite range, `None` if the range is infinite.
    ///
    /// # Examples
    /// ```
    /// use index_sets::NumericRange;
    ///
    /// assert_eq!(NumericRange::new(10, 1, -3).unwrap().member_count(), Some(4));
    /// assert_eq!(NumericRange::point(2).member_count(), Some(1));
    /// assert_eq!(NumericRange::continuous(0, 1).unwrap().member_count(), None);
    /// ```
    pub fn member_count(&self) -> Option<usize> {
        if !self.is_finite() {
            return None;
        }
        let (lo, hi) = (self.lower()?, self.upper()?);
        Some(((hi.get() - lo.get()) / self.unit()).round() as usize + 1)
    }

    /// The member at the given 0-based position in ascending order.
    pub(crate) fn nth_member(&self, position: usize) -> Option<Number> {
        if position >= self.member_count()? {
            return None;
        }
        let lo = self.lower()?;
        Some(Number::new(lo.get() + position as f64 * self.unit()))
    }

    /// The 0-based position of the number among the members in ascending order.
    pub(crate) fn position(&self, x: Number) -> Option<usize> {
        if !self.is_finite() || !self.contains_number(x) {
            return None;
        }
        let lo = self.lower()?;
        Some(((x.get() - lo.get()) / self.unit()).round() as usize)
    }

    /// The distance between neighbouring members of a discrete range.
    fn unit(&self) -> f64 {
        self.step.unsigned_abs().max(1) as f64
    }

    /// The absolute step of the range as it counts towards a common step: progressions count with their step,
    /// points with `1`, and continuous intervals do not count.
    fn lcm_step(&self) -> Option<i64> {
        if self.step != 0 {
            Some(self.step.abs())
        } else if self.is_point() {
            Some(1)
        } else {
            None
        }
    }

    /// The ascending interval covered by the range. For discrete ranges this is the hull of the members.
    fn span(&self) -> Span {
        let (lo_closed, hi_closed) = if self.step == 0 { self.closed } else { (true, true) };
        Span {
            lo: self.lower(),
            hi: self.upper(),
            lo_closed,
            hi_closed,
        }
    }

    /// The identity of the set of numbers described by the range.
    fn key(&self) -> (Option<Number>, Option<Number>, u64, (bool, bool)) {
        (self.lower(), self.upper(), self.step.unsigned_abs(), self.closed)
    }
}

impl PartialEq for NumericRange {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for NumericRange {}

impl Hash for NumericRange {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl Display for NumericRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bound = |b: Option<Number>, upward: bool| match b {
            Some(n) => n.to_string(),
            None if upward => "inf".to_string(),
            None => "-inf".to_string(),
        };
        if self.is_point() {
            return write!(f, "[{}]", bound(self.start, false));
        }
        if self.step == 0 {
            let left = if self.closed.0 { '[' } else { '(' };
            let right = if self.closed.1 { ']' } else { ')' };
            return write!(
                f,
                "{}{},{}{}",
                left,
                bound(self.start, false),
                bound(self.end, true),
                right
            );
        }
        let start = bound(self.start, false);
        let end = bound(self.end, self.step > 0);
        if self.step == 1 {
            write!(f, "[{}:{}]", start, end)
        } else {
            write!(f, "[{}:{}:{}]", start, end, self.step)
        }
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct NumericRangeRepr {
    start: Option<Number>,
    end: Option<Number>,
    step: i64,
    closed: (bool, bool),
}

#[cfg(feature = "serde")]
impl TryFrom<NumericRangeRepr> for NumericRange {
    type Error = RangeError;

    fn try_from(repr: NumericRangeRepr) -> Result<Self, Self::Error> {
        NumericRange::with_brackets(repr.start, repr.end, repr.step, repr.closed)
    }
}

#[cfg(feature = "serde")]
impl From<NumericRange> for NumericRangeRepr {
    fn from(r: NumericRange) -> Self {
        NumericRangeRepr {
            start: r.start,
            end: r.end,
            step: r.step,
            closed: r.closed,
        }
    }
}

/// Iterator over the members of a finite numeric range, in ascending order.
#[derive(Debug, Clone)]
pub struct NumberIter {
    current: f64,
    last: f64,
    step: f64,
}

impl Iterator for NumberIter {
    type Item = Number;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current <= self.last {
            let x = self.current;
            self.current += self.step;
            Some(Number::new(x))
        } else {
            None
        }
    }
}

/// An ascending interval with (possibly) open sides. A missing bound is unbounded and always closed.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Span {
    lo: Option<Number>,
    hi: Option<Number>,
    lo_closed: bool,
    hi_closed: bool,
}

impl Span {
    /// All numbers strictly below `x`.
    fn below(x: Number) -> Self {
        Span {
            lo: None,
            hi: Some(x),
            lo_closed: true,
            hi_closed: false,
        }
    }

    /// All numbers strictly above `x`.
    fn above(x: Number) -> Self {
        Span {
            lo: Some(x),
            hi: None,
            lo_closed: false,
            hi_closed: true,
        }
    }

    fn contains(&self, x: Number) -> bool {
        let above_lo = match self.lo {
            None => true,
            Some(lo) if self.lo_closed => x >= lo,
            Some(lo) => x > lo,
        };
        let below_hi = match self.hi {
            None => true,
            Some(hi) if self.hi_closed => x <= hi,
            Some(hi) => x < hi,
        };
        above_lo && below_hi
    }

    fn is_empty(&self) -> bool {
        match (self.lo, self.hi) {
            (Some(lo), Some(hi)) => lo > hi || (lo == hi && !(self.lo_closed && self.hi_closed)),
            _ => false,
        }
    }

    fn intersect(&self, other: &Span) -> Span {
        use std::cmp::Ordering::*;
        let (lo, lo_closed) = match (self.lo, other.lo) {
            (None, _) => (other.lo, other.lo_closed),
            (_, None) => (self.lo, self.lo_closed),
            (Some(a), Some(b)) => match a.cmp(&b) {
                Less => (other.lo, other.lo_closed),
                Greater => (self.lo, self.lo_closed),
                Equal => (self.lo, self.lo_closed && other.lo_closed),
            },
        };
        let (hi, hi_closed) = match (self.hi, other.hi) {
            (None, _) => (other.hi, other.hi_closed),
            (_, None) => (self.hi, self.hi_closed),
            (Some(a), Some(b)) => match a.cmp(&b) {
                Less => (self.hi, self.hi_closed),
                Greater => (other.hi, other.hi_closed),
                Equal => (self.hi, self.hi_closed && other.hi_closed),
            },
        };
        Span {
            lo,
            hi,
            lo_closed,
            hi_closed,
        }
    }

    /// Returns true if the union of the two spans is a single interval.
    fn touches(&self, other: &Span) -> bool {
        let joined = |hi: Option<Number>, hi_closed: bool, lo: Option<Number>, lo_closed: bool| {
            matches!((hi, lo), (Some(h), Some(l)) if h == l && (hi_closed || lo_closed))
        };
        !self.intersect(other).is_empty()
            || joined(self.hi, self.hi_closed, other.lo, other.lo_closed)
            || joined(other.hi, other.hi_closed, self.lo, self.lo_closed)
    }

    /// The smallest span covering both spans.
    fn hull(&self, other: &Span) -> Span {
        use std::cmp::Ordering::*;
        let (lo, lo_closed) = match (self.lo, other.lo) {
            (None, _) | (_, None) => (None, true),
            (Some(a), Some(b)) => match a.cmp(&b) {
                Less => (self.lo, self.lo_closed),
                Greater => (other.lo, other.lo_closed),
                Equal => (self.lo, self.lo_closed || other.lo_closed),
            },
        };
        let (hi, hi_closed) = match (self.hi, other.hi) {
            (None, _) | (_, None) => (None, true),
            (Some(a), Some(b)) => match a.cmp(&b) {
                Less => (other.hi, other.hi_closed),
                Greater => (self.hi, self.hi_closed),
                Equal => (self.hi, self.hi_closed || other.hi_closed),
            },
        };
        Span {
            lo,
            hi,
            lo_closed,
            hi_closed,
        }
    }

    /// The continuous range covering this span, `None` if the span is empty.
    fn to_range(self) -> Option<NumericRange> {
        if self.is_empty() {
            None
        } else {
            Some(NumericRange::raw(self.lo, self.hi, 0, (self.lo_closed, self.hi_closed)))
        }
    }
}

/// A range of set members.
///
/// # Examples
/// ```
/// use index_sets::{NumericRange, Range};
///
/// let r = Range::numeric(0, 4, 2).unwrap();
/// assert!(r.contains(&2.into()));
/// assert!(r.is_finite());
///
/// let apple = Range::point("apple");
/// assert!(apple.contains(&"apple".into()));
/// assert_eq!(apple.to_string(), "{apple}");
///
/// assert!(Range::Any.contains(&(1, "x").into()));
/// assert_eq!(Range::point(3), Range::from(NumericRange::point(3)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Range {
    /// A numeric range.
    Numeric(NumericRange),
    /// A single non-numeric value. Use [Range::point] to construct it, which maps numbers to numeric ranges.
    NonNumeric(Value),
    /// The range containing every value.
    Any,
}

impl Range {
    /// Creates a numeric range that is closed on both sides. See [NumericRange::new].
    pub fn numeric(
        start: impl Into<Endpoint>,
        end: impl Into<Endpoint>,
        step: impl Into<Number>,
    ) -> Result<Self, RangeError> {
        NumericRange::new(start, end, step).map(Range::Numeric)
    }

    /// Creates the range containing exactly the given value.
    pub fn point(value: impl Into<Value>) -> Self {
        match value.into() {
            Value::Num(x) => Range::Numeric(NumericRange::point(x)),
            v => Range::NonNumeric(v),
        }
    }

    /// Checks whether the given value is a member of the range.
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            Range::Numeric(r) => r.contains(value),
            Range::NonNumeric(v) => v == value,
            Range::Any => true,
        }
    }

    /// Returns true if the members of the range are separated from each other.
    /// The universal range is not discrete.
    pub fn is_discrete(&self) -> bool {
        match self {
            Range::Numeric(r) => r.is_discrete(),
            Range::NonNumeric(_) => true,
            Range::Any => false,
        }
    }

    /// Returns true if the range has finitely many members.
    pub fn is_finite(&self) -> bool {
        match self {
            Range::Numeric(r) => r.is_finite(),
            Range::NonNumeric(_) => true,
            Range::Any => false,
        }
    }

    /// Returns the members of the range in ascending order, or `None` if the range is infinite.
    pub fn members(&self) -> Option<Vec<Value>> {
        match self {
            Range::Numeric(r) => r.iter().map(|it| it.map(Value::Num).collect()),
            Range::NonNumeric(v) => Some(vec![v.clone()]),
            Range::Any => None,
        }
    }

    /// The least common multiple of the absolute steps of this range and the given ranges.
    /// Point ranges count with step `1`, continuous ranges and non-numeric ranges are ignored.
    /// Returns `0` if no range counts and saturates at `i64::MAX`.
    ///
    /// # Examples
    /// ```
    /// use index_sets::{Range, UNBOUNDED};
    ///
    /// let r = Range::numeric(0, UNBOUNDED, 3).unwrap();
    /// let others = [Range::numeric(0, UNBOUNDED, 2).unwrap(), Range::numeric(0, UNBOUNDED, 10).unwrap()];
    /// assert_eq!(r.step_lcm(&others), 30);
    /// let reals = Range::numeric(UNBOUNDED, UNBOUNDED, 0).unwrap();
    /// assert_eq!(reals.step_lcm(&[Range::numeric(0, 1, 0).unwrap()]), 0);
    /// assert_eq!(reals.step_lcm(&[Range::point(0)]), 1);
    /// ```
    pub fn step_lcm<'a, I>(&'a self, others: I) -> i64
    where
        I: IntoIterator<Item = &'a Range>,
    {
        std::iter::once(self)
            .chain(others)
            .filter_map(|r| match r {
                Range::Numeric(n) => n.lcm_step(),
                _ => None,
            })
            .fold(0i128, |acc, step| {
                let step = step as i128;
                let lcm = if acc == 0 { step } else { acc.lcm(&step) };
                lcm.min(i64::MAX as i128)
            }) as i64
    }
}

impl From<NumericRange> for Range {
    fn from(r: NumericRange) -> Self {
        Range::Numeric(r)
    }
}

impl Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Range::Numeric(r) => write!(f, "{}", r),
            Range::NonNumeric(v) => write!(f, "{{{}}}", v),
            Range::Any => write!(f, "[*]"),
        }
    }
}

/// The numeric ranges produced by the algebra. Most operations produce at most two pieces.
type Pieces = SmallVec<[NumericRange; 2]>;
