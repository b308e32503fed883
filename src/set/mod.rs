//! Sets of values, possibly infinite.
//!
//! A [Set] is a cheap handle to an immutable set description. Sets are built from literal members, from ranges,
//! or lazily as the union, intersection or difference of two other sets.
//! Every set supports membership tests and a decomposition into [Range]s. Finite sets can additionally be
//! iterated, and ordered sets support positional access.
//!
//! # Examples
//! ```
//! use index_sets::{global::REALS, Set, Value};
//!
//! let a = Set::sequence([1, 3, 2]);
//! let b = Set::unordered([5, 3, 4]);
//! let union = &a | &b;
//! assert!(union.is_ordered());
//! assert_eq!(union.len().unwrap(), 5);
//! assert_eq!(union.at(4).unwrap(), Value::from(5));
//!
//! let rest = &*REALS - &a;
//! assert!(!rest.is_finite());
//! assert!(rest.contains(&2.5.into()));
//! assert!(!rest.contains(&2.into()));
//! ```

pub mod global;
mod literal;
mod ops;
mod range_set;

use std::{
    collections::{BTreeSet, HashSet},
    fmt::Display,
    hash::BuildHasher,
    ops::{BitAnd, BitOr, Sub},
    sync::Arc,
};

use indexmap::IndexSet;
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

pub use literal::LiteralSet;
pub use ops::{SetOperation, SetOperator, SetVariant};
pub use range_set::RangeSet;

use crate::{Number, NumericRange, Range, RangeError, SetError, Value};

/// A set of [Value]s.
///
/// Cloning a set is cheap: clones share the same immutable description.
/// Sets compare by their members, two sets are equal if they contain the same values.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(into = "SetRepr", from = "SetRepr"))]
pub struct Set {
    node: Arc<SetNode>,
}

/// The description behind a [Set].
#[derive(Debug)]
pub enum SetNode {
    /// Members listed one by one.
    Literal(LiteralSet),
    /// Members of a list of ranges.
    Ranges(RangeSet),
    /// The lazy combination of two sets.
    Operation(SetOperation),
}

impl Set {
    fn from_node(node: SetNode) -> Self {
        Set { node: Arc::new(node) }
    }

    /// Creates an ordered set from a sequence. Members keep the order of their first occurrence.
    pub fn sequence<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::from_node(SetNode::Literal(LiteralSet::new(values.into_iter().map(Into::into), true)))
    }

    /// Creates an unordered set from a collection. The set iterates its members in sorted order.
    pub fn unordered<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::from_node(SetNode::Literal(LiteralSet::new(values.into_iter().map(Into::into), false)))
    }

    /// Creates the empty set.
    pub fn empty() -> Self {
        Self::sequence(std::iter::empty::<Value>())
    }

    /// Creates a set whose members are the members of the given ranges.
    ///
    /// # Examples
    /// ```
    /// use index_sets::{Range, Set, UNBOUNDED};
    ///
    /// let odd = Set::from_ranges([Range::numeric(1, UNBOUNDED, 2).unwrap(), Range::numeric(-1, UNBOUNDED, -2).unwrap()]);
    /// assert!(odd.contains(&(-3).into()));
    /// assert!(!odd.contains(&4.into()));
    /// assert!(!odd.is_finite());
    /// ```
    pub fn from_ranges(ranges: impl IntoIterator<Item = Range>) -> Self {
        Self::from_node(SetNode::Ranges(RangeSet::new(ranges.into_iter().collect(), None)))
    }

    /// Creates a set from ranges that displays as the given name.
    pub fn named(name: impl Into<String>, ranges: impl IntoIterator<Item = Range>) -> Self {
        Self::from_node(SetNode::Ranges(RangeSet::new(
            ranges.into_iter().collect(),
            Some(name.into()),
        )))
    }

    /// Creates the set `start, start + 1, ..., end`. The set is empty if `end < start`.
    ///
    /// # Examples
    /// ```
    /// use index_sets::{Set, Value};
    ///
    /// let s = Set::range(1, 4).unwrap();
    /// assert_eq!(s.ordered().unwrap(), vec![Value::from(1), Value::from(2), Value::from(3), Value::from(4)]);
    /// assert!(Set::range(1, 0).unwrap().is_empty());
    /// ```
    pub fn range(start: impl Into<Number>, end: impl Into<Number>) -> Result<Self, RangeError> {
        Self::range_step(start, end, 1)
    }

    /// Creates the set `start, start + step, ...` up to and including `end`.
    /// The set is empty if `end` lies before `start` in step direction.
    pub fn range_step(
        start: impl Into<Number>,
        end: impl Into<Number>,
        step: impl Into<Number>,
    ) -> Result<Self, RangeError> {
        let (start, end) = (start.into(), end.into());
        match NumericRange::new(start, end, step) {
            Ok(r) => Ok(Self::from_ranges([Range::Numeric(r)])),
            Err(RangeError::StepDirection { .. }) => Ok(Self::from_ranges([])),
            Err(RangeError::ContinuousOrder { .. }) => Ok(Self::from_ranges([])),
            Err(e) => Err(e),
        }
    }

    /// Creates the set `1, 2, ..., n`. The set is empty if `n < 1`.
    pub fn range_upto(n: i64) -> Self {
        if n < 1 {
            Self::from_ranges([])
        } else {
            Self::from_ranges([Range::Numeric(NumericRange::raw(
                Some(1.into()),
                Some(n.into()),
                if n == 1 { 0 } else { 1 },
                (true, true),
            ))])
        }
    }

    /// Creates the set containing every value.
    pub fn any() -> Self {
        Self::from_ranges([Range::Any])
    }

    /// The union of the two sets.
    pub fn union(&self, other: &Set) -> Set {
        self.combine(SetOperator::Union, other)
    }

    /// The intersection of the two sets.
    pub fn intersection(&self, other: &Set) -> Set {
        self.combine(SetOperator::Intersection, other)
    }

    /// The members of this set that are not members of the other set.
    pub fn difference(&self, other: &Set) -> Set {
        self.combine(SetOperator::Difference, other)
    }

    fn combine(&self, operator: SetOperator, other: &Set) -> Set {
        Self::from_node(SetNode::Operation(SetOperation::new(operator, self.clone(), other.clone())))
    }

    /// The description behind the set.
    pub fn node(&self) -> &SetNode {
        &self.node
    }

    /// Returns the combinator if this set is a union, intersection or difference.
    pub fn operation(&self) -> Option<&SetOperation> {
        match &*self.node {
            SetNode::Operation(op) => Some(op),
            _ => None,
        }
    }

    /// Returns true if the set is known to have finitely many members.
    pub fn is_finite(&self) -> bool {
        match &*self.node {
            SetNode::Literal(_) => true,
            SetNode::Ranges(r) => r.is_finite(),
            SetNode::Operation(op) => op.variant() != SetVariant::Infinite,
        }
    }

    /// Returns true if the members of the set have a meaningful order. Ordered sets are finite.
    pub fn is_ordered(&self) -> bool {
        match &*self.node {
            SetNode::Literal(l) => l.is_ordered(),
            SetNode::Ranges(r) => r.is_finite(),
            SetNode::Operation(op) => op.variant() == SetVariant::Ordered,
        }
    }

    /// Checks whether the value is a member of the set.
    pub fn contains(&self, value: &Value) -> bool {
        match &*self.node {
            SetNode::Literal(l) => l.values().contains(value),
            SetNode::Ranges(r) => r.contains(value),
            SetNode::Operation(op) => op.contains(value),
        }
    }

    /// The decomposition of the set into ranges.
    ///
    /// Finite sets decompose into one point range per member.
    ///
    /// # Errors
    /// Fails if the difference of two infinite sets cannot be written as a list of ranges.
    pub fn ranges(&self) -> Result<Vec<Range>, RangeError> {
        match &*self.node {
            SetNode::Literal(l) => Ok(l.values().iter().map(Range::point).collect()),
            SetNode::Ranges(r) => Ok(r.ranges().to_vec()),
            SetNode::Operation(op) => op.ranges(),
        }
    }

    /// The members in iteration order, `None` for infinite sets.
    fn members(&self) -> Option<&IndexSet<Value>> {
        match &*self.node {
            SetNode::Literal(l) => Some(l.values()),
            SetNode::Ranges(r) => r.members(),
            SetNode::Operation(op) => op.members(),
        }
    }

    fn finite_members(&self, operation: &'static str) -> Result<&IndexSet<Value>, SetError> {
        self.members().ok_or_else(|| SetError::NotFinite {
            operation,
            set: self.to_string(),
        })
    }

    fn ordered_members(&self, operation: &'static str) -> Result<&IndexSet<Value>, SetError> {
        let members = self.finite_members(operation)?;
        if self.is_ordered() {
            Ok(members)
        } else {
            Err(SetError::NotOrdered {
                operation,
                set: self.to_string(),
            })
        }
    }

    /// Positional access to the members of an ordered set. A single finite progression is indexed without
    /// listing its members.
    fn positions(&self, operation: &'static str) -> Result<Positions<'_>, SetError> {
        if let SetNode::Ranges(r) = &*self.node {
            if let Some(progression) = r.progression() {
                return Ok(Positions::Progression(progression));
            }
        }
        self.ordered_members(operation).map(Positions::Members)
    }

    /// The positions of an ordered set and the 0-based position of the value in it.
    fn locate(&self, value: &Value, operation: &'static str) -> Result<(Positions<'_>, usize), SetError> {
        let positions = self.positions(operation)?;
        let position = positions.index_of(value).ok_or_else(|| SetError::NotAMember {
            value: value.clone(),
            set: self.to_string(),
        })?;
        Ok((positions, position))
    }

    /// The number of members of a finite set.
    pub fn len(&self) -> Result<usize, SetError> {
        match &*self.node {
            SetNode::Ranges(r) if r.is_finite() => Ok(r.len()),
            _ => Ok(self.finite_members("len")?.len()),
        }
    }

    /// Returns true if the set has no members.
    pub fn is_empty(&self) -> bool {
        match &*self.node {
            SetNode::Ranges(r) => r.ranges().is_empty(),
            _ => match self.members() {
                Some(members) => members.is_empty(),
                None => self.ranges().is_ok_and(|r| r.is_empty()),
            },
        }
    }

    /// Iterates over the members of a finite set in iteration order.
    pub fn iter(&self) -> Result<indexmap::set::Iter<'_, Value>, SetError> {
        Ok(self.finite_members("iter")?.iter())
    }

    /// The members of a finite set in their order. Sets without a meaningful order are sorted.
    pub fn ordered(&self) -> Result<Vec<Value>, SetError> {
        if self.is_ordered() {
            Ok(self.finite_members("ordered")?.iter().cloned().collect())
        } else {
            self.sorted()
        }
    }

    /// The members of a finite set in ascending order.
    pub fn sorted(&self) -> Result<Vec<Value>, SetError> {
        Ok(self.finite_members("sorted")?.iter().cloned().sorted().collect())
    }

    /// The member at the given 1-based position of an ordered set. Negative positions count from the end.
    ///
    /// # Examples
    /// ```
    /// use index_sets::{Set, SetError, Value};
    ///
    /// let s = Set::sequence([1, 3, 2, 0]);
    /// assert_eq!(s.at(2).unwrap(), Value::from(3));
    /// assert_eq!(s.at(-1).unwrap(), Value::from(0));
    /// assert_eq!(s.at(0), Err(SetError::ZeroIndex));
    /// assert!(s.at(5).is_err());
    /// ```
    pub fn at(&self, index: isize) -> Result<Value, SetError> {
        let positions = self.positions("at")?;
        let len = positions.len();
        let position = match index {
            0 => return Err(SetError::ZeroIndex),
            i if i > 0 => i.unsigned_abs() - 1,
            i if i.unsigned_abs() > len => return Err(SetError::IndexBeforeStart { index, len }),
            i => len - i.unsigned_abs(),
        };
        positions.get(position).ok_or(SetError::IndexPastEnd { index, len })
    }

    /// The first member of an ordered set.
    pub fn first(&self) -> Result<Value, SetError> {
        self.at(1)
    }

    /// The last member of an ordered set.
    pub fn last(&self) -> Result<Value, SetError> {
        self.at(-1)
    }

    /// The 1-based position of the value in an ordered set.
    pub fn ord(&self, value: &Value) -> Result<usize, SetError> {
        self.locate(value, "ord").map(|(_, position)| position + 1)
    }

    /// The member `k` positions after the value.
    ///
    /// # Examples
    /// ```
    /// use index_sets::{Set, SetError, Value};
    ///
    /// let s = Set::sequence([1, 3, 2, 0]);
    /// assert_eq!(s.next(&3.into(), 1).unwrap(), Value::from(2));
    /// assert_eq!(s.next(&3.into(), 2).unwrap(), Value::from(0));
    /// assert_eq!(s.next(&0.into(), 1), Err(SetError::AdvancePastEnd));
    /// assert_eq!(s.nextw(&0.into(), 2).unwrap(), Value::from(3));
    /// ```
    pub fn next(&self, value: &Value, k: usize) -> Result<Value, SetError> {
        let (positions, position) = self.locate(value, "next")?;
        position
            .checked_add(k)
            .and_then(|i| positions.get(i))
            .ok_or(SetError::AdvancePastEnd)
    }

    /// The member `k` positions before the value.
    pub fn prev(&self, value: &Value, k: usize) -> Result<Value, SetError> {
        let (positions, position) = self.locate(value, "prev")?;
        position
            .checked_sub(k)
            .and_then(|i| positions.get(i))
            .ok_or(SetError::AdvanceBeforeStart)
    }

    /// The member `k` positions after the value, wrapping around at the end.
    pub fn nextw(&self, value: &Value, k: usize) -> Result<Value, SetError> {
        let (positions, position) = self.locate(value, "nextw")?;
        let len = positions.len();
        positions
            .get((position + k % len) % len)
            .ok_or(SetError::AdvancePastEnd)
    }

    /// The member `k` positions before the value, wrapping around at the start.
    pub fn prevw(&self, value: &Value, k: usize) -> Result<Value, SetError> {
        let (positions, position) = self.locate(value, "prevw")?;
        let len = positions.len();
        positions
            .get((position + len - k % len) % len)
            .ok_or(SetError::AdvanceBeforeStart)
    }

    /// The smallest and largest member.
    ///
    /// Both are `None` if the set is empty or has a non-numeric member. For infinite sets the bounds are derived
    /// from the range decomposition and a side is `None` if the set is unbounded on that side.
    ///
    /// # Examples
    /// ```
    /// use index_sets::{Range, Set};
    ///
    /// let s = Set::from_ranges([Range::numeric(0, 10, 2).unwrap(), Range::numeric(3, 20, 2).unwrap()]);
    /// assert_eq!(s.bounds(), (Some(0.into()), Some(19.into())));
    /// assert_eq!(Set::sequence([1, 2]).bounds(), (Some(1.into()), Some(2.into())));
    /// assert_eq!(Set::sequence(["a"]).bounds(), (None, None));
    /// ```
    pub fn bounds(&self) -> (Option<Number>, Option<Number>) {
        if let SetNode::Ranges(r) = &*self.node {
            return range_bounds(r.ranges());
        }
        if let Some(members) = self.members() {
            return match members.iter().map(Value::as_number).collect::<Option<Vec<Number>>>() {
                Some(numbers) => (numbers.iter().min().copied(), numbers.iter().max().copied()),
                None => (None, None),
            };
        }
        match self.ranges() {
            Ok(ranges) => range_bounds(&ranges),
            Err(err) => {
                warn!(set = %self, %err, "bounds unavailable without a range decomposition");
                (None, None)
            }
        }
    }

    /// The common dimension of the members: `1` for scalars, the arity for tuples.
    /// `None` if the set is empty, mixes dimensions or may contain any value.
    pub fn dimen(&self) -> Option<usize> {
        match &*self.node {
            SetNode::Literal(l) => l.values().iter().map(Value::dimen).all_equal_value().ok(),
            SetNode::Ranges(r) => r.dimen(),
            SetNode::Operation(op) => op.dimen(),
        }
    }

    /// Checks whether the two sets have no member in common.
    pub fn isdisjoint(&self, other: &Set) -> bool {
        if let Some(members) = self.members() {
            return !members.iter().any(|v| other.contains(v));
        }
        if let Some(members) = other.members() {
            return !members.iter().any(|v| self.contains(v));
        }
        match (self.ranges(), other.ranges()) {
            (Ok(mine), Ok(theirs)) => mine.iter().all(|a| theirs.iter().all(|b| a.isdisjoint(b))),
            (Err(err), _) | (_, Err(err)) => {
                warn!(left = %self, right = %other, %err, "assuming sets overlap");
                false
            }
        }
    }

    /// Checks whether every member of this set is a member of the other set.
    ///
    /// # Examples
    /// ```
    /// use index_sets::{global::{INTEGERS, REALS}, Set};
    ///
    /// assert!(Set::sequence([1, 2]).issubset(&INTEGERS));
    /// assert!(!Set::sequence([1.5]).issubset(&INTEGERS));
    /// assert!(INTEGERS.issubset(&REALS));
    /// assert!(!INTEGERS.issubset(&Set::range(0, 10).unwrap()));
    /// ```
    pub fn issubset(&self, other: &Set) -> bool {
        if let Some(members) = self.members() {
            return members.iter().all(|v| other.contains(v));
        }
        match (self.ranges(), other.ranges()) {
            (Ok(mine), Ok(theirs)) => mine
                .iter()
                .all(|r| matches!(r.range_difference(&theirs), Ok(rest) if rest.is_empty())),
            (Err(err), _) | (_, Err(err)) => {
                warn!(left = %self, right = %other, %err, "assuming set is not a subset");
                false
            }
        }
    }

    /// Checks whether every member of the other set is a member of this set.
    pub fn issuperset(&self, other: &Set) -> bool {
        other.issubset(self)
    }

    /// Checks whether the finite set has no member in the container.
    pub fn isdisjoint_with<C: Container + ?Sized>(&self, other: &C) -> Result<bool, SetError> {
        Ok(!self
            .finite_members("isdisjoint_with")?
            .iter()
            .any(|v| other.contains_value(v)))
    }

    /// Checks whether every member of the set is in the container. Infinite sets are only subsets of containers
    /// if they are empty.
    pub fn issubset_of<C: Container + ?Sized>(&self, other: &C) -> bool {
        match self.members() {
            Some(members) => members.iter().all(|v| other.contains_value(v)),
            None => self.is_empty(),
        }
    }

    /// Checks whether the set has exactly the members of the container.
    pub fn equals_container<C: Container + ?Sized>(&self, other: &C) -> bool {
        match self.members() {
            Some(members) => members.len() == other.len() && members.iter().all(|v| other.contains_value(v)),
            None => false,
        }
    }
}

/// The members of an ordered set by position.
enum Positions<'a> {
    Members(&'a IndexSet<Value>),
    Progression(&'a NumericRange),
}

impl Positions<'_> {
    fn len(&self) -> usize {
        match self {
            Positions::Members(members) => members.len(),
            Positions::Progression(r) => r.member_count().unwrap_or(0),
        }
    }

    fn get(&self, position: usize) -> Option<Value> {
        match self {
            Positions::Members(members) => members.get_index(position).cloned(),
            Positions::Progression(r) => r.nth_member(position).map(Value::Num),
        }
    }

    fn index_of(&self, value: &Value) -> Option<usize> {
        match self {
            Positions::Members(members) => members.get_index_of(value),
            Positions::Progression(r) => value.as_number().and_then(|x| r.position(x)),
        }
    }
}

fn range_bounds(ranges: &[Range]) -> (Option<Number>, Option<Number>) {
    let numeric: Option<Vec<&NumericRange>> = ranges
        .iter()
        .map(|r| match r {
            Range::Numeric(n) => Some(n),
            _ => None,
        })
        .collect();
    let Some(numeric) = numeric else {
        return (None, None);
    };
    let lower = numeric
        .iter()
        .map(|r| r.lower())
        .collect::<Option<Vec<Number>>>()
        .and_then(|b| b.into_iter().min());
    let upper = numeric
        .iter()
        .map(|r| r.upper())
        .collect::<Option<Vec<Number>>>()
        .and_then(|b| b.into_iter().max());
    (lower, upper)
}

impl Set {
    /// Returns true if both sets are built the same way from equal parts.
    fn same_description(&self, other: &Set) -> bool {
        if Arc::ptr_eq(&self.node, &other.node) {
            return true;
        }
        match (&*self.node, &*other.node) {
            (SetNode::Ranges(a), SetNode::Ranges(b)) => a.ranges() == b.ranges(),
            (SetNode::Operation(a), SetNode::Operation(b)) => {
                a.operator() == b.operator() && a.left() == b.left() && a.right() == b.right()
            }
            _ => false,
        }
    }
}

impl PartialEq for Set {
    fn eq(&self, other: &Set) -> bool {
        if self.same_description(other) {
            return true;
        }
        if self.is_finite() != other.is_finite() {
            return false;
        }
        match (self.members(), other.members()) {
            (Some(mine), Some(theirs)) => mine.len() == theirs.len() && mine.iter().all(|v| other.contains(v)),
            _ => self.issubset(other) && other.issubset(self),
        }
    }
}

impl BitOr<&Set> for &Set {
    type Output = Set;

    fn bitor(self, rhs: &Set) -> Set {
        self.union(rhs)
    }
}

impl BitAnd<&Set> for &Set {
    type Output = Set;

    fn bitand(self, rhs: &Set) -> Set {
        self.intersection(rhs)
    }
}

impl Sub<&Set> for &Set {
    type Output = Set;

    fn sub(self, rhs: &Set) -> Set {
        self.difference(rhs)
    }
}

impl Display for Set {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &*self.node {
            SetNode::Literal(l) => {
                let (open, close) = if l.is_ordered() { ('[', ']') } else { ('{', '}') };
                write!(f, "{}{}{}", open, l.values().iter().join(", "), close)
            }
            SetNode::Ranges(r) => match r.name() {
                Some(name) => write!(f, "{}", name),
                None if r.ranges().is_empty() => write!(f, "[]"),
                None => write!(f, "{}", r.ranges().iter().join(" | ")),
            },
            SetNode::Operation(op) => write!(f, "({} {} {})", op.left(), op.operator(), op.right()),
        }
    }
}

/// A collection of values that a set can be compared against.
pub trait Container {
    /// Checks whether the value is in the container.
    fn contains_value(&self, value: &Value) -> bool;

    /// The number of distinct values in the container.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Container for [Value] {
    fn contains_value(&self, value: &Value) -> bool {
        self.contains(value)
    }

    fn len(&self) -> usize {
        self.iter().unique().count()
    }
}

impl Container for Vec<Value> {
    fn contains_value(&self, value: &Value) -> bool {
        self.as_slice().contains_value(value)
    }

    fn len(&self) -> usize {
        Container::len(self.as_slice())
    }
}

impl<S: BuildHasher> Container for HashSet<Value, S> {
    fn contains_value(&self, value: &Value) -> bool {
        self.contains(value)
    }

    fn len(&self) -> usize {
        HashSet::len(self)
    }
}

impl Container for BTreeSet<Value> {
    fn contains_value(&self, value: &Value) -> bool {
        self.contains(value)
    }

    fn len(&self) -> usize {
        BTreeSet::len(self)
    }
}

impl<S: BuildHasher> Container for IndexSet<Value, S> {
    fn contains_value(&self, value: &Value) -> bool {
        self.contains(value)
    }

    fn len(&self) -> usize {
        IndexSet::len(self)
    }
}

impl Container for Set {
    fn contains_value(&self, value: &Value) -> bool {
        self.contains(value)
    }

    /// Infinite sets report `usize::MAX`.
    fn len(&self) -> usize {
        Set::len(self).unwrap_or(usize::MAX)
    }
}

/// Sets are persisted through their constructors: deserializing rebuilds an equal set.
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
enum SetRepr {
    Literal { values: Vec<Value>, ordered: bool },
    Ranges { ranges: Vec<Range>, name: Option<String> },
    Operation { operator: SetOperator, left: Box<SetRepr>, right: Box<SetRepr> },
}

#[cfg(feature = "serde")]
impl From<Set> for SetRepr {
    fn from(s: Set) -> Self {
        match &*s.node {
            SetNode::Literal(l) => SetRepr::Literal {
                values: l.values().iter().cloned().collect(),
                ordered: l.is_ordered(),
            },
            SetNode::Ranges(r) => SetRepr::Ranges {
                ranges: r.ranges().to_vec(),
                name: r.name().map(str::to_string),
            },
            SetNode::Operation(op) => SetRepr::Operation {
                operator: op.operator(),
                left: Box::new(op.left().clone().into()),
                right: Box::new(op.right().clone().into()),
            },
        }
    }
}

#[cfg(feature = "serde")]
impl From<SetRepr> for Set {
    fn from(repr: SetRepr) -> Self {
        match repr {
            SetRepr::Literal { values, ordered: true } => Set::sequence(values),
            SetRepr::Literal { values, ordered: false } => Set::unordered(values),
            SetRepr::Ranges { ranges, name: Some(name) } => Set::named(name, ranges),
            SetRepr::Ranges { ranges, name: None } => Set::from_ranges(ranges),
            SetRepr::Operation { operator, left, right } => {
                Set::from(*left).combine(operator, &Set::from(*right))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{global::*, UNBOUNDED};
    use quickcheck::{Arbitrary, Gen};
    use quickcheck_macros::quickcheck;

    fn arbitrary_set(g: &mut Gen, depth: usize) -> Set {
        let small = |g: &mut Gen| {
            (0..u8::arbitrary(g) % 6)
                .map(|_| Value::from(i8::arbitrary(g) % 8))
                .collect::<Vec<_>>()
        };
        match u8::arbitrary(g) % 6 {
            0 => Set::sequence(small(g)),
            1 => Set::unordered(small(g)),
            2 => Set::range_step(i8::arbitrary(g) % 8, i8::arbitrary(g) % 8, 1 + u8::arbitrary(g) % 3)
                .unwrap_or_else(|_| Set::empty()),
            3 => Set::from_ranges([Range::Numeric(NumericRange::arbitrary(g))]),
            _ if depth == 0 => Set::sequence(small(g)),
            _ => {
                let (a, b) = (arbitrary_set(g, depth - 1), arbitrary_set(g, depth - 1));
                match u8::arbitrary(g) % 3 {
                    0 => &a | &b,
                    1 => &a & &b,
                    _ => &a - &b,
                }
            }
        }
    }

    impl Arbitrary for Set {
        fn arbitrary(g: &mut Gen) -> Self {
            arbitrary_set(g, 2)
        }
    }

    fn samples() -> Vec<Value> {
        let mut samples: Vec<Value> = (-20..=20).map(|i| Value::from(i as f64 / 2.0)).collect();
        samples.push(Value::from("a"));
        samples.push(Value::None);
        samples
    }

    fn values<const N: usize>(xs: [i32; N]) -> Vec<Value> {
        xs.into_iter().map(Value::from).collect()
    }

    #[test]
    fn positional_access() {
        let s = Set::sequence([1, 3, 2, 0]);
        assert_eq!(s.at(2).unwrap(), Value::from(3));
        assert_eq!(s.ord(&3.into()).unwrap(), 2);
        assert_eq!(s.next(&3.into(), 1).unwrap(), Value::from(2));
        assert_eq!(s.prev(&2.into(), 1).unwrap(), Value::from(3));
        assert_eq!(s.next(&3.into(), 2).unwrap(), Value::from(0));
        assert_eq!(s.prev(&2.into(), 2).unwrap(), Value::from(1));
        assert_eq!(s.nextw(&0.into(), 1).unwrap(), Value::from(1));
        assert_eq!(s.prevw(&1.into(), 1).unwrap(), Value::from(0));
        assert_eq!(s.nextw(&0.into(), 2).unwrap(), Value::from(3));
        assert_eq!(s.prevw(&1.into(), 2).unwrap(), Value::from(2));
        assert_eq!(s.first().unwrap(), Value::from(1));
        assert_eq!(s.last().unwrap(), Value::from(0));
        assert_eq!(s.at(-4).unwrap(), Value::from(1));
    }

    #[test]
    fn positional_errors() {
        let s = Set::sequence([1, 3, 2, 0]);
        assert_eq!(s.at(0), Err(SetError::ZeroIndex));
        assert_eq!(s.at(5), Err(SetError::IndexPastEnd { index: 5, len: 4 }));
        assert_eq!(s.at(-5), Err(SetError::IndexBeforeStart { index: -5, len: 4 }));
        assert_eq!(s.next(&0.into(), 1), Err(SetError::AdvancePastEnd));
        assert_eq!(s.prev(&1.into(), 1), Err(SetError::AdvanceBeforeStart));
        assert!(matches!(s.ord(&5.into()), Err(SetError::NotAMember { .. })));
        assert!(matches!(Set::empty().first(), Err(SetError::IndexPastEnd { .. })));
    }

    #[test]
    fn capability_errors() {
        assert!(matches!(REALS.len(), Err(SetError::NotFinite { operation: "len", .. })));
        assert!(matches!(REALS.ordered(), Err(SetError::NotFinite { .. })));
        assert!(matches!(REALS.iter(), Err(SetError::NotFinite { .. })));
        assert!(matches!(REALS.at(1), Err(SetError::NotFinite { .. })));
        let unordered = Set::unordered([2, 1]);
        assert!(matches!(unordered.at(1), Err(SetError::NotOrdered { operation: "at", .. })));
        assert!(matches!(unordered.ord(&1.into()), Err(SetError::NotOrdered { .. })));
        assert_eq!(unordered.ordered().unwrap(), values([1, 2]));
    }

    #[test]
    fn range_constructors() {
        assert_eq!(Set::range(1, 3).unwrap().ordered().unwrap(), values([1, 2, 3]));
        assert_eq!(Set::range_upto(3).ordered().unwrap(), values([1, 2, 3]));
        assert_eq!(Set::range_upto(1).ordered().unwrap(), values([1]));
        assert!(Set::range_upto(0).is_empty());
        assert_eq!(Set::range_step(10, 0, -5).unwrap().ordered().unwrap(), values([0, 5, 10]));
        assert!(Set::range_step(0, 10, -1).unwrap().is_empty());
        assert!(Set::range_step(0, 10, 0.5).is_err());
        let merged = Set::from_ranges([Range::numeric(0, 10, 2).unwrap(), Range::numeric(0, 3, 1).unwrap()]);
        assert!(merged.is_ordered());
        assert_eq!(merged.ordered().unwrap(), values([0, 1, 2, 3, 4, 6, 8, 10]));
    }

    #[test]
    fn equality_is_by_members() {
        assert_eq!(Set::sequence([1, 2, 3]), Set::unordered([3, 2, 1]));
        assert_eq!(Set::range(1, 3).unwrap(), Set::sequence([1.0, 2.0, 3.0]));
        assert_ne!(Set::sequence([1, 2]), Set::sequence([1, 2, 3]));
        assert_ne!(Set::sequence([1, 2]), *REALS);
        assert_eq!(&*REALS | &Set::sequence([1]), *REALS);
        assert_eq!(*ANY, Set::any());
    }

    #[test]
    fn equality_is_reflexive_without_range_decomposition() {
        let x = &*REALS - &*INTEGERS;
        assert!(x.ranges().is_err());
        assert_eq!(x, x.clone());
        assert_eq!(x, &*REALS - &*INTEGERS);
        assert_ne!(x, *REALS);
    }

    #[test]
    fn large_ranges_are_indexed_without_listing_members() {
        let s = Set::range(0, 20_000_000).unwrap();
        assert_eq!(s.bounds(), (Some(0.into()), Some(20_000_000.into())));
        assert_eq!(s.len().unwrap(), 20_000_001);
        assert!(!s.is_empty());
        assert_eq!(s.at(-1).unwrap(), Value::from(20_000_000));
        assert_eq!(s.at(11).unwrap(), Value::from(10));
        assert_eq!(s.ord(&10.into()).unwrap(), 11);
        assert!(matches!(s.ord(&10.5.into()), Err(SetError::NotAMember { .. })));
        assert_eq!(s.next(&10.into(), 5).unwrap(), Value::from(15));
        assert_eq!(s.prevw(&0.into(), 1).unwrap(), Value::from(20_000_000));
        assert_eq!(s.at(20_000_002), Err(SetError::IndexPastEnd { index: 20_000_002, len: 20_000_001 }));
        match s.node() {
            SetNode::Ranges(r) => assert!(!r.is_materialized()),
            other => panic!("unexpected node {:?}", other),
        }

        let down = Set::range_step(10, 0, -3).unwrap();
        assert_eq!(down.ordered().unwrap(), values([1, 4, 7, 10]));
        assert_eq!(down.at(2).unwrap(), Value::from(4));
        assert_eq!(down.ord(&10.into()).unwrap(), 4);
        assert_eq!(down.len().unwrap(), 4);
    }

    #[test]
    fn relations() {
        let a = Set::sequence([1, 2]);
        assert!(a.issubset(&INTEGERS));
        assert!(INTEGERS.issuperset(&a));
        assert!(!a.isdisjoint(&INTEGERS));
        assert!(a.isdisjoint(&Set::sequence([3])));
        assert!(NEGATIVE_REALS.isdisjoint(&POSITIVE_INTEGERS));
        assert!(!NON_POSITIVE_REALS.isdisjoint(&NON_NEGATIVE_INTEGERS));
        assert!(POSITIVE_INTEGERS.issubset(&NON_NEGATIVE_REALS));
        assert!(!NON_NEGATIVE_REALS.issubset(&POSITIVE_INTEGERS));
        assert!(INTEGERS.issubset(&ANY));
        assert!(!ANY.issubset(&INTEGERS));
    }

    #[test]
    fn infinite_variant_can_be_empty() {
        let a = Set::from_ranges([Range::numeric(0, 1, 0).unwrap()]);
        let b = Set::from_ranges([Range::numeric(2, 3, 0).unwrap()]);
        let x = &a & &b;
        assert!(!x.is_finite());
        assert!(x.is_empty());
        assert!(x.issubset(&Set::empty()));
        assert!(x.issubset_of(&Vec::<Value>::new()));
    }

    #[test]
    fn containers() {
        let s = Set::sequence([1, 2]);
        assert!(s.equals_container(&values([2, 1, 2])));
        assert!(!s.equals_container(&values([2, 1, 3])));
        let hashed: HashSet<Value> = values([1, 2, 3]).into_iter().collect();
        assert!(s.issubset_of(&hashed));
        assert!(!s.isdisjoint_with(&hashed).unwrap());
        let tree: BTreeSet<Value> = values([5]).into_iter().collect();
        assert!(s.isdisjoint_with(&tree).unwrap());
        let indexed: IndexSet<Value> = values([2, 1]).into_iter().collect();
        assert!(s.equals_container(&indexed));
        assert!(s.equals_container(values([1, 2]).as_slice()));
        assert!(matches!(REALS.isdisjoint_with(&tree), Err(SetError::NotFinite { .. })));
        assert!(!REALS.issubset_of(&tree));
        assert!(!REALS.equals_container(&tree));
        assert!(Container::contains_value(&*REALS, &1.into()));
    }

    #[test]
    fn bounds() {
        let s = Set::from_ranges([
            Range::numeric(UNBOUNDED, UNBOUNDED, 0).unwrap(),
            Range::numeric(0, 10, 2).unwrap(),
        ]);
        assert_eq!(s.bounds(), (None, None));
        assert_eq!(Set::empty().bounds(), (None, None));
        assert_eq!(Set::sequence([Value::from(1), Value::from("a")]).bounds(), (None, None));
        assert_eq!(Set::unordered([3, -1, 2]).bounds(), (Some((-1).into()), Some(3.into())));
        let mixed = &*POSITIVE_INTEGERS | &Set::sequence([-5]);
        assert_eq!(mixed.bounds(), (Some((-5).into()), None));
    }

    #[test]
    fn dimen() {
        assert_eq!(Set::sequence([1, 2]).dimen(), Some(1));
        assert_eq!(Set::sequence([(1, 2), (3, 4)]).dimen(), Some(2));
        assert_eq!(Set::sequence([Value::from(1), Value::from((1, 2))]).dimen(), None);
        assert_eq!(Set::empty().dimen(), None);
        assert_eq!(REALS.dimen(), Some(1));
        assert_eq!(ANY.dimen(), None);
    }

    #[test]
    fn display() {
        assert_eq!(Set::sequence([1, 3, 2]).to_string(), "[1, 3, 2]");
        assert_eq!(Set::unordered([3, 1, 2]).to_string(), "{1, 2, 3}");
        assert_eq!(
            Set::from_ranges([Range::numeric(0, 10, 2).unwrap(), Range::numeric(1, 3, 0).unwrap()]).to_string(),
            "[0:10:2] | [1,3]"
        );
        assert_eq!(Set::range_upto(0).to_string(), "[]");
        assert_eq!((&*REALS & &Set::sequence(["a"])).to_string(), "(Reals & [a])");
    }

    #[test]
    fn sets_are_shared_across_threads() {
        let s = &*INTEGERS & &Set::range(-3, 3).unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let s = s.clone();
                std::thread::spawn(move || s.len().unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 7);
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_rebuilds_equal_sets() {
        let s = &(&Set::sequence([3, 1]) | &Set::range(5, 7).unwrap()) - &Set::unordered([6]);
        let json = serde_json::to_string(&s).unwrap();
        let back: Set = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
        assert_eq!(back.ordered().unwrap(), values([3, 1, 5, 7]));

        let reals: Set = serde_json::from_str(&serde_json::to_string(&*REALS).unwrap()).unwrap();
        assert_eq!(reals, *REALS);
        assert_eq!(reals.to_string(), "Reals");
    }

    #[quickcheck]
    fn membership_follows_operator(a: Set, b: Set) -> bool {
        let (u, i, d) = (&a | &b, &a & &b, &a - &b);
        samples().iter().all(|v| {
            u.contains(v) == (a.contains(v) || b.contains(v))
                && i.contains(v) == (a.contains(v) && b.contains(v))
                && d.contains(v) == (a.contains(v) && !b.contains(v))
        })
    }

    #[quickcheck]
    fn union_is_commutative(a: Set, b: Set) -> bool {
        let (ab, ba) = (&a | &b, &b | &a);
        let same_members = samples().iter().all(|v| ab.contains(v) == ba.contains(v));
        same_members && (!ab.is_finite() || ab == ba)
    }

    #[quickcheck]
    fn sorted_is_sorted_permutation_of_ordered(a: Set) -> bool {
        match (a.ordered(), a.sorted()) {
            (Ok(ordered), Ok(sorted)) => {
                let mut resorted = ordered.clone();
                resorted.sort();
                resorted == sorted && sorted.windows(2).all(|w| w[0] < w[1])
            }
            (Err(_), Err(_)) => !a.is_finite(),
            _ => false,
        }
    }

    #[quickcheck]
    fn finite_members_are_contained(a: Set) -> bool {
        match a.iter() {
            Ok(mut members) => members.all(|v| a.contains(v)) && a.len().is_ok(),
            Err(_) => !a.is_finite(),
        }
    }

    #[quickcheck]
    fn finite_ranges_cover_members(a: Set) -> bool {
        match (a.iter(), a.ranges()) {
            (Ok(members), Ok(ranges)) => {
                members.len() == ranges.len() && members.zip(&ranges).all(|(v, r)| r.contains(v))
            }
            _ => true,
        }
    }
}
