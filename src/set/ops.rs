//! Lazy set combinators.
//!
//! A combinator holds both operands and decides once, at construction, whether the result is ordered, finite or
//! infinite. Members of finite results are computed on first use and cached.

use std::{fmt::Display, sync::OnceLock};

use indexmap::IndexSet;
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::Set;
use crate::{Range, RangeError, Value};

/// The operator of a set combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SetOperator {
    /// Members of either operand.
    Union,
    /// Members of both operands.
    Intersection,
    /// Members of the left operand that are not in the right one.
    Difference,
}

impl Display for SetOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetOperator::Union => write!(f, "|"),
            SetOperator::Intersection => write!(f, "&"),
            SetOperator::Difference => write!(f, "-"),
        }
    }
}

/// The capabilities of a combinator's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetVariant {
    /// Finite, with a meaningful member order.
    Ordered,
    /// Finite, iterated in sorted order.
    Finite,
    /// Possibly infinite. Only membership and range based queries are available.
    Infinite,
}

/// The lazy union, intersection or difference of two sets.
#[derive(Debug)]
pub struct SetOperation {
    operator: SetOperator,
    left: Set,
    right: Set,
    variant: SetVariant,
    /// The ranges of a difference of infinite sets that turned out to be finite.
    resolved: Option<Vec<Range>>,
    members: OnceLock<IndexSet<Value>>,
}

impl SetOperation {
    pub(crate) fn new(operator: SetOperator, left: Set, right: Set) -> Self {
        let (variant, resolved) = select_variant(operator, &left, &right);
        trace!(%operator, ?variant, left = %left, right = %right, "combined sets");
        SetOperation {
            operator,
            left,
            right,
            variant,
            resolved,
            members: OnceLock::new(),
        }
    }

    /// The operator combining the two operands.
    pub fn operator(&self) -> SetOperator {
        self.operator
    }

    /// The left operand.
    pub fn left(&self) -> &Set {
        &self.left
    }

    /// The right operand.
    pub fn right(&self) -> &Set {
        &self.right
    }

    /// Whether the result is ordered, finite or possibly infinite. Fixed when the sets are combined.
    pub fn variant(&self) -> SetVariant {
        self.variant
    }

    pub(crate) fn contains(&self, value: &Value) -> bool {
        match self.operator {
            SetOperator::Union => self.left.contains(value) || self.right.contains(value),
            SetOperator::Intersection => self.left.contains(value) && self.right.contains(value),
            SetOperator::Difference => self.left.contains(value) && !self.right.contains(value),
        }
    }

    /// The members in emission order, or `None` for infinite variants.
    pub(crate) fn members(&self) -> Option<&IndexSet<Value>> {
        if self.variant == SetVariant::Infinite {
            return None;
        }
        Some(self.members.get_or_init(|| self.collect_members()))
    }

    fn collect_members(&self) -> IndexSet<Value> {
        match self.operator {
            SetOperator::Union => members_of(&self.left).chain(members_of(&self.right)).cloned().collect(),
            SetOperator::Intersection => {
                let (driver, filter) = if self.left.is_finite()
                    && (self.left.is_ordered() || !self.right.is_ordered() || !self.right.is_finite())
                {
                    (&self.left, &self.right)
                } else {
                    (&self.right, &self.left)
                };
                members_of(driver).filter(|v| filter.contains(v)).cloned().collect()
            }
            SetOperator::Difference => match &self.resolved {
                Some(ranges) => ranges
                    .iter()
                    .filter_map(Range::members)
                    .flatten()
                    .sorted()
                    .dedup()
                    .collect(),
                None => members_of(&self.left).filter(|v| !self.right.contains(v)).cloned().collect(),
            },
        }
    }

    pub(crate) fn ranges(&self) -> Result<Vec<Range>, RangeError> {
        if let Some(members) = self.members() {
            return Ok(members.iter().map(Range::point).collect());
        }
        let left = self.left.ranges()?;
        let right = self.right.ranges()?;
        match self.operator {
            SetOperator::Union => {
                let mut ranges = left.clone();
                for r in right {
                    match r.range_difference(&left) {
                        Ok(rest) => ranges.extend(rest),
                        Err(err) => {
                            debug!(range = %r, %err, "keeping overlapping range in union");
                            ranges.push(r);
                        }
                    }
                }
                Ok(Range::coalesce(ranges))
            }
            SetOperator::Intersection => Ok(Range::coalesce(left.iter().flat_map(|r| r.range_intersection(&right)))),
            SetOperator::Difference => difference_ranges(&left, &right).map(Range::coalesce),
        }
    }

    pub(crate) fn dimen(&self) -> Option<usize> {
        let (left, right) = (self.left.dimen(), self.right.dimen());
        match self.operator {
            SetOperator::Union => left.filter(|_| left == right),
            SetOperator::Intersection => match (left, right) {
                (Some(a), Some(b)) => (a == b).then_some(a),
                (d, None) | (None, d) => d,
            },
            SetOperator::Difference => left,
        }
    }
}

fn members_of(s: &Set) -> impl Iterator<Item = &Value> {
    s.members().into_iter().flatten()
}

fn difference_ranges(left: &[Range], right: &[Range]) -> Result<Vec<Range>, RangeError> {
    let mut ranges = Vec::new();
    for r in left {
        ranges.extend(r.range_difference(right)?);
    }
    Ok(ranges)
}

fn select_variant(operator: SetOperator, left: &Set, right: &Set) -> (SetVariant, Option<Vec<Range>>) {
    let finite = |ordered: bool| {
        if ordered {
            SetVariant::Ordered
        } else {
            SetVariant::Finite
        }
    };
    let variant = match (operator, left.is_finite(), right.is_finite()) {
        (SetOperator::Union, true, true) => finite(left.is_ordered() || right.is_ordered()),
        (SetOperator::Union, _, _) => SetVariant::Infinite,
        (SetOperator::Intersection, true, true) => finite(left.is_ordered() || right.is_ordered()),
        (SetOperator::Intersection, true, false) => finite(left.is_ordered()),
        (SetOperator::Intersection, false, true) => finite(right.is_ordered()),
        (SetOperator::Intersection, false, false) => SetVariant::Infinite,
        (SetOperator::Difference, true, _) => finite(left.is_ordered()),
        (SetOperator::Difference, false, _) => {
            let resolved = left
                .ranges()
                .and_then(|l| right.ranges().and_then(|r| difference_ranges(&l, &r)));
            return match resolved {
                Ok(ranges) if ranges.iter().all(Range::is_finite) => (SetVariant::Finite, Some(ranges)),
                _ => (SetVariant::Infinite, None),
            };
        }
    };
    (variant, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{global::*, Set, UNBOUNDED};

    fn variant(s: &Set) -> SetVariant {
        s.operation().map(SetOperation::variant).unwrap()
    }

    fn values<const N: usize>(xs: [i32; N]) -> Vec<Value> {
        xs.into_iter().map(Value::from).collect()
    }

    #[test]
    fn union_variants() {
        let ordered = Set::sequence([1, 3, 2]);
        let unordered = Set::unordered([5, 3, 4]);
        assert_eq!(variant(&(&ordered | &unordered)), SetVariant::Ordered);
        assert_eq!(variant(&(&unordered | &ordered)), SetVariant::Ordered);
        assert_eq!(variant(&(&unordered | &Set::unordered([9]))), SetVariant::Finite);
        assert_eq!(variant(&(&ordered | &*REALS)), SetVariant::Infinite);
    }

    #[test]
    fn ordered_union_emission() {
        let x = &Set::sequence([1, 3, 2]) | &Set::sequence([5, 3, 4]);
        assert_eq!(x.ordered().unwrap(), values([1, 3, 2, 5, 4]));
        assert_eq!(x.sorted().unwrap(), values([1, 2, 3, 4, 5]));
        assert_eq!(x.len().unwrap(), 5);
    }

    #[test]
    fn unordered_union_is_sorted() {
        let x = &Set::unordered([1, 3, 2]) | &Set::unordered([5, 3, 4]);
        assert_eq!(variant(&x), SetVariant::Finite);
        assert_eq!(x.ordered().unwrap(), values([1, 2, 3, 4, 5]));
    }

    #[test]
    fn intersection_variants() {
        let ordered = Set::sequence([1, 3, 2, 5]);
        let unordered = Set::unordered([0, 2, 3, 4, 5]);
        let x = &ordered & &unordered;
        assert_eq!(variant(&x), SetVariant::Ordered);
        assert_eq!(x.ordered().unwrap(), values([3, 2, 5]));
        let y = &unordered & &ordered;
        assert_eq!(variant(&y), SetVariant::Ordered);
        assert_eq!(y.ordered().unwrap(), values([3, 2, 5]));
        assert_eq!(variant(&(&unordered & &Set::unordered([2]))), SetVariant::Finite);
        assert_eq!(variant(&(&*REALS & &ordered)), SetVariant::Ordered);
        assert_eq!(variant(&(&*REALS & &unordered)), SetVariant::Finite);
        assert_eq!(variant(&(&*REALS & &*INTEGERS)), SetVariant::Infinite);
    }

    #[test]
    fn intersection_with_infinite_set() {
        let x = &Set::sequence([1.5, 3.0, -2.0, 7.0]) & &*NON_NEGATIVE_INTEGERS;
        assert_eq!(x.ordered().unwrap(), values([3, 7]));
        assert!(x.contains(&3.into()));
        assert!(!x.contains(&1.5.into()));
    }

    #[test]
    fn difference_variants() {
        let ordered = Set::sequence([1, 3, 2, 5]);
        let x = &ordered - &Set::unordered([2, 9]);
        assert_eq!(variant(&x), SetVariant::Ordered);
        assert_eq!(x.ordered().unwrap(), values([1, 3, 5]));
        assert_eq!(variant(&(&Set::unordered([1, 2]) - &*REALS)), SetVariant::Finite);
        assert_eq!(variant(&(&*REALS - &ordered)), SetVariant::Infinite);
    }

    #[test]
    fn infinite_difference_can_be_finite() {
        let evens = Set::from_ranges([Range::numeric(0, UNBOUNDED, 2).unwrap()]);
        let from_ten = Set::from_ranges([Range::numeric(10, UNBOUNDED, 1).unwrap()]);
        let x = &evens - &from_ten;
        assert_eq!(variant(&x), SetVariant::Finite);
        assert_eq!(x.ordered().unwrap(), values([0, 2, 4, 6, 8]));
    }

    #[test]
    fn infinite_ranges() {
        let a = Set::from_ranges([Range::numeric(0, 4, 0).unwrap()]);
        let b = Set::from_ranges([Range::numeric(2, 6, 0).unwrap()]);
        assert_eq!((&a & &b).ranges().unwrap(), vec![Range::numeric(2, 4, 0).unwrap()]);
        assert_eq!((&a | &b).ranges().unwrap(), vec![Range::numeric(0, 6, 0).unwrap()]);
        assert_eq!(
            (&a - &b).ranges().unwrap(),
            vec![Range::Numeric(crate::NumericRange::with_brackets(0, 2, 0, (true, false)).unwrap())]
        );
    }

    #[test]
    fn touching_ranges_are_merged() {
        let a = Set::from_ranges([Range::numeric(0, 2, 0).unwrap()]);
        let b = Set::from_ranges([Range::numeric(1, 3, 0).unwrap(), Range::numeric(2, 5, 0).unwrap()]);
        assert_eq!((&a | &b).ranges().unwrap(), vec![Range::numeric(0, 5, 0).unwrap()]);

        let halves = Set::from_ranges([Range::numeric(0, 2, 0).unwrap(), Range::numeric(2, 4, 0).unwrap()]);
        assert_eq!((&halves & &*REALS).ranges().unwrap(), vec![Range::numeric(0, 4, 0).unwrap()]);

        let evens = Set::from_ranges([Range::numeric(0, UNBOUNDED, 2).unwrap()]);
        let x = &evens | &Set::from_ranges([Range::numeric(0, UNBOUNDED, 2).unwrap()]);
        assert_eq!(x.ranges().unwrap(), vec![Range::numeric(0, UNBOUNDED, 2).unwrap()]);
    }

    #[test]
    fn union_ranges_skip_covered_members() {
        let x = &Set::from_ranges([Range::numeric(1, 3, 0).unwrap()]) | &Set::sequence([5, 3, 4]);
        assert_eq!(variant(&x), SetVariant::Infinite);
        assert_eq!(
            x.ranges().unwrap(),
            vec![Range::numeric(1, 3, 0).unwrap(), Range::point(5), Range::point(4)]
        );
    }

    #[test]
    fn finite_ranges_are_points() {
        let x = &Set::sequence([Value::from(1), Value::from("a")]) | &Set::sequence([2]);
        assert_eq!(
            x.ranges().unwrap(),
            vec![Range::point(1), Range::point("a"), Range::point(2)]
        );
    }

    #[test]
    fn operation_dimen() {
        let pairs = Set::sequence([(1, 2), (3, 4)]);
        let scalars = Set::sequence([1, 2]);
        assert_eq!((&pairs | &pairs).dimen(), Some(2));
        assert_eq!((&pairs | &scalars).dimen(), None);
        assert_eq!((&pairs - &scalars).dimen(), Some(2));
        assert_eq!((&*REALS & &scalars).dimen(), Some(1));
        assert_eq!((&*ANY & &pairs).dimen(), Some(2));
        assert_eq!((&*ANY | &pairs).dimen(), None);
    }

    #[test]
    fn operator_display() {
        let x = &Set::sequence([1]) | &Set::unordered([2]);
        assert_eq!(x.to_string(), "([1] | {2})");
        let y = &*REALS - &x;
        assert_eq!(y.to_string(), "(Reals - ([1] | {2}))");
    }
}
