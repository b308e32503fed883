use std::sync::OnceLock;

use indexmap::IndexSet;
use itertools::Itertools;
use tracing::trace;

use crate::{NumericRange, Range, Value};

/// A set described by a list of ranges. Its members are the members of any of the ranges.
///
/// A range set is finite if all its ranges are. Finite range sets are ordered: they iterate their members in
/// ascending order without duplicates. The member list is materialized on first use.
#[derive(Debug)]
pub struct RangeSet {
    ranges: Vec<Range>,
    name: Option<String>,
    finite: bool,
    members: OnceLock<IndexSet<Value>>,
}

impl RangeSet {
    pub(crate) fn new(ranges: Vec<Range>, name: Option<String>) -> Self {
        let finite = ranges.iter().all(Range::is_finite);
        RangeSet {
            ranges,
            name,
            finite,
            members: OnceLock::new(),
        }
    }

    /// The ranges making up the set.
    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    /// The display name of the set, if it has one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns true if every range of the set is finite.
    pub fn is_finite(&self) -> bool {
        self.finite
    }

    pub(crate) fn contains(&self, value: &Value) -> bool {
        self.ranges.iter().any(|r| r.contains(value))
    }

    /// The range if the set is made of a single finite numeric range.
    pub(crate) fn progression(&self) -> Option<&NumericRange> {
        match self.ranges.as_slice() {
            [Range::Numeric(r)] if r.is_finite() => Some(r),
            _ => None,
        }
    }

    /// The number of members of a finite set. A single range is counted without listing its members.
    pub(crate) fn len(&self) -> usize {
        match self.progression().and_then(NumericRange::member_count) {
            Some(count) => count,
            None => self.members().map_or(0, IndexSet::len),
        }
    }

    /// The sorted members, or `None` if the set is infinite.
    pub(crate) fn members(&self) -> Option<&IndexSet<Value>> {
        if !self.finite {
            return None;
        }
        Some(self.members.get_or_init(|| {
            let members: IndexSet<Value> = self
                .ranges
                .iter()
                .filter_map(Range::members)
                .flatten()
                .sorted()
                .dedup()
                .collect();
            trace!(ranges = self.ranges.len(), members = members.len(), "materialized range set");
            members
        }))
    }

    #[cfg(test)]
    pub(crate) fn is_materialized(&self) -> bool {
        self.members.get().is_some()
    }

    pub(crate) fn dimen(&self) -> Option<usize> {
        self.ranges
            .iter()
            .map(|r| match r {
                Range::Numeric(_) => Some(1),
                Range::NonNumeric(v) => Some(v.dimen()),
                Range::Any => None,
            })
            .collect::<Option<Vec<usize>>>()?
            .into_iter()
            .all_equal_value()
            .ok()
    }
}
