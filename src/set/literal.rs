use indexmap::IndexSet;
use itertools::Itertools;

use crate::Value;

/// A finite set given by an explicit collection of members.
///
/// Ordered literal sets keep the order in which members were first given.
/// Unordered literal sets keep their members sorted, so that their iteration order is deterministic.
#[derive(Debug, Clone)]
pub struct LiteralSet {
    values: IndexSet<Value>,
    ordered: bool,
}

impl LiteralSet {
    pub(crate) fn new(values: impl IntoIterator<Item = Value>, ordered: bool) -> Self {
        let values = if ordered {
            values.into_iter().collect()
        } else {
            values.into_iter().sorted().dedup().collect()
        };
        LiteralSet { values, ordered }
    }

    /// Returns true if the set was built from an ordered sequence.
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    /// The members of the set, in iteration order.
    pub fn values(&self) -> &IndexSet<Value> {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_keeps_first_occurrence() {
        let s = LiteralSet::new([3, 1, 3, 2, 1].map(Value::from), true);
        assert!(s.is_ordered());
        assert_eq!(s.values().iter().cloned().collect_vec(), [3, 1, 2].map(Value::from));
    }

    #[test]
    fn unordered_is_sorted() {
        let s = LiteralSet::new([Value::from("b"), Value::from(2), Value::from(1.0), Value::from(1)], false);
        assert!(!s.is_ordered());
        assert_eq!(
            s.values().iter().cloned().collect_vec(),
            vec![Value::from(1), Value::from(2), Value::from("b")]
        );
    }
}
