//! Exact intersection and difference of ranges.
//!
//! Continuous intervals are intersected by comparing their bounds. Progressions are intersected by solving the
//! pair of congruences `x = a (mod m)` and `x = b (mod n)`, whose solutions form a progression with step `lcm(m, n)`.
//! Differences are computed piecewise, so that every result is again a list of ranges.

use num_integer::Integer;
use smallvec::{smallvec, SmallVec};
use tracing::debug;

use super::{NumericRange, Pieces, Range, Span};
use crate::{Number, RangeError};

impl Range {
    /// Checks whether the two ranges have no member in common.
    ///
    /// # Examples
    /// ```
    /// use index_sets::{Range, UNBOUNDED};
    ///
    /// let fives = Range::numeric(0, UNBOUNDED, 5).unwrap();
    /// assert!(!fives.isdisjoint(&Range::numeric(1, UNBOUNDED, 7).unwrap()));
    /// assert!(fives.isdisjoint(&Range::numeric(23, UNBOUNDED, -7).unwrap()));
    /// assert!(!fives.isdisjoint(&Range::Any));
    /// ```
    pub fn isdisjoint(&self, other: &Range) -> bool {
        self.intersect(other).is_empty()
    }

    /// Checks whether every member of this range is a member of the other range.
    ///
    /// # Examples
    /// ```
    /// use index_sets::{NumericRange, Range, UNBOUNDED};
    ///
    /// let evens = Range::numeric(0, 10, 2).unwrap();
    /// assert!(evens.issubset(&Range::numeric(0, 10, 1).unwrap()));
    /// assert!(!evens.issubset(&Range::numeric(0, 10, 4).unwrap()));
    /// assert!(evens.issubset(&Range::numeric(UNBOUNDED, UNBOUNDED, 0).unwrap()));
    /// ```
    pub fn issubset(&self, other: &Range) -> bool {
        matches!(self.range_difference([other]), Ok(rest) if rest.is_empty())
    }

    /// Intersects this range with each of the given ranges and returns the union of the pieces.
    /// Pieces are reported in the order of the given ranges, duplicates are dropped.
    ///
    /// # Examples
    /// ```
    /// use index_sets::{Range, UNBOUNDED};
    ///
    /// let evens = Range::numeric(0, UNBOUNDED, 2).unwrap();
    /// let threes = Range::numeric(1, UNBOUNDED, 3).unwrap();
    /// assert_eq!(evens.range_intersection([&threes]), vec![Range::numeric(4, UNBOUNDED, 6).unwrap()]);
    /// ```
    pub fn range_intersection<'a, I>(&self, others: I) -> Vec<Range>
    where
        I: IntoIterator<Item = &'a Range>,
    {
        let mut result: Vec<Range> = Vec::new();
        for piece in others.into_iter().flat_map(|other| self.intersect(other)) {
            if !result.contains(&piece) {
                result.push(piece);
            }
        }
        result
    }

    /// Removes all given ranges from this range and returns the remaining pieces.
    ///
    /// The pieces are pairwise disjoint. Removing a universal range leaves nothing, removing anything else from the
    /// universal range leaves the universal range.
    ///
    /// # Errors
    /// Fails with [RangeError::InfinitePuncture] if a continuous interval would have to be split at infinitely
    /// many points.
    ///
    /// # Examples
    /// ```
    /// use index_sets::{NumericRange, Range, UNBOUNDED};
    ///
    /// let reals = Range::numeric(UNBOUNDED, UNBOUNDED, 0).unwrap();
    /// let rest = reals.range_difference([&Range::numeric(5, 10, 5).unwrap()]).unwrap();
    /// let rendered: Vec<String> = rest.iter().map(|r| r.to_string()).collect();
    /// assert_eq!(rendered, vec!["[-inf,5)", "(5,10)", "(10,inf]"]);
    ///
    /// let naturals = Range::numeric(0, UNBOUNDED, 1).unwrap();
    /// assert!(reals.range_difference([&naturals]).is_err());
    /// ```
    pub fn range_difference<'a, I>(&self, others: I) -> Result<Vec<Range>, RangeError>
    where
        I: IntoIterator<Item = &'a Range>,
    {
        let mut others: Vec<&Range> = others.into_iter().collect();
        // Removing intervals first leaves fewer points for progressions to puncture.
        others.sort_by_key(|r| subtraction_rank(r));
        let mut remaining = vec![self.clone()];
        for other in others {
            if remaining.is_empty() {
                break;
            }
            let mut next = Vec::with_capacity(remaining.len());
            for piece in &remaining {
                next.extend(piece.subtract(other)?);
            }
            remaining = next;
        }
        Ok(remaining)
    }

    /// Drops duplicate ranges and merges continuous ranges and points that overlap or touch into single
    /// intervals. Other ranges keep their relative order.
    ///
    /// # Examples
    /// ```
    /// use index_sets::{NumericRange, Range};
    ///
    /// let left = Range::numeric(0, 4, 0).unwrap();
    /// let right = Range::from(NumericRange::with_brackets(4, 6, 0, (false, true)).unwrap());
    /// let merged = Range::coalesce([left, Range::point("a"), right, Range::point(6)]);
    /// assert_eq!(merged, vec![Range::numeric(0, 6, 0).unwrap(), Range::point("a")]);
    /// ```
    pub fn coalesce(ranges: impl IntoIterator<Item = Range>) -> Vec<Range> {
        let mut result: Vec<Range> = Vec::new();
        for mut range in ranges {
            let mut slot: Option<usize> = None;
            while let Some(i) = result.iter().position(|r| r.merges_with(&range)) {
                let hull = match (result.remove(i), &range) {
                    (Range::Numeric(a), Range::Numeric(b)) => a.span().hull(&b.span()).to_range(),
                    _ => None,
                };
                if let Some(hull) = hull {
                    range = Range::Numeric(hull);
                }
                slot = Some(slot.map_or(i, |s| s.min(i)));
            }
            if result.contains(&range) {
                continue;
            }
            match slot {
                Some(i) => result.insert(i, range),
                None => result.push(range),
            }
        }
        result
    }

    /// Returns true if the two ranges can be written as one continuous interval.
    fn merges_with(&self, other: &Range) -> bool {
        match (self, other) {
            (Range::Numeric(a), Range::Numeric(b)) => {
                a.step == 0
                    && b.step == 0
                    && (a.is_continuous() || b.is_continuous())
                    && a.span().touches(&b.span())
            }
            _ => false,
        }
    }

    fn intersect(&self, other: &Range) -> SmallVec<[Range; 2]> {
        match (self, other) {
            (Range::Any, r) | (r, Range::Any) => smallvec![r.clone()],
            (Range::NonNumeric(a), Range::NonNumeric(b)) if a == b => smallvec![self.clone()],
            (Range::Numeric(a), Range::Numeric(b)) => a.intersect(b).into_iter().map(Range::Numeric).collect(),
            _ => SmallVec::new(),
        }
    }

    fn subtract(&self, other: &Range) -> Result<SmallVec<[Range; 2]>, RangeError> {
        Ok(match (self, other) {
            (_, Range::Any) => SmallVec::new(),
            (Range::Any, _) => smallvec![Range::Any],
            (Range::NonNumeric(a), Range::NonNumeric(b)) if a == b => SmallVec::new(),
            (Range::Numeric(a), Range::Numeric(b)) => a.subtract(b)?.into_iter().map(Range::Numeric).collect(),
            _ => smallvec![self.clone()],
        })
    }
}

/// The most sub-progressions a progression is split into when another progression is removed from it.
const MAX_SPLITS: i128 = 1 << 16;

fn subtraction_rank(r: &Range) -> u8 {
    match r {
        Range::Any => 0,
        Range::Numeric(n) if n.step() == 0 => 1,
        Range::NonNumeric(_) => 2,
        Range::Numeric(_) => 3,
    }
}

impl NumericRange {
    fn intersect(&self, other: &NumericRange) -> Pieces {
        match (self.step, other.step) {
            (0, 0) => self.span().intersect(&other.span()).to_range().into_iter().collect(),
            (_, 0) => self.clip(&other.span()),
            (0, _) => other.clip(&self.span()),
            _ => progression_intersection(self, other),
        }
    }

    /// The members of this range that lie within the span.
    fn clip(&self, span: &Span) -> Pieces {
        let span = self.span().intersect(span);
        match self.start {
            Some(anchor) if self.step != 0 => clip_progression(anchor.get(), self.step.abs(), &span, self.step < 0),
            _ => span.to_range().into_iter().collect(),
        }
    }

    fn subtract(&self, other: &NumericRange) -> Result<Vec<NumericRange>, RangeError> {
        if self.intersect(other).is_empty() {
            return Ok(vec![self.clone()]);
        }
        match (self.step, other.step) {
            (_, 0) => Ok(self.without_span(&other.span())),
            (0, _) => self.puncture(other),
            _ => self.without_progression(other),
        }
    }

    /// Removes the span by clipping this range to the span's complement, lower part first.
    fn without_span(&self, span: &Span) -> Vec<NumericRange> {
        let mut pieces = Vec::new();
        if let Some(lo) = span.lo {
            pieces.extend(self.clip(&Span {
                lo: None,
                hi: Some(lo),
                lo_closed: true,
                hi_closed: !span.lo_closed,
            }));
        }
        if let Some(hi) = span.hi {
            pieces.extend(self.clip(&Span {
                lo: Some(hi),
                hi: None,
                lo_closed: !span.hi_closed,
                hi_closed: true,
            }));
        }
        pieces
    }

    /// Removes the members of a progression from a continuous interval, splitting it into open-ended pieces.
    fn puncture(&self, other: &NumericRange) -> Result<Vec<NumericRange>, RangeError> {
        let mut points = Vec::new();
        for hit in other.clip(&self.span()) {
            let Some(hit) = hit.iter() else {
                debug!(range = %self, other = %other, "cannot puncture interval at infinitely many points");
                return Err(RangeError::InfinitePuncture {
                    range: self.to_string(),
                    other: other.to_string(),
                });
            };
            points.extend(hit);
        }
        points.sort();
        Ok(self.without_points(points))
    }

    /// Splits the range at each of the ascending points, dropping the points themselves.
    fn without_points(&self, points: impl IntoIterator<Item = Number>) -> Vec<NumericRange> {
        let mut pieces = Vec::new();
        let mut rest = Some(self.clone());
        for x in points {
            let Some(current) = rest.take() else {
                break;
            };
            pieces.extend(current.clip(&Span::below(x)));
            rest = current.clip(&Span::above(x)).into_iter().next();
        }
        pieces.extend(rest);
        pieces
    }

    /// Removes one progression from another.
    ///
    /// This range is split into `lcm / |step|` sub-progressions with step `lcm`. Each of them either misses the
    /// other progression entirely or coincides with it on the other's hull.
    /// If there are too many sub-progressions, the range is split at the common members instead, which works
    /// as long as there are finitely many of them.
    fn without_progression(&self, other: &NumericRange) -> Result<Vec<NumericRange>, RangeError> {
        let (Some(start), Some(other_start)) = (self.start, other.start) else {
            return Ok(vec![self.clone()]);
        };
        let (m, n) = (self.step.unsigned_abs() as i128, other.step.unsigned_abs() as i128);
        let lcm = m.lcm(&n);
        if lcm / m > MAX_SPLITS || lcm > i64::MAX as i128 {
            return self.without_common_members(other);
        }
        let (lcm, splits) = (lcm as i64, (lcm / m) as i64);
        let span = self.span();
        let hull = other.span();
        let mut pieces = Vec::new();
        for j in 0..splits {
            let anchor = start.get() + (j * self.step) as f64;
            if !span.contains(Number::new(anchor)) {
                break;
            }
            let hits_other = (anchor - other_start.get()) % n as f64 == 0.0;
            for sub in clip_progression(anchor, lcm, &span, self.step < 0) {
                if hits_other {
                    pieces.extend(sub.without_span(&hull));
                } else {
                    pieces.push(sub);
                }
            }
        }
        Ok(pieces)
    }

    fn without_common_members(&self, other: &NumericRange) -> Result<Vec<NumericRange>, RangeError> {
        let mut points = Vec::new();
        for common in progression_intersection(self, other) {
            let Some(common) = common.iter() else {
                debug!(range = %self, other = %other, "too many sub-progressions to remove progression");
                return Err(RangeError::TooManyPieces {
                    range: self.to_string(),
                    other: other.to_string(),
                });
            };
            points.extend(common);
        }
        points.sort();
        Ok(self.without_points(points))
    }
}

/// Intersects two progressions by solving their congruences.
fn progression_intersection(a: &NumericRange, b: &NumericRange) -> Pieces {
    let span = a.span().intersect(&b.span());
    let (Some(sa), Some(sb)) = (a.start, b.start) else {
        return Pieces::new();
    };
    if span.is_empty() {
        return Pieces::new();
    }
    // Progressions whose anchors are not an integral distance apart never meet.
    let Some(d) = Number::new(sb.get() - sa.get()).to_i64() else {
        return Pieces::new();
    };
    let (d, m, n) = (d as i128, a.step.abs() as i128, b.step.abs() as i128);
    let egcd = m.extended_gcd(&n);
    let g = egcd.gcd;
    if d % g != 0 {
        return Pieces::new();
    }
    let t = ((d / g) * egcd.x).mod_floor(&(n / g));
    let anchor = sa.get() + (m * t) as f64;
    let step = i64::try_from(m / g * n).unwrap_or(i64::MAX);
    clip_progression(anchor, step, &span, a.step < 0)
}

/// The members of the progression `anchor + k * step` (for all integers `k`) that lie within the span.
/// The result runs downwards if `descending` is set. If the span is unbounded on both sides, the progression
/// is split at the anchor into an ascending and a descending part.
fn clip_progression(anchor: f64, step: i64, span: &Span, descending: bool) -> Pieces {
    if span.is_empty() {
        return Pieces::new();
    }
    let m = step as f64;
    let first = span.lo.map(|lo| {
        let x = anchor + m * ((lo.get() - anchor) / m).ceil();
        if x == lo.get() && !span.lo_closed {
            x + m
        } else {
            x
        }
    });
    let last = span.hi.map(|hi| {
        let x = anchor + m * ((hi.get() - anchor) / m).floor();
        if x == hi.get() && !span.hi_closed {
            x - m
        } else {
            x
        }
    });
    let progression = |start: f64, end: Option<f64>, step: i64| {
        NumericRange::raw(Some(Number::new(start)), end.map(Number::new), step, (true, true))
    };
    match (first, last) {
        (Some(f), Some(l)) if f > l => Pieces::new(),
        (Some(f), Some(l)) if f == l => smallvec![NumericRange::point(f)],
        (Some(f), Some(l)) if descending => smallvec![progression(l, Some(f), -step)],
        (Some(f), Some(l)) => smallvec![progression(f, Some(l), step)],
        (Some(f), None) => smallvec![progression(f, None, step)],
        (None, Some(l)) => smallvec![progression(l, None, -step)],
        (None, None) => smallvec![progression(anchor, None, step), progression(anchor - m, None, -step)],
    }
}
