//! Compact set of integers stored as maximal disjoint ranges.
//!
//! An [`IntervalSet`] keeps a `BTreeMap` from the low end of each range to
//! its high end. Ranges never overlap and never touch: inserting a value that
//! bridges two ranges merges them. A dense column of identifiers therefore
//! collapses to a handful of entries no matter how many rows it spans, which
//! is what makes uniqueness checks over integer columns affordable.
//!
//! Every operation is a constant number of ordered-map lookups, so insertion
//! costs `O(log n)` in the number of stored ranges, independent of the
//! magnitude of the values.

use std::{
    collections::BTreeMap,
    fmt,
    ops::Bound::{Excluded, Unbounded},
};

use num_bigint::BigInt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntervalSet {
    ranges: BTreeMap<BigInt, BigInt>,
}

impl IntervalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value`, returning `false` when it was already present.
    pub fn add(&mut self, value: &BigInt) -> bool {
        let floor = self
            .ranges
            .range(..=value)
            .next_back()
            .map(|(lo, hi)| (lo.clone(), hi.clone()));
        let ceiling = self
            .ranges
            .range(value..)
            .next()
            .map(|(lo, hi)| (lo.clone(), hi.clone()));

        if floor.as_ref().is_some_and(|(_, hi)| value <= hi)
            || ceiling.as_ref().is_some_and(|(lo, _)| lo == value)
        {
            return false;
        }

        let start = match (floor, ceiling) {
            (Some((lo, hi)), _) if &hi + 1u32 == *value => {
                self.ranges.insert(lo.clone(), value.clone());
                lo
            }
            (_, Some((lo, hi))) if value + 1u32 == lo => {
                self.ranges.remove(&lo);
                self.ranges.insert(value.clone(), hi);
                value.clone()
            }
            _ => {
                self.ranges.insert(value.clone(), value.clone());
                value.clone()
            }
        };

        self.merge_following(&start);
        true
    }

    /// Absent values never collide; several NULLs may share a unique key.
    pub fn add_optional(&mut self, value: Option<&BigInt>) -> bool {
        match value {
            Some(value) => self.add(value),
            None => true,
        }
    }

    fn merge_following(&mut self, start: &BigInt) {
        let Some(end) = self.ranges.get(start).cloned() else {
            return;
        };
        let next = self
            .ranges
            .range((Excluded(start), Unbounded))
            .next()
            .map(|(lo, hi)| (lo.clone(), hi.clone()));
        if let Some((next_lo, next_hi)) = next
            && &end + 1u32 >= next_lo
        {
            self.ranges.remove(&next_lo);
            self.ranges.insert(start.clone(), end.max(next_hi));
        }
    }

    pub fn contains(&self, value: &BigInt) -> bool {
        self.ranges
            .range(..=value)
            .next_back()
            .is_some_and(|(_, hi)| value <= hi)
    }

    /// Number of stored ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Number of distinct integers covered by all ranges.
    pub fn cardinality(&self) -> BigInt {
        self.ranges
            .iter()
            .fold(BigInt::from(0), |total, (lo, hi)| total + (hi - lo) + 1u32)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BigInt, &BigInt)> {
        self.ranges.iter()
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (idx, (lo, hi)) in self.ranges.iter().enumerate() {
            if idx > 0 {
                write!(f, " ")?;
            }
            write!(f, "[{lo},{hi}]")?;
        }
        write!(f, "]")
    }
}
