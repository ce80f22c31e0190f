//! Per-column candidate-key detection.
//!
//! Integers are tracked in an [`IntervalSet`] so dense identifier columns
//! cost a few ranges instead of one entry per row. Every other value goes into
//! a capped set of raw strings. Either tracker is abandoned on the first
//! duplicate and never comes back.

use std::{collections::HashSet, fmt};

use num_bigint::BigInt;

use crate::{classify, infer::SqlType, interval_set::IntervalSet};

#[derive(Debug, Clone)]
pub enum Tracking<T> {
    Tracking(T),
    Abandoned,
}

impl<T> Tracking<T> {
    pub fn is_abandoned(&self) -> bool {
        matches!(self, Tracking::Abandoned)
    }

    pub fn tracked(&self) -> Option<&T> {
        match self {
            Tracking::Tracking(inner) => Some(inner),
            Tracking::Abandoned => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniquenessLoss {
    NonInteger,
    DuplicateInteger,
    DuplicateValue,
    CapExceeded(usize),
    NumericCollision,
}

impl fmt::Display for UniquenessLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniquenessLoss::NonInteger => write!(f, "is not all integers"),
            UniquenessLoss::DuplicateInteger => write!(f, "is not unique as integers"),
            UniquenessLoss::DuplicateValue => write!(f, "is not unique"),
            UniquenessLoss::CapExceeded(cap) => write!(
                f,
                "has more distinct values than {cap}; no longer tracked except as integers"
            ),
            UniquenessLoss::NumericCollision => {
                write!(f, "has distinct strings that denote the same number")
            }
        }
    }
}

/// Losses caused by a single observed value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Observation {
    pub integers: Option<UniquenessLoss>,
    pub values: Option<UniquenessLoss>,
}

impl Observation {
    pub fn losses(self) -> impl Iterator<Item = UniquenessLoss> {
        self.integers.into_iter().chain(self.values)
    }
}

#[derive(Debug, Clone)]
pub struct UniquenessTracker {
    integers: Tracking<IntervalSet>,
    values: Tracking<HashSet<String>>,
    cap: usize,
}

impl UniquenessTracker {
    pub fn new(cap: usize) -> Self {
        Self {
            integers: Tracking::Tracking(IntervalSet::new()),
            values: Tracking::Tracking(HashSet::new()),
            cap,
        }
    }

    pub fn integers(&self) -> &Tracking<IntervalSet> {
        &self.integers
    }

    pub fn values(&self) -> &Tracking<HashSet<String>> {
        &self.values
    }

    /// Feeds one trimmed value, `None` for NULL; `integer` is its integer
    /// reading. NULLs never collide, so any number of them may share a key.
    pub fn observe(&mut self, raw: Option<&str>, integer: Option<&BigInt>) -> Observation {
        let mut observation = Observation::default();

        if let Tracking::Tracking(set) = &mut self.integers {
            let loss = match (raw, integer) {
                (Some(_), None) => Some(UniquenessLoss::NonInteger),
                (_, value) if !set.add_optional(value) => Some(UniquenessLoss::DuplicateInteger),
                _ => None,
            };
            if loss.is_some() {
                self.integers = Tracking::Abandoned;
                observation.integers = loss;
            }
        }

        if let (Some(raw), Tracking::Tracking(set)) = (raw, &mut self.values) {
            let loss = if set.contains(raw) {
                Some(UniquenessLoss::DuplicateValue)
            } else {
                set.insert(raw.to_string());
                (set.len() > self.cap).then_some(UniquenessLoss::CapExceeded(self.cap))
            };
            if loss.is_some() {
                self.values = Tracking::Abandoned;
                observation.values = loss;
            }
        }

        observation
    }

    /// Re-checks surviving strings under the column's final numeric reading.
    ///
    /// Distinct strings such as `1` and `01`, or `0.1` and `1e-1`, can denote
    /// the same number; a collision demotes the string tracker.
    pub fn revalidate(&mut self, sql_type: &SqlType) -> Option<UniquenessLoss> {
        let Tracking::Tracking(set) = &self.values else {
            return None;
        };
        let unique = match sql_type {
            SqlType::Integer(_) => distinct_integers(set),
            SqlType::Float | SqlType::Double => distinct_doubles(set),
            _ => true,
        };
        if unique {
            None
        } else {
            self.values = Tracking::Abandoned;
            Some(UniquenessLoss::NumericCollision)
        }
    }

    /// A column is a key candidate when a tracker survived and saw a value.
    pub fn is_key_candidate(&self) -> bool {
        self.integers.tracked().is_some_and(|set| !set.is_empty())
            || self.values.tracked().is_some_and(|set| !set.is_empty())
    }
}

fn distinct_integers(values: &HashSet<String>) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|value| {
        classify::parse_integer(value, false).is_some_and(|parsed| seen.insert(parsed))
    })
}

fn distinct_doubles(values: &HashSet<String>) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|value| {
        value
            .parse::<f64>()
            .is_ok_and(|parsed| seen.insert(parsed.to_bits()))
    })
}
