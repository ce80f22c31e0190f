//! Per-column inference state accumulated while a file is scanned.

use std::fmt;

use num_bigint::BigInt;
use serde::Serialize;

use crate::classify::{self, FloatClass};

const CANDIDATE_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeState {
    #[default]
    Unknown,
    Possible,
    Impossible,
}

impl TypeState {
    /// Whether the candidate still needs to be tested.
    pub fn is_open(self) -> bool {
        self != TypeState::Impossible
    }

    pub fn is_possible(self) -> bool {
        self == TypeState::Possible
    }

    /// Records the verdict for one value. Once impossible, a state never
    /// moves again; callers only evaluate open states.
    pub fn record(&mut self, matched: bool) {
        debug_assert!(
            self.is_open(),
            "type state cannot leave Impossible once reached"
        );
        if self.is_open() {
            *self = if matched {
                TypeState::Possible
            } else {
                TypeState::Impossible
            };
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateType {
    Integer,
    Float,
    Double,
    Date,
    Time,
    DateTime,
    OracleDate,
    OracleDateTime,
}

impl CandidateType {
    pub const ALL: [CandidateType; CANDIDATE_COUNT] = [
        CandidateType::Integer,
        CandidateType::Float,
        CandidateType::Double,
        CandidateType::Date,
        CandidateType::Time,
        CandidateType::DateTime,
        CandidateType::OracleDate,
        CandidateType::OracleDateTime,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CandidateType::Integer => "integer",
            CandidateType::Float => "float",
            CandidateType::Double => "double",
            CandidateType::Date => "date",
            CandidateType::Time => "time",
            CandidateType::DateTime => "datetime",
            CandidateType::OracleDate => "oracle_date",
            CandidateType::OracleDateTime => "oracle_datetime",
        }
    }
}

impl fmt::Display for CandidateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeStates([TypeState; CANDIDATE_COUNT]);

impl TypeStates {
    pub fn get(&self, candidate: CandidateType) -> TypeState {
        self.0[candidate.index()]
    }

    pub fn is_possible(&self, candidate: CandidateType) -> bool {
        self.get(candidate).is_possible()
    }

    fn is_open(&self, candidate: CandidateType) -> bool {
        self.get(candidate).is_open()
    }

    fn record(&mut self, candidate: CandidateType, matched: bool) {
        self.0[candidate.index()].record(matched);
    }

    fn test(&mut self, candidate: CandidateType, value: &str, predicate: fn(&str) -> bool) {
        if self.is_open(candidate) {
            self.record(candidate, predicate(value));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (CandidateType, TypeState)> + '_ {
        CandidateType::ALL
            .iter()
            .map(move |candidate| (*candidate, self.get(*candidate)))
    }
}

#[derive(Debug, Clone)]
pub struct ColumnState {
    pub name: String,
    pub nullable: bool,
    pub max_length: usize,
    pub min_int: Option<BigInt>,
    pub max_int: Option<BigInt>,
    pub states: TypeStates,
}

impl ColumnState {
    pub fn new(index: usize) -> Self {
        Self {
            name: generated_name(index),
            nullable: false,
            max_length: 0,
            min_int: None,
            max_int: None,
            states: TypeStates::default(),
        }
    }

    pub fn is_possible(&self, candidate: CandidateType) -> bool {
        self.states.is_possible(candidate)
    }

    pub fn mark_null(&mut self) {
        self.nullable = true;
    }

    /// Narrows every open candidate with one non-null trimmed value.
    ///
    /// `integer` is the value as parsed by [`classify::parse_integer`]; any
    /// integer literal also satisfies the floating-point candidates.
    pub fn observe(&mut self, value: &str, integer: Option<&BigInt>) {
        self.states
            .test(CandidateType::Date, value, classify::is_date);
        self.states
            .test(CandidateType::OracleDate, value, classify::is_oracle_date);
        self.states
            .test(CandidateType::Time, value, classify::is_time);
        self.states
            .test(CandidateType::DateTime, value, classify::is_datetime);
        self.states.test(
            CandidateType::OracleDateTime,
            value,
            classify::is_oracle_datetime,
        );

        if self.states.is_open(CandidateType::Integer) {
            self.states
                .record(CandidateType::Integer, integer.is_some());
            if let Some(integer) = integer {
                self.widen_bounds(integer);
            }
        }

        let float_open = self.states.is_open(CandidateType::Float);
        let double_open = self.states.is_open(CandidateType::Double);
        if float_open || double_open {
            let class = classify::float_class(value);
            let is_integer = integer.is_some();
            if float_open {
                self.states.record(
                    CandidateType::Float,
                    class == FloatClass::Single || is_integer,
                );
            }
            if double_open {
                self.states.record(
                    CandidateType::Double,
                    class != FloatClass::NotFloat || is_integer,
                );
            }
        }

        self.max_length = self.max_length.max(value.chars().count());
    }

    fn widen_bounds(&mut self, integer: &BigInt) {
        if self.min_int.as_ref().is_none_or(|min| integer < min) {
            self.min_int = Some(integer.clone());
        }
        if self.max_int.as_ref().is_none_or(|max| integer > max) {
            self.max_int = Some(integer.clone());
        }
    }
}

pub fn generated_name(index: usize) -> String {
    format!("V{index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observe_all(values: &[&str]) -> ColumnState {
        let mut column = ColumnState::new(0);
        for value in values {
            let integer = classify::parse_integer(value, false);
            column.observe(value, integer.as_ref());
        }
        column
    }

    #[test]
    fn impossible_never_returns_to_possible() {
        let column = observe_all(&["12", "abc", "34", "56"]);
        assert_eq!(
            column.states.get(CandidateType::Integer),
            TypeState::Impossible
        );
        assert_eq!(
            column.states.get(CandidateType::Double),
            TypeState::Impossible
        );
    }

    #[test]
    fn integer_bounds_track_extremes() {
        let column = observe_all(&["5", "-12", "300", "7"]);
        assert!(column.is_possible(CandidateType::Integer));
        assert_eq!(column.min_int, Some(BigInt::from(-12)));
        assert_eq!(column.max_int, Some(BigInt::from(300)));
        assert_eq!(column.max_length, 3);
    }

    #[test]
    fn integers_keep_float_candidates_alive() {
        let column = observe_all(&["1", "2.5", "3"]);
        assert!(!column.is_possible(CandidateType::Integer));
        assert!(column.is_possible(CandidateType::Float));
        assert!(column.is_possible(CandidateType::Double));
    }

    #[test]
    fn double_range_rules_out_float_only() {
        let column = observe_all(&["1.5", "1.0E100"]);
        assert!(!column.is_possible(CandidateType::Float));
        assert!(column.is_possible(CandidateType::Double));
    }

    #[test]
    fn unseen_candidates_stay_unknown() {
        let column = ColumnState::new(3);
        assert_eq!(column.name, "V3");
        assert!(
            column
                .states
                .iter()
                .all(|(_, state)| state == TypeState::Unknown)
        );
    }

    #[test]
    #[should_panic(expected = "cannot leave Impossible")]
    #[cfg(debug_assertions)]
    fn recording_into_impossible_is_rejected_in_debug_builds() {
        let mut state = TypeState::Impossible;
        state.record(true);
    }
}
