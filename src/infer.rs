//! Streaming column type inference.
//!
//! [`ColumnInferencer`] consumes rows one at a time, narrowing every column's
//! candidate types, and [`ColumnInferencer::finish`] turns the surviving
//! candidates into concrete MySQL types following a fixed precedence:
//! integer, float, double, datetime, date, time and finally text.

use std::{fmt, sync::LazyLock};

use log::{debug, warn};
use num_bigint::BigInt;
use regex::Regex;

use crate::{
    classify,
    column::{CandidateType, ColumnState, TypeStates},
    config::InferenceConfig,
    error::InferError,
    uniqueness::UniquenessTracker,
};

/// Leading fields kept in a row-shape diagnostic.
const PREVIEW_FIELDS: usize = 5;

/// Digits carried by the widest exact numeric type, `DECIMAL(65)`.
const DECIMAL_DIGITS: u32 = 65;

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z$_][0-9A-Za-z$_]*$").expect("column name pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntegerWidth {
    Tiny,
    Small,
    Medium,
    Int,
    Big,
    Decimal,
}

impl IntegerWidth {
    pub fn as_str(self) -> &'static str {
        match self {
            IntegerWidth::Tiny => "TINYINT",
            IntegerWidth::Small => "SMALLINT",
            IntegerWidth::Medium => "MEDIUMINT",
            IntegerWidth::Int => "INT",
            IntegerWidth::Big => "BIGINT",
            IntegerWidth::Decimal => "DECIMAL(65)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerType {
    pub width: IntegerWidth,
    pub unsigned: bool,
}

impl fmt::Display for IntegerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.width.as_str())?;
        if self.unsigned {
            f.write_str(" UNSIGNED")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TextType {
    Varchar,
    TinyText,
    Text,
    MediumText,
    LongText,
}

impl TextType {
    const ORDERED: [TextType; 5] = [
        TextType::Varchar,
        TextType::TinyText,
        TextType::Text,
        TextType::MediumText,
        TextType::LongText,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TextType::Varchar => "VARCHAR(255)",
            TextType::TinyText => "TINYTEXT",
            TextType::Text => "TEXT",
            TextType::MediumText => "MEDIUMTEXT",
            TextType::LongText => "LONGTEXT",
        }
    }

    /// Longest value, in characters, the type holds for the given encoding.
    /// UTF-8 limits assume three bytes per character.
    pub fn capacity(self, utf8: bool) -> u64 {
        match (self, utf8) {
            (TextType::Varchar | TextType::TinyText, false) => 255,
            (TextType::Text, false) => 65_535,
            (TextType::MediumText, false) => 16_777_215,
            (TextType::LongText, false) => 4_294_967_295,
            (TextType::Varchar | TextType::TinyText, true) => 84,
            (TextType::Text, true) => 21_844,
            (TextType::MediumText, true) => 5_592_402,
            (TextType::LongText, true) => 1_431_655_765,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer(IntegerType),
    Float,
    Double,
    DateTime { oracle: bool },
    Date { oracle: bool },
    Time,
    Text(TextType),
}

impl SqlType {
    pub fn is_text(&self) -> bool {
        matches!(self, SqlType::Text(_))
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Integer(integer) => integer.fmt(f),
            SqlType::Float => f.write_str("FLOAT"),
            SqlType::Double => f.write_str("DOUBLE"),
            SqlType::DateTime { .. } => f.write_str("DATETIME"),
            SqlType::Date { .. } => f.write_str("DATE"),
            SqlType::Time => f.write_str("TIME"),
            SqlType::Text(text) => f.write_str(text.as_str()),
        }
    }
}

struct WidthBounds {
    width: IntegerWidth,
    signed_min: BigInt,
    signed_max: BigInt,
    unsigned_max: BigInt,
}

static WIDTH_BOUNDS: LazyLock<Vec<WidthBounds>> = LazyLock::new(|| {
    let decimal_max = BigInt::from(10u32).pow(DECIMAL_DIGITS) - 1u32;
    vec![
        WidthBounds {
            width: IntegerWidth::Tiny,
            signed_min: BigInt::from(i8::MIN),
            signed_max: BigInt::from(i8::MAX),
            unsigned_max: BigInt::from(u8::MAX),
        },
        WidthBounds {
            width: IntegerWidth::Small,
            signed_min: BigInt::from(i16::MIN),
            signed_max: BigInt::from(i16::MAX),
            unsigned_max: BigInt::from(u16::MAX),
        },
        WidthBounds {
            width: IntegerWidth::Medium,
            signed_min: BigInt::from(-8_388_608i32),
            signed_max: BigInt::from(8_388_607i32),
            unsigned_max: BigInt::from(16_777_215u32),
        },
        WidthBounds {
            width: IntegerWidth::Int,
            signed_min: BigInt::from(i32::MIN),
            signed_max: BigInt::from(i32::MAX),
            unsigned_max: BigInt::from(u32::MAX),
        },
        WidthBounds {
            width: IntegerWidth::Big,
            signed_min: BigInt::from(i64::MIN),
            signed_max: BigInt::from(i64::MAX),
            unsigned_max: BigInt::from(u64::MAX),
        },
        WidthBounds {
            width: IntegerWidth::Decimal,
            signed_min: -decimal_max.clone(),
            signed_max: decimal_max.clone(),
            unsigned_max: decimal_max,
        },
    ]
});

/// Narrowest integer type covering `[min, max]`. Non-negative ranges use
/// the unsigned variants; `DECIMAL(65)` is never marked unsigned. Returns
/// `None` when the range exceeds 65 digits.
pub fn select_integer_width(min: &BigInt, max: &BigInt) -> Option<IntegerType> {
    let unsigned = min.sign() != num_bigint::Sign::Minus;
    WIDTH_BOUNDS
        .iter()
        .find(|bounds| {
            if unsigned {
                max <= &bounds.unsigned_max
            } else {
                min >= &bounds.signed_min && max <= &bounds.signed_max
            }
        })
        .map(|bounds| IntegerType {
            width: bounds.width,
            unsigned: unsigned && bounds.width != IntegerWidth::Decimal,
        })
}

/// Narrowest text type able to hold `max_length` characters.
pub fn select_text_type(max_length: usize, utf8: bool) -> TextType {
    TextType::ORDERED
        .into_iter()
        .find(|text| max_length as u64 <= text.capacity(utf8))
        .unwrap_or(TextType::LongText)
}

/// Applies the finalization precedence to one column.
pub fn decide_type(column: &ColumnState, utf8: bool) -> SqlType {
    let text = || SqlType::Text(select_text_type(column.max_length, utf8));

    if column.is_possible(CandidateType::Integer) {
        let width = match (&column.min_int, &column.max_int) {
            (Some(min), Some(max)) => select_integer_width(min, max),
            _ => None,
        };
        // Float and double are only alive through the integer rule here,
        // so an integer too wide for DECIMAL(65) is stored as text.
        return width.map_or_else(text, SqlType::Integer);
    }
    if column.is_possible(CandidateType::Float) {
        return SqlType::Float;
    }
    if column.is_possible(CandidateType::Double) {
        return SqlType::Double;
    }
    if column.is_possible(CandidateType::DateTime) {
        return SqlType::DateTime { oracle: false };
    }
    if column.is_possible(CandidateType::OracleDateTime) {
        return SqlType::DateTime { oracle: true };
    }
    if column.is_possible(CandidateType::Date) {
        return SqlType::Date { oracle: false };
    }
    if column.is_possible(CandidateType::OracleDate) {
        return SqlType::Date { oracle: true };
    }
    if column.is_possible(CandidateType::Time) {
        return SqlType::Time;
    }
    text()
}

pub fn is_good_column_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

/// A column after end of stream.
#[derive(Debug, Clone)]
pub struct FinalColumn {
    pub name: String,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub max_length: usize,
    pub min_int: Option<BigInt>,
    pub max_int: Option<BigInt>,
    pub unique_key: bool,
    pub states: TypeStates,
}

#[derive(Debug, Clone)]
pub struct InferredTable {
    pub columns: Vec<FinalColumn>,
    /// Whether the first row was taken as column names.
    pub header_consumed: bool,
    pub data_rows: usize,
    pub lines_read: usize,
}

pub struct ColumnInferencer<'a> {
    config: &'a InferenceConfig,
    columns: Vec<ColumnState>,
    trackers: Vec<UniquenessTracker>,
    started: bool,
    header_consumed: bool,
    data_rows: usize,
    lines_read: usize,
}

impl<'a> ColumnInferencer<'a> {
    pub fn new(config: &'a InferenceConfig) -> Self {
        Self {
            config,
            columns: Vec::new(),
            trackers: Vec::new(),
            started: false,
            header_consumed: false,
            data_rows: 0,
            lines_read: 0,
        }
    }

    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Feeds one row. The first row fixes the column count; a later row
    /// with a different count is rejected and leaves the state untouched.
    pub fn observe_row<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<(), InferError> {
        self.lines_read += 1;

        if !self.started {
            self.started = true;
            self.columns = (0..fields.len()).map(ColumnState::new).collect();
            if self.config.detect_unique_keys {
                self.trackers = (0..fields.len())
                    .map(|_| UniquenessTracker::new(self.config.max_tracked_values))
                    .collect();
            }
            if self.config.first_row_is_header && self.accept_header(fields) {
                self.header_consumed = true;
                return Ok(());
            }
        } else if fields.len() != self.columns.len() {
            return Err(InferError::RowShape {
                line: self.lines_read,
                found: fields.len(),
                expected: self.columns.len(),
                preview: fields
                    .iter()
                    .take(PREVIEW_FIELDS)
                    .map(|field| field.as_ref().to_string())
                    .collect(),
            });
        }

        self.data_rows += 1;
        for (index, field) in fields.iter().enumerate() {
            self.observe_value(index, field.as_ref().trim());
        }
        Ok(())
    }

    fn accept_header<S: AsRef<str>>(&mut self, fields: &[S]) -> bool {
        let mut accepted = true;
        for (index, field) in fields.iter().enumerate() {
            let name = field.as_ref().trim();
            if !is_good_column_name(name) {
                warn!("Column {index} name {name:?} is not a valid identifier");
                accepted = false;
            }
        }
        if accepted {
            for (column, field) in self.columns.iter_mut().zip(fields) {
                column.name = field.as_ref().trim().to_string();
            }
        } else {
            warn!("Treating the first line as data with generated column names");
        }
        accepted
    }

    fn observe_value(&mut self, index: usize, value: &str) {
        let column = &mut self.columns[index];
        let raw = (!self.config.is_null(value)).then_some(value);
        let integer = raw.and_then(|value| {
            classify::parse_integer(value, self.config.reject_leading_zero_integers)
        });
        if let Some(tracker) = self.trackers.get_mut(index) {
            for loss in tracker.observe(raw, integer.as_ref()).losses() {
                debug!("Column {index} ({}) {loss}", column.name);
            }
        }
        match raw {
            Some(value) => column.observe(value, integer.as_ref()),
            None => column.mark_null(),
        }
    }

    /// Resolves every column's type and, when requested, its key status.
    pub fn finish(self) -> InferredTable {
        let utf8 = self.config.utf8;
        let mut trackers = self.trackers.into_iter();
        let columns = self
            .columns
            .into_iter()
            .enumerate()
            .map(|(index, column)| {
                let sql_type = decide_type(&column, utf8);
                let unique_key = trackers.next().is_some_and(|mut tracker| {
                    if let Some(loss) = tracker.revalidate(&sql_type) {
                        debug!("Column {index} ({}) {loss}", column.name);
                    }
                    tracker.is_key_candidate()
                });
                FinalColumn {
                    name: column.name,
                    sql_type,
                    nullable: column.nullable,
                    max_length: column.max_length,
                    min_int: column.min_int,
                    max_int: column.max_int,
                    unique_key,
                    states: column.states,
                }
            })
            .collect();

        InferredTable {
            columns,
            header_consumed: self.header_consumed,
            data_rows: self.data_rows,
            lines_read: self.lines_read,
        }
    }
}
