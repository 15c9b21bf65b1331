//! Single model record.
//!
//! # Responsibility
//! - Define the validated record managed by every backend.
//! - Provide the fixed-format timestamp and enum option set.
//!
//! # Invariants
//! - `id` is `Unassigned` until a storage layer assigns it.
//! - `single_enum` is always one of `SingleEnum::OPTIONS`.
//! - `single_datetime` renders as `YYYY-MM-DDTHH:MM:SS` with no zone.

use chrono::{Datelike, NaiveDateTime};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// External timestamp format, second precision, no timezone suffix.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DATETIME_TEXT_LEN: usize = "YYYY-MM-DDTHH:MM:SS".len();
const MAX_YEAR: i32 = 9999;

/// Record identity, absent before creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ModelId {
    #[default]
    Unassigned,
    Assigned(String),
}

impl ModelId {
    pub fn assigned(id: impl Into<String>) -> Self {
        Self::Assigned(id.into())
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Unassigned => None,
            Self::Assigned(id) => Some(id.as_str()),
        }
    }

    pub fn is_unassigned(&self) -> bool {
        matches!(self, Self::Unassigned)
    }
}

/// Declared option set for `single_enum`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SingleEnum {
    Red,
    Green,
    Blue,
}

impl SingleEnum {
    pub const OPTIONS: [&'static str; 3] = ["red", "green", "blue"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
        }
    }
}

impl FromStr for SingleEnum {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "red" => Ok(Self::Red),
            "green" => Ok(Self::Green),
            "blue" => Ok(Self::Blue),
            _ => Err(()),
        }
    }
}

impl Display for SingleEnum {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timestamp text or value outside the fixed external form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateTimeError {
    #[error("expected exactly YYYY-MM-DDTHH:MM:SS")]
    Shape,
    #[error("year {0} is outside 0000..=9999")]
    YearOutOfRange(i32),
    #[error("{0}")]
    Format(#[from] chrono::ParseError),
}

/// Timestamp that always renders in `DATETIME_FORMAT`.
///
/// Years are limited to `0..=9999` so the text form is always 19 ASCII bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime(NaiveDateTime);

impl DateTime {
    pub fn new(value: NaiveDateTime) -> Result<Self, DateTimeError> {
        let year = value.year();
        if !(0..=MAX_YEAR).contains(&year) {
            return Err(DateTimeError::YearOutOfRange(year));
        }
        Ok(Self(value))
    }

    /// Parses the external text form; signed or 5-digit years, fractional
    /// seconds and zones are rejected.
    pub fn parse(value: &str) -> Result<Self, DateTimeError> {
        let starts_with_digit = value.bytes().next().is_some_and(|b| b.is_ascii_digit());
        if value.len() != DATETIME_TEXT_LEN || !value.is_ascii() || !starts_with_digit {
            return Err(DateTimeError::Shape);
        }
        Self::new(NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)?)
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }
}

impl Display for DateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATETIME_FORMAT))
    }
}

/// The record under management.
///
/// Field order here is the canonical encode order.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleModel {
    pub id: ModelId,
    pub single_bool: bool,
    pub single_int: i64,
    pub single_float: f64,
    pub single_string: String,
    pub single_enum: SingleEnum,
    pub single_datetime: DateTime,
}

impl SingleModel {
    /// Returns a copy carrying the given identity.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = ModelId::assigned(id);
        self
    }
}

/// One page of records plus the unwindowed population count.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResult {
    pub total: u64,
    pub items: Vec<SingleModel>,
}

/// Pagination window for list calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: u32,
    pub limit: u32,
}

impl Page {
    pub fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }
}
