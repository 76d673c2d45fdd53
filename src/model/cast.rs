//! Cast registry
//!
//! Casts convert raw values read from a source into typed values. They are
//! named by short identifiers (`sym`, `int`, `float`, `date`, `datetime`,
//! `time`) which are resolved against a static table when a segment or measure
//! is defined, never when a value is cast.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::value::{Symbol, Value};
use crate::error::ConfigError;

/// A named conversion applied to extracted values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cast {
    /// Interned symbol
    Sym,
    /// 64-bit integer
    Int,
    /// 64-bit floating point
    Float,
    /// Calendar date
    Date,
    /// Date and time without timezone
    DateTime,
    /// Time of day
    Time,
}

/// Identifier table for every known cast
const REGISTRY: [(&str, Cast); 6] = [
    ("sym", Cast::Sym),
    ("int", Cast::Int),
    ("float", Cast::Float),
    ("date", Cast::Date),
    ("datetime", Cast::DateTime),
    ("time", Cast::Time),
];

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

/// Error when a value cannot be converted by a cast
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot cast {value:?} with '{cast}'")]
pub struct CastError {
    pub cast: Cast,
    pub value: Value,
}

impl Cast {
    /// Look up a cast by identifier
    pub fn lookup(name: &str) -> Option<Cast> {
        REGISTRY
            .iter()
            .find(|(id, _)| *id == name)
            .map(|(_, cast)| *cast)
    }

    /// All registered identifiers, in registry order
    pub fn identifiers() -> impl Iterator<Item = &'static str> {
        REGISTRY.iter().map(|(id, _)| *id)
    }

    pub fn identifier(self) -> &'static str {
        REGISTRY
            .iter()
            .find(|(_, cast)| *cast == self)
            .map(|(id, _)| *id)
            .unwrap_or("?")
    }

    /// Convert a raw value. NULL passes through every cast unchanged.
    pub fn apply(self, value: Value) -> Result<Value, CastError> {
        if value.is_null() {
            return Ok(value);
        }
        let converted = match self {
            Cast::Sym => Some(cast_sym(&value)),
            Cast::Int => cast_int(&value),
            Cast::Float => cast_float(&value),
            Cast::Date => cast_date(&value),
            Cast::DateTime => cast_datetime(&value),
            Cast::Time => cast_time(&value),
        };
        converted.ok_or(CastError { cast: self, value })
    }
}

fn cast_sym(value: &Value) -> Value {
    match value {
        Value::Symbol(_) => value.clone(),
        other => Value::Symbol(Symbol::intern(&other.to_string())),
    }
}

fn cast_int(value: &Value) -> Option<Value> {
    match value {
        Value::Int(_) => Some(value.clone()),
        Value::Float(f) if f.is_finite() => Some(Value::Int(f.trunc() as i64)),
        Value::Bool(b) => Some(Value::Int(i64::from(*b))),
        Value::Text(_) | Value::Symbol(_) => {
            let text = value.as_str()?.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| {
                    text.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                })
                .map(Value::Int)
        }
        _ => None,
    }
}

fn cast_float(value: &Value) -> Option<Value> {
    match value {
        Value::Float(_) => Some(value.clone()),
        Value::Int(i) => Some(Value::float(*i as f64)),
        Value::Text(_) | Value::Symbol(_) => {
            value.as_str()?.trim().parse::<f64>().ok().map(Value::float)
        }
        _ => None,
    }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

fn cast_date(value: &Value) -> Option<Value> {
    match value {
        Value::Date(_) => Some(value.clone()),
        Value::DateTime(dt) => Some(Value::Date(dt.date())),
        Value::Text(_) | Value::Symbol(_) => {
            let text = value.as_str()?.trim();
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .or_else(|| parse_datetime(text).map(|dt| dt.date()))
                .map(Value::Date)
        }
        _ => None,
    }
}

fn cast_datetime(value: &Value) -> Option<Value> {
    match value {
        Value::DateTime(_) => Some(value.clone()),
        Value::Date(d) => Some(Value::DateTime(d.and_time(NaiveTime::MIN))),
        Value::Text(_) | Value::Symbol(_) => {
            let text = value.as_str()?.trim();
            parse_datetime(text)
                .or_else(|| {
                    NaiveDate::parse_from_str(text, DATE_FORMAT)
                        .ok()
                        .map(|d| d.and_time(NaiveTime::MIN))
                })
                .map(Value::DateTime)
        }
        _ => None,
    }
}

fn cast_time(value: &Value) -> Option<Value> {
    match value {
        Value::Time(_) => Some(value.clone()),
        Value::DateTime(dt) => Some(Value::Time(dt.time())),
        Value::Text(_) | Value::Symbol(_) => {
            let text = value.as_str()?.trim();
            TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
                .or_else(|| parse_datetime(text).map(|dt| dt.time()))
                .map(Value::Time)
        }
        _ => None,
    }
}

impl fmt::Display for Cast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for Cast {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cast::lookup(s).ok_or_else(|| ConfigError::UnknownCast(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Cast {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Cast::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Cast {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.identifier())
    }
}
