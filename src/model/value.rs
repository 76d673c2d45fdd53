//! Atomic data values
//!
//! Every value read from a source, fixed on a segment, or produced by a cast is
//! a [`Value`]. Values are hashable and totally ordered so they can key the
//! dimension and dataset indexes.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use ordered_float::OrderedFloat;
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

/// An atomic data value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    /// SQL NULL
    Null,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Text(String),
    /// Interned symbol (produced by the `sym` cast)
    Symbol(Symbol),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Time of day
    Time(NaiveTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Shorthand for `Value::Float(OrderedFloat(v))`
    pub fn float(v: f64) -> Self {
        Value::Float(OrderedFloat(v))
    }

    /// Intern `name` and wrap it as a symbol value
    pub fn symbol(name: &str) -> Self {
        Value::Symbol(Symbol::intern(name))
    }

    /// Borrow the textual content of text and symbol values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Symbol(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(f.0),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v.0),
            Value::Text(s) => f.write_str(s),
            Value::Symbol(s) => f.write_str(s.as_str()),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(v) => serializer.serialize_f64(v.0),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Symbol(s) => serializer.serialize_str(s.as_str()),
            Value::Date(_) | Value::DateTime(_) | Value::Time(_) => {
                serializer.serialize_str(&self.to_string())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::Time(v)
    }
}

// ============================================================================
// Symbols
// ============================================================================

/// An interned string
///
/// Equal names share one allocation for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Arc<str>);

fn interner() -> &'static Mutex<HashSet<Arc<str>>> {
    static INTERNER: OnceLock<Mutex<HashSet<Arc<str>>>> = OnceLock::new();
    INTERNER.get_or_init(|| Mutex::new(HashSet::new()))
}

impl Symbol {
    pub fn intern(name: &str) -> Self {
        // A poisoned lock still holds a consistent set of strings.
        let mut table = interner().lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = table.get(name) {
            return Symbol(Arc::clone(existing));
        }
        let sym: Arc<str> = Arc::from(name);
        table.insert(Arc::clone(&sym));
        Symbol(sym)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether two symbols share the same interned allocation
    pub fn ptr_eq(&self, other: &Symbol) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
