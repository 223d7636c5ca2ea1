//! Filter value types.
//!
//! This module defines the runtime representation of filter values. The kind
//! universe is deliberately small: numbers, strings, booleans, `null`,
//! `undefined` and one level of set-of-scalars. Anything else is rejected at
//! the boundary (see [`FilterValue::try_from`] for JSON input).

use indexmap::IndexSet;
use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A filter number, stored as `f64`.
///
/// Equality is SameValueZero: `NaN` equals `NaN` and `-0` equals `0`, so
/// numbers behave inside a [`FilterSet`]. Text form drops a trailing `.0`.
///
/// Decoding only reads integers, so a fractional number survives in the
/// filter state but comes back from the query string truncated
/// (`2.5` → `"2.5"` → `2`).
#[derive(Debug, Clone, Copy)]
pub struct Number(f64);

impl Number {
    pub fn new(value: f64) -> Self {
        Number(value)
    }

    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// The value as an integer, if it is whole and fits.
    pub fn as_i64(self) -> Option<i64> {
        let f = self.0;
        // `i64::MAX as f64` rounds up, hence `<`.
        (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        (self.0.is_nan() && other.0.is_nan()) || self.0 == other.0
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let bits = if self.0.is_nan() {
            f64::NAN.to_bits()
        } else if self.0 == 0.0 {
            0
        } else {
            self.0.to_bits()
        };
        bits.hash(state);
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0;
        if n.is_nan() {
            f.write_str("NaN")
        } else if n.is_infinite() {
            f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
        } else if n == 0.0 {
            f.write_str("0")
        } else {
            write!(f, "{}", n)
        }
    }
}

/// Whole numbers serialize as JSON integers.
impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_i64() {
            Some(i) => serializer.serialize_i64(i),
            None => serializer.serialize_f64(self.0),
        }
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number(value)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number(value as f64)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number(value.into())
    }
}

/// A single non-collection value.
///
/// Sets are built from scalars only, so nested sets cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(Number),
    String(String),
    Bool(bool),
    Null,
    /// Has no text form; encoding it fails.
    Undefined,
}

impl Scalar {
    pub fn kind(&self) -> FilterKind {
        match self {
            Scalar::Number(_) => FilterKind::Number,
            Scalar::String(_) => FilterKind::String,
            Scalar::Bool(_) => FilterKind::Bool,
            Scalar::Null => FilterKind::Null,
            Scalar::Undefined => FilterKind::Undefined,
        }
    }
}

impl From<Number> for Scalar {
    fn from(value: Number) -> Self {
        Scalar::Number(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

/// Insertion-ordered set of scalars.
///
/// Duplicates collapse onto the first occurrence, and iteration (and
/// therefore encoding) follows first-insertion order. Equality ignores order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterSet(IndexSet<Scalar>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the value was not already present.
    pub fn insert(&mut self, value: impl Into<Scalar>) -> bool {
        self.0.insert(value.into())
    }

    /// Removes a value, keeping the order of the remaining elements.
    pub fn remove(&mut self, value: &Scalar) -> bool {
        self.0.shift_remove(value)
    }

    pub fn contains(&self, value: &Scalar) -> bool {
        self.0.contains(value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scalar> {
        self.0.iter()
    }
}

impl<T: Into<Scalar>> FromIterator<T> for FilterSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a FilterSet {
    type Item = &'a Scalar;
    type IntoIter = indexmap::set::Iter<'a, Scalar>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The kind of a filter value.
///
/// Used for diagnostics and by the typed decode mode, which decodes a
/// parameter against the kind of its key's default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Number,
    String,
    Bool,
    Null,
    Undefined,
    Set,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Number => "number",
            FilterKind::String => "string",
            FilterKind::Bool => "boolean",
            FilterKind::Null => "null",
            FilterKind::Undefined => "undefined",
            FilterKind::Set => "set",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime representation of a filter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Number(Number),
    String(String),
    Bool(bool),
    Null,
    Undefined,
    Set(FilterSet),
}

impl FilterValue {
    pub fn kind(&self) -> FilterKind {
        match self {
            FilterValue::Number(_) => FilterKind::Number,
            FilterValue::String(_) => FilterKind::String,
            FilterValue::Bool(_) => FilterKind::Bool,
            FilterValue::Null => FilterKind::Null,
            FilterValue::Undefined => FilterKind::Undefined,
            FilterValue::Set(_) => FilterKind::Set,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FilterValue::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FilterValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FilterValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&FilterSet> {
        match self {
            FilterValue::Set(set) => Some(set),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FilterValue::Null)
    }

    /// Converts to a [`Scalar`], or `None` for sets.
    pub fn into_scalar(self) -> Option<Scalar> {
        match self {
            FilterValue::Number(n) => Some(Scalar::Number(n)),
            FilterValue::String(s) => Some(Scalar::String(s)),
            FilterValue::Bool(b) => Some(Scalar::Bool(b)),
            FilterValue::Null => Some(Scalar::Null),
            FilterValue::Undefined => Some(Scalar::Undefined),
            FilterValue::Set(_) => None,
        }
    }
}

impl From<Scalar> for FilterValue {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Number(n) => FilterValue::Number(n),
            Scalar::String(s) => FilterValue::String(s),
            Scalar::Bool(b) => FilterValue::Bool(b),
            Scalar::Null => FilterValue::Null,
            Scalar::Undefined => FilterValue::Undefined,
        }
    }
}

impl From<Number> for FilterValue {
    fn from(value: Number) -> Self {
        FilterValue::Number(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Number(value.into())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Number(value.into())
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Number(value.into())
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::String(value)
    }
}

impl From<FilterSet> for FilterValue {
    fn from(value: FilterSet) -> Self {
        FilterValue::Set(value)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    /// `None` maps to `null`, mirroring how an absent optional reads in JSON.
    fn from(value: Option<T>) -> Self {
        value.map_or(FilterValue::Null, Into::into)
    }
}

/// JSON input is the dynamic way to describe defaults, so it is also where
/// out-of-universe kinds show up: objects and nested arrays are rejected.
impl TryFrom<serde_json::Value> for FilterValue {
    type Error = crate::error::FilterError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::Array(items) => {
                let mut set = FilterSet::new();
                for item in items {
                    let scalar = FilterValue::try_from(item)?
                        .into_scalar()
                        .ok_or_else(|| crate::error::FilterError::unsupported("nested set"))?;
                    set.insert(scalar);
                }
                Ok(FilterValue::Set(set))
            }
            Value::Object(_) => Err(crate::error::FilterError::unsupported("object")),
            Value::Null => Ok(FilterValue::Null),
            Value::Bool(b) => Ok(FilterValue::Bool(b)),
            Value::String(s) => Ok(FilterValue::String(s)),
            Value::Number(n) => n
                .as_f64()
                .map(FilterValue::from)
                .ok_or_else(|| crate::error::FilterError::unsupported("number")),
        }
    }
}
