//! # Query-String Codec
//!
//! Converts a [`FilterValue`] to the flat text stored under one query
//! parameter, and back. No schema travels with the text, so decoding infers
//! the kind purely from the shape of the string.
//!
//! ## Element Grammar
//!
//! | Value | Text |
//! |-------|------|
//! | number | `3`, `-12`, `2.5` |
//! | string | raw text, no escaping |
//! | boolean | `true`, `false` |
//! | null | `null` |
//! | set | `{a,b,3}`, empty set `{}` |
//!
//! Commas and braces inside values are not escaped and will corrupt set
//! parsing. `undefined` has no text form.
//!
//! ## Decode Precedence
//!
//! First match wins:
//! 1. `null`
//! 2. `true` / `false`
//! 3. Leading base-10 integer (`"3abc"` decodes to `3`, `"2.5"` to `2`)
//! 4. `{` word tokens separated by `,` `}` → set, each token decoded by 1-3
//! 5. Anything else → string
//!
//! Numbers encode with their fractional part but decode as integers, so a
//! fractional filter does not survive a trip through the query string.
//!
//! The reserved literals collide with strings of the same text: a string
//! filter set to `"true"` comes back as boolean `true`. [`DecodeMode::Typed`]
//! is the opt-in way around this; the default stays compatible with existing
//! URLs.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{FilterError, Result};
use crate::value::{FilterKind, FilterSet, FilterValue, Number, Scalar};

/// ASCII word tokens only, to match URLs produced by other consumers.
static SET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\{((?:[A-Za-z0-9_]+(?:,[A-Za-z0-9_]+)*)?)\}$").expect("set pattern is valid")
});

/// How parameter text is interpreted when a default kind is known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Shape-only precedence decode, compatible with existing URLs.
    #[default]
    Lenient,
    /// Decode against the kind of the key's default value, falling back to
    /// the lenient decode when the text does not fit.
    Typed,
}

impl DecodeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeMode::Lenient => "lenient",
            DecodeMode::Typed => "typed",
        }
    }
}

impl fmt::Display for DecodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive, so `QUERYFILTERS_DECODE_MODE=Typed` works.
impl FromStr for DecodeMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(DecodeMode::Lenient),
            "typed" => Ok(DecodeMode::Typed),
            other => Err(format!(
                "unknown decode mode `{other}`, expected `lenient` or `typed`"
            )),
        }
    }
}

// Goes through `FromStr` so file values and environment strings parse alike.
impl<'de> Deserialize<'de> for DecodeMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub mode: DecodeMode,
    /// Only accept whole-text integers, so `"3abc"` stays a string.
    pub strict_numbers: bool,
}

impl DecodeOptions {
    pub fn typed() -> Self {
        Self {
            mode: DecodeMode::Typed,
            ..Self::default()
        }
    }
}

/// Encode a value to its query-string text.
///
/// Fails with `UnsupportedType` for `undefined`, including inside a set.
pub fn encode(value: &FilterValue) -> Result<String> {
    match value {
        FilterValue::Number(n) => Ok(n.to_string()),
        FilterValue::String(s) => Ok(s.clone()),
        FilterValue::Bool(b) => Ok(b.to_string()),
        FilterValue::Null => Ok("null".to_string()),
        FilterValue::Undefined => Err(FilterError::unsupported(FilterKind::Undefined.as_str())),
        FilterValue::Set(set) => encode_set(set),
    }
}

fn encode_set(set: &FilterSet) -> Result<String> {
    let items = set.iter().map(encode_scalar).collect::<Result<Vec<_>>>()?;
    Ok(format!("{{{}}}", items.join(",")))
}

fn encode_scalar(scalar: &Scalar) -> Result<String> {
    match scalar {
        Scalar::Number(n) => Ok(n.to_string()),
        Scalar::String(s) => Ok(s.clone()),
        Scalar::Bool(b) => Ok(b.to_string()),
        Scalar::Null => Ok("null".to_string()),
        Scalar::Undefined => Err(FilterError::unsupported(FilterKind::Undefined.as_str())),
    }
}

/// Decode text with the default (lenient) options. Never fails.
pub fn decode(text: &str) -> FilterValue {
    decode_with(text, &DecodeOptions::default())
}

/// Shape-only decode. `options.mode` is ignored here; see [`decode_for`].
pub fn decode_with(text: &str, options: &DecodeOptions) -> FilterValue {
    if let Some(scalar) = decode_scalar(text, options) {
        return scalar.into();
    }
    if let Some(set) = parse_set(text, options) {
        return FilterValue::Set(set);
    }
    FilterValue::String(text.to_string())
}

/// Decode text for a key whose default value has kind `expected`.
///
/// In [`DecodeMode::Lenient`] this is [`decode_with`]. In
/// [`DecodeMode::Typed`] the expected kind is tried first.
pub fn decode_for(text: &str, expected: FilterKind, options: &DecodeOptions) -> FilterValue {
    if options.mode == DecodeMode::Lenient {
        return decode_with(text, options);
    }

    let typed = match expected {
        FilterKind::String => Some(FilterValue::String(text.to_string())),
        FilterKind::Number => parse_number(text, options.strict_numbers).map(FilterValue::Number),
        FilterKind::Bool => parse_bool(text).map(FilterValue::Bool),
        FilterKind::Set => parse_set(text, options).map(FilterValue::Set),
        FilterKind::Null | FilterKind::Undefined => None,
    };

    typed.unwrap_or_else(|| {
        tracing::trace!(text, %expected, "parameter does not fit default kind, decoding by shape");
        decode_with(text, options)
    })
}

/// Rules 1-3 of the precedence list.
fn decode_scalar(text: &str, options: &DecodeOptions) -> Option<Scalar> {
    if text == "null" {
        tracing::trace!(text, "decoded reserved literal");
        return Some(Scalar::Null);
    }
    if let Some(b) = parse_bool(text) {
        tracing::trace!(text, "decoded reserved literal");
        return Some(Scalar::Bool(b));
    }
    parse_number(text, options.strict_numbers).map(Scalar::Number)
}

fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Strict mode wants the whole text to be the integer: no leading
/// whitespace, nothing trailing.
fn parse_number(text: &str, strict: bool) -> Option<Number> {
    let (value, rest) = parse_int_prefix(text)?;
    if strict && (!rest.is_empty() || text.starts_with(char::is_whitespace)) {
        return None;
    }

    if !rest.is_empty() {
        tracing::trace!(text, %value, "numeric decode ignored trailing text");
    }
    Some(value)
}

/// Leading-prefix integer parse: optional whitespace, optional sign, at
/// least one ASCII digit. Returns the value and the unparsed remainder.
///
/// Digit runs beyond `i64` range still parse, losing precision like any
/// large float.
fn parse_int_prefix(text: &str) -> Option<(Number, &str)> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();

    let digits_start = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits_len = bytes[digits_start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits_len == 0 {
        return None;
    }

    let end = digits_start + digits_len;
    let value: f64 = trimmed[..end].parse().ok()?;
    Some((value.into(), &trimmed[end..]))
}

fn parse_set(text: &str, options: &DecodeOptions) -> Option<FilterSet> {
    let captures = SET_PATTERN.captures(text)?;
    let body = captures.get(1).map_or("", |m| m.as_str());
    if body.is_empty() {
        return Some(FilterSet::new());
    }

    Some(
        body.split(',')
            .map(|token| {
                decode_scalar(token, options).unwrap_or_else(|| Scalar::String(token.to_string()))
            })
            .collect(),
    )
}
