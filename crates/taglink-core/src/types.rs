// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core data types exchanged with the tag server.
//!
//! An [`Item`] is the value/quality/timestamp triple returned for one tag
//! read. The empty item (all fields at their defaults) stands for "no data".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Value
// =============================================================================

/// A scalar tag value.
///
/// Numeric comparison is normalised, so `Int(2)` equals `Float(2.0)`.
///
/// # Examples
///
/// ```
/// use taglink_core::Value;
///
/// assert_eq!(Value::Int(2), Value::Float(2.0));
/// assert_ne!(Value::Int(2), Value::String("2".into()));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// No value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed 64-bit integer.
    Int(i64),

    /// 64-bit floating point.
    Float(f64),

    /// UTF-8 string.
    String(String),
}

impl Value {
    /// Returns the type name of this value.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
        }
    }

    /// Returns `true` if this is the null value.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for integer and float values.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Attempts to convert this value to a boolean.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to convert this value to an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    /// Attempts to convert this value to an f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to get this value as a string slice.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Converts a JSON scalar into a value. Arrays and objects are rejected.
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        match json {
            serde_json::Value::Null => Some(Value::Null),
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_f64().map(Value::Float)),
            serde_json::Value::String(s) => Some(Value::String(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (a, b) if a.is_numeric() && b.is_numeric() => a.as_f64() == b.as_f64(),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

// =============================================================================
// Quality
// =============================================================================

/// Quality code attached to every tag read.
///
/// Known codes map to named variants. Anything else is kept as
/// [`Quality::Other`] and is never considered good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i16", into = "i16")]
pub enum Quality {
    /// Value is not usable (code 0).
    #[default]
    Bad,

    /// Value may be usable (code 64).
    Uncertain,

    /// Value is usable (code 192).
    Good,

    /// Value is usable but overridden locally (code 216).
    GoodButForced,

    /// Any code outside the known set.
    Other(i16),
}

impl Quality {
    /// Bit mask selecting the quality status bits.
    pub const STATUS_MASK: i16 = 0xC0;

    /// Returns the numeric code.
    pub fn code(&self) -> i16 {
        match self {
            Quality::Bad => 0,
            Quality::Uncertain => 64,
            Quality::Good => 192,
            Quality::GoodButForced => 216,
            Quality::Other(code) => *code,
        }
    }

    /// Converts a transport-level code that may not fit in 16 bits.
    ///
    /// Codes outside the `i16` range collapse to [`Quality::Bad`].
    pub fn from_wide(code: i32) -> Self {
        i16::try_from(code).map(Self::from).unwrap_or(Quality::Bad)
    }

    /// Returns `true` only for the defined good codes.
    #[inline]
    pub fn is_good(&self) -> bool {
        matches!(self, Quality::Good | Quality::GoodButForced)
    }

    /// Returns the status bits of the code (bad, uncertain, or good family).
    #[inline]
    pub fn status_bits(&self) -> i16 {
        self.code() & Self::STATUS_MASK
    }
}

impl From<i16> for Quality {
    fn from(code: i16) -> Self {
        match code {
            0 => Quality::Bad,
            64 => Quality::Uncertain,
            192 => Quality::Good,
            216 => Quality::GoodButForced,
            other => Quality::Other(other),
        }
    }
}

impl From<Quality> for i16 {
    fn from(q: Quality) -> Self {
        q.code()
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Bad => write!(f, "bad"),
            Quality::Uncertain => write!(f, "uncertain"),
            Quality::Good => write!(f, "good"),
            Quality::GoodButForced => write!(f, "good (forced)"),
            Quality::Other(code) => write!(f, "unknown ({})", code),
        }
    }
}

// =============================================================================
// Item
// =============================================================================

/// Value, quality and timestamp of one tag read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// The tag value.
    pub value: Value,

    /// Quality reported by the server.
    pub quality: Quality,

    /// Source timestamp. The Unix epoch for the empty item.
    pub timestamp: DateTime<Utc>,
}

impl Item {
    /// Creates an item.
    pub fn new(value: impl Into<Value>, quality: Quality, timestamp: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            quality,
            timestamp,
        }
    }

    /// Returns the empty item used for unknown or failed tags.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` if every field is at its default.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns `true` if the quality is one of the good codes.
    #[inline]
    pub fn is_good(&self) -> bool {
        self.quality.is_good()
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] @ {}",
            self.value,
            self.quality,
            self.timestamp.to_rfc3339()
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_numeric_equality() {
        assert_eq!(Value::Int(2), Value::Float(2.0));
        assert_eq!(Value::Float(0.5), Value::Float(0.5));
        assert_ne!(Value::Int(2), Value::Float(2.5));
        assert_ne!(Value::Bool(true), Value::Int(1));
        assert_ne!(Value::Null, Value::Int(0));
    }

    #[test]
    fn test_value_json_shape() {
        assert_eq!(serde_json::to_string(&Value::Int(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");

        let v: Value = serde_json::from_str("0.12").unwrap();
        assert!(matches!(v, Value::Float(f) if f == 0.12));
        let v: Value = serde_json::from_str("2").unwrap();
        assert!(matches!(v, Value::Int(2)));
        let v: Value = serde_json::from_str("\"Hello\"").unwrap();
        assert_eq!(v.as_str(), Some("Hello"));
        let v: Value = serde_json::from_str("true").unwrap();
        assert_eq!(v.as_bool(), Some(true));
    }

    #[test]
    fn test_value_from_json_rejects_composites() {
        assert!(Value::from_json(&serde_json::json!([1, 2])).is_none());
        assert!(Value::from_json(&serde_json::json!({"a": 1})).is_none());
        assert_eq!(Value::from_json(&serde_json::json!(7)), Some(Value::Int(7)));
    }

    #[test]
    fn test_quality_codes() {
        assert_eq!(Quality::from(192), Quality::Good);
        assert_eq!(Quality::from(216), Quality::GoodButForced);
        assert_eq!(Quality::from(64), Quality::Uncertain);
        assert_eq!(Quality::from(0), Quality::Bad);
        assert_eq!(Quality::from(24), Quality::Other(24));
        assert_eq!(Quality::Other(24).code(), 24);
    }

    #[test]
    fn test_quality_is_good() {
        assert!(Quality::Good.is_good());
        assert!(Quality::GoodButForced.is_good());
        assert!(!Quality::Uncertain.is_good());
        assert!(!Quality::Bad.is_good());
        assert!(!Quality::Other(200).is_good());
    }

    #[test]
    fn test_quality_from_wide() {
        assert_eq!(Quality::from_wide(192), Quality::Good);
        assert_eq!(Quality::from_wide(70_000), Quality::Bad);
        assert_eq!(Quality::from_wide(-70_000), Quality::Bad);
    }

    #[test]
    fn test_empty_item() {
        let item = Item::empty();
        assert!(item.is_empty());
        assert!(!item.is_good());
        assert_eq!(item.timestamp.timestamp(), 0);

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["value"], serde_json::Value::Null);
        assert_eq!(json["quality"], 0);
    }

    #[test]
    fn test_item_roundtrip_json() {
        let item = Item::new(1.5, Quality::Good, Utc::now());
        let json = serde_json::to_string(&item).unwrap();
        let back: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
        assert!(!back.is_empty());
    }
}
