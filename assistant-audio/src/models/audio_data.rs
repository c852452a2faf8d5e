//! Tempo and key values exchanged with the analysis backend

use serde::{Deserialize, Serialize};
use std::fmt;

/// A BPM value as it was encountered
///
/// Tag storage keeps tempo as text while the backend reports a JSON number.
/// The variant is preserved so that strict comparisons can tell `"128"`
/// apart from `128`, while [`BpmValue::as_tag_text`] gives the common string
/// form used for loose comparisons and for writing tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BpmValue {
    /// Whole number (JSON integer)
    Integer(i64),
    /// Fractional number (JSON float)
    Float(f64),
    /// Text as stored in a tag frame
    Text(String),
}

impl BpmValue {
    /// String form of the value
    ///
    /// Floats without a fractional part render without a decimal point,
    /// so `128.0` and `128` share the form `"128"`.
    pub fn as_tag_text(&self) -> String {
        match self {
            BpmValue::Integer(value) => value.to_string(),
            BpmValue::Float(value) => {
                if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                    (*value as i64).to_string()
                } else {
                    value.to_string()
                }
            }
            BpmValue::Text(text) => text.clone(),
        }
    }
}

impl fmt::Display for BpmValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_tag_text())
    }
}

impl From<i64> for BpmValue {
    fn from(value: i64) -> Self {
        BpmValue::Integer(value)
    }
}

impl From<i32> for BpmValue {
    fn from(value: i32) -> Self {
        BpmValue::Integer(i64::from(value))
    }
}

impl From<f64> for BpmValue {
    fn from(value: f64) -> Self {
        BpmValue::Float(value)
    }
}

impl From<&str> for BpmValue {
    fn from(value: &str) -> Self {
        BpmValue::Text(value.to_string())
    }
}

/// Tempo and key computed by the analysis backend for one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioData {
    /// Beats per minute
    pub bpm: BpmValue,
    /// Musical key, usually in Camelot notation (e.g. "8A")
    pub initial_key: String,
}

impl AudioData {
    pub fn new(bpm: impl Into<BpmValue>, initial_key: impl Into<String>) -> Self {
        Self {
            bpm: bpm.into(),
            initial_key: initial_key.into(),
        }
    }
}
