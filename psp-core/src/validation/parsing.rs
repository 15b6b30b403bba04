//! Parameter string decoding
//!
//! Component headers embed parameters as `key=value` entries separated by
//! commas. Values are typed by shape: integers first, then floats, and
//! everything else is kept as text. Decoding never fails.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use crate::format::constants::PARAM_SEPARATOR;

/// Typed parameter value
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
}

/// Decoded parameters, keyed by name
pub type Parameters = BTreeMap<String, ParamValue>;

impl ParamValue {
    /// Infer the type of a trimmed value string
    pub fn infer(value: &str) -> Self {
        if is_integer(value) {
            if let Ok(v) = value.parse::<i64>() {
                return ParamValue::Int(v);
            }
        }
        if is_float(value) {
            if let Ok(v) = value.parse::<f64>() {
                return ParamValue::Float(v);
            }
        }
        ParamValue::Str(value.to_string())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value, widening integers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Float(v) => Some(*v),
            ParamValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Interpret the value as a flag
    ///
    /// Integers are true when non-zero. Text accepts `true`/`false`,
    /// `yes`/`no` and `t`/`f` in any case.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Int(v) => Some(*v != 0),
            ParamValue::Float(_) => None,
            ParamValue::Str(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "yes" | "t" => Some(true),
                "false" | "no" | "f" => Some(false),
                _ => None,
            },
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            // Debug keeps a decimal point or exponent so the value reads back as a float
            ParamValue::Float(v) => write!(f, "{v:?}"),
            ParamValue::Str(v) => f.write_str(v),
        }
    }
}

/// Decode a comma separated `key=value` blob
///
/// Keys and values are trimmed. The value is everything after the first
/// `=`. A later duplicate key replaces the earlier one. An entry with no
/// `=` is kept as a flag whose value is the empty string. Empty entries and
/// entries with an empty key are dropped.
pub fn decode_parameters(blob: &str) -> Parameters {
    let mut params = Parameters::new();
    for entry in blob.split(PARAM_SEPARATOR) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        match entry.split_once('=') {
            Some((key, value)) => {
                let key = key.trim();
                if key.is_empty() {
                    continue;
                }
                params.insert(key.to_string(), ParamValue::infer(value.trim()));
            }
            None => {
                params.insert(entry.to_string(), ParamValue::Str(String::new()));
            }
        }
    }
    params
}

/// Render parameters back into a blob accepted by [`decode_parameters`]
pub fn encode_parameters(params: &Parameters) -> String {
    params
        .iter()
        .map(|(key, value)| match value {
            ParamValue::Str(s) if s.is_empty() => key.clone(),
            _ => format!("{key}={value}"),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Optional sign followed by one or more digits
fn is_integer(s: &str) -> bool {
    let digits = strip_sign(s.as_bytes());
    !digits.is_empty() && digits.iter().all(u8::is_ascii_digit)
}

/// Optional sign, digits with an optional decimal point, optional exponent
///
/// At least one mantissa digit is required, so `.`, `e5` and `inf` are
/// not floats.
fn is_float(s: &str) -> bool {
    let bytes = strip_sign(s.as_bytes());
    let mut i = 0;
    let mut mantissa_digits = 0;

    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        mantissa_digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            mantissa_digits += 1;
        }
    }
    if mantissa_digits == 0 {
        return false;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let exponent = strip_sign(&bytes[i + 1..]);
        return !exponent.is_empty() && exponent.iter().all(u8::is_ascii_digit);
    }
    i == bytes.len()
}

fn strip_sign(bytes: &[u8]) -> &[u8] {
    match bytes.first() {
        Some(b'+') | Some(b'-') => &bytes[1..],
        _ => bytes,
    }
}
