//! Field value types and formats

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A polymorphic value carried by a form field change
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as a number, parsing text inputs
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Get the value as a boolean, accepting checkbox-style text
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            FieldValue::String(s) => match s.as_str() {
                "true" | "on" => Some(true),
                "false" | "off" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Get the value as a list of names
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the carried type, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::String(_) => "string",
            FieldValue::List(_) => "list",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

/// Text formats checked by the local schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    /// Indian Financial System Code: 4 letters, a zero, 6 alphanumerics
    Ifsc,
    /// UPI virtual payment address (`handle@provider`)
    UpiHandle,
}

impl FieldFormat {
    pub fn is_valid(&self, value: &str) -> bool {
        self.regex().is_match(value)
    }

    pub fn regex(&self) -> &'static Regex {
        match self {
            FieldFormat::Ifsc => ifsc_regex(),
            FieldFormat::UpiHandle => upi_handle_regex(),
        }
    }
}

/// Compiled on first use and shared for the life of the process
pub(crate) fn ifsc_regex() -> &'static Regex {
    static IFSC_REGEX: OnceLock<Regex> = OnceLock::new();
    IFSC_REGEX.get_or_init(|| {
        // Four bank letters, a literal 0, then six branch characters
        Regex::new(r"^[A-Z]{4}0[A-Z0-9]{6}$").expect("IFSC pattern is a valid regex")
    })
}

pub(crate) fn upi_handle_regex() -> &'static Regex {
    static UPI_REGEX: OnceLock<Regex> = OnceLock::new();
    UPI_REGEX.get_or_init(|| {
        // handle@psp: 2-256 handle characters, 2-64 letter provider
        Regex::new(r"^[a-zA-Z0-9.\-_]{2,256}@[a-zA-Z]{2,64}$")
            .expect("UPI handle pattern is a valid regex")
    })
}
