//! Option types, typed option values and primitive value conversion.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::IntErrorKind;
use thiserror::Error;

/// The declared type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Free-form text, zero value `""`.
    String,
    /// A switch, zero value `false`.
    Bool,
    /// A signed 64-bit integer, zero value `0`.
    Int,
}

impl OptionType {
    /// The value an option of this type holds when it declares no default.
    pub fn zero_value(self) -> OptionValue {
        match self {
            OptionType::String => OptionValue::String(String::new()),
            OptionType::Bool => OptionValue::Bool(false),
            OptionType::Int => OptionValue::Int(0),
        }
    }

    /// Placeholder shown for the option's value in usage text.
    pub fn value_name(self) -> &'static str {
        match self {
            OptionType::String => "STRING",
            OptionType::Bool => "BOOL",
            OptionType::Int => "INT",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionType::String => "string",
            OptionType::Bool => "bool",
            OptionType::Int => "int",
        };
        f.write_str(name)
    }
}

/// A typed option value.
///
/// The variant is fixed when the option is declared. The `as_*` readers
/// panic when asked for a different type: that is a mismatch between the
/// declaration and the code reading it, not something a user can cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    String(String),
    Bool(bool),
    Int(i64),
}

impl OptionValue {
    /// The type this value was registered with.
    pub fn option_type(&self) -> OptionType {
        match self {
            OptionValue::String(_) => OptionType::String,
            OptionValue::Bool(_) => OptionType::Bool,
            OptionValue::Int(_) => OptionType::Int,
        }
    }

    /// Read a bool value.
    ///
    /// # Panics
    ///
    /// Panics if the value is not a bool.
    pub fn as_bool(&self) -> bool {
        match self {
            OptionValue::Bool(value) => *value,
            other => other.mismatch(OptionType::Bool),
        }
    }

    /// Read an int value.
    ///
    /// # Panics
    ///
    /// Panics if the value is not an int.
    pub fn as_int(&self) -> i64 {
        match self {
            OptionValue::Int(value) => *value,
            other => other.mismatch(OptionType::Int),
        }
    }

    /// Read a string value.
    ///
    /// # Panics
    ///
    /// Panics if the value is not a string.
    pub fn as_str(&self) -> &str {
        match self {
            OptionValue::String(value) => value.as_str(),
            other => other.mismatch(OptionType::String),
        }
    }

    fn mismatch(&self, requested: OptionType) -> ! {
        panic!(
            "option value {:?} is registered as {}, cannot be read as {}",
            self,
            self.option_type(),
            requested
        )
    }

    /// Parse `text` as a value of the same type as `self`.
    pub(crate) fn parse_as(&self, text: &str) -> Result<OptionValue, ValueError> {
        match self.option_type() {
            OptionType::String => Ok(OptionValue::String(text.to_string())),
            OptionType::Bool => parse_bool(text).map(OptionValue::Bool),
            OptionType::Int => parse_int(text).map(OptionValue::Int),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::String(value) => f.write_str(value),
            OptionValue::Bool(value) => write!(f, "{}", value),
            OptionValue::Int(value) => write!(f, "{}", value),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Int(i64::from(value))
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::String(value)
    }
}

/// Why a piece of text could not be converted to a bool or an int.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("invalid syntax")]
    InvalidSyntax,

    #[error("value out of range")]
    OutOfRange,
}

/// Parse a bool the way flag values are usually spelled.
pub(crate) fn parse_bool(text: &str) -> Result<bool, ValueError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ValueError::InvalidSyntax),
    }
}

/// Parse a signed 64-bit integer.
///
/// Accepts an optional sign, `0x`/`0o`/`0b` prefixes, a leading `0` for
/// octal and `_` between digits.
pub(crate) fn parse_int(text: &str) -> Result<i64, ValueError> {
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits, prefixed) = split_radix(body);
    let cleaned = strip_separators(digits, prefixed).ok_or(ValueError::InvalidSyntax)?;

    // from_str_radix accepts its own sign, which would let "-+1" through
    if !cleaned.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return Err(ValueError::InvalidSyntax);
    }

    let magnitude = u64::from_str_radix(&cleaned, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => ValueError::OutOfRange,
        _ => ValueError::InvalidSyntax,
    })?;

    if negative {
        if magnitude == i64::MIN.unsigned_abs() {
            return Ok(i64::MIN);
        }
        i64::try_from(magnitude)
            .map(|v| -v)
            .map_err(|_| ValueError::OutOfRange)
    } else {
        i64::try_from(magnitude).map_err(|_| ValueError::OutOfRange)
    }
}

/// Split a base prefix off an unsigned number.
///
/// Returns the radix, the remaining digits and whether a prefix was present.
fn split_radix(body: &str) -> (u32, &str, bool) {
    let bytes = body.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'0' {
        return match bytes[1].to_ascii_lowercase() {
            b'x' => (16, &body[2..], true),
            b'o' => (8, &body[2..], true),
            b'b' => (2, &body[2..], true),
            _ => (8, &body[1..], true),
        };
    }
    (10, body, false)
}

/// Remove `_` separators, rejecting any that do not sit between digits.
fn strip_separators(digits: &str, prefixed: bool) -> Option<String> {
    let mut cleaned = String::with_capacity(digits.len());
    let mut after_digit = prefixed;
    let mut trailing_underscore = false;

    for c in digits.chars() {
        if c == '_' {
            if !after_digit {
                return None;
            }
            after_digit = false;
            trailing_underscore = true;
        } else {
            cleaned.push(c);
            after_digit = true;
            trailing_underscore = false;
        }
    }

    if trailing_underscore {
        None
    } else {
        Some(cleaned)
    }
}
