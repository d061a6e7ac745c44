//! Dynamic story values and their loose coercion rules.
//!
//! Script variables hold a string, a number or a boolean. Arithmetic and
//! comparisons coerce across those types the permissive way story authors
//! expect: `"5" == 5` holds, `true + 1` is `2`, and `"a" + 1` concatenates.

use std::cmp::Ordering;
use std::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Num(f64),
    Str(String),
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Num(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
        }
    }

    /// Numeric view of the value; unparsable strings become NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Bool(true) => 1.0,
            Value::Bool(false) => 0.0,
            Value::Num(n) => *n,
            Value::Str(s) => parse_number(s).unwrap_or(f64::NAN),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// `+` concatenates as soon as either side is a string.
    pub fn add(&self, rhs: &Value) -> Value {
        match (self, rhs) {
            (Value::Str(_), _) | (_, Value::Str(_)) => Value::Str(format!("{}{}", self, rhs)),
            _ => Value::Num(self.to_number() + rhs.to_number()),
        }
    }

    pub fn sub(&self, rhs: &Value) -> Value {
        Value::Num(self.to_number() - rhs.to_number())
    }

    pub fn mul(&self, rhs: &Value) -> Value {
        Value::Num(self.to_number() * rhs.to_number())
    }

    pub fn div(&self, rhs: &Value) -> Value {
        Value::Num(self.to_number() / rhs.to_number())
    }

    /// Equality with cross-type coercion through numbers.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            _ => self.to_number() == other.to_number(),
        }
    }

    /// Two strings order lexically, anything else orders numerically.
    /// `None` when either side is NaN.
    pub fn loose_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            _ => self.to_number().partial_cmp(&other.to_number()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => f.write_str(s),
            Value::Num(n) => f.write_str(&format_number(*n)),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".into()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".into() } else { "-Infinity".into() }
    } else if n == 0.0 {
        "0".into()
    } else {
        n.to_string()
    }
}

/// Reads a numeric literal. Surrounding whitespace is ignored and a blank
/// string counts as zero; `Infinity` and unsigned `0x`/`0o`/`0b` forms are
/// accepted.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0.0);
    }

    let (sign, body) = match text.as_bytes()[0] {
        b'-' => (-1.0, &text[1..]),
        b'+' => (1.0, &text[1..]),
        _ => (1.0, text),
    };
    if body.starts_with(['+', '-']) || body.is_empty() {
        return None;
    }
    if body == "Infinity" {
        return Some(sign * f64::INFINITY);
    }

    if body.len() > 2 && body.as_bytes()[0] == b'0' {
        let radix = match body.as_bytes()[1] {
            b'x' | b'X' => Some(16),
            b'o' | b'O' => Some(8),
            b'b' | b'B' => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            // signed radix literals are not numbers
            if body.len() != text.len() {
                return None;
            }
            return body[2..].chars().try_fold(0f64, |acc, c| {
                c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
            });
        }
    }

    if !body.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')) {
        return None;
    }
    body.parse::<f64>().ok().map(|n| sign * n)
}
