//! Runtime Value Representation
//!
//! A register holds exactly one of these. Strings are owned byte buffers, so
//! overwriting or dropping a register releases its text.

use std::fmt;

/// Runtime value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Signed integer
    Number(i32),

    /// Owned text; raw bytes, not necessarily UTF-8
    String(Vec<u8>),
}

impl Value {
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn as_number(&self) -> Option<i32> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::String(s) => Some(s),
            Value::Number(_) => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Number(0)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.as_bytes().to_vec())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", String::from_utf8_lossy(s)),
        }
    }
}
