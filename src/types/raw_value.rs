use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric-like field as emitted by the backend: JSON number or text
/// such as `"12 200"` or `"12,5"`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawAmount {
    Number(serde_json::Number),
    Text(String),
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        RawAmount::Text(value.to_owned())
    }
}

impl From<i64> for RawAmount {
    fn from(value: i64) -> Self {
        RawAmount::Number(value.into())
    }
}

impl fmt::Display for RawAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawAmount::Number(n) => write!(f, "{}", n),
            RawAmount::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Identifier that is numeric on some endpoints and a string (uuid or
/// digits) on others.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum RawId {
    Int(i64),
    Text(String),
}

impl RawId {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RawId::Int(v) => Some(*v),
            RawId::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Int(v) => write!(f, "{}", v),
            RawId::Text(s) => write!(f, "{}", s),
        }
    }
}
