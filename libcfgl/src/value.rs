//! CFGL value representation.

use indexmap::IndexMap;
use std::fmt;

/// Ordered key/value storage for CFGL mappings.
pub type Mapping = IndexMap<String, Value>;

/// A CFGL value.
#[derive(Clone, PartialEq)]
pub enum Value {
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit floating-point number.
    Float(f64),
    /// Raw text between `[[` and `]]`.
    Text(String),
    /// Mapping in insertion order.
    Mapping(Mapping),
}

impl Value {
    /// An empty mapping.
    pub fn empty_mapping() -> Self {
        Value::Mapping(Mapping::new())
    }

    /// Returns the integer value if this is an `Integer`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the float value if this is a `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns a reference to the text if this is `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a reference to the entries if this is a `Mapping`.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Mapping(_))
    }

    /// Look up `key` if this is a `Mapping`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Short name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Mapping(_) => "mapping",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => {
                if n.is_finite() && n.fract() == 0.0 {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Text(s) => write!(f, "{:?}", s),
            Value::Mapping(map) => f.debug_map().entries(map).finish(),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Value::Mapping(map)
    }
}
