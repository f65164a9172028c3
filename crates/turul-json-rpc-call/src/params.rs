use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    String(String),
    Integer(i64),
    Float(f64),
}

impl Scalar {
    /// Read a scalar from JSON; `None` for anything else
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Scalar::String(s.clone())),
            Value::Number(n) if n.is_f64() => n.as_f64().map(Scalar::Float),
            Value::Number(n) => n.as_i64().map(Scalar::Integer),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Scalar::String(s) => Value::String(s.clone()),
            Scalar::Integer(i) => Value::from(*i),
            // non-finite floats have no JSON form and become null
            Scalar::Float(f) => Value::from(*f),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value, widening integers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Integer(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::String(_) => None,
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::Integer(i)
    }
}

impl From<i32> for Scalar {
    fn from(i: i32) -> Self {
        Scalar::Integer(i64::from(i))
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Scalar::Float(f)
    }
}

/// Why a params value was refused
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    #[error("params must be an array or an object, got a bare string")]
    BareString,

    #[error("params must be an array or an object")]
    NotStructured,

    #[error("named parameter '{0}' is not a string or number")]
    NonScalarValue(String),

    #[error("positional parameter {0} is not a string or number")]
    NonScalarElement(usize),
}

/// Parameters for a JSON-RPC call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Params {
    /// Positional parameters as an array
    Positional(Vec<Scalar>),
    /// Named parameters as an object, in insertion order
    Named(IndexMap<String, Scalar>),
}

impl Params {
    /// Get a parameter by name (for named params only)
    pub fn get(&self, key: &str) -> Option<&Scalar> {
        match self {
            Params::Named(map) => map.get(key),
            Params::Positional(_) => None,
        }
    }

    /// Get a parameter by index (for positional params only)
    pub fn get_index(&self, index: usize) -> Option<&Scalar> {
        match self {
            Params::Positional(vec) => vec.get(index),
            Params::Named(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Params::Named(map) => map.len(),
            Params::Positional(vec) => vec.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Params::Named(_))
    }

    pub fn to_value(&self) -> Value {
        match self {
            Params::Named(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
            Params::Positional(vec) => Value::Array(vec.iter().map(Scalar::to_value).collect()),
        }
    }
}

impl TryFrom<Value> for Params {
    type Error = ParamsError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => map
                .into_iter()
                .map(|(key, value)| match Scalar::from_value(&value) {
                    Some(scalar) => Ok((key, scalar)),
                    None => Err(ParamsError::NonScalarValue(key)),
                })
                .collect::<Result<IndexMap<_, _>, _>>()
                .map(Params::Named),
            Value::Array(vec) => vec
                .iter()
                .enumerate()
                .map(|(index, value)| {
                    Scalar::from_value(value).ok_or(ParamsError::NonScalarElement(index))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Params::Positional),
            Value::String(_) => Err(ParamsError::BareString),
            _ => Err(ParamsError::NotStructured),
        }
    }
}

impl From<IndexMap<String, Scalar>> for Params {
    fn from(map: IndexMap<String, Scalar>) -> Self {
        Params::Named(map)
    }
}

impl From<Vec<Scalar>> for Params {
    fn from(vec: Vec<Scalar>) -> Self {
        Params::Positional(vec)
    }
}
