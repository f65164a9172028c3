use std::fmt;

use serde::Serialize;
use serde_json::{Number, Value};
use uuid::Uuid;

/// An identifier established by the client for a JSON-RPC request.
/// Can be a string, a number, or null.
///
/// Numbers keep their wire form: `4.0` stays `4.0` and ids beyond the `i64`
/// range stay intact, so a response echoes the id exactly as it was sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(Number),
    Null,
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::String(s) => write!(f, "{}", s),
            RequestId::Number(n) => write!(f, "{}", n),
            RequestId::Null => write!(f, "null"),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n.into())
    }
}

impl From<i32> for RequestId {
    fn from(n: i32) -> Self {
        RequestId::Number(n.into())
    }
}

impl From<u64> for RequestId {
    fn from(n: u64) -> Self {
        RequestId::Number(n.into())
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::String(s)
    }
}

impl RequestId {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RequestId::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RequestId::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RequestId::Null)
    }

    /// Read an id from a JSON value, keeping numbers in their wire form.
    ///
    /// Returns `None` for booleans, arrays and objects. Whether a number or
    /// string is acceptable as the id of a new call is decided by
    /// [`IdSpec`], so a rejected id can still be echoed in the error.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(RequestId::Null),
            Value::String(s) => Some(RequestId::String(s.clone())),
            Value::Number(n) => Some(RequestId::Number(n.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RequestId::String(s) => Value::String(s.clone()),
            RequestId::Number(n) => Value::Number(n.clone()),
            RequestId::Null => Value::Null,
        }
    }

    /// A number with a non-zero fractional part, or a string reading as one
    fn is_fractional(&self) -> bool {
        match self {
            RequestId::Number(n) => n.is_f64() && n.as_f64().is_some_and(|f| f.fract() != 0.0),
            RequestId::String(s) => looks_fractional(s),
            RequestId::Null => false,
        }
    }
}

/// How a new call obtains its id.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum IdSpec {
    /// Assign a fresh opaque token
    #[default]
    Generate,
    /// No id at all; the call never receives a response
    Notification,
    /// Use the given value, subject to validation
    Explicit(Value),
}

impl IdSpec {
    /// Resolve into an [`Identifier`].
    ///
    /// On rejection the error carries the attempted id when it is expressible
    /// as a [`RequestId`], so the resulting error response stays addressable.
    pub(crate) fn resolve(self) -> Result<Identifier, Option<RequestId>> {
        match self {
            IdSpec::Generate => Ok(Identifier::generate()),
            IdSpec::Notification => Ok(Identifier::Notification),
            IdSpec::Explicit(value) => {
                let id = RequestId::from_value(&value).ok_or(None)?;
                if id.is_fractional() {
                    return Err(Some(id));
                }
                Ok(Identifier::Explicit(id))
            }
        }
    }
}

/// A string id that reads as a number must read as an integral one.
fn looks_fractional(s: &str) -> bool {
    match s.trim().parse::<f64>() {
        Ok(f) => !(f.is_finite() && f.fract() == 0.0),
        Err(_) => false,
    }
}

impl From<i64> for IdSpec {
    fn from(n: i64) -> Self {
        IdSpec::Explicit(Value::from(n))
    }
}

impl From<i32> for IdSpec {
    fn from(n: i32) -> Self {
        IdSpec::Explicit(Value::from(n))
    }
}

impl From<u64> for IdSpec {
    fn from(n: u64) -> Self {
        IdSpec::Explicit(Value::from(n))
    }
}

impl From<f64> for IdSpec {
    fn from(f: f64) -> Self {
        IdSpec::Explicit(Value::from(f))
    }
}

impl From<&str> for IdSpec {
    fn from(s: &str) -> Self {
        IdSpec::Explicit(Value::String(s.to_string()))
    }
}

impl From<String> for IdSpec {
    fn from(s: String) -> Self {
        IdSpec::Explicit(Value::String(s))
    }
}

impl From<RequestId> for IdSpec {
    fn from(id: RequestId) -> Self {
        IdSpec::Explicit(id.to_value())
    }
}

impl From<Value> for IdSpec {
    fn from(value: Value) -> Self {
        IdSpec::Explicit(value)
    }
}

/// The resolved id classification of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Notification,
    Explicit(RequestId),
    AutoGenerated(String),
}

impl Identifier {
    fn generate() -> Self {
        Identifier::AutoGenerated(Uuid::new_v4().simple().to_string())
    }

    pub fn is_notification(&self) -> bool {
        matches!(self, Identifier::Notification)
    }

    /// The id as it appears on the wire; `None` for notifications
    pub fn wire_id(&self) -> Option<RequestId> {
        match self {
            Identifier::Notification => None,
            Identifier::Explicit(id) => Some(id.clone()),
            Identifier::AutoGenerated(token) => Some(RequestId::String(token.clone())),
        }
    }
}

/// JSON-RPC version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonRpcVersion {
    V2_0,
}

impl JsonRpcVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonRpcVersion::V2_0 => "2.0",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "2.0" => Some(JsonRpcVersion::V2_0),
            _ => None,
        }
    }
}

impl Default for JsonRpcVersion {
    fn default() -> Self {
        JsonRpcVersion::V2_0
    }
}

impl fmt::Display for JsonRpcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for JsonRpcVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
