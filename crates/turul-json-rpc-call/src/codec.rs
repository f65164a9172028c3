//! Wire codec shared by calls and errors.
//!
//! Output is compact JSON with non-ASCII characters written literally. The
//! envelope structs fix the key order of the recognized members; user data
//! keeps its own insertion order.

use serde::Serialize;
use serde_json::Value;

use crate::JSONRPC_VERSION;
use crate::error::CallError;
use crate::params::Params;
use crate::types::{JsonRpcVersion, RequestId};

/// Byte encoding for serialized messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl Encoding {
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Encoding::Utf8 => text.as_bytes().to_vec(),
            Encoding::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            Encoding::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        }
    }
}

/// `{jsonrpc, method, params?, id?}`
#[derive(Debug, Serialize)]
pub(crate) struct RequestEnvelope<'a> {
    pub jsonrpc: &'a JsonRpcVersion,
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<&'a Params>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a RequestId>,
}

/// `{code, message, data?}`
#[derive(Debug, Serialize)]
pub(crate) struct ErrorObject<'a> {
    pub code: i64,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a Value>,
}

/// `{jsonrpc, result | error, id}`
#[derive(Debug, Serialize)]
pub(crate) struct ResponseEnvelope<'a> {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorObject<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a RequestId>,
}

impl<'a> ResponseEnvelope<'a> {
    pub fn result(result: &'a Value, id: Option<&'a RequestId>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(error: ErrorObject<'a>, id: Option<&'a RequestId>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result: None,
            error: Some(error),
            id,
        }
    }
}

pub(crate) fn to_text<T: Serialize>(message: &T) -> Result<String, CallError> {
    Ok(serde_json::to_string(message)?)
}
