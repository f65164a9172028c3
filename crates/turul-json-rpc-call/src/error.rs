use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::codec::{self, Encoding, ErrorObject, ResponseEnvelope};
use crate::error_codes::{
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};
use crate::registry::{ErrorRegistry, SERVER_ERROR_RANGE};
use crate::types::RequestId;

/// JSON-RPC error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    ServerError(i64), // -32099 to -32000
    Application(i64),
}

impl JsonRpcErrorCode {
    pub fn from_code(code: i64) -> Self {
        match code {
            PARSE_ERROR => JsonRpcErrorCode::ParseError,
            INVALID_REQUEST => JsonRpcErrorCode::InvalidRequest,
            METHOD_NOT_FOUND => JsonRpcErrorCode::MethodNotFound,
            INVALID_PARAMS => JsonRpcErrorCode::InvalidParams,
            INTERNAL_ERROR => JsonRpcErrorCode::InternalError,
            code if SERVER_ERROR_RANGE.contains(&code) => JsonRpcErrorCode::ServerError(code),
            code => JsonRpcErrorCode::Application(code),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            JsonRpcErrorCode::ParseError => PARSE_ERROR,
            JsonRpcErrorCode::InvalidRequest => INVALID_REQUEST,
            JsonRpcErrorCode::MethodNotFound => METHOD_NOT_FOUND,
            JsonRpcErrorCode::InvalidParams => INVALID_PARAMS,
            JsonRpcErrorCode::InternalError => INTERNAL_ERROR,
            JsonRpcErrorCode::ServerError(code) | JsonRpcErrorCode::Application(code) => *code,
        }
    }

    /// Message fixed by the protocol; `None` outside the builtin tier
    pub fn builtin_message(&self) -> Option<&'static str> {
        match self {
            JsonRpcErrorCode::ParseError => Some("Parse error"),
            JsonRpcErrorCode::InvalidRequest => Some("Invalid Request"),
            JsonRpcErrorCode::MethodNotFound => Some("Method not found"),
            JsonRpcErrorCode::InvalidParams => Some("Invalid params"),
            JsonRpcErrorCode::InternalError => Some("Internal error"),
            JsonRpcErrorCode::ServerError(_) | JsonRpcErrorCode::Application(_) => None,
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin_message().is_some()
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.builtin_message() {
            Some(message) => write!(f, "{}: {}", self.code(), message),
            None => write!(f, "{}", self.code()),
        }
    }
}

/// A JSON-RPC error: code, message, optional data, and the id of the call it answers.
///
/// The message of a registered code is always the registered one; see
/// [`ErrorRegistry`]. Two errors are equal when their fields match and they
/// serialize to the same bytes.
#[derive(Debug, Clone)]
pub struct RpcError {
    code: i64,
    message: String,
    data: Option<Value>,
    id: Option<RequestId>,
}

impl RpcError {
    /// An error for a registered code, resolved through the global registry
    pub fn new(code: i64) -> Result<Self, CallError> {
        Self::new_in(ErrorRegistry::global(), code, None)
    }

    /// An error with a caller-supplied message.
    ///
    /// For registered codes the message must match the registered one; for
    /// any other code it becomes this error's message.
    pub fn with_message(code: i64, message: impl Into<String>) -> Result<Self, CallError> {
        Self::new_in(ErrorRegistry::global(), code, Some(message.into()))
    }

    pub fn new_in(
        registry: &ErrorRegistry,
        code: i64,
        message: Option<String>,
    ) -> Result<Self, CallError> {
        // an empty message is no message
        let supplied = message.filter(|m| !m.is_empty());
        let message = match (registry.lookup(code), supplied) {
            (Some(registered), Some(supplied)) if registered != supplied => {
                return Err(CallError::MessageConflict {
                    code,
                    registered,
                    supplied,
                });
            }
            (Some(registered), _) => registered,
            (None, Some(supplied)) => supplied,
            (None, None) => return Err(CallError::MissingMessage { code }),
        };

        Ok(Self {
            code,
            message,
            data: None,
            id: None,
        })
    }

    fn builtin(kind: JsonRpcErrorCode, id: Option<RequestId>) -> Self {
        Self {
            code: kind.code(),
            message: kind.builtin_message().unwrap_or_default().to_string(),
            data: None,
            id,
        }
    }

    /// Parse error; the id of unparseable input is never known
    pub fn parse_error() -> Self {
        Self::builtin(JsonRpcErrorCode::ParseError, None)
    }

    pub fn invalid_request(id: Option<RequestId>) -> Self {
        Self::builtin(JsonRpcErrorCode::InvalidRequest, id)
    }

    pub fn method_not_found(id: Option<RequestId>) -> Self {
        Self::builtin(JsonRpcErrorCode::MethodNotFound, id)
    }

    pub fn invalid_params(id: Option<RequestId>) -> Self {
        Self::builtin(JsonRpcErrorCode::InvalidParams, id)
    }

    pub fn internal_error(id: Option<RequestId>) -> Self {
        Self::builtin(JsonRpcErrorCode::InternalError, id)
    }

    /// Rebuild an error from the `error` member of a response.
    pub(crate) fn from_wire(value: &Value, id: Option<RequestId>) -> Result<Self, CallError> {
        let object = value
            .as_object()
            .ok_or_else(|| CallError::MalformedResponse("error member is not an object".into()))?;

        let code = match object.get("code") {
            Some(code) => code
                .as_i64()
                .ok_or_else(|| CallError::NonIntegerCode(code.clone()))?,
            None => return Err(CallError::MalformedResponse("error has no code".into())),
        };
        let message = match object.get("message") {
            Some(Value::String(message)) => Some(message.clone()),
            None | Some(Value::Null) => None,
            Some(other) => {
                return Err(CallError::MalformedResponse(format!(
                    "error message is not a string: {}",
                    other
                )));
            }
        };

        let mut error = Self::new_in(ErrorRegistry::global(), code, message)?;
        error.data = object.get("data").filter(|data| !data.is_null()).cloned();
        error.id = id;
        Ok(error)
    }

    /// Attach data; `null` counts as no data and is never sent
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data).filter(|data| !data.is_null());
        self
    }

    /// Tag the error with the id of the call it answers
    pub fn with_id(mut self, id: Option<RequestId>) -> Self {
        self.id = id;
        self
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Correlation id; `None` serializes as `null`
    pub fn id(&self) -> Option<&RequestId> {
        self.id.as_ref()
    }

    pub fn kind(&self) -> JsonRpcErrorCode {
        JsonRpcErrorCode::from_code(self.code)
    }

    pub(crate) fn object(&self) -> ErrorObject<'_> {
        ErrorObject {
            code: self.code,
            message: &self.message,
            data: self.data.as_ref(),
        }
    }

    /// The error object: `{code, message, data}` with `data` omitted when absent
    pub fn values(&self) -> Value {
        let mut object = Map::new();
        object.insert("code".to_string(), Value::from(self.code));
        object.insert("message".to_string(), Value::String(self.message.clone()));
        if let Some(data) = &self.data {
            object.insert("data".to_string(), data.clone());
        }
        Value::Object(object)
    }

    /// The full error response as JSON text
    pub fn response(&self) -> Result<String, CallError> {
        let null = RequestId::Null;
        codec::to_text(&ResponseEnvelope::error(
            self.object(),
            Some(self.id.as_ref().unwrap_or(&null)),
        ))
    }

    pub fn response_bytes(&self, encoding: Encoding) -> Result<Vec<u8>, CallError> {
        Ok(encoding.encode(&self.response()?))
    }
}

impl PartialEq for RpcError {
    fn eq(&self, other: &Self) -> bool {
        if self.code != other.code || self.message != other.message || self.data != other.data {
            debug!(code = self.code, other_code = other.code, "Errors differ in fields");
            return false;
        }
        match (self.response(), other.response()) {
            (Ok(a), Ok(b)) if a == b => true,
            _ => {
                debug!(code = self.code, "Errors differ in serialized response");
                false
            }
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [code {}]", self.message, self.code)
    }
}

impl std::error::Error for RpcError {}

/// Failures returned by call construction, state transitions and serialization
#[derive(Debug, Error)]
pub enum CallError {
    /// A protocol error: a rejected call, or an error received from the peer
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("batch calls not implemented")]
    BatchUnsupported,

    #[error("cannot set {operation} on a notification")]
    NotificationOutcome { operation: &'static str },

    #[error("notifications have no response")]
    NotificationResponse,

    #[error("no result or error has been set")]
    NoOutcome,

    #[error("result or error has already been set")]
    OutcomeAlreadySet,

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("error code must be an integer, got {0}")]
    NonIntegerCode(Value),

    #[error("inconsistent message for error code {code}: expected '{registered}', got '{supplied}'")]
    MessageConflict {
        code: i64,
        registered: String,
        supplied: String,
    },

    #[error("no message available for error code {code}")]
    MissingMessage { code: i64 },

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CallError {
    /// The protocol error carried by this failure, if any
    pub fn rpc_error(&self) -> Option<&RpcError> {
        match self {
            CallError::Rpc(error) => Some(error),
            _ => None,
        }
    }
}
