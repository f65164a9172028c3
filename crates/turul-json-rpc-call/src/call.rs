//! The call object: one JSON-RPC request and, once resolved, its response.
//!
//! An [`RpcCall`] is validated when it is created and never exists in a
//! partially valid state. Afterwards only its [`Outcome`] changes, once,
//! from `Pending` to `Resolved` or `Errored`. Notifications have no outcome
//! transitions and never produce a response.

use std::fmt;
use std::mem;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::codec::{self, Encoding, RequestEnvelope, ResponseEnvelope};
use crate::error::{CallError, RpcError};
use crate::params::{Params, Scalar};
use crate::types::{IdSpec, Identifier, JsonRpcVersion, RequestId};
use crate::{JSONRPC_VERSION, RESERVED_METHOD_PREFIX};

/// State of a call with respect to its response
#[derive(Debug, Clone, Default)]
pub enum Outcome {
    #[default]
    Pending,
    Resolved(Value),
    Errored(RpcError),
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Pending)
    }
}

/// The raw members of a call before validation
struct RawCall {
    jsonrpc: Option<Value>,
    method: Option<Value>,
    params: Option<Value>,
    id: IdSpec,
}

/// A JSON-RPC call
#[derive(Debug, Clone)]
pub struct RpcCall {
    version: JsonRpcVersion,
    method: String,
    params: Option<Params>,
    id: Identifier,
    outcome: Outcome,
}

impl RpcCall {
    /// Create a call and validate it.
    ///
    /// Fails with `Invalid Request` for a bad id or method and with
    /// `Invalid params` for params that do not serialize to scalars.
    pub fn new(
        method: impl Into<String>,
        params: Option<Params>,
        id: impl Into<IdSpec>,
    ) -> Result<Self, RpcError> {
        Self::clean(RawCall {
            jsonrpc: Some(Value::String(JSONRPC_VERSION.to_string())),
            method: Some(Value::String(method.into())),
            params: params.map(|params| params.to_value()),
            id: id.into(),
        })
    }

    /// Start building a call; the id is generated unless set otherwise
    pub fn builder(method: impl Into<String>) -> RpcCallBuilder {
        RpcCallBuilder::new(method)
    }

    fn clean(raw: RawCall) -> Result<Self, RpcError> {
        let id = raw.id.resolve().map_err(|attempted| {
            debug!(id = ?attempted, "Rejected call id");
            RpcError::invalid_request(attempted)
        })?;
        let known = id.wire_id();

        // wire requests must carry "2.0"; only `from_url` supplies the default
        let version = match &raw.jsonrpc {
            Some(Value::String(version)) => JsonRpcVersion::parse(version),
            _ => None,
        }
        .ok_or_else(|| {
            debug!(jsonrpc = ?raw.jsonrpc, "Rejected call version");
            RpcError::invalid_request(known.clone())
        })?;

        let method = match raw.method {
            Some(Value::String(method))
                if !method.is_empty() && !method.starts_with(RESERVED_METHOD_PREFIX) =>
            {
                method
            }
            other => {
                debug!(method = ?other, "Rejected call method");
                return Err(RpcError::invalid_request(known));
            }
        };

        let params = match raw.params {
            None | Some(Value::Null) => None,
            Some(value) => Some(Params::try_from(value).map_err(|e| {
                debug!(%method, error = %e, "Rejected call params");
                RpcError::invalid_params(known.clone())
            })?),
        };

        Ok(Self {
            version,
            method,
            params,
            id,
            outcome: Outcome::Pending,
        })
    }

    /// Parse a call received on the wire.
    ///
    /// Only `jsonrpc`, `method`, `params` and `id` are read; a missing `id`
    /// makes the call a notification. Unparseable input fails with
    /// `Parse error` and a null id. Batches are not supported.
    pub fn from_request(request: impl AsRef<[u8]>) -> Result<Self, CallError> {
        let value: Value = serde_json::from_slice(request.as_ref()).map_err(|e| {
            debug!(error = %e, "Failed to parse request");
            RpcError::parse_error()
        })?;

        let mut object = match value {
            Value::Object(object) => object,
            Value::Array(_) => return Err(CallError::BatchUnsupported),
            _ => return Err(RpcError::invalid_request(None).into()),
        };

        let id = match object.remove("id") {
            Some(id) => IdSpec::Explicit(id),
            None => IdSpec::Notification,
        };

        Ok(Self::clean(RawCall {
            jsonrpc: object.remove("jsonrpc"),
            method: object.remove("method"),
            params: object.remove("params"),
            id,
        })?)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn version(&self) -> &JsonRpcVersion {
        &self.version
    }

    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    /// Positional arguments; empty unless params are positional
    pub fn positional(&self) -> &[Scalar] {
        match &self.params {
            Some(Params::Positional(args)) => args,
            _ => &[],
        }
    }

    /// Named arguments, if params are named
    pub fn named(&self) -> Option<&IndexMap<String, Scalar>> {
        match &self.params {
            Some(Params::Named(kwargs)) => Some(kwargs),
            _ => None,
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.id
    }

    /// The id as sent on the wire; `None` for notifications
    pub fn id(&self) -> Option<RequestId> {
        self.id.wire_id()
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_notification()
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn is_pending(&self) -> bool {
        !self.outcome.is_terminal()
    }

    /// The result, or the error the call resolved with
    pub fn result(&self) -> Result<&Value, CallError> {
        match &self.outcome {
            Outcome::Pending => Err(CallError::NoOutcome),
            Outcome::Resolved(result) => Ok(result),
            Outcome::Errored(error) => Err(error.clone().into()),
        }
    }

    /// The error, `None` if the call resolved successfully
    pub fn error(&self) -> Result<Option<&RpcError>, CallError> {
        match &self.outcome {
            Outcome::Pending => Err(CallError::NoOutcome),
            Outcome::Resolved(_) => Ok(None),
            Outcome::Errored(error) => Ok(Some(error)),
        }
    }

    fn check_transition(&self, operation: &'static str) -> Result<(), CallError> {
        if self.is_notification() {
            return Err(CallError::NotificationOutcome { operation });
        }
        if self.outcome.is_terminal() {
            return Err(CallError::OutcomeAlreadySet);
        }
        Ok(())
    }

    pub fn set_result(&mut self, result: Value) -> Result<(), CallError> {
        self.check_transition("result")?;
        self.outcome = Outcome::Resolved(result);
        Ok(())
    }

    /// Resolve the call with an error built from the global registry.
    ///
    /// A dispatcher that cannot find the method uses `-32601` here.
    pub fn set_error(
        &mut self,
        code: i64,
        message: Option<&str>,
        data: Option<Value>,
    ) -> Result<(), CallError> {
        self.check_transition("error")?;
        let mut error = match message {
            Some(message) => RpcError::with_message(code, message)?,
            None => RpcError::new(code)?,
        };
        if let Some(data) = data {
            error = error.with_data(data);
        }
        self.set_rpc_error(error)
    }

    /// Resolve the call with a prepared error, tagged with this call's id
    pub fn set_rpc_error(&mut self, error: RpcError) -> Result<(), CallError> {
        self.check_transition("error")?;
        self.outcome = Outcome::Errored(error.with_id(self.id()));
        Ok(())
    }

    /// The request as JSON text
    pub fn request(&self) -> Result<String, CallError> {
        let id = self.id();
        codec::to_text(&RequestEnvelope {
            jsonrpc: &self.version,
            method: &self.method,
            params: self.params.as_ref(),
            id: id.as_ref(),
        })
    }

    pub fn request_bytes(&self, encoding: Encoding) -> Result<Vec<u8>, CallError> {
        Ok(encoding.encode(&self.request()?))
    }

    /// The response as JSON text; only available once the call is resolved
    pub fn response(&self) -> Result<String, CallError> {
        if self.is_notification() {
            return Err(CallError::NotificationResponse);
        }
        let id = self.id();
        match &self.outcome {
            Outcome::Pending => Err(CallError::NoOutcome),
            Outcome::Resolved(result) => {
                codec::to_text(&ResponseEnvelope::result(result, id.as_ref()))
            }
            Outcome::Errored(error) => {
                codec::to_text(&ResponseEnvelope::error(error.object(), id.as_ref()))
            }
        }
    }

    pub fn response_bytes(&self, encoding: Encoding) -> Result<Vec<u8>, CallError> {
        Ok(encoding.encode(&self.response()?))
    }

    /// Apply a response received for this call.
    ///
    /// A result resolves the call. An error resolves it too and is returned
    /// as `Err(CallError::Rpc(..))` so the caller observes the remote failure.
    /// Unparseable input errors the call with `Parse error`.
    ///
    /// # Panics
    ///
    /// Panics if the response id is not this call's id. A mismatched response
    /// means the caller routed it to the wrong call.
    pub fn assign_response(&mut self, response: impl AsRef<[u8]>) -> Result<(), CallError> {
        if self.is_notification() {
            return Err(CallError::NotificationResponse);
        }

        let value: Value = match serde_json::from_slice(response.as_ref()) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "Failed to parse response");
                let error = RpcError::parse_error().with_id(self.id());
                self.set_rpc_error(error.clone())?;
                return Err(error.into());
            }
        };
        let Value::Object(mut object) = value else {
            return Err(CallError::MalformedResponse(
                "response is not a JSON object".into(),
            ));
        };

        let own_id = self.id();
        let response_id = object
            .get("id")
            .ok_or_else(|| CallError::MalformedResponse("response has no id".into()))?;
        if RequestId::from_value(response_id) != own_id {
            panic!(
                "Response id {} doesn't match call id {:?}",
                response_id, own_id
            );
        }

        if let Some(result) = object.remove("result") {
            self.set_result(result)
        } else if let Some(error) = object.remove("error") {
            let error = RpcError::from_wire(&error, own_id)?;
            warn!(
                method = %self.method,
                code = error.code(),
                error_message = error.message(),
                "Call failed remotely"
            );
            self.set_rpc_error(error.clone())?;
            Err(error.into())
        } else {
            Err(CallError::MalformedResponse(
                "result or error not provided in response".into(),
            ))
        }
    }

    /// The request as a JSON value
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("jsonrpc".to_string(), Value::from(self.version.as_str()));
        object.insert("method".to_string(), Value::String(self.method.clone()));
        if let Some(params) = &self.params {
            object.insert("params".to_string(), params.to_value());
        }
        if let Some(id) = self.id() {
            object.insert("id".to_string(), id.to_value());
        }
        Value::Object(object)
    }
}

impl PartialEq for RpcCall {
    fn eq(&self, other: &Self) -> bool {
        if self.version != other.version
            || self.method != other.method
            || self.params != other.params
            || self.id() != other.id()
        {
            debug!(method = %self.method, other_method = %other.method, "Calls differ in request");
            return false;
        }
        if mem::discriminant(&self.outcome) != mem::discriminant(&other.outcome) {
            debug!(method = %self.method, "Calls differ in outcome");
            return false;
        }
        if !self.outcome.is_terminal() {
            return true;
        }
        match (self.response(), other.response()) {
            (Ok(a), Ok(b)) if a == b => true,
            _ => {
                debug!(method = %self.method, "Calls differ in response");
                false
            }
        }
    }
}

impl fmt::Display for RpcCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let request = self.request().map_err(|_| fmt::Error)?;
        f.write_str(&request)
    }
}

/// Builder for [`RpcCall`] taking raw JSON for params and id.
///
/// Validation happens in [`build`](RpcCallBuilder::build), exactly as for calls
/// received on the wire.
#[derive(Debug, Clone)]
pub struct RpcCallBuilder {
    jsonrpc: String,
    method: String,
    params: Option<Value>,
    id: IdSpec,
}

impl RpcCallBuilder {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params: None,
            id: IdSpec::Generate,
        }
    }

    pub fn version(mut self, jsonrpc: impl Into<String>) -> Self {
        self.jsonrpc = jsonrpc.into();
        self
    }

    pub fn params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn positional<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Scalar>,
    {
        let args = args.into_iter().map(|arg| arg.into().to_value()).collect();
        self.params = Some(Value::Array(args));
        self
    }

    pub fn named<I, K, S>(mut self, kwargs: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<Scalar>,
    {
        let kwargs = kwargs
            .into_iter()
            .map(|(key, value)| (key.into(), value.into().to_value()))
            .collect();
        self.params = Some(Value::Object(kwargs));
        self
    }

    pub fn id(mut self, id: impl Into<IdSpec>) -> Self {
        self.id = id.into();
        self
    }

    pub fn notification(mut self) -> Self {
        self.id = IdSpec::Notification;
        self
    }

    pub fn build(self) -> Result<RpcCall, RpcError> {
        RpcCall::clean(RawCall {
            jsonrpc: Some(Value::String(self.jsonrpc)),
            method: Some(Value::String(self.method)),
            params: self.params,
            id: self.id,
        })
    }
}
