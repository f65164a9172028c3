//! # JSON-RPC 2.0 Call Object Model
//!
//! A pure, transport-agnostic model of JSON-RPC 2.0 calls and errors.
//! This crate constructs, validates, serializes, parses and correlates request,
//! response and error objects. Moving bytes between peers and mapping method
//! names to code are left to the transport and dispatcher layered on top.
//!
//! ## Features
//! - Validation at construction: a [`RpcCall`] or [`RpcError`] is either valid or never exists
//! - Error code governance through a builtin tier and a replaceable server tier ([`ErrorRegistry`])
//! - Explicit id handling: generated, explicit, or notification ([`IdSpec`])
//! - Positional and named scalar parameters ([`Params`])
//! - Stable wire output with non-ASCII preserved literally, as text or encoded bytes
//! - Building single calls from URL query strings
//!
//! Batch calls are rejected with [`CallError::BatchUnsupported`].
//!
//! ```rust
//! use turul_json_rpc_call::RpcCall;
//! use serde_json::json;
//!
//! let client = RpcCall::builder("subtract").params(json!([42, 23])).id(1).build()?;
//!
//! let mut server = RpcCall::from_request(client.request()?)?;
//! server.set_result(json!(19))?;
//! assert_eq!(server.response()?, r#"{"jsonrpc":"2.0","result":19,"id":1}"#);
//! # Ok::<(), turul_json_rpc_call::CallError>(())
//! ```

pub mod call;
pub mod codec;
pub mod error;
pub mod params;
pub mod prelude;
pub mod registry;
pub mod types;
pub mod url_request;

// Re-export main types
pub use call::{Outcome, RpcCall, RpcCallBuilder};
pub use codec::Encoding;
pub use error::{CallError, JsonRpcErrorCode, RpcError};
pub use params::{Params, ParamsError, Scalar};
pub use registry::{ErrorRegistry, RegistryError, lookup, set_server_errors};
pub use types::{IdSpec, Identifier, JsonRpcVersion, RequestId};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Method names starting with this prefix are reserved for rpc-internal methods
pub const RESERVED_METHOD_PREFIX: &str = "rpc.";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    // Server error range: -32099 to -32000
    pub const SERVER_ERROR_START: i64 = -32099;
    pub const SERVER_ERROR_END: i64 = -32000;
}
