//! # JSON-RPC Call Prelude
//!
//! This module provides convenient re-exports of the most commonly used types
//! from the JSON-RPC call library.
//!
//! ```rust
//! use turul_json_rpc_call::prelude::*;
//! ```

// Core JSON-RPC types
pub use crate::call::{Outcome, RpcCall, RpcCallBuilder};
pub use crate::codec::Encoding;
pub use crate::error::{CallError, JsonRpcErrorCode, RpcError};
pub use crate::params::{Params, Scalar};
pub use crate::registry::ErrorRegistry;
pub use crate::types::{IdSpec, Identifier, JsonRpcVersion, RequestId};

// Standard error codes
pub use crate::error_codes::*;
