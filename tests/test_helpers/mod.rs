//! Test Helpers for JSON-RPC Call Integration Tests
//!
//! Plays the receiving peer in memory: request bytes go in, response bytes
//! come out, the way a transport would hand them over.

use serde_json::Value;
use turul_json_rpc_call::{CallError, Encoding, RpcCall};

/// What a test receiver does with a well-formed call
pub enum Reply {
    Result(Value),
    Error(i64, Option<&'static str>),
}

/// Install a test subscriber once; later calls are no-ops
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Receive request bytes and produce the response bytes, if any.
///
/// Rejected requests answer with their error response; notifications and
/// batches get no answer.
pub fn serve<F>(request: &[u8], handler: F) -> Option<Vec<u8>>
where
    F: FnOnce(&RpcCall) -> Reply,
{
    let mut call = match RpcCall::from_request(request) {
        Ok(call) => call,
        Err(CallError::Rpc(error)) => return error.response_bytes(Encoding::Utf8).ok(),
        Err(_) => return None,
    };
    if call.is_notification() {
        return None;
    }

    let resolved = match handler(&call) {
        Reply::Result(result) => call.set_result(result),
        Reply::Error(code, message) => call.set_error(code, message, None),
    };
    resolved.ok()?;
    call.response_bytes(Encoding::Utf8).ok()
}

/// Send a client call to an in-memory receiver and assign its answer.
///
/// Returns the receiver's response text, `None` if it sent nothing back.
pub fn exchange<F>(client: &mut RpcCall, handler: F) -> Option<(String, Result<(), CallError>)>
where
    F: FnOnce(&RpcCall) -> Reply,
{
    let request = client.request_bytes(Encoding::Utf8).ok()?;
    let response = serve(&request, handler)?;
    let outcome = client.assign_response(&response);
    Some((String::from_utf8_lossy(&response).into_owned(), outcome))
}

/// The receiver used by most tests: `subtract` over positional or named integers
pub fn subtract(call: &RpcCall) -> Reply {
    if call.method() != "subtract" {
        return Reply::Error(-32601, None);
    }
    let (minuend, subtrahend) = match call.named() {
        Some(kwargs) => (kwargs.get("minuend"), kwargs.get("subtrahend")),
        None => (call.positional().first(), call.positional().get(1)),
    };
    match (
        minuend.and_then(|m| m.as_i64()),
        subtrahend.and_then(|s| s.as_i64()),
    ) {
        (Some(m), Some(s)) => Reply::Result(Value::from(m - s)),
        _ => Reply::Error(-32602, None),
    }
}
