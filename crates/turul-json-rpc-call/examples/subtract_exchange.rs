//! Subtract Exchange Example
//!
//! Plays both sides of a JSON-RPC conversation in one process: the client
//! builds calls and serializes them, a toy receiver parses them, resolves them
//! and sends back responses, and the client assigns those responses.
//! Bytes move through a `Vec<u8>` where a real transport would sit.
//!
//! Run with `RUST_LOG=debug` to see validation and correlation logging.

use serde_json::{Value, json};
use tracing::info;
use turul_json_rpc_call::prelude::*;

const SERVER_ERRORS: &str = r#"
[server_errors]
"-32000" = "Subtraction overflowed"
"#;

/// Resolve a received call; returns the response bytes, if any
fn receive(request: &[u8]) -> Option<Vec<u8>> {
    let mut call = match RpcCall::from_request(request) {
        Ok(call) => call,
        Err(CallError::Rpc(error)) => return error.response_bytes(Encoding::Utf8).ok(),
        Err(e) => {
            info!("Dropping request: {}", e);
            return None;
        }
    };

    if call.is_notification() {
        info!("Notification '{}' received, no response", call.method());
        return None;
    }

    let outcome = match call.method() {
        "subtract" => subtract(&call),
        _ => Err(METHOD_NOT_FOUND),
    };
    let resolved = match outcome {
        Ok(result) => call.set_result(result),
        Err(code) => call.set_error(code, None, None),
    };
    if let Err(e) = resolved {
        info!("Could not resolve call: {}", e);
        return None;
    }
    call.response_bytes(Encoding::Utf8).ok()
}

fn subtract(call: &RpcCall) -> Result<Value, i64> {
    let (minuend, subtrahend) = match call.named() {
        Some(kwargs) => (kwargs.get("minuend"), kwargs.get("subtrahend")),
        None => (call.positional().first(), call.positional().get(1)),
    };
    let minuend = minuend.and_then(Scalar::as_i64).ok_or(INVALID_PARAMS)?;
    let subtrahend = subtrahend.and_then(Scalar::as_i64).ok_or(INVALID_PARAMS)?;
    minuend
        .checked_sub(subtrahend)
        .map(Value::from)
        .ok_or(SERVER_ERROR_END)
}

fn exchange(mut call: RpcCall) -> Result<(), CallError> {
    let request = call.request_bytes(Encoding::Utf8)?;
    info!("--> {}", call);

    let Some(response) = receive(&request) else {
        return Ok(());
    };
    info!("<-- {}", String::from_utf8_lossy(&response));

    match call.assign_response(&response) {
        Ok(()) => info!("Result: {}", call.result()?),
        Err(CallError::Rpc(error)) => info!("Remote error: {}", error),
        Err(e) => return Err(e),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    ErrorRegistry::global().set_server_errors_from_toml(SERVER_ERRORS)?;

    exchange(RpcCall::builder("subtract").positional([42, 23]).id(1).build()?)?;
    exchange(
        RpcCall::builder("subtract")
            .named([("subtrahend", 23), ("minuend", 42)])
            .id(3)
            .build()?,
    )?;
    exchange(
        RpcCall::builder("subtract")
            .positional([i64::MIN, 1])
            .build()?,
    )?;
    exchange(RpcCall::builder("update").params(json!([1, 2, 3, 4, 5])).notification().build()?)?;
    exchange(RpcCall::builder("foobar").id("1").build()?)?;

    // what a receiver sends back for bytes that are not JSON
    let response = receive(br#"{"jsonrpc": "2.0", "method": "foobar, "params": "bar", "baz]"#);
    if let Some(response) = response {
        info!("<-- {}", String::from_utf8_lossy(&response));
    }

    Ok(())
}
