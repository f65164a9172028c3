//! Single calls encoded in a URL.
//!
//! `http://host/subtract?params=[42,23]&id=1` becomes
//! `{"jsonrpc":"2.0","method":"subtract","params":[42,23],"id":"1"}`.
//! Query parameters map onto the request members and the last occurrence of a
//! repeated key wins. Without a `method` parameter the URL path names the
//! method. `params` is read as JSON when it holds an array or object; every
//! other value, the id included, stays a string.

use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::JSONRPC_VERSION;
use crate::call::RpcCall;
use crate::error::CallError;

const RELATIVE_BASE: &str = "http://localhost/";

impl RpcCall {
    /// Build a call from a URL, absolute or relative
    pub fn from_url(input: &str) -> Result<Self, CallError> {
        let url = parse_url(input)?;

        let mut fields = Map::new();
        for (key, value) in url.query_pairs() {
            // blank values count as absent
            if value.is_empty() {
                continue;
            }
            fields.insert(key.into_owned(), Value::String(value.into_owned()));
        }

        if !fields.contains_key("method") {
            let path = urlencoding::decode_binary(url.path().as_bytes());
            let path = String::from_utf8_lossy(&path);
            fields.insert(
                "method".to_string(),
                Value::String(path.trim_start_matches('/').to_string()),
            );
        }
        if !fields.contains_key("jsonrpc") {
            fields.insert("jsonrpc".to_string(), Value::from(JSONRPC_VERSION));
        }

        let decoded = match fields.get("params") {
            Some(Value::String(raw)) => serde_json::from_str::<Value>(raw)
                .ok()
                .filter(|params| params.is_array() || params.is_object()),
            _ => None,
        };
        if let Some(params) = decoded {
            fields.insert("params".to_string(), params);
        }

        debug!(url = %url, "Building call from URL");
        Self::from_request(serde_json::to_vec(&Value::Object(fields))?)
    }
}

fn parse_url(input: &str) -> Result<Url, CallError> {
    match Url::parse(input) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(Url::parse(RELATIVE_BASE)?.join(input)?),
        Err(e) => Err(e.into()),
    }
}
