//! Error code registry.
//!
//! Codes resolve to canonical messages through two tiers, checked in order:
//! the five builtin protocol errors, which never change, and a server tier
//! confined to [`SERVER_ERROR_RANGE`] that can only be replaced as a whole.
//! Any other code has no registered message; an [`RpcError`](crate::RpcError)
//! using it must bring its own, and that message stays local to the instance.
//!
//! The process-wide registry lives behind [`ErrorRegistry::global`]. Replacing
//! its server tier is atomic with respect to concurrent lookups, but doing so
//! while traffic is in flight means two errors with the same code may carry
//! different messages. Configure the server tier during startup.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use lazy_static::lazy_static;
use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::error::JsonRpcErrorCode;
use crate::error_codes::{SERVER_ERROR_END, SERVER_ERROR_START};

/// Codes reserved for implementation-defined server errors
pub const SERVER_ERROR_RANGE: RangeInclusive<i64> = SERVER_ERROR_START..=SERVER_ERROR_END;

/// Errors raised while configuring the server tier
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("error code must be an integer, got '{0}'")]
    NonIntegerCode(String),

    #[error("message for error code {code} must be a string, got {value}")]
    NonStringMessage { code: i64, value: String },

    #[error("message for error code {0} must not be empty")]
    EmptyMessage(i64),

    #[error("error code {0} is outside the server error range -32099 to -32000")]
    OutOfRange(i64),

    #[error("server errors must be a table mapping codes to messages")]
    NotATable,

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

lazy_static! {
    static ref GLOBAL_REGISTRY: ErrorRegistry = ErrorRegistry::new();
}

/// Code to message table with an immutable builtin tier and a replaceable server tier
#[derive(Debug, Default)]
pub struct ErrorRegistry {
    server: RwLock<BTreeMap<i64, String>>,
}

impl ErrorRegistry {
    /// A registry with the builtin tier and an empty server tier
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry used by [`RpcError::new`](crate::RpcError::new)
    pub fn global() -> &'static ErrorRegistry {
        &GLOBAL_REGISTRY
    }

    /// Canonical message of a builtin protocol error
    pub fn builtin(code: i64) -> Option<&'static str> {
        JsonRpcErrorCode::from_code(code).builtin_message()
    }

    pub fn lookup(&self, code: i64) -> Option<String> {
        if let Some(message) = Self::builtin(code) {
            return Some(message.to_string());
        }
        self.server.read().get(&code).cloned()
    }

    /// Replace the whole server tier.
    ///
    /// Every entry is validated before anything is swapped in; on error the
    /// previous table stays in place.
    pub fn set_server_errors<I, S>(&self, entries: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        let mut table = BTreeMap::new();
        for (code, message) in entries {
            if !SERVER_ERROR_RANGE.contains(&code) {
                return Err(RegistryError::OutOfRange(code));
            }
            let message = message.into();
            if message.is_empty() {
                return Err(RegistryError::EmptyMessage(code));
            }
            table.insert(code, message);
        }

        let count = table.len();
        *self.server.write() = table;
        info!(count, "Replaced server error table");
        Ok(())
    }

    /// Replace the server tier from a JSON object of `"code": "message"` pairs
    pub fn set_server_errors_from_value(&self, value: &Value) -> Result<(), RegistryError> {
        let object = value.as_object().ok_or(RegistryError::NotATable)?;
        let entries = object
            .iter()
            .map(|(key, message)| {
                let code = parse_code(key)?;
                match message {
                    Value::String(message) => Ok((code, message.clone())),
                    other => Err(RegistryError::NonStringMessage {
                        code,
                        value: other.to_string(),
                    }),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.set_server_errors(entries)
    }

    /// Replace the server tier from a TOML document.
    ///
    /// The codes may sit at the top level or under a `[server_errors]` table:
    ///
    /// ```toml
    /// [server_errors]
    /// "-32000" = "Database unavailable"
    /// ```
    pub fn set_server_errors_from_toml(&self, document: &str) -> Result<(), RegistryError> {
        let mut root: toml::Table = toml::from_str(document)?;
        let table = match root.remove("server_errors") {
            Some(toml::Value::Table(table)) => table,
            Some(_) => return Err(RegistryError::NotATable),
            None => root,
        };

        let entries = table
            .into_iter()
            .map(|(key, message)| {
                let code = parse_code(&key)?;
                match message {
                    toml::Value::String(message) => Ok((code, message)),
                    other => Err(RegistryError::NonStringMessage {
                        code,
                        value: other.to_string(),
                    }),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.set_server_errors(entries)
    }

    /// Snapshot of the server tier
    pub fn server_errors(&self) -> BTreeMap<i64, String> {
        self.server.read().clone()
    }

    pub fn clear_server_errors(&self) {
        self.server.write().clear();
        info!("Cleared server error table");
    }
}

fn parse_code(key: &str) -> Result<i64, RegistryError> {
    key.trim()
        .parse::<i64>()
        .map_err(|_| RegistryError::NonIntegerCode(key.to_string()))
}

/// Look up a code in the global registry
pub fn lookup(code: i64) -> Option<String> {
    ErrorRegistry::global().lookup(code)
}

/// Replace the server tier of the global registry
pub fn set_server_errors<I, S>(entries: I) -> Result<(), RegistryError>
where
    I: IntoIterator<Item = (i64, S)>,
    S: Into<String>,
{
    ErrorRegistry::global().set_server_errors(entries)
}
