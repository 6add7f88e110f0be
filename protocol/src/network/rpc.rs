//! # factomd JSON-RPC interface
//!
//! Typed definitions for the part of the factomd v2 JSON-RPC API the write
//! path needs, plus the [`RpcTransport`] seam the submission pipeline talks
//! through. The HTTP implementation lives in the CLI crate; tests plug in
//! scripted transports.
//!
//! ## Method Index
//!
//! | Method              | Params                  | Result                          |
//! |---------------------|-------------------------|---------------------------------|
//! | `commit-chain`      | `message` (hex)         | [`CommitResponse`]              |
//! | `commit-entry`      | `message` (hex)         | [`CommitResponse`]              |
//! | `reveal-chain`      | `entry` (hex)           | [`RevealResponse`]              |
//! | `reveal-entry`      | `entry` (hex)           | [`RevealResponse`]              |
//! | `ack`               | `hash`, `chainid`       | [`AckResponse`]                 |
//! | `entry-credit-rate` | none                    | [`EntryCreditRateResponse`]     |
//! | `factoid-submit`    | `transaction` (hex)     | [`FactoidSubmitResponse`]       |

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{REPEATED_COMMIT_ERROR_CODE, REPEATED_COMMIT_MESSAGE};
use crate::error::{FactomError, Result};

// ---------------------------------------------------------------------------
// RPC Method Enumeration
// ---------------------------------------------------------------------------

/// factomd methods used by this crate. Serialises to the wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RpcMethod {
    #[serde(rename = "commit-chain")]
    CommitChain,
    #[serde(rename = "commit-entry")]
    CommitEntry,
    #[serde(rename = "reveal-chain")]
    RevealChain,
    #[serde(rename = "reveal-entry")]
    RevealEntry,
    #[serde(rename = "ack")]
    Ack,
    #[serde(rename = "entry-credit-rate")]
    EntryCreditRate,
    #[serde(rename = "factoid-submit")]
    FactoidSubmit,
}

impl RpcMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CommitChain => "commit-chain",
            Self::CommitEntry => "commit-entry",
            Self::RevealChain => "reveal-chain",
            Self::RevealEntry => "reveal-entry",
            Self::Ack => "ack",
            Self::EntryCreditRate => "entry-credit-rate",
            Self::FactoidSubmit => "factoid-submit",
        }
    }
}

impl fmt::Display for RpcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RPC Request / Response
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Always "2.0".
    pub jsonrpc: String,
    /// Echoed back in the response.
    pub id: u64,
    pub method: RpcMethod,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
}

impl RpcRequest {
    pub fn new(id: u64, method: RpcMethod, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method,
            params,
        }
    }
}

/// A JSON-RPC 2.0 response. Exactly one of `result` or `error` is set by a
/// conforming node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    /// Collapse the envelope into the result value or the error object.
    pub fn into_result(self) -> std::result::Result<serde_json::Value, RpcError> {
        match (self.result, self.error) {
            (_, Some(error)) => Err(error),
            (Some(result), None) => Ok(result),
            (None, None) => Err(RpcError::internal_error(
                "response carries neither result nor error",
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// RPC Errors
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 error object, kept intact from the node.
///
/// Transports also use it for their own failures (connection refused, bad
/// JSON) with the standard codes, so callers see one error shape.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("RPC error {code}: {message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Response could not be parsed (-32700).
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::new(-32700, msg)
    }

    /// Transport-level or server-internal failure (-32603).
    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::new(-32603, msg)
    }

    /// factomd rejects a commit whose ledger it has already seen. This is
    /// the only error the submission pipeline recovers from.
    pub fn is_repeated_commit(&self) -> bool {
        self.code == REPEATED_COMMIT_ERROR_CODE || self.message == REPEATED_COMMIT_MESSAGE
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Something that can carry a JSON-RPC call to a factomd node.
///
/// Implementations own request ids and any retry policy. They must return
/// the node's error object unchanged so repeated commits stay recognisable.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(
        &self,
        method: RpcMethod,
        params: serde_json::Value,
    ) -> std::result::Result<serde_json::Value, RpcError>;
}

/// Call `method` and decode the result into `T`.
pub(crate) async fn call_typed<T, R>(
    transport: &R,
    method: RpcMethod,
    params: serde_json::Value,
) -> Result<T>
where
    T: DeserializeOwned,
    R: RpcTransport + ?Sized,
{
    let value = transport.call(method, params).await?;
    serde_json::from_value(value)
        .map_err(|e| FactomError::malformed("rpc response", format!("{}: {}", method, e)))
}

// ---------------------------------------------------------------------------
// Typed Response Payloads
// ---------------------------------------------------------------------------

/// Result of `commit-chain` / `commit-entry`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub txid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entryhash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chainidhash: Option<String>,
}

/// Result of `reveal-chain` / `reveal-entry`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealResponse {
    #[serde(default)]
    pub message: String,
    pub entryhash: String,
    pub chainid: String,
}

/// Status block inside an ack response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactiondate: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactiondatestring: Option<String>,
}

/// Which status block of an [`AckResponse`] to inspect. Factoid
/// transaction acks have a flat `status` and use no field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckField {
    CommitData,
    EntryData,
}

impl AckField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CommitData => "commitdata",
            Self::EntryData => "entrydata",
        }
    }
}

/// Result of `ack`. Commit and entry acks fill `commitdata` / `entrydata`;
/// Factoid transaction acks fill the flat `status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committxid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entryhash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commitdata: Option<AckStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrydata: Option<AckStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl AckResponse {
    /// The status string selected by `field`, if present.
    pub fn status_of(&self, field: Option<AckField>) -> Option<&str> {
        match field {
            Some(AckField::CommitData) => self.commitdata.as_ref().map(|s| s.status.as_str()),
            Some(AckField::EntryData) => self.entrydata.as_ref().map(|s| s.status.as_str()),
            None => self.status.as_deref(),
        }
    }
}

/// Result of `entry-credit-rate`: factoshis per Entry Credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryCreditRateResponse {
    pub rate: u64,
}

/// Result of `factoid-submit`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoidSubmitResponse {
    #[serde(default)]
    pub message: String,
    pub txid: String,
}
