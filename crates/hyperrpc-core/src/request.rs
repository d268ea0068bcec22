//! JSON-RPC 2.0 wire types.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Named JSON-RPC parameters. HyperSDK methods take a single object.
pub type RpcParams = Map<String, Value>;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Returns a fresh request id. Ids only pair a response with its request.
pub fn next_request_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: RpcParams,
    pub id: u64,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request.
    pub fn new(id: u64, method: impl Into<String>, params: RpcParams) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            method: method.into(),
            params,
            id,
        }
    }
}

/// Error object carried by an envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A JSON-RPC response envelope.
///
/// HyperSDK nodes are loose about `jsonrpc` and `id` on the way back, so only
/// `result` and `error` are read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RpcEnvelope {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
}

impl RpcEnvelope {
    /// The error message, if the node reported a non-empty one.
    pub fn error_message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .map(|e| e.message.as_str())
            .filter(|m| !m.is_empty())
    }

    /// Unwrap the result, letting a non-empty error message win over it.
    pub fn into_result(self) -> Result<Value, String> {
        if let Some(msg) = self.error_message() {
            return Err(msg.to_owned());
        }
        Ok(self.result.unwrap_or(Value::Null))
    }
}
