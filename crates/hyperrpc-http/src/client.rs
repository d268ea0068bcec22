//! HTTP JSON-RPC transport backed by `reqwest`.
//!
//! Each `send` is a single POST to `{api_host}/ext/bc/{vm}/{namespace}`.
//! The whole exchange (connect, send, read body) runs under one deadline;
//! when it fires the in-flight request is dropped and the call fails with
//! [`RpcFailure::Timeout`]. Nothing is retried here.

use std::time::Duration;

use async_trait::async_trait;

use hyperrpc_core::endpoint::EndpointIdentity;
use hyperrpc_core::error::RpcFailure;
use hyperrpc_core::request::{JsonRpcRequest, RpcEnvelope};
use hyperrpc_core::transport::RpcTransport;

/// Render `err` followed by each distinct cause in its `source()` chain.
pub(crate) fn describe_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let msg = cause.to_string();
        // Some wrappers already repeat their cause in their own message.
        if !out.contains(&msg) {
            out.push_str(": ");
            out.push_str(&msg);
        }
        source = cause.source();
    }
    out
}

pub(crate) fn transport_failure(err: &reqwest::Error) -> RpcFailure {
    RpcFailure::Transport(describe_chain(err))
}

/// Budget for one JSON-RPC exchange.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(3000);

/// Configuration for `HttpTransport`.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    pub request_timeout: Duration,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// HTTP JSON-RPC transport for one node/VM pair.
pub struct HttpTransport {
    endpoint: EndpointIdentity,
    http: reqwest::Client,
    request_timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for `endpoint`.
    pub fn new(endpoint: EndpointIdentity, config: HttpTransportConfig) -> Result<Self, RpcFailure> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| transport_failure(&e))?;
        Ok(Self {
            endpoint,
            http,
            request_timeout: config.request_timeout,
        })
    }

    /// Create with the default 3000 ms timeout.
    pub fn default_for(endpoint: EndpointIdentity) -> Result<Self, RpcFailure> {
        Self::new(endpoint, HttpTransportConfig::default())
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    async fn exchange(&self, url: &str, req: &JsonRpcRequest) -> Result<RpcEnvelope, RpcFailure> {
        let resp = self
            .http
            .post(url)
            .json(req)
            .send()
            .await
            .map_err(|e| transport_failure(&e))?;

        // The envelope is read regardless of status; nodes put RPC errors in
        // the body of non-2xx responses too.
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .await
            .map_err(|e| transport_failure(&e))?;

        serde_json::from_slice::<RpcEnvelope>(&body).map_err(|e| {
            RpcFailure::Transport(format!("HTTP {status}: malformed JSON-RPC body: {e}"))
        })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn send(&self, namespace: &str, req: JsonRpcRequest) -> Result<RpcEnvelope, RpcFailure> {
        let url = self.endpoint.url_for(namespace);
        match tokio::time::timeout(self.request_timeout, self.exchange(&url, &req)).await {
            Ok(result) => {
                if let Err(e) = &result {
                    tracing::debug!(error = %e, url = %url, method = %req.method, "rpc transport error");
                }
                result
            }
            Err(_) => {
                let ms = self.request_timeout.as_millis() as u64;
                tracing::warn!(url = %url, method = %req.method, timeout_ms = ms, "rpc request timed out");
                Err(RpcFailure::Timeout { ms })
            }
        }
    }

    fn endpoint(&self) -> &EndpointIdentity {
        &self.endpoint
    }
}
