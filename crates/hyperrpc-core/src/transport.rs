//! The `RpcTransport` trait — the seam between clients and the network.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::endpoint::EndpointIdentity;
use crate::error::RpcFailure;
use crate::request::{next_request_id, JsonRpcRequest, RpcEnvelope, RpcParams};

/// Performs exactly one JSON-RPC exchange per `send`; never retries.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    /// POST `req` to the node's `namespace` route and return the raw envelope.
    async fn send(&self, namespace: &str, req: JsonRpcRequest) -> Result<RpcEnvelope, RpcFailure>;

    /// The node and VM this transport targets.
    fn endpoint(&self) -> &EndpointIdentity;

    /// Call `method` in `namespace`, unwrap the envelope, and read the result as `T`.
    async fn call<T: DeserializeOwned + Send>(
        &self,
        namespace: &str,
        method: &str,
        params: RpcParams,
    ) -> Result<T, RpcFailure> {
        let req = JsonRpcRequest::new(next_request_id(), method, params);
        tracing::debug!(namespace, method, id = req.id, "rpc call");
        let result = self
            .send(namespace, req)
            .await?
            .into_result()
            .map_err(RpcFailure::Rpc)?;
        Ok(serde_json::from_value(result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    struct Canned {
        endpoint: EndpointIdentity,
        reply: Value,
        seen: Mutex<Vec<(String, JsonRpcRequest)>>,
    }

    #[async_trait]
    impl RpcTransport for Canned {
        async fn send(&self, namespace: &str, req: JsonRpcRequest) -> Result<RpcEnvelope, RpcFailure> {
            self.seen.lock().unwrap().push((namespace.to_owned(), req));
            Ok(serde_json::from_value(self.reply.clone())?)
        }

        fn endpoint(&self) -> &EndpointIdentity {
            &self.endpoint
        }
    }

    fn canned(reply: Value) -> Canned {
        Canned {
            endpoint: EndpointIdentity::parse("http://localhost:9650", "morpheusvm", "morpheusapi").unwrap(),
            reply,
            seen: Mutex::new(vec![]),
        }
    }

    #[tokio::test]
    async fn call_deserializes_result() {
        let t = canned(json!({ "result": { "abi": "[]" } }));
        let v: Value = t.call("coreapi", "hypersdk.getABI", RpcParams::new()).await.unwrap();
        assert_eq!(v, json!({ "abi": "[]" }));
        let seen = t.seen.lock().unwrap();
        assert_eq!(seen[0].0, "coreapi");
        assert_eq!(seen[0].1.method, "hypersdk.getABI");
    }

    #[tokio::test]
    async fn call_surfaces_rpc_error_even_with_result() {
        let t = canned(json!({ "result": 1, "error": { "message": "unknown method" } }));
        let err = t
            .call::<Value>("coreapi", "hypersdk.nope", RpcParams::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RpcFailure::Rpc(ref m) if m == "unknown method"));
    }

    #[tokio::test]
    async fn wrong_result_shape_is_decode_failure() {
        let t = canned(json!({ "result": "not a number" }));
        let err = t.call::<u64>("coreapi", "x", RpcParams::new()).await.unwrap_err();
        assert!(matches!(err, RpcFailure::Decode(_)));
    }
}
