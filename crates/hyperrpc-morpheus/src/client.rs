//! MorpheusVM client: fixes namespace and method naming over a transport.
//!
//! | Operation | Namespace | Method |
//! |---|---|---|
//! | `get_network` | `coreapi` | `hypersdk.network` |
//! | `get_abi` | `coreapi` | `hypersdk.getABI` |
//! | `send_tx` | `coreapi` | `hypersdk.submitTx` |
//! | `get_balance` | `<vm_rpc_prefix>` | `<vm_name>.balance` |
//!
//! `request_faucet_transfer` bypasses JSON-RPC and goes to the faucet host.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::json;

use hyperrpc_core::endpoint::CORE_NAMESPACE;
use hyperrpc_core::{Balance, EndpointIdentity, RpcFailure, RpcParams, RpcTransport};
use hyperrpc_http::{FaucetHttpClient, HttpTransport};

use crate::config::{ClientConfig, ConfigError};

const CORE_METHOD_PREFIX: &str = "hypersdk";

/// Result of `hypersdk.network`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    pub network_id: u32,
    pub subnet_id: String,
    pub chain_id: String,
}

#[derive(Deserialize)]
struct AbiResult {
    abi: String,
}

#[derive(Deserialize)]
struct BalanceResult {
    amount: Balance,
}

/// Typed MorpheusVM operations over any [`RpcTransport`].
pub struct VmClient<T = HttpTransport> {
    transport: T,
    faucet: FaucetHttpClient,
}

impl VmClient<HttpTransport> {
    /// Build the HTTP-backed client described by `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new(config.endpoint()?, config.transport_config())
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        let faucet =
            FaucetHttpClient::new(config.faucet_url()?).map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self::new(transport, faucet))
    }
}

impl<T: RpcTransport> VmClient<T> {
    pub fn new(transport: T, faucet: FaucetHttpClient) -> Self {
        Self { transport, faucet }
    }

    pub fn endpoint(&self) -> &EndpointIdentity {
        self.transport.endpoint()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn core_call<R: DeserializeOwned + Send>(&self, method: &str, params: RpcParams) -> Result<R, RpcFailure> {
        self.transport
            .call(CORE_NAMESPACE, &format!("{CORE_METHOD_PREFIX}.{method}"), params)
            .await
    }

    async fn vm_call<R: DeserializeOwned + Send>(&self, method: &str, params: RpcParams) -> Result<R, RpcFailure> {
        let endpoint = self.transport.endpoint();
        self.transport
            .call(
                endpoint.vm_rpc_prefix(),
                &format!("{}.{method}", endpoint.vm_name()),
                params,
            )
            .await
    }

    /// Network, subnet and chain identifiers of the node.
    pub async fn get_network(&self) -> Result<NetworkInfo, RpcFailure> {
        self.core_call("network", RpcParams::new()).await
    }

    /// The VM's action/output ABI descriptor.
    pub async fn get_abi(&self) -> Result<String, RpcFailure> {
        let res: AbiResult = self.core_call("getABI", RpcParams::new()).await?;
        Ok(res.abi)
    }

    /// Submit already-signed transaction bytes. Any result payload is ignored.
    pub async fn send_tx(&self, tx_bytes: &[u8]) -> Result<(), RpcFailure> {
        let mut params = RpcParams::new();
        params.insert("tx".into(), json!(STANDARD.encode(tx_bytes)));
        let _: IgnoredAny = self.core_call("submitTx", params).await?;
        tracing::info!(bytes = tx_bytes.len(), "transaction submitted");
        Ok(())
    }

    /// Balance of `address` in the smallest unit.
    pub async fn get_balance(&self, address: &str) -> Result<Balance, RpcFailure> {
        let mut params = RpcParams::new();
        params.insert("address".into(), json!(address));
        let res: BalanceResult = self.vm_call("balance", params).await?;
        Ok(res.amount)
    }

    /// Ask the faucet to credit `address`.
    pub async fn request_faucet_transfer(&self, address: &str) -> Result<(), RpcFailure> {
        self.faucet.request_transfer(address).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hyperrpc_core::{JsonRpcRequest, RpcEnvelope};
    use serde_json::Value;
    use std::sync::Mutex;

    struct Recorder {
        endpoint: EndpointIdentity,
        reply: Value,
        calls: Mutex<Vec<(String, JsonRpcRequest)>>,
    }

    #[async_trait]
    impl RpcTransport for Recorder {
        async fn send(&self, namespace: &str, req: JsonRpcRequest) -> Result<RpcEnvelope, RpcFailure> {
            self.calls.lock().unwrap().push((namespace.to_owned(), req));
            Ok(serde_json::from_value(self.reply.clone())?)
        }

        fn endpoint(&self) -> &EndpointIdentity {
            &self.endpoint
        }
    }

    fn client(prefix: &str, reply: Value) -> VmClient<Recorder> {
        let recorder = Recorder {
            endpoint: EndpointIdentity::parse("http://localhost:9650", "morpheusvm", prefix).unwrap(),
            reply,
            calls: Mutex::new(vec![]),
        };
        let faucet = FaucetHttpClient::new("http://localhost:8765".parse().unwrap()).unwrap();
        VmClient::new(recorder, faucet)
    }

    fn last_call(c: &VmClient<Recorder>) -> (String, JsonRpcRequest) {
        c.transport().calls.lock().unwrap().last().cloned().unwrap()
    }

    #[tokio::test]
    async fn balance_routes_to_vm_namespace_exactly() {
        let c = client("/morpheusapi", json!({ "result": { "amount": 500000000 } }));
        let balance = c.get_balance("addr1").await.unwrap();
        assert_eq!(balance, Balance::from(500_000_000));
        assert_eq!(balance.to_string(), "500000000");

        let (ns, req) = last_call(&c);
        assert_eq!(ns, "morpheusapi");
        assert_eq!(req.method, "morpheusvm.balance");
        assert_eq!(Value::Object(req.params), json!({ "address": "addr1" }));
    }

    #[tokio::test]
    async fn float_balance_is_rejected() {
        let c = client("morpheusapi", json!({ "result": { "amount": 500000000.5 } }));
        let err = c.get_balance("addr1").await.unwrap_err();
        assert!(matches!(err, RpcFailure::Decode(_)));
    }

    #[tokio::test]
    async fn network_routes_to_core() {
        let c = client(
            "morpheusapi",
            json!({ "result": { "networkId": 1337, "subnetId": "sub", "chainId": "chain" } }),
        );
        let info = c.get_network().await.unwrap();
        assert_eq!(
            info,
            NetworkInfo {
                network_id: 1337,
                subnet_id: "sub".into(),
                chain_id: "chain".into()
            }
        );
        let (ns, req) = last_call(&c);
        assert_eq!(ns, "coreapi");
        assert_eq!(req.method, "hypersdk.network");
        assert!(req.params.is_empty());
    }

    #[tokio::test]
    async fn abi_unwraps_descriptor() {
        let c = client("morpheusapi", json!({ "result": { "abi": "{\"actions\":[]}" } }));
        assert_eq!(c.get_abi().await.unwrap(), "{\"actions\":[]}");
        assert_eq!(last_call(&c).1.method, "hypersdk.getABI");
    }

    #[tokio::test]
    async fn send_tx_base64_encodes_bytes() {
        let c = client("morpheusapi", json!({ "result": { "txId": "abc" } }));
        c.send_tx(&[0xde, 0xad, 0xbe, 0xef]).await.unwrap();
        let (ns, req) = last_call(&c);
        assert_eq!(ns, "coreapi");
        assert_eq!(req.method, "hypersdk.submitTx");
        assert_eq!(req.params["tx"], json!("3q2+7w=="));
    }

    #[tokio::test]
    async fn send_tx_surfaces_node_rejection() {
        let c = client("morpheusapi", json!({ "error": { "message": "invalid signature" } }));
        let err = c.send_tx(b"tx").await.unwrap_err();
        assert_eq!(err.to_string(), "invalid signature");
    }
}
