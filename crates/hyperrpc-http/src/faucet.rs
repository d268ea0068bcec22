//! Faucet drip requests.
//!
//! The faucet is a separate service from the node. A drip is a bare
//! `POST {faucet_host}/faucet/{address}` with body `{}`; success is any 2xx
//! status and the response body is ignored.

use url::Url;

use hyperrpc_core::error::RpcFailure;

use crate::client::transport_failure;

/// Client for the faucet HTTP service.
#[derive(Debug, Clone)]
pub struct FaucetHttpClient {
    faucet_host: Url,
    http: reqwest::Client,
}

impl FaucetHttpClient {
    pub fn new(faucet_host: Url) -> Result<Self, RpcFailure> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| transport_failure(&e))?;
        Ok(Self { faucet_host, http })
    }

    pub fn faucet_host(&self) -> &Url {
        &self.faucet_host
    }

    /// URL a drip for `address` is posted to. `address` is percent-encoded.
    pub fn drip_url(&self, address: &str) -> Result<Url, RpcFailure> {
        let mut url = self.faucet_host.clone();
        url.path_segments_mut()
            .map_err(|_| {
                RpcFailure::Transport(format!("faucet host {} cannot carry a path", self.faucet_host))
            })?
            .pop_if_empty()
            .push("faucet")
            .push(address);
        Ok(url)
    }

    /// Ask the faucet to credit `address`.
    pub async fn request_transfer(&self, address: &str) -> Result<(), RpcFailure> {
        let url = self.drip_url(address)?;
        let resp = self
            .http
            .post(url.clone())
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| transport_failure(&e))?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "faucet request rejected");
            return Err(RpcFailure::FaucetRequestFailed {
                status: status.as_u16(),
            });
        }
        tracing::debug!(url = %url, status = status.as_u16(), "faucet request accepted");
        Ok(())
    }
}
