//! Client configuration, resolved once at startup.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use hyperrpc_core::{Balance, EndpointIdentity, PollPolicy};
use hyperrpc_http::HttpTransportConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL for {field} '{value}': {source}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid value for {var}: '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("client setup failed: {0}")]
    Client(String),
}

/// Faucet polling budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_max_attempts() -> u32 { 100 }
fn default_interval_ms() -> u64 { 100 }

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl PollConfig {
    pub fn policy(&self) -> PollPolicy {
        PollPolicy::new(self.max_attempts, Duration::from_millis(self.interval_ms))
    }
}

/// Everything the VM client and faucet poller need to know about the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Node API host, e.g. "http://localhost:9650"
    #[serde(default = "default_api_host")]
    pub api_host: String,
    /// Faucet service host, e.g. "http://localhost:8765"
    #[serde(default = "default_faucet_host")]
    pub faucet_host: String,
    #[serde(default = "default_vm_name")]
    pub vm_name: String,
    /// Route segment of the VM namespace; a leading `/` is tolerated.
    #[serde(default = "default_vm_rpc_prefix")]
    pub vm_rpc_prefix: String,
    /// Decimal places used when displaying balances
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    #[serde(default = "default_coin_symbol")]
    pub coin_symbol: String,
    /// Bech32 human-readable address prefix
    #[serde(default = "default_hrp")]
    pub hrp: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub poll: PollConfig,
}

fn default_api_host() -> String { "http://localhost:9650".into() }
fn default_faucet_host() -> String { "http://localhost:8765".into() }
fn default_vm_name() -> String { "morpheusvm".into() }
fn default_vm_rpc_prefix() -> String { "morpheusapi".into() }
fn default_decimals() -> u32 { 9 }
fn default_coin_symbol() -> String { "RED".into() }
fn default_hrp() -> String { "morpheus".into() }
fn default_request_timeout_ms() -> u64 { 3000 }

impl Default for ClientConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl ClientConfig {
    /// Local devnet defaults.
    pub fn development() -> Self {
        Self {
            api_host: default_api_host(),
            faucet_host: default_faucet_host(),
            vm_name: default_vm_name(),
            vm_rpc_prefix: default_vm_rpc_prefix(),
            decimals: default_decimals(),
            coin_symbol: default_coin_symbol(),
            hrp: default_hrp(),
            request_timeout_ms: default_request_timeout_ms(),
            poll: PollConfig::default(),
        }
    }

    /// Development defaults overridden by `MORPHEUS_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = Self::development();
        if let Some(v) = lookup("MORPHEUS_API_HOST") {
            cfg.api_host = v;
        }
        if let Some(v) = lookup("MORPHEUS_FAUCET_HOST") {
            cfg.faucet_host = v;
        }
        if let Some(v) = lookup("MORPHEUS_VM_NAME") {
            cfg.vm_name = v;
        }
        if let Some(v) = lookup("MORPHEUS_VM_RPC_PREFIX") {
            cfg.vm_rpc_prefix = v;
        }
        if let Some(v) = lookup("MORPHEUS_REQUEST_TIMEOUT_MS") {
            cfg.request_timeout_ms = v.parse().map_err(|_| ConfigError::InvalidNumber {
                var: "MORPHEUS_REQUEST_TIMEOUT_MS",
                value: v,
            })?;
        }
        // Fail early on malformed hosts rather than on first use.
        cfg.endpoint()?;
        cfg.faucet_url()?;
        Ok(cfg)
    }

    pub fn endpoint(&self) -> Result<EndpointIdentity, ConfigError> {
        EndpointIdentity::parse(&self.api_host, self.vm_name.clone(), self.vm_rpc_prefix.clone()).map_err(
            |source| ConfigError::InvalidUrl {
                field: "api_host",
                value: self.api_host.clone(),
                source,
            },
        )
    }

    pub fn faucet_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.faucet_host).map_err(|source| ConfigError::InvalidUrl {
            field: "faucet_host",
            value: self.faucet_host.clone(),
            source,
        })
    }

    pub fn transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    /// `"0.500000000 RED"`
    pub fn display_balance(&self, balance: &Balance) -> String {
        format!("{} {}", balance.format_units(self.decimals), self.coin_symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn development_defaults() {
        let cfg = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.api_host, "http://localhost:9650");
        assert_eq!(cfg.faucet_host, "http://localhost:8765");
        assert_eq!(cfg.vm_name, "morpheusvm");
        assert_eq!(cfg.vm_rpc_prefix, "morpheusapi");
        assert_eq!(cfg.decimals, 9);
        assert_eq!(cfg.coin_symbol, "RED");
        assert_eq!(cfg.hrp, "morpheus");
        assert_eq!(cfg.poll.policy(), PollPolicy::default());
        assert_eq!(cfg.transport_config().request_timeout, Duration::from_millis(3000));
    }

    #[test]
    fn env_overrides() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            ("MORPHEUS_API_HOST", "https://api.example.com"),
            ("MORPHEUS_VM_RPC_PREFIX", "/morpheusapi"),
            ("MORPHEUS_REQUEST_TIMEOUT_MS", "500"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_host, "https://api.example.com");
        assert_eq!(cfg.endpoint().unwrap().vm_rpc_prefix(), "morpheusapi");
        assert_eq!(cfg.request_timeout_ms, 500);
    }

    #[test]
    fn bad_host_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[("MORPHEUS_FAUCET_HOST", "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { field: "faucet_host", .. }));
    }

    #[test]
    fn bad_timeout_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[("MORPHEUS_REQUEST_TIMEOUT_MS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: ClientConfig =
            serde_json::from_str(r#"{ "api_host": "http://10.0.0.1:9650", "poll": { "max_attempts": 5 } }"#).unwrap();
        assert_eq!(cfg.api_host, "http://10.0.0.1:9650");
        assert_eq!(cfg.vm_name, "morpheusvm");
        assert_eq!(cfg.poll.max_attempts, 5);
        assert_eq!(cfg.poll.interval_ms, 100);
    }

    #[test]
    fn display_balance_uses_symbol_and_decimals() {
        let cfg = ClientConfig::development();
        assert_eq!(cfg.display_balance(&Balance::from(500_000_000)), "0.500000000 RED");
    }
}
