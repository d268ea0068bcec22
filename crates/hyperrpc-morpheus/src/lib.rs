//! hyperrpc-morpheus — MorpheusVM client and faucet polling.
//!
//! # Quick start
//! ```rust,no_run
//! use std::sync::Arc;
//! use hyperrpc_morpheus::{ClientConfig, FaucetPoller, VmClient};
//! use hyperrpc_core::Balance;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let client = Arc::new(VmClient::from_config(&config)?);
//! let mut poller = FaucetPoller::new(client, config.poll.policy());
//! poller.set_inputs("morpheus1...", Balance::parse_units("1", config.decimals)?);
//! let state = poller.wait_settled().await;
//! println!("loading={} error={:?}", state.loading(), state.error());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod poller;

pub use client::{NetworkInfo, VmClient};
pub use config::{ClientConfig, ConfigError, PollConfig};
pub use poller::{FaucetBackend, FaucetPoller, FaucetSession, FaucetState, SessionFailure, SessionStatus};
