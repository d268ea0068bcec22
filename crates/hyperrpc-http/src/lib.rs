//! hyperrpc-http — reqwest-backed transports for HyperSDK nodes.
//!
//! - [`HttpTransport`] — one JSON-RPC POST per call, hard request timeout
//! - [`FaucetHttpClient`] — plain `POST /faucet/{address}` drip requests

pub mod client;
pub mod faucet;

pub use client::{HttpTransport, HttpTransportConfig, DEFAULT_REQUEST_TIMEOUT};
pub use faucet::FaucetHttpClient;
