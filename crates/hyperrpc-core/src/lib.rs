//! hyperrpc-core — foundation traits and types for HyperSDK JSON-RPC clients.
//!
//! # Overview
//!
//! A HyperSDK node serves two JSON-RPC namespaces per chain: the generic
//! `coreapi` namespace (`hypersdk.*` methods) and a VM-specific namespace
//! (`<vm>.*` methods). This crate defines:
//!
//! - [`RpcTransport`] — the async trait every transport implements
//! - [`JsonRpcRequest`] / [`RpcEnvelope`] — wire types
//! - [`EndpointIdentity`] — which node and VM a transport talks to
//! - [`RpcFailure`] — the single failure channel for every operation
//! - [`Balance`] — exact, arbitrary-precision currency amounts
//! - [`policy`] module — bounded "poll until" utility

pub mod balance;
pub mod endpoint;
pub mod error;
pub mod policy;
pub mod request;
pub mod transport;

pub use balance::Balance;
pub use endpoint::EndpointIdentity;
pub use error::{FailureKind, RpcFailure};
pub use policy::{poll_until, PollOutcome, PollPolicy};
pub use request::{JsonRpcRequest, RpcEnvelope, RpcErrorObject, RpcParams};
pub use transport::RpcTransport;
