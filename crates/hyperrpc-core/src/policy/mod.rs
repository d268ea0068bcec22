//! Policy engine — bounded waiting for remote state to change.
//!
//! Transports never retry. The only retry loop lives here and is driven by
//! callers that expect eventual consistency, e.g. waiting for a faucet drip
//! to show up in a balance.

pub mod poll;

pub use poll::{poll_until, PollOutcome, PollPolicy};
