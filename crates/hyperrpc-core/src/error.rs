//! Failure types shared by the transport, the VM client and the faucet poller.

use thiserror::Error;

/// Every way a client operation can fail.
#[derive(Debug, Error)]
pub enum RpcFailure {
    /// The request did not complete within the transport's time budget.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// The node reported an application error in the envelope.
    #[error("{0}")]
    Rpc(String),

    /// Network failure, unreadable body, or any non-timeout abort.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The faucet endpoint answered with a non-2xx status.
    #[error("Faucet request failed: HTTP {status}")]
    FaucetRequestFailed { status: u16 },

    /// Polling used its whole budget without observing the expected change.
    #[error("Gave up after {attempts} polls without a balance change")]
    Exhausted { attempts: u32 },

    /// The envelope's `result` could not be read as the expected type.
    #[error("Unexpected result shape: {0}")]
    Decode(String),
}

/// Discriminant of [`RpcFailure`], cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Timeout,
    Rpc,
    Transport,
    FaucetRequestFailed,
    Exhausted,
    Decode,
}

impl RpcFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Rpc(_) => FailureKind::Rpc,
            Self::Transport(_) => FailureKind::Transport,
            Self::FaucetRequestFailed { .. } => FailureKind::FaucetRequestFailed,
            Self::Exhausted { .. } => FailureKind::Exhausted,
            Self::Decode(_) => FailureKind::Decode,
        }
    }

    /// Returns `true` for a policy give-up rather than a failed call.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Rpc => write!(f, "rpc"),
            Self::Transport => write!(f, "transport"),
            Self::FaucetRequestFailed => write!(f, "faucet-request-failed"),
            Self::Exhausted => write!(f, "exhausted"),
            Self::Decode => write!(f, "decode"),
        }
    }
}

impl From<serde_json::Error> for RpcFailure {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_message_passes_through_verbatim() {
        let err = RpcFailure::Rpc("invalid address".into());
        assert_eq!(err.to_string(), "invalid address");
        assert_eq!(err.kind(), FailureKind::Rpc);
    }

    #[test]
    fn timeout_is_human_readable() {
        let err = RpcFailure::Timeout { ms: 3000 };
        assert_eq!(err.to_string(), "Request timed out after 3000ms");
    }

    #[test]
    fn only_exhausted_is_a_give_up() {
        assert!(RpcFailure::Exhausted { attempts: 100 }.is_exhausted());
        assert!(!RpcFailure::FaucetRequestFailed { status: 429 }.is_exhausted());
    }
}
