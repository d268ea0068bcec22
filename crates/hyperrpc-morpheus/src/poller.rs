//! Faucet polling session: top up an address and wait for the funds to land.
//!
//! State machine for one session:
//! ```text
//! Idle ─activate─▶ Checking ─balance > min─▶ Settled
//!                     │
//!                     └─▶ Dripping ─▶ Polling ─balance changed─▶ Settled
//!                                        └─budget spent─▶ Failed(exhausted)
//! any failed call ─▶ Failed(reason)
//! ```
//!
//! The published [`FaucetState`] carries a generation number. Each
//! activation bumps it, and a session only writes while its generation is
//! still current, so a superseded session can never overwrite newer state.
//! Superseded sessions are not aborted: in-flight calls (a drip in
//! particular) run to completion and their results are dropped.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use hyperrpc_core::{poll_until, Balance, FailureKind, PollOutcome, PollPolicy, RpcFailure, RpcTransport};

use crate::client::VmClient;

/// The two calls a faucet session needs.
#[async_trait]
pub trait FaucetBackend: Send + Sync + 'static {
    async fn balance(&self, address: &str) -> Result<Balance, RpcFailure>;
    async fn drip(&self, address: &str) -> Result<(), RpcFailure>;
}

#[async_trait]
impl<T: RpcTransport> FaucetBackend for VmClient<T> {
    async fn balance(&self, address: &str) -> Result<Balance, RpcFailure> {
        self.get_balance(address).await
    }

    async fn drip(&self, address: &str) -> Result<(), RpcFailure> {
        self.request_faucet_transfer(address).await
    }
}

/// Why a session stopped without settling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&RpcFailure> for SessionFailure {
    fn from(e: &RpcFailure) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// No address; nothing to do.
    Idle,
    Checking,
    Dripping,
    Polling,
    /// Funds are available. `dripped` is false when no drip was needed.
    Settled { balance: Balance, dripped: bool },
    Failed(SessionFailure),
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Checking => write!(f, "checking"),
            Self::Dripping => write!(f, "dripping"),
            Self::Polling => write!(f, "polling"),
            Self::Settled { .. } => write!(f, "settled"),
            Self::Failed(e) => write!(f, "failed ({})", e.kind),
        }
    }
}

/// What a consumer renders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaucetState {
    pub generation: u64,
    pub address: String,
    pub min_balance: Balance,
    pub status: SessionStatus,
}

impl FaucetState {
    fn initial() -> Self {
        Self {
            generation: 0,
            address: String::new(),
            min_balance: Balance::zero(),
            status: SessionStatus::Idle,
        }
    }

    pub fn loading(&self) -> bool {
        matches!(
            self.status,
            SessionStatus::Checking | SessionStatus::Dripping | SessionStatus::Polling
        )
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            SessionStatus::Failed(e) => Some(&e.message),
            _ => None,
        }
    }

    /// True when the consumer should show its wrapped content.
    pub fn is_ready(&self) -> bool {
        matches!(self.status, SessionStatus::Idle | SessionStatus::Settled { .. })
    }
}

/// One activation's worth of work, bound to a generation.
pub struct FaucetSession<B> {
    backend: Arc<B>,
    policy: PollPolicy,
    address: String,
    min_balance: Balance,
    generation: u64,
    state: Arc<watch::Sender<FaucetState>>,
}

impl<B: FaucetBackend> FaucetSession<B> {
    pub fn new(
        backend: Arc<B>,
        policy: PollPolicy,
        address: String,
        min_balance: Balance,
        generation: u64,
        state: Arc<watch::Sender<FaucetState>>,
    ) -> Self {
        Self {
            backend,
            policy,
            address,
            min_balance,
            generation,
            state,
        }
    }

    /// Write `status` if this session is still current.
    fn publish(&self, status: SessionStatus) -> bool {
        let generation = self.generation;
        self.state.send_if_modified(move |s| {
            if s.generation != generation {
                return false;
            }
            s.status = status;
            true
        })
    }

    /// Drive the session to a terminal status and return it.
    pub async fn run(self) -> SessionStatus {
        let status = match self.drive().await {
            Ok(status) => status,
            Err(e) => {
                if e.is_exhausted() {
                    tracing::warn!(address = %self.address, error = %e, "faucet: giving up");
                } else {
                    tracing::warn!(address = %self.address, error = %e, "faucet session failed");
                }
                SessionStatus::Failed(SessionFailure::from(&e))
            }
        };
        if !self.publish(status.clone()) {
            tracing::debug!(
                address = %self.address,
                generation = self.generation,
                "discarding result of superseded faucet session"
            );
        }
        status
    }

    async fn drive(&self) -> Result<SessionStatus, RpcFailure> {
        self.publish(SessionStatus::Checking);
        let initial = self.backend.balance(&self.address).await?;
        if initial > self.min_balance {
            tracing::info!(address = %self.address, balance = %initial, "faucet: balance sufficient, no drip");
            return Ok(SessionStatus::Settled {
                balance: initial,
                dripped: false,
            });
        }

        self.publish(SessionStatus::Dripping);
        self.backend.drip(&self.address).await?;
        tracing::info!(address = %self.address, "faucet: drip requested");

        self.publish(SessionStatus::Polling);
        let outcome = poll_until(
            &self.policy,
            || self.backend.balance(&self.address),
            |balance| *balance != initial,
        )
        .await?;

        match outcome {
            PollOutcome::Satisfied { value, attempts } => {
                tracing::info!(
                    address = %self.address,
                    from = %initial,
                    to = %value,
                    attempts,
                    "faucet: balance changed"
                );
                Ok(SessionStatus::Settled {
                    balance: value,
                    dripped: true,
                })
            }
            PollOutcome::Exhausted { attempts } => Err(RpcFailure::Exhausted { attempts }),
        }
    }
}

/// Owns the faucet state for one consumer and re-runs sessions as inputs change.
pub struct FaucetPoller<B> {
    backend: Arc<B>,
    policy: PollPolicy,
    state: Arc<watch::Sender<FaucetState>>,
}

impl<B: FaucetBackend> FaucetPoller<B> {
    pub fn new(backend: Arc<B>, policy: PollPolicy) -> Self {
        let (tx, _rx) = watch::channel(FaucetState::initial());
        Self {
            backend,
            policy,
            state: Arc::new(tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FaucetState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> FaucetState {
        self.state.borrow().clone()
    }

    /// Update the address and minimum balance.
    ///
    /// Returns `false` when both are unchanged. Otherwise the running session
    /// (if any) is superseded, and a new one starts unless `address` is empty.
    /// Must be called within a Tokio runtime.
    pub fn set_inputs(&mut self, address: impl Into<String>, min_balance: Balance) -> bool {
        let address = address.into();
        {
            let s = self.state.borrow();
            if s.address == address && s.min_balance == min_balance {
                return false;
            }
        }

        let active = !address.is_empty();
        let mut generation = 0;
        self.state.send_modify(|s| {
            s.generation += 1;
            generation = s.generation;
            s.address = address.clone();
            s.min_balance = min_balance.clone();
            s.status = if active {
                SessionStatus::Checking
            } else {
                SessionStatus::Idle
            };
        });

        if active {
            tracing::debug!(address = %address, min_balance = %min_balance, generation, "faucet: activating");
            let session = FaucetSession::new(
                self.backend.clone(),
                self.policy,
                address,
                min_balance,
                generation,
                self.state.clone(),
            );
            tokio::spawn(session.run());
        }
        true
    }

    /// Wait until the current session leaves its loading states.
    pub async fn wait_settled(&self) -> FaucetState {
        let mut rx = self.subscribe();
        // `self` owns the sender, so the channel cannot close while waiting.
        let _ = rx.wait_for(|s| !s.loading()).await;
        self.state()
    }
}
