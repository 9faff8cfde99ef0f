//! Settlement executor seam
//!
//! Finalizing an auction transfers ticket ownership on-chain. That call is
//! external, slow, and fallible; the closer treats it as a black box that
//! either returns a receipt or fails with no ownership transfer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use types::ids::{TicketId, WalletAddress};
use types::numeric::Amount;
use uuid::Uuid;

/// Per-invocation settlement intent id
///
/// Generated fresh for every close attempt so executors that support
/// deduplication can detect a retried call after a timeout. Executors
/// without that capability are free to ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettlementIntent(Uuid);

impl SettlementIntent {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SettlementIntent {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SettlementIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Proof of a completed settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    /// On-chain transaction hash
    pub tx_hash: String,
    /// Intent id this receipt answers
    pub intent: SettlementIntent,
}

/// Settlement failures
#[derive(Debug, Clone, Error)]
pub enum SettlementError {
    /// The chain rejected the transfer (reverted, insufficient funds, ...)
    #[error("settlement rejected: {0}")]
    Rejected(String),

    /// The executor could not reach the chain
    #[error("chain unavailable: {0}")]
    Unavailable(String),
}

/// Executes ownership transfer and payment for an accepted bid
#[async_trait]
pub trait SettlementExecutor: Send + Sync {
    async fn execute(
        &self,
        ticket: TicketId,
        buyer: WalletAddress,
        amount: Amount,
        intent: SettlementIntent,
    ) -> Result<SettlementReceipt, SettlementError>;
}

/// Development executor that settles instantly with a synthetic receipt
///
/// Stands in for the marketplace contract when no chain is configured.
pub struct DevExecutor;

#[async_trait]
impl SettlementExecutor for DevExecutor {
    async fn execute(
        &self,
        ticket: TicketId,
        buyer: WalletAddress,
        amount: Amount,
        intent: SettlementIntent,
    ) -> Result<SettlementReceipt, SettlementError> {
        tracing::debug!(%ticket, %buyer, %amount, %intent, "dev settlement");
        Ok(SettlementReceipt {
            tx_hash: format!("0x{}", Uuid::now_v7().simple()),
            intent,
        })
    }
}
