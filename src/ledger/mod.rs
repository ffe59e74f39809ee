// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! The ledger node boundary
//!
//! Everything the engine needs from a node goes through [`LedgerClient`]:
//! nonce lookup, simulation (`eth_call`), raw transaction submission, and
//! receipt lookup. Keeping the surface this small lets the engine run against
//! an alloy provider in production and an in-memory ledger in tests.
//!
//! - [`AlloyLedger`]: [`LedgerClient`] over any alloy `Provider<AnyNetwork>`
//! - [`FailoverLedger`]: primary plus standby endpoints

use alloy_primitives::{Address, Bytes, TxHash};
use alloy_rpc_types::{BlockId, TransactionRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::RpcError;

mod failover;
mod node;

pub use failover::FailoverLedger;
pub use node::AlloyLedger;

/// Result of an `eth_call` that reached the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// The call returned normally with this return data.
    Success(Bytes),
    /// The call reverted; carries the node's reason (e.g. `"execution reverted: 120601"`).
    Reverted(String),
}

/// The subset of a transaction receipt the engine reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Transaction hash
    pub transaction_hash: TxHash,
    /// Block the transaction was included in
    pub block_number: u64,
    /// `true` if execution succeeded
    pub status: bool,
    /// Address of the created contract, for deployments
    pub contract_address: Option<Address>,
    /// Gas consumed
    pub gas_used: u64,
}

/// Minimal async interface to a ledger node.
///
/// # Thread Safety
///
/// Implementations are shared across tasks behind an `Arc` and must be
/// `Send + Sync`.
///
/// # Error Handling
///
/// Contract reverts are data, not errors: [`call`](Self::call) returns
/// [`CallOutcome::Reverted`]. `Err` is reserved for transport failures and
/// node error responses.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Number of transactions sent from `account` (next nonce).
    async fn transaction_count(&self, account: Address) -> Result<u64, RpcError>;

    /// Execute a call against the state at `block` without creating a transaction.
    async fn call(
        &self,
        request: TransactionRequest,
        block: BlockId,
    ) -> Result<CallOutcome, RpcError>;

    /// Submit an EIP-2718 encoded signed transaction; returns its hash.
    async fn send_raw_transaction(&self, encoded: Bytes) -> Result<TxHash, RpcError>;

    /// Receipt for `tx_hash`, or `None` while it is not mined yet.
    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, RpcError>;

    /// Human readable endpoint label for logs.
    fn endpoint(&self) -> String;
}
