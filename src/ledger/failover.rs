// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Primary/standby endpoint failover.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alloy_primitives::{Address, Bytes, TxHash};
use alloy_rpc_types::{BlockId, TransactionRequest};
use async_trait::async_trait;
use tracing::{info, warn};

use super::{CallOutcome, LedgerClient, Receipt};
use crate::errors::RpcError;

/// A [`LedgerClient`] that moves to the next endpoint when the active one is unreachable.
///
/// Reads (`transaction_count`, `call`, `transaction_receipt`) are retried on
/// the following endpoints after a connection failure, and the endpoint that
/// answered becomes active. `send_raw_transaction` is attempted on the active
/// endpoint only: resending to another node after an ambiguous transport
/// failure could broadcast the same transaction twice.
pub struct FailoverLedger {
    endpoints: Vec<Arc<dyn LedgerClient>>,
    active: AtomicUsize,
}

impl FailoverLedger {
    /// Creates a failover client; the first endpoint starts active.
    ///
    /// Returns `None` when `endpoints` is empty.
    pub fn new(endpoints: Vec<Arc<dyn LedgerClient>>) -> Option<Self> {
        if endpoints.is_empty() {
            return None;
        }
        Some(Self {
            endpoints,
            active: AtomicUsize::new(0),
        })
    }

    /// Index of the endpoint currently in use.
    pub fn active_index(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    fn active_endpoint(&self) -> &Arc<dyn LedgerClient> {
        &self.endpoints[self.active_index() % self.endpoints.len()]
    }

    /// Runs `op` against each endpoint starting at the active one until one
    /// answers without a connection failure.
    async fn with_failover<T, F, Fut>(
        &self,
        operation: &'static str,
        op: F,
    ) -> Result<T, RpcError>
    where
        F: Fn(Arc<dyn LedgerClient>) -> Fut,
        Fut: std::future::Future<Output = Result<T, RpcError>>,
    {
        let start = self.active_index();
        let count = self.endpoints.len();

        for offset in 0..count {
            let index = (start + offset) % count;
            let endpoint = self.endpoints[index].clone();
            match op(endpoint.clone()).await {
                Err(err) if err.is_connection_failure() => {
                    warn!(
                        endpoint = %endpoint.endpoint(),
                        operation,
                        error = %err,
                        "Ledger endpoint unreachable, trying next"
                    );
                }
                result => {
                    if index != start {
                        self.active.store(index, Ordering::Relaxed);
                        info!(endpoint = %endpoint.endpoint(), "Switched active ledger endpoint");
                    }
                    return result;
                }
            }
        }

        Err(RpcError::NoEndpointAvailable {
            operation: operation.to_string(),
            attempted: count,
        })
    }
}

#[async_trait]
impl LedgerClient for FailoverLedger {
    async fn transaction_count(&self, account: Address) -> Result<u64, RpcError> {
        self.with_failover("eth_getTransactionCount", |endpoint| async move {
            endpoint.transaction_count(account).await
        })
        .await
    }

    async fn call(
        &self,
        request: TransactionRequest,
        block: BlockId,
    ) -> Result<CallOutcome, RpcError> {
        self.with_failover("eth_call", |endpoint| {
            let request = request.clone();
            async move { endpoint.call(request, block).await }
        })
        .await
    }

    async fn send_raw_transaction(&self, encoded: Bytes) -> Result<TxHash, RpcError> {
        self.active_endpoint().send_raw_transaction(encoded).await
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, RpcError> {
        self.with_failover("eth_getTransactionReceipt", |endpoint| async move {
            endpoint.transaction_receipt(tx_hash).await
        })
        .await
    }

    fn endpoint(&self) -> String {
        self.active_endpoint().endpoint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    struct StubLedger {
        name: &'static str,
        reachable: bool,
        calls: AtomicU32,
    }

    impl StubLedger {
        fn new(name: &'static str, reachable: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                reachable,
                calls: AtomicU32::new(0),
            })
        }

        fn check(&self) -> Result<(), RpcError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.reachable {
                Ok(())
            } else {
                Err(RpcError::chain_connection_failed(
                    "stub",
                    std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "down"),
                ))
            }
        }
    }

    #[async_trait]
    impl LedgerClient for StubLedger {
        async fn transaction_count(&self, _account: Address) -> Result<u64, RpcError> {
            self.check().map(|_| 7)
        }

        async fn call(
            &self,
            _request: TransactionRequest,
            _block: BlockId,
        ) -> Result<CallOutcome, RpcError> {
            self.check().map(|_| CallOutcome::Success(Bytes::new()))
        }

        async fn send_raw_transaction(&self, _encoded: Bytes) -> Result<TxHash, RpcError> {
            self.check().map(|_| TxHash::ZERO)
        }

        async fn transaction_receipt(
            &self,
            _tx_hash: TxHash,
        ) -> Result<Option<Receipt>, RpcError> {
            self.check().map(|_| None)
        }

        fn endpoint(&self) -> String {
            self.name.to_string()
        }
    }

    #[test]
    fn test_empty_endpoint_list_is_rejected() {
        assert!(FailoverLedger::new(Vec::new()).is_none());
    }

    #[tokio::test]
    async fn test_read_moves_to_standby() {
        let primary = StubLedger::new("primary", false);
        let standby = StubLedger::new("standby", true);
        let endpoints = vec![
            primary.clone() as Arc<dyn LedgerClient>,
            standby.clone() as Arc<dyn LedgerClient>,
        ];
        let ledger = FailoverLedger::new(endpoints).expect("non-empty endpoint list");

        let nonce = ledger
            .transaction_count(Address::ZERO)
            .await
            .expect("standby should answer");

        assert_eq!(nonce, 7);
        assert_eq!(ledger.active_index(), 1, "standby should become active");
        assert_eq!(ledger.endpoint(), "standby");
    }

    #[tokio::test]
    async fn test_send_is_not_retried_on_other_endpoints() {
        let primary = StubLedger::new("primary", false);
        let standby = StubLedger::new("standby", true);
        let endpoints = vec![
            primary.clone() as Arc<dyn LedgerClient>,
            standby.clone() as Arc<dyn LedgerClient>,
        ];
        let ledger = FailoverLedger::new(endpoints).expect("non-empty endpoint list");

        let result = ledger.send_raw_transaction(Bytes::new()).await;

        assert!(result.is_err());
        assert_eq!(standby.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_endpoints_down() {
        let endpoints = vec![
            StubLedger::new("a", false) as Arc<dyn LedgerClient>,
            StubLedger::new("b", false) as Arc<dyn LedgerClient>,
        ];
        let ledger = FailoverLedger::new(endpoints).expect("non-empty endpoint list");

        let err = ledger
            .transaction_receipt(TxHash::ZERO)
            .await
            .expect_err("no endpoint is reachable");

        assert!(matches!(err, RpcError::NoEndpointAvailable { attempted: 2, .. }));
    }
}
