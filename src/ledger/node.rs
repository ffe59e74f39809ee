// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! [`LedgerClient`] implementation over an alloy provider.

use alloy_json_rpc::ErrorPayload;
use alloy_network::{AnyNetwork, ReceiptResponse};
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_provider::Provider;
use alloy_rpc_types::serde_helpers::WithOtherFields;
use alloy_rpc_types::{BlockId, TransactionRequest};
use alloy_sol_types::{Revert, SolError};
use alloy_transport::TransportError;
use async_trait::async_trait;
use tracing::trace;

use super::{CallOutcome, LedgerClient, Receipt};
use crate::errors::RpcError;
use crate::revert::REVERT_PREFIX;

/// A [`LedgerClient`] backed by an alloy `Provider<AnyNetwork>`.
///
/// # Example
///
/// ```rust,ignore
/// use tokenops::ledger::AlloyLedger;
/// use tokenops::provider::create_http_provider;
///
/// let provider = create_http_provider(&config.ledger.url, &config.ledger)?;
/// let ledger = AlloyLedger::new(provider, config.ledger.url.clone());
/// ```
#[derive(Debug, Clone)]
pub struct AlloyLedger<P> {
    provider: P,
    endpoint: String,
}

impl<P> AlloyLedger<P>
where
    P: Provider<AnyNetwork>,
{
    /// Wraps `provider`; `endpoint` is only used in logs.
    pub fn new(provider: P, endpoint: impl Into<String>) -> Self {
        Self {
            provider,
            endpoint: endpoint.into(),
        }
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P> LedgerClient for AlloyLedger<P>
where
    P: Provider<AnyNetwork> + Send + Sync,
{
    async fn transaction_count(&self, account: Address) -> Result<u64, RpcError> {
        self.provider
            .get_transaction_count(account)
            .pending()
            .await
            .map_err(|e| map_transport_error("eth_getTransactionCount", e))
    }

    async fn call(
        &self,
        request: TransactionRequest,
        block: BlockId,
    ) -> Result<CallOutcome, RpcError> {
        match self
            .provider
            .call(WithOtherFields::new(request))
            .block(block)
            .await
        {
            Ok(data) => Ok(CallOutcome::Success(data)),
            Err(err) => match err.as_error_resp().and_then(revert_reason) {
                Some(reason) => {
                    trace!(endpoint = %self.endpoint, reason = %reason, "eth_call reverted");
                    Ok(CallOutcome::Reverted(reason))
                }
                None => Err(map_transport_error("eth_call", err)),
            },
        }
    }

    async fn send_raw_transaction(&self, encoded: Bytes) -> Result<TxHash, RpcError> {
        let pending = self
            .provider
            .send_raw_transaction(&encoded)
            .await
            .map_err(|e| map_transport_error("eth_sendRawTransaction", e))?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, RpcError> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| map_transport_error("eth_getTransactionReceipt", e))?;

        // A receipt without a block number is still pending on some nodes.
        Ok(receipt.and_then(|r| {
            r.block_number().map(|block_number| Receipt {
                transaction_hash: r.transaction_hash(),
                block_number,
                status: r.status(),
                contract_address: r.contract_address(),
                gas_used: r.gas_used(),
            })
        }))
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }
}

/// Extracts a revert reason from a JSON-RPC error payload.
///
/// Nodes either put the reason in the message (`"execution reverted: 120601"`)
/// or return a bare `"execution reverted"` with ABI-encoded `Error(string)`
/// data. Both are normalized to the message form.
fn revert_reason(payload: &ErrorPayload) -> Option<String> {
    let message = payload.message.as_ref();
    if !message.starts_with(REVERT_PREFIX) {
        return None;
    }
    if message.len() > REVERT_PREFIX.len() {
        return Some(message.to_string());
    }
    let decoded = payload
        .as_revert_data()
        .and_then(|data| Revert::abi_decode(&data).ok());
    Some(match decoded {
        Some(revert) => format!("{REVERT_PREFIX}: {}", revert.reason),
        None => message.to_string(),
    })
}

/// Maps an alloy transport error into the engine's RPC error.
fn map_transport_error(operation: &str, err: TransportError) -> RpcError {
    match err.as_error_resp() {
        Some(payload) => RpcError::ErrorResponse {
            operation: operation.to_string(),
            code: payload.code,
            message: payload.message.to_string(),
        },
        None => RpcError::chain_connection_failed(operation, err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(message: &str) -> ErrorPayload {
        ErrorPayload {
            code: 3,
            message: message.to_string().into(),
            data: None,
        }
    }

    #[test]
    fn test_revert_reason_from_message() {
        assert_eq!(
            revert_reason(&payload("execution reverted: 120601")),
            Some("execution reverted: 120601".to_string())
        );
    }

    #[test]
    fn test_bare_revert_without_data() {
        assert_eq!(
            revert_reason(&payload("execution reverted")),
            Some("execution reverted".to_string())
        );
    }

    #[test]
    fn test_non_revert_error_is_not_a_reason() {
        assert_eq!(revert_reason(&payload("nonce too low")), None);
    }
}
