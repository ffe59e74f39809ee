// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! View calls against token and satellite contracts
//!
//! Getters are read with `eth_call` at the latest block. A getter that
//! reverts or returns undecodable data yields `None` and the caller falls
//! back to the attribute's default; only transport failures are errors.

use alloy_primitives::Address;
use alloy_rpc_types::{BlockId, TransactionInput, TransactionRequest};
use alloy_sol_types::SolCall;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::errors::ReadError;
use crate::ledger::{CallOutcome, LedgerClient};

/// Issues view calls against one contract, at most `concurrency` in flight.
pub(crate) struct ContractReader<'a> {
    ledger: &'a dyn LedgerClient,
    contract: Address,
    operation: &'static str,
    permits: Semaphore,
}

impl<'a> ContractReader<'a> {
    pub(crate) fn new(
        ledger: &'a dyn LedgerClient,
        contract: Address,
        operation: &'static str,
        concurrency: usize,
    ) -> Self {
        Self {
            ledger,
            contract,
            operation,
            permits: Semaphore::new(concurrency.max(1)),
        }
    }

    /// Calls `call`; `None` if it reverted or its return data did not decode.
    pub(crate) async fn get<C: SolCall>(&self, call: C) -> Result<Option<C::Return>, ReadError> {
        // The semaphore is never closed; a failed acquire only drops the limit.
        let _permit = self.permits.acquire().await.ok();

        let request = TransactionRequest::default()
            .to(self.contract)
            .input(TransactionInput::new(call.abi_encode().into()));
        let outcome = self
            .ledger
            .call(request, BlockId::latest())
            .await
            .map_err(|e| ReadError::service_unavailable(self.operation, self.contract, e))?;

        match outcome {
            CallOutcome::Success(data) => match C::abi_decode_returns(&data) {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    debug!(contract = %self.contract, getter = C::SIGNATURE, error = %e, "Getter returned undecodable data");
                    Ok(None)
                }
            },
            CallOutcome::Reverted(reason) => {
                debug!(contract = %self.contract, getter = C::SIGNATURE, reason = %reason, "Getter reverted");
                Ok(None)
            }
        }
    }

    /// Calls `call`, substituting `default` for a revert or decode failure.
    pub(crate) async fn get_or<C: SolCall>(
        &self,
        call: C,
        default: C::Return,
    ) -> Result<C::Return, ReadError> {
        Ok(self.get(call).await?.unwrap_or(default))
    }
}
