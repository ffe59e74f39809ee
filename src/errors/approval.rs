// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for transfer application state transitions.

use alloy_primitives::U256;

use crate::approval::ApprovalState;

/// A transition was requested on an application that already reached a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Transfer application {application_id} is already {state}")]
pub struct ApprovalStateError {
    /// Contract-assigned application id
    pub application_id: U256,
    /// State the application is in
    pub state: ApprovalState,
}
