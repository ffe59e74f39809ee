// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Contract bindings for security tokens and their satellite contracts
//!
//! The `sol!` macro generates one call struct per function (e.g.
//! `ISecurityToken::transferFromCall`) with `abi_encode` for building call
//! data and `abi_decode_returns` for reading results, plus a `*Calls` enum
//! per interface for selector-based decoding.
//!
//! - [`ISecurityToken`]: functions every security token exposes (transfers,
//!   issuance, redemption, locks, transfer approvals, common attributes)
//! - [`IStraightBond`]: bond-specific attributes and setters
//! - [`IShare`]: share-specific attributes and setters
//! - [`IExchange`]: balances an exchange holds on behalf of an account
//! - [`ISecurityTokenEscrow`]: escrow-side transfer approval
//!
//! # Example: Encoding a forced transfer
//!
//! ```rust
//! use alloy_primitives::{address, U256};
//! use alloy_sol_types::SolCall;
//! use tokenops::contracts::ISecurityToken;
//!
//! let call = ISecurityToken::transferFromCall {
//!     from: address!("1111111111111111111111111111111111111111"),
//!     to: address!("2222222222222222222222222222222222222222"),
//!     value: U256::from(10),
//! };
//! let input = call.abi_encode();
//! assert_eq!(&input[..4], &ISecurityToken::transferFromCall::SELECTOR);
//! ```

use alloy_sol_types::sol;

sol! {
    #[sol(all_derives)]
    interface ISecurityToken {
        // Transfers
        function transferFrom(address from, address to, uint256 value) external returns (bool);
        function bulkTransferFrom(address[] fromList, address[] toList, uint256[] valueList) external returns (bool);
        function bulkTransfer(address[] toList, uint256[] valueList) external returns (bool);

        // Issuance and redemption
        function issueFrom(address targetAddress, address lockAddress, uint256 amount) external;
        function bulkIssueFrom(address[] targetAddressList, address[] lockAddressList, uint256[] amounts) external;
        function redeemFrom(address targetAddress, address lockAddress, uint256 amount) external;
        function bulkRedeemFrom(address[] targetAddressList, address[] lockAddressList, uint256[] amounts) external;

        // Locks
        function lock(address lockAddress, uint256 value, string data) external;
        function forceLock(address lockAddress, address accountAddress, uint256 value, string data) external;
        function forceUnlock(address lockAddress, address accountAddress, address recipientAddress, uint256 value, string data) external;
        function forceChangeLockedAccount(address lockAddress, address beforeAccountAddress, address afterAccountAddress, uint256 value, string data) external;
        function lockedOf(address lockAddress, address accountAddress) external view returns (uint256);

        // Transfer approvals
        function approveTransfer(uint256 index, string data) external;
        function cancelTransfer(uint256 index, string data) external;
        function applicationsForTransfer(uint256 index) external view returns (address from, address to, uint256 amount, bool valid);

        // Balances
        function balanceOf(address account) external view returns (uint256);

        // Common attributes
        function owner() external view returns (address);
        function name() external view returns (string);
        function symbol() external view returns (string);
        function totalSupply() external view returns (uint256);
        function tradableExchange() external view returns (address);
        function contactInformation() external view returns (string);
        function privacyPolicy() external view returns (string);
        function status() external view returns (bool);
        function personalInfoAddress() external view returns (address);
        function requirePersonalInfoRegistered() external view returns (bool);
        function transferable() external view returns (bool);
        function isOffering() external view returns (bool);
        function transferApprovalRequired() external view returns (bool);
        function memo() external view returns (string);

        // Common setters
        function setTradableExchange(address exchange) external;
        function setPersonalInfoAddress(address personalInfo) external;
        function setRequirePersonalInfoRegistered(bool required) external;
        function setContactInformation(string contactInformation) external;
        function setPrivacyPolicy(string privacyPolicy) external;
        function setStatus(bool status) external;
        function setTransferable(bool transferable) external;
        function changeOfferingStatus(bool isOffering) external;
        function setTransferApprovalRequired(bool required) external;
        function setMemo(string memo) external;
    }

    #[sol(all_derives)]
    interface IStraightBond {
        function faceValue() external view returns (uint256);
        function faceValueCurrency() external view returns (string);
        function interestRate() external view returns (uint256);
        function interestPaymentCurrency() external view returns (string);
        function interestPaymentDate() external view returns (string);
        function redemptionDate() external view returns (string);
        function redemptionValue() external view returns (uint256);
        function redemptionValueCurrency() external view returns (string);
        function returnDate() external view returns (string);
        function returnAmount() external view returns (string);
        function baseFXRate() external view returns (string);
        function purpose() external view returns (string);
        function isRedeemed() external view returns (bool);

        function setFaceValue(uint256 faceValue) external;
        function setFaceValueCurrency(string currency) external;
        function setPurpose(string purpose) external;
        function setInterestRate(uint256 interestRate) external;
        function setInterestPaymentDate(string interestPaymentDate) external;
        function setInterestPaymentCurrency(string currency) external;
        function setRedemptionValue(uint256 redemptionValue) external;
        function setRedemptionValueCurrency(string currency) external;
        function setRedemptionDate(string redemptionDate) external;
        function setBaseFXRate(string baseFXRate) external;
        function changeToRedeemed() external;
    }

    #[sol(all_derives)]
    interface IShare {
        function issuePrice() external view returns (uint256);
        function cancellationDate() external view returns (string);
        function principalValue() external view returns (uint256);
        function isCanceled() external view returns (bool);
        function dividendInformation() external view returns (uint256 dividends, string dividendRecordDate, string dividendPaymentDate);

        function setDividendInformation(uint256 dividends, string dividendRecordDate, string dividendPaymentDate) external;
        function setCancellationDate(string cancellationDate) external;
        function setPrincipalValue(uint256 principalValue) external;
        function changeToCanceled() external;
    }

    #[sol(all_derives)]
    interface IExchange {
        function balanceOf(address account, address token) external view returns (uint256);
        function commitmentOf(address account, address token) external view returns (uint256);
    }

    #[sol(all_derives)]
    interface ISecurityTokenEscrow {
        function approveTransfer(uint256 escrowId, string data) external;
    }
}
