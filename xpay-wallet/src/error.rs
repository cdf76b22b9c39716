//! Wallet-specific failures, mapped to [`xpay_core::error::FailureKind`] at
//! the call boundary so the Router never has to know about key-storage
//! details.

use xpay_core::error::{FailureKind, PaymentError};

/// Errors a [`crate::Wallet`] operation can return.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// No signer is loaded; [`crate::Wallet::initialize`] was never called.
    #[error("wallet not initialized")]
    NotInitialized,
    /// A signing operation was already in flight when another was requested.
    ///
    /// §3's "single owner of key material" invariant also bars concurrent
    /// use of that material: two transfers signing at once could double
    /// spend the same nonce/sequence number.
    #[error("a signing operation is already in progress")]
    SignerBusy,
    /// The key file could not be read, written, or parsed.
    #[error("key storage error: {0}")]
    Storage(String),
    /// A chain-adapter call failed while servicing this wallet operation.
    #[error("chain error: {0}")]
    Chain(#[from] xpay_core::chain::ChainError),
}

impl From<WalletError> for PaymentError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::NotInitialized | WalletError::SignerBusy => {
                PaymentError::new(FailureKind::Internal, err.to_string())
            }
            WalletError::Storage(_) => PaymentError::new(FailureKind::Internal, err.to_string()),
            WalletError::Chain(chain_err) => match chain_err {
                xpay_core::chain::ChainError::RpcUnavailable(_) => {
                    PaymentError::new(FailureKind::Transient, chain_err.to_string())
                }
                xpay_core::chain::ChainError::InsufficientFunds { .. } => {
                    PaymentError::new(FailureKind::InsufficientFunds, chain_err.to_string())
                }
                xpay_core::chain::ChainError::Malformed(_) | xpay_core::chain::ChainError::Signer(_) => {
                    PaymentError::new(FailureKind::Internal, chain_err.to_string())
                }
            },
        }
    }
}
