//! Key custody for the x402 micropayment execution core (C4).
//!
//! [`Wallet`] is the sole owner of signing key material in this workspace;
//! every other crate reaches a signer only through the `&dyn
//! xpay_core::signer::Signer` a [`Wallet::transfer`] call hands to a chain
//! adapter, never directly.

pub mod error;
mod signer_account;
mod signer_evm;
mod storage;
mod wallet;

pub use error::WalletError;
pub use signer_account::AccountSigner;
pub use signer_evm::EvmSigner;
pub use wallet::Wallet;
