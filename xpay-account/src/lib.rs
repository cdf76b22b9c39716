//! The account-model (Solana-like) chain adapter.
//!
//! Implements [`xpay_core::chain::ChainAdapter`] by reducing every RPC
//! response to the chain-agnostic balance deltas `xpay-verifier` checks
//! against, instead of the instruction-level parsing `r402-svm` does for its
//! richer payment-authorization scheme.

mod adapter;
mod deltas;
mod programs;
mod signer_bridge;

pub use adapter::AccountChainAdapter;
