//! The EVM chain adapter, stubbed to the same [`xpay_core::chain::ChainAdapter`]
//! contract the account-model adapter implements (§1).

mod adapter;
mod events;
mod rlp;
mod rpc;

pub use adapter::EvmChainAdapter;
