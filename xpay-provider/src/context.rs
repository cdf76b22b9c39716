//! The per-call context a [`crate::provider::Provider`] needs to submit a
//! payment: the wallet that signs it, the chain adapter it submits through.

use std::time::Instant;

use xpay_core::chain::ChainAdapter;
use xpay_wallet::Wallet;

/// Bundles the caller-supplied dependencies for one payment attempt.
///
/// Built fresh by the [`crate::router::Router`] for every provider tried,
/// rather than stored on the `Router` itself — the wallet and adapter are the
/// caller's, not the router's, to own.
pub struct ExecutionContext<'a> {
    /// The wallet signing and submitting this payment.
    pub wallet: &'a Wallet,
    /// The chain adapter the payment is submitted through.
    pub adapter: &'a dyn ChainAdapter,
    /// The deadline by which the submitted transaction must finalize.
    pub deadline: Instant,
}
