//! The closed provider variant set (§4.2, REDESIGN FLAG in §9): "Provider
//! selection logic used string comparison / dynamic dispatch keyed on a
//! provider 'type' string... Replaced by a closed enum (`Facilitator` |
//! `Direct`); callers match exhaustively instead of `if provider.kind() ==
//! "facilitator"`."

use xpay_core::chain::{ChainAdapter, TxId};
use xpay_core::error::PaymentError;
use xpay_core::health::ProviderHealth;
use xpay_core::payment::{PaymentIntent, ProviderTag};

use crate::context::ExecutionContext;
use crate::direct::DirectProvider;
use crate::facilitator::FacilitatorProvider;

/// One of the two ways a payment can be submitted.
///
/// Closed by construction: there is no third variant and no way to register
/// one at runtime, so every `match` on a `Provider` (or its [`ProviderTag`])
/// is exhaustive.
pub enum Provider {
    /// A remote facilitator service submits the transfer.
    Facilitator(FacilitatorProvider),
    /// The caller's own wallet submits the transfer.
    Direct(DirectProvider),
}

impl Provider {
    /// The tag identifying which variant this is, for health-cache keys and
    /// [`xpay_core::payment::ExecutionResult::provider`] reporting.
    #[must_use]
    pub const fn tag(&self) -> ProviderTag {
        match self {
            Self::Facilitator(_) => ProviderTag::Facilitator,
            Self::Direct(_) => ProviderTag::Direct,
        }
    }

    /// Submits `intent` through this provider, returning the id of the
    /// (not yet verified) submitted transaction.
    ///
    /// # Errors
    ///
    /// Returns whatever the underlying variant's submission fails with.
    pub async fn submit(&self, intent: &PaymentIntent, ctx: &ExecutionContext<'_>) -> Result<TxId, PaymentError> {
        match self {
            Self::Facilitator(p) => p.submit(intent, ctx).await,
            Self::Direct(p) => p.submit(intent, ctx).await,
        }
    }

    /// Probes this provider's current liveness (§4.2, §4.4): for
    /// `Facilitator`, the facilitator's own uptime plus the chain tip; for
    /// `Direct`, the chain tip alone.
    pub async fn health(&self, adapter: &dyn ChainAdapter) -> ProviderHealth {
        match self {
            Self::Facilitator(p) => p.check_health(adapter).await,
            Self::Direct(p) => p.check_health(adapter).await,
        }
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Facilitator(p) => f.debug_tuple("Provider::Facilitator").field(p).finish(),
            Self::Direct(p) => f.debug_tuple("Provider::Direct").field(p).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn tag_matches_variant() {
        let config = xpay_core::config::ProviderConfig {
            max_payment_value: xpay_core::amount::Amount::from_base_units(u128::MAX),
            facilitator_url: None,
            request_timeout: Duration::from_secs(5),
        };
        assert_eq!(Provider::Direct(DirectProvider::new(config)).tag(), ProviderTag::Direct);
    }
}
