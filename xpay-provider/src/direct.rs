//! The direct-transfer provider (§4.2): the Wallet signs and submits the
//! transfer itself, with no third-party facilitator in the loop.

use tracing::instrument;

use xpay_core::amount::Amount;
use xpay_core::chain::{ChainAdapter, TxId};
use xpay_core::config::ProviderConfig;
use xpay_core::error::PaymentError;
use xpay_core::health::ProviderHealth;
use xpay_core::payment::PaymentIntent;

use crate::context::ExecutionContext;

/// Submits payments straight from the caller's own [`xpay_wallet::Wallet`].
#[derive(Debug, Clone, Copy)]
pub struct DirectProvider {
    max_payment_value: Amount,
}

impl DirectProvider {
    /// Builds a provider enforcing `config.max_payment_value` as its own
    /// ceiling, independent of whatever ceiling the caller already checked.
    #[must_use]
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            max_payment_value: config.max_payment_value,
        }
    }

    /// Signs and submits `intent`'s requirement through `ctx`'s wallet and
    /// adapter, returning the id of the submitted (not yet verified)
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`FailureKind::PriceCeiling`](xpay_core::error::FailureKind::PriceCeiling)
    /// if the requirement exceeds this provider's own configured ceiling
    /// (§4.4's defense-in-depth check, independent of the Client Engine's own
    /// ceiling check). Otherwise returns whatever
    /// [`xpay_wallet::Wallet::transfer`] returns, mapped to a
    /// [`PaymentError`].
    #[instrument(skip(self, intent, ctx))]
    pub async fn submit(&self, intent: &PaymentIntent, ctx: &ExecutionContext<'_>) -> Result<TxId, PaymentError> {
        let requirement = &intent.requirement;
        if requirement.max_amount_required > self.max_payment_value {
            tracing::warn!(
                required = %requirement.max_amount_required,
                ceiling = %self.max_payment_value,
                "requirement exceeds this provider's configured ceiling"
            );
            return Err(PaymentError::price_ceiling(format!(
                "required {} exceeds this provider's configured ceiling {}",
                requirement.max_amount_required, self.max_payment_value
            )));
        }
        ctx.wallet
            .transfer(ctx.adapter, requirement.pay_to, &requirement.asset, requirement.max_amount_required)
            .await
            .map_err(PaymentError::from)
    }

    /// Healthy iff `adapter` answers its own health probe (§4.4: "same tip
    /// health-check" as the facilitator path, minus the HTTP dependency).
    pub async fn check_health(&self, adapter: &dyn ChainAdapter) -> ProviderHealth {
        match adapter.probe_health().await {
            Ok(()) => ProviderHealth::observed(true, None),
            Err(e) => ProviderHealth::observed(false, Some(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use xpay_core::address::Address;
    use xpay_core::asset::Asset;
    use xpay_core::network::Network;
    use xpay_core::payment::PaymentRequirement;
    use xpay_core::signer::Signer;
    use xpay_wallet::Wallet;

    fn config(max_payment_value: u128) -> ProviderConfig {
        ProviderConfig {
            max_payment_value: Amount::from_base_units(max_payment_value),
            facilitator_url: None,
            request_timeout: Duration::from_secs(5),
        }
    }

    struct UnreachableAdapter;

    impl ChainAdapter for UnreachableAdapter {
        fn network(&self) -> Network {
            Network::AccountMain
        }
        fn fetch_transaction(
            &self,
            _tx_id: &xpay_core::chain::TxId,
        ) -> xpay_core::chain::BoxFuture<'_, Result<Option<xpay_core::chain::ParsedTransaction>, xpay_core::chain::ChainError>> {
            Box::pin(async { panic!("not reached") })
        }
        fn balance(&self, _owner: Address, _asset: &Asset) -> xpay_core::chain::BoxFuture<'_, Result<Amount, xpay_core::chain::ChainError>> {
            Box::pin(async { panic!("not reached") })
        }
        fn transfer(
            &self,
            _signer: &dyn Signer,
            _to: Address,
            _asset: &Asset,
            _amount: Amount,
        ) -> xpay_core::chain::BoxFuture<'_, Result<TxId, xpay_core::chain::ChainError>> {
            Box::pin(async { panic!("not reached") })
        }
        fn probe_health(&self) -> xpay_core::chain::BoxFuture<'_, Result<(), xpay_core::chain::ChainError>> {
            Box::pin(async { panic!("not reached") })
        }
    }

    fn temp_wallet() -> Wallet {
        let dir = std::env::temp_dir().join(format!("xpay-direct-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        Wallet::new(xpay_core::config::WalletConfig {
            key_path: dir.join("wallet.key"),
        })
    }

    #[tokio::test]
    async fn submit_rejects_requirement_above_its_own_ceiling() {
        let provider = DirectProvider::new(config(100));
        let wallet = temp_wallet();
        wallet.initialize(xpay_core::network::NetworkFamily::Account).await.unwrap();
        let adapter = UnreachableAdapter;
        let ctx = ExecutionContext {
            wallet: &wallet,
            adapter: &adapter,
            deadline: std::time::Instant::now() + Duration::from_secs(1),
        };
        let requirement = PaymentRequirement {
            network: Network::AccountMain,
            pay_to: Address::Account([7u8; 32]),
            max_amount_required: Amount::from_base_units(1_000),
            asset: Asset::native(9, "SOL"),
        };
        let intent = PaymentIntent::new(requirement, Amount::from_base_units(1_000)).unwrap();
        let err = provider.submit(&intent, &ctx).await.unwrap_err();
        assert_eq!(err.kind, xpay_core::error::FailureKind::PriceCeiling);
    }
}
