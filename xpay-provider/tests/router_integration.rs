//! End-to-end Router tests: a direct-transfer payment against an in-memory
//! [`ChainAdapter`] fake, exercising health caching, submission, and
//! independent on-chain re-verification together.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use xpay_core::address::Address;
use xpay_core::amount::Amount;
use xpay_core::asset::Asset;
use xpay_core::chain::{AccountBalanceDelta, BoxFuture, ChainAdapter, ChainError, ParsedTransaction, TxId};
use xpay_core::config::{ProviderConfig, RouterConfig, WalletConfig};
use xpay_core::network::{Network, NetworkFamily};
use xpay_core::payment::{Outcome, PaymentIntent, PaymentRequirement, ProviderTag};
use xpay_core::signer::Signer;
use xpay_provider::{DirectProvider, Provider, Router};
use xpay_wallet::Wallet;

/// A fake adapter that records one submitted transfer and reports it
/// finalized with the expected delta as soon as it's asked about.
struct FakeAdapter {
    network: Network,
    pay_to: Address,
    amount: Amount,
    submitted: Mutex<Option<TxId>>,
}

impl ChainAdapter for FakeAdapter {
    fn network(&self) -> Network {
        self.network
    }

    fn fetch_transaction(&self, tx_id: &TxId) -> BoxFuture<'_, Result<Option<ParsedTransaction>, ChainError>> {
        let tx_id = tx_id.clone();
        Box::pin(async move {
            Ok(Some(ParsedTransaction {
                tx_id,
                finalized: true,
                token_deltas: Vec::new(),
                account_deltas: vec![AccountBalanceDelta {
                    owner: self.pay_to,
                    delta: i128::try_from(self.amount.base_units()).unwrap(),
                }],
                on_chain_error: None,
            }))
        })
    }

    fn balance(&self, _owner: Address, _asset: &Asset) -> BoxFuture<'_, Result<Amount, ChainError>> {
        Box::pin(async move { Ok(Amount::from_base_units(u128::MAX)) })
    }

    fn transfer(&self, signer: &dyn Signer, _to: Address, _asset: &Asset, _amount: Amount) -> BoxFuture<'_, Result<TxId, ChainError>> {
        let network = self.network;
        let address = signer.address();
        Box::pin(async move {
            let raw = match address {
                Address::Account(bytes) => bs58::encode([bytes.as_slice(), &[0u8; 32]].concat()).into_string(),
                Address::Evm(_) => format!("0x{}", "ab".repeat(32)),
            };
            let tx_id = TxId::parse(raw, network).expect("fake adapter produces a shape-valid tx id");
            *self.submitted.lock().await = Some(tx_id.clone());
            Ok(tx_id)
        })
    }

    fn probe_health(&self) -> BoxFuture<'_, Result<(), ChainError>> {
        Box::pin(async move { Ok(()) })
    }
}

fn temp_wallet_config(name: &str) -> WalletConfig {
    let dir = std::env::temp_dir().join(format!("xpay-provider-test-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    WalletConfig { key_path: dir.join("wallet.key") }
}

#[tokio::test]
async fn direct_provider_round_trip_succeeds_and_reports_no_fallback() {
    let wallet_config = temp_wallet_config("direct-ok");
    let wallet = Wallet::new(wallet_config.clone());
    let payer = wallet.initialize(NetworkFamily::Account).await.unwrap();

    let pay_to = Address::Account([9u8; 32]);
    let amount = Amount::from_base_units(1_000);
    let adapter = FakeAdapter {
        network: Network::AccountMain,
        pay_to,
        amount,
        submitted: Mutex::new(None),
    };

    let requirement = PaymentRequirement {
        network: Network::AccountMain,
        pay_to,
        max_amount_required: amount,
        asset: Asset::native(9, "SOL"),
    };
    let intent = PaymentIntent::new(requirement, amount).unwrap();

    let config = RouterConfig::new(ProviderTag::Direct, None, false, 1, Duration::from_millis(1)).unwrap();
    let provider_config = ProviderConfig {
        max_payment_value: Amount::from_base_units(u128::MAX),
        facilitator_url: None,
        request_timeout: Duration::from_secs(5),
    };
    let router = Router::new(config, Provider::Direct(DirectProvider::new(provider_config)), None);

    let deadline = Instant::now() + Duration::from_secs(5);
    let result = router.execute(&intent, &wallet, &adapter, deadline).await;

    assert_eq!(result.provider, ProviderTag::Direct);
    match result.outcome {
        Outcome::Success { receipt } => {
            assert_eq!(receipt.to, pay_to);
            assert_eq!(receipt.from, payer);
            assert_eq!(receipt.amount, amount);
        }
        Outcome::Failure { kind, message } => panic!("expected success, got {kind:?}: {message}"),
    }
    assert_eq!(router.stats().fallbacks_used, 0);

    std::fs::remove_file(&wallet_config.key_path).ok();
}

#[tokio::test]
async fn underpaying_adapter_surfaces_a_verification_failure() {
    let wallet_config = temp_wallet_config("direct-underpay");
    let wallet = Wallet::new(wallet_config.clone());
    wallet.initialize(NetworkFamily::Account).await.unwrap();

    let pay_to = Address::Account([9u8; 32]);
    let required = Amount::from_base_units(1_000);
    let adapter = FakeAdapter {
        network: Network::AccountMain,
        pay_to,
        amount: Amount::from_base_units(1), // far short of `required`
        submitted: Mutex::new(None),
    };

    let requirement = PaymentRequirement {
        network: Network::AccountMain,
        pay_to,
        max_amount_required: required,
        asset: Asset::native(9, "SOL"),
    };
    let intent = PaymentIntent::new(requirement, required).unwrap();

    let config = RouterConfig::new(ProviderTag::Direct, None, false, 1, Duration::from_millis(1)).unwrap();
    let provider_config = ProviderConfig {
        max_payment_value: Amount::from_base_units(u128::MAX),
        facilitator_url: None,
        request_timeout: Duration::from_secs(5),
    };
    let router = Router::new(config, Provider::Direct(DirectProvider::new(provider_config)), None);

    let deadline = Instant::now() + Duration::from_secs(5);
    let result = router.execute(&intent, &wallet, &adapter, deadline).await;

    match result.outcome {
        Outcome::Success { .. } => panic!("expected a verification failure"),
        Outcome::Failure { kind, .. } => assert_eq!(kind, xpay_core::error::FailureKind::Verification),
    }

    std::fs::remove_file(&wallet_config.key_path).ok();
}
