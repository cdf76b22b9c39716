//! End-to-end `pay_and_fetch` tests against a mocked HTTP resource and an
//! in-memory [`ChainAdapter`] fake, mirroring the mock-server style used by
//! `r402-http`'s facilitator client tests.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use xpay_core::address::Address;
use xpay_core::amount::Amount;
use xpay_core::asset::Asset;
use xpay_core::chain::{AccountBalanceDelta, BoxFuture, ChainAdapter, ChainError, ParsedTransaction, TxId};
use xpay_core::config::{ProviderConfig, RouterConfig, WalletConfig};
use xpay_core::network::{Network, NetworkFamily};
use xpay_core::payment::{Outcome, ProviderTag};
use xpay_core::signer::Signer;
use xpay_client::ClientEngine;
use xpay_provider::{DirectProvider, Provider, Router};
use xpay_wallet::Wallet;

struct FakeAdapter {
    pay_to: Address,
    amount: Amount,
}

impl ChainAdapter for FakeAdapter {
    fn network(&self) -> Network {
        Network::AccountDev
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
        let address = signer.address();
        Box::pin(async move {
            let raw = match address {
                Address::Account(bytes) => bs58::encode([bytes.as_slice(), &[0u8; 32]].concat()).into_string(),
                Address::Evm(_) => format!("0x{}", "ab".repeat(32)),
            };
            Ok(TxId::parse(raw, Network::AccountDev).unwrap())
        })
    }

    fn probe_health(&self) -> BoxFuture<'_, Result<(), ChainError>> {
        Box::pin(async move { Ok(()) })
    }
}

fn temp_wallet_config(name: &str) -> WalletConfig {
    let dir = std::env::temp_dir().join(format!("xpay-client-test-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    WalletConfig { key_path: dir.join("wallet.key") }
}

async fn build_engine(name: &str, pay_to: Address, amount: Amount) -> ClientEngine {
    let wallet_config = temp_wallet_config(name);
    let wallet = Wallet::new(wallet_config);
    wallet.initialize(NetworkFamily::Account).await.unwrap();

    let config = RouterConfig::new(ProviderTag::Direct, None, false, 1, Duration::from_millis(1)).unwrap();
    let provider_config = ProviderConfig {
        max_payment_value: Amount::from_base_units(u128::MAX),
        facilitator_url: None,
        request_timeout: Duration::from_secs(5),
    };
    let router = Router::new(config, Provider::Direct(DirectProvider::new(provider_config)), None);

    let mut adapters: HashMap<Network, Box<dyn ChainAdapter>> = HashMap::new();
    adapters.insert(Network::AccountDev, Box::new(FakeAdapter { pay_to, amount }));

    ClientEngine::new(reqwest::Client::new(), router, wallet, adapters)
}

#[tokio::test]
async fn free_endpoint_passes_through_with_no_payment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/free"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .mount(&server)
        .await;

    let pay_to = Address::Account([9u8; 32]);
    let amount = Amount::from_base_units(20_000);
    let engine = build_engine("free", pay_to, amount).await;

    let (status, body, result) = engine
        .pay_and_fetch(
            reqwest::Method::GET,
            &format!("{}/free", server.uri()),
            None,
            Amount::from_base_units(100_000),
            Instant::now() + Duration::from_secs(5),
        )
        .await
        .unwrap();

    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body, b"hello");
    assert!(result.is_none());
}

#[tokio::test]
async fn challenged_endpoint_is_paid_and_retried_with_receipt() {
    let server = MockServer::start().await;
    let pay_to = Address::Account([9u8; 32]);
    let amount = Amount::from_base_units(20_000);

    Mock::given(method("GET"))
        .and(path("/paid"))
        .and(header_exists("X-Payment"))
        .respond_with(ResponseTemplate::new(200).set_body_string("unlocked"))
        .mount(&server)
        .await;

    let challenge_body = serde_json::json!({
        "accepts": [{
            "network": "account-dev",
            "payTo": pay_to.to_string(),
            "maxAmountRequired": amount.to_string(),
            "asset": "",
        }]
    });
    Mock::given(method("GET"))
        .and(path("/paid"))
        .respond_with(ResponseTemplate::new(402).set_body_json(&challenge_body))
        .mount(&server)
        .await;

    let engine = build_engine("paid", pay_to, amount).await;

    let (status, body, result) = engine
        .pay_and_fetch(
            reqwest::Method::GET,
            &format!("{}/paid", server.uri()),
            None,
            Amount::from_base_units(100_000),
            Instant::now() + Duration::from_secs(5),
        )
        .await
        .unwrap();

    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body, b"unlocked");
    match result.unwrap().outcome {
        Outcome::Success { receipt } => {
            assert_eq!(receipt.to, pay_to);
            assert_eq!(receipt.amount, amount);
        }
        Outcome::Failure { kind, message } => panic!("expected success, got {kind:?}: {message}"),
    }
}

#[tokio::test]
async fn price_above_ceiling_is_rejected_without_paying() {
    let server = MockServer::start().await;
    let pay_to = Address::Account([9u8; 32]);
    let amount = Amount::from_base_units(20_000);

    let challenge_body = serde_json::json!({
        "accepts": [{
            "network": "account-dev",
            "payTo": pay_to.to_string(),
            "maxAmountRequired": amount.to_string(),
            "asset": "",
        }]
    });
    Mock::given(method("GET"))
        .and(path("/expensive"))
        .respond_with(ResponseTemplate::new(402).set_body_json(&challenge_body))
        .mount(&server)
        .await;

    let engine = build_engine("ceiling", pay_to, amount).await;

    let err = engine
        .pay_and_fetch(
            reqwest::Method::GET,
            &format!("{}/expensive", server.uri()),
            None,
            Amount::from_base_units(10),
            Instant::now() + Duration::from_secs(5),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, xpay_core::error::FailureKind::PriceCeiling);
}
