//! Chain-agnostic payment verification (C3, §4.3).
//!
//! [`verify`] never touches a signer and never branches on which concrete
//! [`ChainAdapter`] it was given — it only reads the [`ParsedTransaction`]
//! balance deltas the adapter hands back, the same seam
//! [`xpay_core::chain`] was designed around.

use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::instrument;

use xpay_core::amount::Amount;
use xpay_core::asset::AssetKind;
use xpay_core::chain::{ChainAdapter, TxId};
use xpay_core::error::PaymentError;
use xpay_core::payment::PaymentRequirement;

/// How long to wait between re-fetches while polling for finalization.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// The outcome of checking a transaction against a [`PaymentRequirement`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The transaction moved at least the required amount to the required
    /// recipient, within the asset's comparison rule.
    VerifiedOk {
        /// The transaction id that was verified.
        tx_id: TxId,
        /// The amount actually observed moving to the recipient.
        observed_amount: Amount,
    },
    /// The transaction does not satisfy the requirement.
    VerifiedBad {
        /// Why verification failed.
        reason: String,
    },
}

/// Polls `adapter` for `tx_id` until it finalizes or `deadline` passes, then
/// checks its balance deltas against `expected`.
///
/// Token requirements are checked by finding the recipient's delta on the
/// required mint and requiring it to be at least the required amount.
/// Native requirements apply `expected.network`'s fee tolerance (§4.3): the
/// observed delta may fall short of the required amount by up to that many
/// base units to absorb the sender's own transaction fee being netted out
/// of what the recipient's balance appears to gain relative to a naive
/// same-account accounting.
///
/// # Errors
///
/// Returns a [`xpay_core::error::FailureKind::Transient`] error if the
/// transaction never appears or never finalizes before `deadline`, or if the
/// adapter itself fails. Returns a [`xpay_core::error::FailureKind::Protocol`]
/// error only for a token requirement that is itself malformed (missing its
/// mint/contract address) — a failed on-chain transaction, an absent
/// recipient delta, or a short delta are all reported as [`Verdict::VerifiedBad`],
/// never as an `Err`.
#[instrument(skip(adapter, expected, deadline), fields(%tx_id))]
pub async fn verify(
    adapter: &dyn ChainAdapter,
    expected: &PaymentRequirement,
    tx_id: &TxId,
    deadline: Instant,
) -> Result<Verdict, PaymentError> {
    let parsed = loop {
        match adapter.fetch_transaction(tx_id).await {
            Ok(Some(parsed)) if parsed.finalized => break parsed,
            Ok(_) => {
                if Instant::now() >= deadline {
                    tracing::warn!(%tx_id, "transaction did not finalize before the deadline");
                    return Err(PaymentError::transient(format!(
                        "transaction {tx_id} did not finalize before the deadline"
                    )));
                }
                tracing::debug!(%tx_id, "transaction not yet finalized, polling again");
                sleep(POLL_INTERVAL).await;
            }
            Err(e) => return Err(PaymentError::transient(e.to_string())),
        }
    };

    if let Some(on_chain_error) = &parsed.on_chain_error {
        tracing::info!(%tx_id, %on_chain_error, "transaction finalized with an on-chain error");
        return Ok(Verdict::VerifiedBad {
            reason: format!("transaction {tx_id} failed on-chain: {on_chain_error}"),
        });
    }

    match expected.asset.kind {
        AssetKind::Token => verify_token(expected, &parsed.token_deltas, &parsed.account_deltas, tx_id),
        AssetKind::Native => verify_native(expected, &parsed.account_deltas, tx_id),
    }
}

fn verify_token(
    expected: &PaymentRequirement,
    token_deltas: &[xpay_core::chain::TokenBalanceDelta],
    _account_deltas: &[xpay_core::chain::AccountBalanceDelta],
    tx_id: &TxId,
) -> Result<Verdict, PaymentError> {
    let Some(mint) = expected.asset.mint_or_contract else {
        return Err(PaymentError::protocol("token requirement missing mint/contract address"));
    };
    let matching = token_deltas
        .iter()
        .find(|d| d.mint_or_contract == mint && d.owner == expected.pay_to);
    let Some(delta) = matching else {
        return Ok(Verdict::VerifiedBad {
            reason: format!("transaction {tx_id} carries no balance movement for the required asset"),
        });
    };
    if delta.delta <= 0 {
        return Ok(Verdict::VerifiedBad {
            reason: format!("recipient's balance did not increase (delta {})", delta.delta),
        });
    }
    let observed = u128::try_from(delta.delta).unwrap_or(0);
    if observed < expected.max_amount_required.base_units() {
        return Ok(Verdict::VerifiedBad {
            reason: format!(
                "observed amount {observed} is less than the required {}",
                expected.max_amount_required
            ),
        });
    }
    Ok(Verdict::VerifiedOk {
        tx_id: tx_id.clone(),
        observed_amount: Amount::from_base_units(observed),
    })
}

fn verify_native(
    expected: &PaymentRequirement,
    account_deltas: &[xpay_core::chain::AccountBalanceDelta],
    tx_id: &TxId,
) -> Result<Verdict, PaymentError> {
    let matching = account_deltas.iter().find(|d| d.owner == expected.pay_to);
    let Some(delta) = matching else {
        return Ok(Verdict::VerifiedBad {
            reason: format!("transaction {tx_id} carries no native balance movement for the recipient"),
        });
    };
    if delta.delta <= 0 {
        return Ok(Verdict::VerifiedBad {
            reason: format!("recipient's native balance did not increase (delta {})", delta.delta),
        });
    }
    let observed = u128::try_from(delta.delta).unwrap_or(0);
    let required = expected.max_amount_required.base_units();
    let tolerance = expected.network.default_fee_tolerance();
    if observed + tolerance < required {
        return Ok(Verdict::VerifiedBad {
            reason: format!(
                "observed amount {observed} is more than the {tolerance}-unit fee tolerance short of the required {required}"
            ),
        });
    }
    Ok(Verdict::VerifiedOk {
        tx_id: tx_id.clone(),
        observed_amount: Amount::from_base_units(observed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use xpay_core::address::Address;
    use xpay_core::asset::Asset;
    use xpay_core::chain::{AccountBalanceDelta, ParsedTransaction, TokenBalanceDelta};
    use xpay_core::network::Network;

    fn requirement(network: Network, asset: Asset, amount: u128) -> PaymentRequirement {
        PaymentRequirement {
            network,
            pay_to: Address::Account([5u8; 32]),
            max_amount_required: Amount::from_base_units(amount),
            asset,
        }
    }

    fn some_tx_id() -> TxId {
        let sig = bs58::encode([1u8; 64]).into_string();
        TxId::parse(sig, Network::AccountMain).unwrap()
    }

    #[test]
    fn token_verification_accepts_exact_and_over_payment() {
        let mint = Address::Account([9u8; 32]);
        let req = requirement(Network::AccountMain, Asset::token(mint, 6, "USDX"), 1_000);
        let deltas = vec![TokenBalanceDelta {
            mint_or_contract: mint,
            owner: req.pay_to,
            delta: 1_500,
        }];
        let verdict = verify_token(&req, &deltas, &[], &some_tx_id()).unwrap();
        assert!(matches!(verdict, Verdict::VerifiedOk { .. }));
    }

    #[test]
    fn token_verification_rejects_underpayment() {
        let mint = Address::Account([9u8; 32]);
        let req = requirement(Network::AccountMain, Asset::token(mint, 6, "USDX"), 1_000);
        let deltas = vec![TokenBalanceDelta {
            mint_or_contract: mint,
            owner: req.pay_to,
            delta: 500,
        }];
        let verdict = verify_token(&req, &deltas, &[], &some_tx_id()).unwrap();
        assert!(matches!(verdict, Verdict::VerifiedBad { .. }));
    }

    #[test]
    fn native_verification_tolerates_fee_slack() {
        let req = requirement(Network::AccountMain, Asset::native(9, "SOL"), 1_000_000);
        let deltas = vec![AccountBalanceDelta {
            owner: req.pay_to,
            delta: 999_997,
        }];
        let verdict = verify_native(&req, &deltas, &some_tx_id()).unwrap();
        assert!(matches!(verdict, Verdict::VerifiedOk { .. }));
    }

    #[test]
    fn native_verification_rejects_shortfall_beyond_tolerance() {
        let req = requirement(Network::AccountMain, Asset::native(9, "SOL"), 1_000_000);
        let deltas = vec![AccountBalanceDelta {
            owner: req.pay_to,
            delta: 900_000,
        }];
        let verdict = verify_native(&req, &deltas, &some_tx_id()).unwrap();
        assert!(matches!(verdict, Verdict::VerifiedBad { .. }));
    }

    #[test]
    fn token_verification_reports_verified_bad_when_no_delta_matches() {
        let mint = Address::Account([9u8; 32]);
        let req = requirement(Network::AccountMain, Asset::token(mint, 6, "USDX"), 1_000);
        let verdict = verify_token(&req, &[], &[], &some_tx_id()).unwrap();
        assert!(matches!(verdict, Verdict::VerifiedBad { .. }));
    }

    #[test]
    fn native_verification_reports_verified_bad_when_recipient_not_in_tx() {
        let req = requirement(Network::AccountMain, Asset::native(9, "SOL"), 1_000_000);
        let deltas = vec![AccountBalanceDelta {
            owner: Address::Account([1u8; 32]),
            delta: 1_000_000,
        }];
        let verdict = verify_native(&req, &deltas, &some_tx_id()).unwrap();
        assert!(matches!(verdict, Verdict::VerifiedBad { .. }));
    }

    struct FakeAdapter {
        parsed: ParsedTransaction,
    }

    impl ChainAdapter for FakeAdapter {
        fn network(&self) -> Network {
            Network::AccountMain
        }

        fn fetch_transaction(&self, _tx_id: &TxId) -> xpay_core::chain::BoxFuture<'_, Result<Option<ParsedTransaction>, xpay_core::chain::ChainError>> {
            let parsed = self.parsed.clone();
            Box::pin(async move { Ok(Some(parsed)) })
        }

        fn balance(&self, _owner: Address, _asset: &Asset) -> xpay_core::chain::BoxFuture<'_, Result<Amount, xpay_core::chain::ChainError>> {
            Box::pin(async move { Ok(Amount::ZERO) })
        }

        fn transfer(
            &self,
            _signer: &dyn xpay_core::signer::Signer,
            _to: Address,
            _asset: &Asset,
            _amount: Amount,
        ) -> xpay_core::chain::BoxFuture<'_, Result<TxId, xpay_core::chain::ChainError>> {
            unimplemented!("not exercised by these tests")
        }

        fn probe_health(&self) -> xpay_core::chain::BoxFuture<'_, Result<(), xpay_core::chain::ChainError>> {
            Box::pin(async move { Ok(()) })
        }
    }

    #[tokio::test]
    async fn verify_reports_verified_bad_on_on_chain_failure() {
        let tx_id = some_tx_id();
        let req = requirement(Network::AccountMain, Asset::native(9, "SOL"), 1_000_000);
        let adapter = FakeAdapter {
            parsed: ParsedTransaction {
                tx_id: tx_id.clone(),
                finalized: true,
                token_deltas: Vec::new(),
                account_deltas: vec![AccountBalanceDelta {
                    owner: req.pay_to,
                    delta: 1_000_000,
                }],
                on_chain_error: Some("instruction 0 failed: custom program error".to_owned()),
            },
        };
        let verdict = verify(&adapter, &req, &tx_id, Instant::now() + Duration::from_secs(5))
            .await
            .unwrap();
        assert!(matches!(verdict, Verdict::VerifiedBad { .. }));
    }
}
