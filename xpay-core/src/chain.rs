//! The chain adapter contract: everything `xpay-verifier` and `xpay-wallet`
//! need from a concrete chain, expressed without leaking RPC client types
//! into callers.
//!
//! Grounded on `r402::facilitator::Facilitator`'s `BoxFuture`-returning,
//! object-safe trait shape, adapted from a single verify/settle pair to the
//! broader set of chain operations §4 assigns to C3/C4 (fetch + parse a
//! transaction, read a balance, submit a signed transfer).

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::address::Address;
use crate::amount::Amount;
use crate::asset::Asset;
use crate::network::Network;
use crate::signer::Signer;

/// A boxed, `Send` future, mirroring `r402::facilitator::BoxFuture` — the
/// shape that keeps `dyn ChainAdapter` object-safe under `async fn`'s
/// current restrictions.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A transaction identifier, shape-validated against its network family at
/// construction per §6: base58, 87-88 characters for account-model chains;
/// `0x` followed by 64 hex characters for EVM.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TxId {
    raw: String,
}

/// Error returned when a string does not match the transaction-id shape for
/// its network family.
#[derive(Debug, Clone, thiserror::Error)]
#[error("malformed transaction id for {family:?}: {raw:?}")]
pub struct TxIdShapeError {
    raw: String,
    family: crate::network::NetworkFamily,
}

impl TxId {
    /// Validates `raw` against the shape `network`'s family expects.
    ///
    /// Validated once here, up front, so that every downstream consumer
    /// (Router logging, wire serialization, Verifier lookups) can treat a
    /// `TxId` as already well-formed — per §4.3's closing note that this
    /// check happens "before any RPC call is attempted."
    ///
    /// # Errors
    ///
    /// Returns [`TxIdShapeError`] if `raw` doesn't match the expected shape.
    pub fn parse(raw: impl Into<String>, network: Network) -> Result<Self, TxIdShapeError> {
        let raw = raw.into();
        let family = network.family();
        let shape_ok = match family {
            crate::network::NetworkFamily::Account => {
                let len = raw.chars().count();
                (87..=88).contains(&len) && bs58::decode(&raw).into_vec().is_ok()
            }
            crate::network::NetworkFamily::Evm => {
                raw.strip_prefix("0x")
                    .is_some_and(|hex_part| hex_part.len() == 64 && hex::decode(hex_part).is_ok())
            }
        };
        if shape_ok {
            Ok(Self { raw })
        } else {
            Err(TxIdShapeError { raw, family })
        }
    }

    /// Returns the underlying string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({})", self.raw)
    }
}

/// The net change in a token balance observed between a transaction's pre-
/// and post-state, for one (owner, mint/contract) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBalanceDelta {
    /// The token's mint (account-model) or contract (EVM) address.
    pub mint_or_contract: Address,
    /// The account whose balance changed.
    pub owner: Address,
    /// Signed change in base units; positive means the owner received.
    pub delta: i128,
}

/// The net change in a native-coin balance observed in a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBalanceDelta {
    /// The account whose native balance changed.
    pub owner: Address,
    /// Signed change in base units; positive means the owner received.
    pub delta: i128,
}

/// A finalized transaction reduced to the balance movements a [`Verifier`]
/// needs, with every chain-specific instruction/log/account-index detail
/// already stripped away by the adapter that produced it.
///
/// This is the seam that keeps `xpay-verifier` chain-agnostic: it never
/// parses an account-model instruction or an EVM log, only these deltas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTransaction {
    /// The transaction's own id.
    pub tx_id: TxId,
    /// `true` once the chain considers this transaction irreversible.
    pub finalized: bool,
    /// Token balance movements observed in the transaction.
    pub token_deltas: Vec<TokenBalanceDelta>,
    /// Native balance movements observed in the transaction.
    pub account_deltas: Vec<AccountBalanceDelta>,
    /// The transaction's top-level on-chain error, if it failed after being
    /// included in a block (an account-model instruction error, or an EVM
    /// reverted receipt). `None` means it executed successfully.
    pub on_chain_error: Option<String>,
}

/// Everything a chain-specific adapter must provide to plug into the router,
/// verifier, and wallet.
///
/// Object-safe by construction (`BoxFuture` return types, no generics on the
/// trait itself) so a `Router` can hold `Box<dyn ChainAdapter>` per network,
/// the same shape `r402-facilitator::local::FacilitatorLocal` uses to route
/// over a family of chain providers.
pub trait ChainAdapter: Send + Sync {
    /// The network this adapter serves.
    fn network(&self) -> Network;

    /// Fetches and parses a transaction by id.
    ///
    /// Returns `Ok(None)` if the transaction is not yet visible to the node
    /// (still a Transient condition from the caller's point of view, not a
    /// protocol error).
    fn fetch_transaction(&self, tx_id: &TxId) -> BoxFuture<'_, Result<Option<ParsedTransaction>, ChainError>>;

    /// Reads the balance of `asset` held by `owner`, in base units.
    fn balance(&self, owner: Address, asset: &Asset) -> BoxFuture<'_, Result<Amount, ChainError>>;

    /// Builds, signs (via `signer`), and submits a transfer of `amount` of
    /// `asset` from the signer's own address to `to`. Returns the id of the
    /// submitted transaction; the caller is responsible for polling
    /// [`ChainAdapter::fetch_transaction`] until it finalizes.
    fn transfer(
        &self,
        signer: &dyn Signer,
        to: Address,
        asset: &Asset,
        amount: Amount,
    ) -> BoxFuture<'_, Result<TxId, ChainError>>;

    /// A cheap liveness probe used by the Router's health cache (§4.2): an
    /// RPC call with no side effects, such as fetching the current block
    /// height or slot.
    fn probe_health(&self) -> BoxFuture<'_, Result<(), ChainError>>;
}

/// Errors surfaced by a [`ChainAdapter`] implementation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChainError {
    /// The RPC endpoint could not be reached, timed out, or returned a
    /// server error. Always mapped to [`crate::error::FailureKind::Transient`]
    /// by callers.
    #[error("rpc unavailable: {0}")]
    RpcUnavailable(String),
    /// The RPC call succeeded but returned data this adapter could not
    /// parse into a [`ParsedTransaction`].
    #[error("malformed chain response: {0}")]
    Malformed(String),
    /// The signer's address balance was insufficient for the requested
    /// transfer.
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds {
        /// Balance actually held.
        have: Amount,
        /// Balance required for the transfer.
        need: Amount,
    },
    /// The signer rejected the request (wrong network family, signing
    /// failure).
    #[error("signer error: {0}")]
    Signer(#[from] crate::signer::SignerError),
}
