//! The payment handshake's data model (§3-§4): what a server requires, what
//! the client commits to, and what executing that commitment produces.

use crate::address::Address;
use crate::amount::Amount;
use crate::asset::Asset;
use crate::chain::TxId;
use crate::error::PaymentError;
use crate::network::Network;

use serde::{Deserialize, Serialize};

/// One entry of a 402 response's `accepts` array: a network/asset/amount the
/// server is willing to take payment in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequirement {
    /// The network this requirement is priced on.
    pub network: Network,
    /// The address payment must be sent to.
    pub pay_to: Address,
    /// The exact amount required, in the asset's base units.
    pub max_amount_required: Amount,
    /// The asset the server wants paid.
    pub asset: Asset,
}

/// Identifies which provider family executed a payment, per the REDESIGN
/// FLAG in §9: a closed tagged variant rather than an open registry, so
/// callers match instead of branching on a name string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderTag {
    /// A third-party facilitator service executed the transfer and returned
    /// a receipt.
    Facilitator,
    /// The Wallet submitted the transfer directly to the chain.
    Direct,
}

/// A caller's commitment to pay one [`PaymentRequirement`], selected from a
/// server's `accepts` list and bounded by the caller's own ceiling.
///
/// Constructed only through [`PaymentIntent::new`], which enforces §4's
/// invariant that the committed amount never exceeds the caller's ceiling —
/// a `PaymentIntent` that exists is, by construction, affordable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    /// The requirement this intent satisfies.
    pub requirement: PaymentRequirement,
    /// The caller-supplied upper bound this intent was checked against.
    pub price_ceiling: Amount,
}

impl PaymentIntent {
    /// Builds an intent for `requirement`, rejecting it outright if its
    /// price exceeds `price_ceiling`.
    ///
    /// # Errors
    ///
    /// Returns a [`FailureKind::PriceCeiling`](crate::error::FailureKind::PriceCeiling)
    /// error if `requirement.max_amount_required` exceeds `price_ceiling`.
    pub fn new(requirement: PaymentRequirement, price_ceiling: Amount) -> Result<Self, PaymentError> {
        if requirement.max_amount_required > price_ceiling {
            return Err(PaymentError::price_ceiling(format!(
                "required {} exceeds ceiling {}",
                requirement.max_amount_required, price_ceiling
            )));
        }
        Ok(Self {
            requirement,
            price_ceiling,
        })
    }
}

/// Proof that a payment was made, attached to the retried request per §4.1's
/// `X-Payment` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    /// The network the payment was executed on.
    pub network: Network,
    /// The finalized transaction id.
    pub tx_id: TxId,
    /// The paying address.
    pub from: Address,
    /// The receiving address.
    pub to: Address,
    /// The amount actually transferred, in base units.
    pub amount: Amount,
    /// The asset transferred.
    pub asset: Asset,
}

/// The terminal outcome of one `pay_and_fetch` call (§4.1, §8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The resource was fetched after a verified payment.
    Success {
        /// The receipt for the payment that unlocked the resource.
        receipt: PaymentReceipt,
    },
    /// The payment could not be completed.
    Failure {
        /// Why it failed.
        kind: crate::error::FailureKind,
        /// A human-readable explanation.
        message: String,
    },
}

/// The full result of executing a payment through a provider (§4.2),
/// carrying both the outcome and which provider family produced it so the
/// Client Engine can report failover transparently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Which provider executed (or attempted) this payment.
    pub provider: ProviderTag,
    /// The outcome of the attempt.
    pub outcome: Outcome,
}
