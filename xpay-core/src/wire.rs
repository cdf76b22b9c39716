//! The byte-exact JSON shapes of §6: the 402 body, the `X-Payment` retry
//! header, and their conversions to/from the domain types in
//! [`crate::payment`].
//!
//! Every numeric field crosses the wire as a decimal string, never a JSON
//! number — the same discipline `r402::timestamp::UnixTimestamp` applies to
//! unix timestamps, generalized here to amounts so a JS client's float
//! arithmetic can never silently round a payment amount.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::amount::Amount;
use crate::asset::Asset;
use crate::chain::TxId;
use crate::error::PaymentError;
use crate::network::Network;
use crate::payment::{PaymentReceipt, PaymentRequirement};

/// One `accepts[]` entry of a 402 response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirementWire {
    /// Canonical network tag, e.g. `"account-main"`.
    pub network: String,
    /// The address payment must be sent to.
    pub pay_to: String,
    /// The required amount, base units, as a decimal string.
    pub max_amount_required: String,
    /// The asset's mint/contract address, or `""` for the network's native
    /// coin.
    ///
    /// §6 gives the wire format a single `asset` string with no separate
    /// native/token discriminator; this crate treats the empty string as
    /// the native-coin sentinel (recorded as an Open Question decision).
    pub asset: String,
}

/// A full 402 response body: `{"accepts": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequiredBody {
    /// The requirements the server will accept payment against.
    pub accepts: Vec<PaymentRequirementWire>,
}

/// The `X-Payment` header value sent on the retried request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReceiptWire {
    /// Canonical network tag the payment was executed on.
    pub network: String,
    /// The finalized transaction id.
    pub tx_hash: String,
    /// The paying address.
    pub from: String,
    /// The receiving address.
    pub to: String,
    /// The amount transferred, base units, as a decimal string.
    pub amount: String,
    /// The asset's mint/contract address, or `""` for native.
    pub asset: String,
}

impl TryFrom<&PaymentRequirementWire> for PaymentRequirement {
    type Error = PaymentError;

    fn try_from(wire: &PaymentRequirementWire) -> Result<Self, Self::Error> {
        let network: Network = wire
            .network
            .parse()
            .map_err(|e| PaymentError::protocol(format!("bad network tag: {e}")))?;
        let family = network.family();
        let pay_to = Address::parse(&wire.pay_to, family)
            .map_err(|e| PaymentError::protocol(format!("bad payTo address: {e}")))?;
        let max_amount_required = wire
            .max_amount_required
            .parse::<Amount>()
            .map_err(|e| PaymentError::protocol(format!("bad maxAmountRequired: {e}")))?;
        let asset = asset_from_wire(&wire.asset, family)?;
        Ok(Self {
            network,
            pay_to,
            max_amount_required,
            asset,
        })
    }
}

impl From<&PaymentRequirement> for PaymentRequirementWire {
    fn from(req: &PaymentRequirement) -> Self {
        Self {
            network: req.network.canonical_tag().to_owned(),
            pay_to: req.pay_to.to_string(),
            max_amount_required: req.max_amount_required.to_string(),
            asset: asset_to_wire(&req.asset),
        }
    }
}

impl TryFrom<&PaymentReceiptWire> for PaymentReceipt {
    type Error = PaymentError;

    fn try_from(wire: &PaymentReceiptWire) -> Result<Self, Self::Error> {
        let network: Network = wire
            .network
            .parse()
            .map_err(|e| PaymentError::protocol(format!("bad network tag: {e}")))?;
        let family = network.family();
        let tx_id = TxId::parse(wire.tx_hash.clone(), network)
            .map_err(|e| PaymentError::protocol(format!("bad txHash: {e}")))?;
        let from = Address::parse(&wire.from, family)
            .map_err(|e| PaymentError::protocol(format!("bad from address: {e}")))?;
        let to = Address::parse(&wire.to, family)
            .map_err(|e| PaymentError::protocol(format!("bad to address: {e}")))?;
        let amount = wire
            .amount
            .parse::<Amount>()
            .map_err(|e| PaymentError::protocol(format!("bad amount: {e}")))?;
        let asset = asset_from_wire(&wire.asset, family)?;
        Ok(Self {
            network,
            tx_id,
            from,
            to,
            amount,
            asset,
        })
    }
}

impl From<&PaymentReceipt> for PaymentReceiptWire {
    fn from(receipt: &PaymentReceipt) -> Self {
        Self {
            network: receipt.network.canonical_tag().to_owned(),
            tx_hash: receipt.tx_id.to_string(),
            from: receipt.from.to_string(),
            to: receipt.to.to_string(),
            amount: receipt.amount.to_string(),
            asset: asset_to_wire(&receipt.asset),
        }
    }
}

/// Decodes the wire `asset` string: `""` means native, anything else is
/// parsed as a mint/contract address. Decimals and symbol are not carried on
/// the wire (§6 treats decimal conversion as presentation-only, outside the
/// core) and default to `0`/`""`.
fn asset_from_wire(asset: &str, family: crate::network::NetworkFamily) -> Result<Asset, PaymentError> {
    if asset.is_empty() {
        Ok(Asset::native(0, ""))
    } else {
        let address = Address::parse(asset, family)
            .map_err(|e| PaymentError::protocol(format!("bad asset address: {e}")))?;
        Ok(Asset::token(address, 0, ""))
    }
}

fn asset_to_wire(asset: &Asset) -> String {
    asset
        .mint_or_contract
        .map_or_else(String::new, |address| address.to_string())
}
