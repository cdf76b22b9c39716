//! The closed set of blockchain networks served by this core.
//!
//! Unlike `r402::chain::ChainId` (an open CAIP-2 `namespace:reference` pair),
//! [`Network`] is a closed tagged enum: §1 of the spec scopes this core to
//! exactly two network families, and §6 fixes the wire tags as a stable,
//! lowercase, closed set. Adding a network is a code change here, by design.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A closed tag identifying one of the networks this core can pay on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    /// The account-model chain's production network.
    AccountMain,
    /// The account-model chain's developer/staging network.
    AccountDev,
    /// The account-model chain's test network.
    AccountTest,
    /// The EVM-family chain's production network.
    EvmMain,
    /// The EVM-family chain's test network.
    EvmTest,
}

/// The two network families a [`Network`] can belong to.
///
/// Used to pick the right [`crate::signer::Signer`] and wire-format parsing
/// rules (base58 transaction ids vs. `0x`-prefixed hex, byte-exact vs.
/// case-insensitive address equality).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetworkFamily {
    /// The UTXO-free account-model chain (native coin + SPL-style tokens).
    Account,
    /// The EVM-family chain (native coin + ERC-20-style tokens).
    Evm,
}

impl Network {
    /// All networks this core knows about, in canonical-tag order.
    pub const ALL: [Self; 5] = [
        Self::AccountMain,
        Self::AccountDev,
        Self::AccountTest,
        Self::EvmMain,
        Self::EvmTest,
    ];

    /// The stable, lowercase canonical wire tag from §6.
    #[must_use]
    pub const fn canonical_tag(self) -> &'static str {
        match self {
            Self::AccountMain => "account-main",
            Self::AccountDev => "account-dev",
            Self::AccountTest => "account-test",
            Self::EvmMain => "evm-main",
            Self::EvmTest => "evm-test",
        }
    }

    /// The network family this network belongs to.
    #[must_use]
    pub const fn family(self) -> NetworkFamily {
        match self {
            Self::AccountMain | Self::AccountDev | Self::AccountTest => NetworkFamily::Account,
            Self::EvmMain | Self::EvmTest => NetworkFamily::Evm,
        }
    }

    /// The default RPC URL for this network, used when no `rpc_url` override
    /// is supplied in configuration.
    #[must_use]
    pub const fn default_rpc_url(self) -> &'static str {
        match self {
            Self::AccountMain => "https://rpc.account-mainnet.example",
            Self::AccountDev => "https://rpc.account-devnet.example",
            Self::AccountTest => "https://rpc.account-testnet.example",
            Self::EvmMain => "https://rpc.evm-mainnet.example",
            Self::EvmTest => "https://rpc.evm-testnet.example",
        }
    }

    /// The native-transfer fee-tolerance constant for this network (§4.3).
    ///
    /// The reference account-model network tolerates up to 5000 base units
    /// of fee slack when comparing an expected native amount to the observed
    /// balance delta; every other network defaults to zero tolerance unless
    /// a deployment explicitly overrides it.
    #[must_use]
    pub const fn default_fee_tolerance(self) -> u128 {
        match self {
            Self::AccountMain | Self::AccountDev | Self::AccountTest => 5_000,
            Self::EvmMain | Self::EvmTest => 0,
        }
    }
}

/// Error returned when parsing an unrecognized network tag.
///
/// Per §6, unknown tags are not a hard parse failure for callers that want to
/// treat them as `Unsupported`; this error carries the offending string so
/// callers can make that distinction themselves.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unrecognized network tag: {0}")]
pub struct UnknownNetworkTag(pub String);

impl FromStr for Network {
    type Err = UnknownNetworkTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|n| n.canonical_tag() == s)
            .ok_or_else(|| UnknownNetworkTag(s.to_owned()))
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_tag())
    }
}

impl Serialize for Network {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.canonical_tag())
    }
}

impl<'de> Deserialize<'de> for Network {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
