//! The asset being transferred: the network's native coin, or a fungible
//! token deployed on it (SPL-style on the account-model chain, ERC-20-style
//! on EVM).

use crate::address::Address;

/// Whether an [`Asset`] is the chain's native coin or a deployed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// The chain's native coin (no mint/contract address).
    Native,
    /// A fungible token identified by its mint (account-model) or contract
    /// (EVM) address.
    Token,
}

/// An asset that can be transferred and verified by this core.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Asset {
    /// Native coin or deployed token.
    pub kind: AssetKind,
    /// The mint (account-model) or contract (EVM) address. Absent for
    /// [`AssetKind::Native`].
    pub mint_or_contract: Option<Address>,
    /// Number of decimal places, used only at the presentation boundary.
    pub decimals: u8,
    /// Human-readable ticker, used only at the presentation boundary.
    pub symbol: String,
}

impl Asset {
    /// Constructs the native-coin asset for a network.
    #[must_use]
    pub fn native(decimals: u8, symbol: impl Into<String>) -> Self {
        Self {
            kind: AssetKind::Native,
            mint_or_contract: None,
            decimals,
            symbol: symbol.into(),
        }
    }

    /// Constructs a token asset identified by its mint/contract address.
    #[must_use]
    pub fn token(mint_or_contract: Address, decimals: u8, symbol: impl Into<String>) -> Self {
        Self {
            kind: AssetKind::Token,
            mint_or_contract: Some(mint_or_contract),
            decimals,
            symbol: symbol.into(),
        }
    }

    /// Returns `true` if this is the chain's native coin.
    #[must_use]
    pub const fn is_native(&self) -> bool {
        matches!(self.kind, AssetKind::Native)
    }
}
