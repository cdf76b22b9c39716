//! The account-model (ed25519) [`xpay_core::signer::Signer`] implementation,
//! a thin wrapper over `solana-keypair`/`solana-signer` — the same crates
//! `r402-svm`'s transaction-building path signs through.

use solana_keypair::Keypair;
use solana_signer::Signer as SolanaSignerTrait;

use xpay_core::address::Address;
use xpay_core::network::NetworkFamily;
use xpay_core::signer::{Signature, Signer, SignerError};

use crate::error::WalletError;

/// An ed25519 keypair adapted to this core's [`Signer`] trait.
pub struct AccountSigner {
    keypair: Keypair,
}

impl AccountSigner {
    /// Generates a fresh random keypair.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            keypair: Keypair::new(),
        }
    }

    /// Reconstructs a signer from a previously persisted 64-byte keypair
    /// encoding (`solana_keypair::Keypair::to_bytes` layout: 32-byte secret
    /// seed followed by the 32-byte public key).
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Storage`] if `bytes` is not a valid keypair
    /// encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let keypair = Keypair::try_from(bytes).map_err(|e| WalletError::Storage(e.to_string()))?;
        Ok(Self { keypair })
    }

    /// The persisted byte encoding used by [`AccountSigner::from_bytes`].
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.keypair.to_bytes().to_vec()
    }
}

impl Signer for AccountSigner {
    fn address(&self) -> Address {
        Address::Account(self.keypair.pubkey().to_bytes())
    }

    fn network_family(&self) -> NetworkFamily {
        NetworkFamily::Account
    }

    fn sign(&self, message: &[u8]) -> Result<Signature, SignerError> {
        let signature = SolanaSignerTrait::sign_message(&self.keypair, message);
        Ok(Signature(signature.as_ref().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_bytes() {
        let signer = AccountSigner::generate();
        let bytes = signer.to_bytes();
        let restored = AccountSigner::from_bytes(&bytes).unwrap();
        assert_eq!(signer.address(), restored.address());
    }

    #[test]
    fn signs_a_message() {
        let signer = AccountSigner::generate();
        let sig = signer.sign(b"hello").unwrap();
        assert_eq!(sig.0.len(), 64);
    }
}
