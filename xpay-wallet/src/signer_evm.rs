//! The EVM (secp256k1/ECDSA) [`xpay_core::signer::Signer`] implementation.
//!
//! `r402-evm`'s provider stack signs through a full Alloy `PrivateKeySigner`
//! wired into a filler stack; since §1 stubs the EVM adapter down to the
//! same contract as the account-model one, this crate instead grounds on
//! the lighter `k256`+`sha3` keccak-address pattern the EVM-only examples in
//! the pack use directly, without pulling in Alloy's provider machinery.

use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use sha3::{Digest, Keccak256};

use xpay_core::address::Address;
use xpay_core::network::NetworkFamily;
use xpay_core::signer::{Signature, Signer, SignerError};

use crate::error::WalletError;

/// A secp256k1 signing key adapted to this core's [`Signer`] trait.
pub struct EvmSigner {
    signing_key: SigningKey,
}

impl EvmSigner {
    /// Generates a fresh random signing key.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Reconstructs a signer from a previously persisted 32-byte scalar.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Storage`] if `bytes` is not a valid secp256k1
    /// scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let signing_key = SigningKey::from_slice(bytes).map_err(|e| WalletError::Storage(e.to_string()))?;
        Ok(Self { signing_key })
    }

    /// The persisted 32-byte scalar encoding used by
    /// [`EvmSigner::from_bytes`].
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.signing_key.to_bytes().to_vec()
    }

    fn keccak_address(&self) -> [u8; 20] {
        let verifying_key = self.signing_key.verifying_key();
        let uncompressed = verifying_key.to_encoded_point(false);
        let hash = Keccak256::digest(&uncompressed.as_bytes()[1..]);
        let mut address = [0u8; 20];
        address.copy_from_slice(&hash[12..]);
        address
    }
}

impl Signer for EvmSigner {
    fn address(&self) -> Address {
        Address::Evm(self.keccak_address())
    }

    fn network_family(&self) -> NetworkFamily {
        NetworkFamily::Evm
    }

    fn sign(&self, message: &[u8]) -> Result<Signature, SignerError> {
        let prehash = Keccak256::digest(message);
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&prehash)
            .map_err(|e| SignerError::InvalidMessage(e.to_string()))?;
        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(recovery_id.to_byte());
        Ok(Signature(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_bytes() {
        let signer = EvmSigner::generate();
        let bytes = signer.to_bytes();
        let restored = EvmSigner::from_bytes(&bytes).unwrap();
        assert_eq!(signer.address(), restored.address());
    }

    #[test]
    fn sign_produces_65_byte_recoverable_signature() {
        let signer = EvmSigner::generate();
        let sig = signer.sign(b"hello").unwrap();
        assert_eq!(sig.0.len(), 65);
    }
}
