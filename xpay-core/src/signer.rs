//! The signing capability consumed by chain adapters.
//!
//! §3: "The secret must never be logged, serialized, or included in any
//! error returned to a caller; debug formatting must elide it." Chain
//! adapters never see the raw secret — they hold a `&dyn Signer` and ask it
//! to sign opaque message bytes, exactly as `r402-svm`'s `TransactionInt::sign`
//! takes a `&P: SolanaChainProviderLike` rather than a raw keypair.

use std::fmt;

use crate::address::Address;
use crate::network::NetworkFamily;

/// A detached signature produced by a [`Signer`].
///
/// Opaque bytes: 64-byte ed25519 signatures on the account-model chain,
/// 65-byte recoverable ECDSA signatures on EVM.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(pub Vec<u8>);

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", hex::encode(&self.0))
    }
}

/// Secret key material that must never be logged, serialized, or echoed back
/// to a caller.
///
/// `Debug` is implemented manually to elide the bytes; there is no `Display`
/// impl at all. The backing buffer is best-effort zeroed on drop.
pub struct SensitiveBytes(Vec<u8>);

impl SensitiveBytes {
    /// Wraps raw secret bytes.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Borrows the raw bytes. Callers must uphold the same non-logging,
    /// non-serializing contract as this type.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SensitiveBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SensitiveBytes(REDACTED)")
    }
}

impl SensitiveBytes {
    fn zeroize(&mut self) {
        for byte in &mut self.0 {
            *byte = 0;
        }
    }
}

impl Drop for SensitiveBytes {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Errors a [`Signer`] implementation can return.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// The message shape was not one this signer can produce a signature for.
    #[error("cannot sign message: {0}")]
    InvalidMessage(String),
    /// The underlying key material is unavailable (e.g. not yet initialized).
    #[error("signer not initialized")]
    NotInitialized,
}

/// The sole owner of key material, per §3's Wallet-is-the-only-owner
/// invariant. Chain adapters and providers hold a `&dyn Signer`; only the
/// Wallet (`xpay-wallet`) constructs one.
pub trait Signer: Send + Sync {
    /// This signer's public address.
    fn address(&self) -> Address;

    /// The chain family this signer produces signatures for.
    fn network_family(&self) -> NetworkFamily;

    /// Produces a detached signature over `message`.
    ///
    /// # Errors
    ///
    /// Returns [`SignerError`] if signing fails.
    fn sign(&self, message: &[u8]) -> Result<Signature, SignerError>;
}

impl fmt::Debug for dyn Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").field("address", &self.address()).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensitive_bytes_debug_elides_content() {
        let secret = SensitiveBytes::new(vec![1, 2, 3, 4]);
        assert_eq!(format!("{secret:?}"), "SensitiveBytes(REDACTED)");
    }

    #[test]
    fn sensitive_bytes_zeroized_before_drop() {
        let mut secret = SensitiveBytes::new(vec![9u8; 8]);
        secret.zeroize();
        assert!(secret.expose().iter().all(|b| *b == 0));
    }
}
