//! Bridges this core's [`xpay_core::signer::Signer`] to the `solana_signer::Signer`
//! trait the transaction-building helpers in `solana-transaction` expect,
//! mirroring how `r402-svm`'s `TransactionInt::sign` takes a provider that
//! implements the same borrowed-signer contract rather than a raw keypair.

use solana_pubkey::Pubkey;
use solana_signature::Signature as SolanaSignature;
use solana_signer::{Signer as SolanaSigner, SignerError as SolanaSignerError};

use xpay_core::address::Address;
use xpay_core::signer::Signer;

/// Adapts a borrowed `&dyn Signer` to `solana_signer::Signer` for exactly
/// the duration of one transaction build.
pub struct SolanaSignerBridge<'a> {
    inner: &'a dyn Signer,
}

impl<'a> SolanaSignerBridge<'a> {
    /// Wraps `inner` for use where a `solana_signer::Signer` is expected.
    #[must_use]
    pub const fn new(inner: &'a dyn Signer) -> Self {
        Self { inner }
    }
}

impl SolanaSigner for SolanaSignerBridge<'_> {
    fn try_pubkey(&self) -> Result<Pubkey, SolanaSignerError> {
        match self.inner.address() {
            Address::Account(bytes) => Ok(Pubkey::from(bytes)),
            Address::Evm(_) => Err(SolanaSignerError::Custom(
                "signer does not hold an account-model address".to_owned(),
            )),
        }
    }

    fn try_sign_message(&self, message: &[u8]) -> Result<SolanaSignature, SolanaSignerError> {
        let signature = self
            .inner
            .sign(message)
            .map_err(|e| SolanaSignerError::Custom(e.to_string()))?;
        let bytes: [u8; 64] = signature
            .0
            .try_into()
            .map_err(|_| SolanaSignerError::Custom("signature was not 64 bytes".to_owned()))?;
        Ok(SolanaSignature::from(bytes))
    }

    fn is_interactive(&self) -> bool {
        false
    }
}
