//! The Wallet component (§4.4, C4): the sole owner of key material, exposing
//! initialize/address/balance/transfer/rotate as the only operations that
//! ever touch a signer.

use std::path::PathBuf;

use tokio::sync::Mutex;
use tracing::instrument;

use xpay_core::address::Address;
use xpay_core::amount::Amount;
use xpay_core::asset::Asset;
use xpay_core::chain::{ChainAdapter, TxId};
use xpay_core::config::WalletConfig;
use xpay_core::network::NetworkFamily;
use xpay_core::signer::Signer;

use crate::error::WalletError;
use crate::signer_account::AccountSigner;
use crate::signer_evm::EvmSigner;
use crate::storage;

/// The concrete key material backing a [`Wallet`] — never exposed outside
/// this crate as anything but a `&dyn Signer`.
enum KeyMaterial {
    Account(AccountSigner),
    Evm(EvmSigner),
}

impl KeyMaterial {
    fn generate(family: NetworkFamily) -> Self {
        match family {
            NetworkFamily::Account => Self::Account(AccountSigner::generate()),
            NetworkFamily::Evm => Self::Evm(EvmSigner::generate()),
        }
    }

    fn from_bytes(family: NetworkFamily, bytes: &[u8]) -> Result<Self, WalletError> {
        match family {
            NetworkFamily::Account => AccountSigner::from_bytes(bytes).map(Self::Account),
            NetworkFamily::Evm => EvmSigner::from_bytes(bytes).map(Self::Evm),
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Account(signer) => signer.to_bytes(),
            Self::Evm(signer) => signer.to_bytes(),
        }
    }

    fn as_signer(&self) -> &dyn Signer {
        match self {
            Self::Account(signer) => signer,
            Self::Evm(signer) => signer,
        }
    }
}

/// Holds at most one signer at a time, behind a mutex that also serializes
/// every signing operation — §3's "secret exists in exactly one owning
/// location" invariant extended to mean "is used by exactly one in-flight
/// operation at a time", so two concurrent transfers can never race the same
/// account sequence number or nonce.
pub struct Wallet {
    key_path: PathBuf,
    material: Mutex<Option<KeyMaterial>>,
}

impl Wallet {
    /// Builds an uninitialized wallet bound to the key path in `config`.
    #[must_use]
    pub fn new(config: WalletConfig) -> Self {
        Self {
            key_path: config.key_path,
            material: Mutex::new(None),
        }
    }

    /// Loads the persisted key at the configured path, or generates and
    /// persists a fresh one for `family` if none exists yet.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::Storage`] if the key file exists but cannot be
    /// read, has unsafe permissions, or is corrupt.
    #[instrument(skip(self))]
    pub async fn initialize(&self, family: NetworkFamily) -> Result<Address, WalletError> {
        let mut guard = self.material.lock().await;
        let material = if self.key_path.exists() {
            tracing::debug!(path = %self.key_path.display(), "loading persisted key");
            let (stored_family, bytes) = storage::read_key_file(&self.key_path)?;
            KeyMaterial::from_bytes(stored_family, &bytes)?
        } else {
            tracing::info!(path = %self.key_path.display(), ?family, "generating fresh key");
            let fresh = KeyMaterial::generate(family);
            self.persist(&fresh)?;
            fresh
        };
        let address = material.as_signer().address();
        *guard = Some(material);
        Ok(address)
    }

    /// Returns this wallet's public address.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::NotInitialized`] if [`Wallet::initialize`] has
    /// not been called yet.
    pub async fn address(&self) -> Result<Address, WalletError> {
        let guard = self.material.lock().await;
        guard
            .as_ref()
            .map(|m| m.as_signer().address())
            .ok_or(WalletError::NotInitialized)
    }

    /// Reads this wallet's balance of `asset` through `adapter`.
    ///
    /// Per §4.5, an RPC failure here is never fatal to the caller: it is
    /// logged at `warn` and reported as a balance of zero rather than
    /// propagated, since a balance read backs an advisory pre-flight check,
    /// not a submission.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::NotInitialized`] if uninitialized. Never
    /// returns [`WalletError::Chain`].
    #[instrument(skip(self, adapter, asset))]
    pub async fn balance(&self, adapter: &dyn ChainAdapter, asset: &Asset) -> Result<Amount, WalletError> {
        let address = self.address().await?;
        match adapter.balance(address, asset).await {
            Ok(amount) => Ok(amount),
            Err(e) => {
                tracing::warn!(error = %e, "balance read failed, reporting zero");
                Ok(Amount::ZERO)
            }
        }
    }

    /// Signs and submits a transfer of `amount` of `asset` to `to` through
    /// `adapter`. Holds the signer mutex for the duration of the call, so a
    /// concurrent [`Wallet::rotate`] or another transfer blocks until this
    /// one has submitted.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::NotInitialized`] if uninitialized,
    /// [`WalletError::Chain`] carrying [`xpay_core::chain::ChainError::InsufficientFunds`]
    /// if a pre-flight balance read comes up short of `amount`, or
    /// [`WalletError::Chain`] if the adapter rejects or fails the transfer.
    #[instrument(skip(self, adapter, asset), fields(%to, %amount))]
    pub async fn transfer(
        &self,
        adapter: &dyn ChainAdapter,
        to: Address,
        asset: &Asset,
        amount: Amount,
    ) -> Result<TxId, WalletError> {
        let have = self.balance(adapter, asset).await?;
        if have < amount {
            tracing::warn!(%have, need = %amount, "pre-flight balance check failed");
            return Err(WalletError::Chain(xpay_core::chain::ChainError::InsufficientFunds { have, need: amount }));
        }

        let guard = self.material.lock().await;
        let material = guard.as_ref().ok_or(WalletError::NotInitialized)?;
        let result = adapter
            .transfer(material.as_signer(), to, asset, amount)
            .await
            .map_err(WalletError::from);
        match &result {
            Ok(tx_id) => tracing::info!(%tx_id, "transfer submitted"),
            Err(err) => tracing::warn!(error = %err, "transfer failed"),
        }
        result
    }

    /// Replaces the current signer with a freshly generated one of the same
    /// network family, persisting it before releasing the lock so a crash
    /// mid-rotation never leaves the on-disk key ahead of the in-memory one.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::NotInitialized`] if uninitialized, or
    /// [`WalletError::Storage`] if the new key cannot be persisted.
    #[instrument(skip(self))]
    pub async fn rotate(&self) -> Result<Address, WalletError> {
        let mut guard = self.material.lock().await;
        let family = guard.as_ref().ok_or(WalletError::NotInitialized)?.as_signer().network_family();
        let fresh = KeyMaterial::generate(family);
        self.persist(&fresh)?;
        let address = fresh.as_signer().address();
        *guard = Some(fresh);
        tracing::info!(%address, "signer rotated");
        Ok(address)
    }

    fn persist(&self, material: &KeyMaterial) -> Result<(), WalletError> {
        let signer = material.as_signer();
        storage::write_key_file(
            &self.key_path,
            signer.network_family(),
            &signer.address().to_string(),
            &material.to_bytes(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(name: &str) -> WalletConfig {
        let dir = std::env::temp_dir().join(format!("xpay-wallet-lib-test-{}-{}", std::process::id(), name));
        std::fs::create_dir_all(&dir).unwrap();
        WalletConfig {
            key_path: dir.join("wallet.key"),
        }
    }

    #[tokio::test]
    async fn initialize_generates_and_persists_a_fresh_key() {
        let config = temp_config("fresh");
        let wallet = Wallet::new(config.clone());
        let address = wallet.initialize(NetworkFamily::Account).await.unwrap();
        assert_eq!(wallet.address().await.unwrap(), address);
        std::fs::remove_file(&config.key_path).ok();
    }

    #[tokio::test]
    async fn initialize_reloads_an_existing_key() {
        let config = temp_config("reload");
        let first_address = {
            let wallet = Wallet::new(config.clone());
            wallet.initialize(NetworkFamily::Evm).await.unwrap()
        };
        let wallet = Wallet::new(config.clone());
        let reloaded = wallet.initialize(NetworkFamily::Account).await.unwrap();
        assert_eq!(reloaded, first_address);
        std::fs::remove_file(&config.key_path).ok();
    }

    #[tokio::test]
    async fn address_before_initialize_fails() {
        let config = temp_config("uninit");
        let wallet = Wallet::new(config);
        assert!(wallet.address().await.is_err());
    }

    #[tokio::test]
    async fn rotate_changes_the_address() {
        let config = temp_config("rotate");
        let wallet = Wallet::new(config.clone());
        let before = wallet.initialize(NetworkFamily::Account).await.unwrap();
        let after = wallet.rotate().await.unwrap();
        assert_ne!(before, after);
        assert_eq!(wallet.address().await.unwrap(), after);
        std::fs::remove_file(&config.key_path).ok();
    }

    struct FakeAdapter {
        balance_result: Result<Amount, xpay_core::chain::ChainError>,
    }

    impl ChainAdapter for FakeAdapter {
        fn network(&self) -> xpay_core::network::Network {
            xpay_core::network::Network::AccountMain
        }
        fn fetch_transaction(
            &self,
            _tx_id: &TxId,
        ) -> xpay_core::chain::BoxFuture<'_, Result<Option<xpay_core::chain::ParsedTransaction>, xpay_core::chain::ChainError>> {
            Box::pin(async { panic!("not exercised by these tests") })
        }
        fn balance(&self, _owner: Address, _asset: &Asset) -> xpay_core::chain::BoxFuture<'_, Result<Amount, xpay_core::chain::ChainError>> {
            let result = self.balance_result.clone();
            Box::pin(async move { result })
        }
        fn transfer(
            &self,
            _signer: &dyn Signer,
            _to: Address,
            _asset: &Asset,
            _amount: Amount,
        ) -> xpay_core::chain::BoxFuture<'_, Result<TxId, xpay_core::chain::ChainError>> {
            Box::pin(async { panic!("transfer must not be reached when the pre-flight balance check fails") })
        }
        fn probe_health(&self) -> xpay_core::chain::BoxFuture<'_, Result<(), xpay_core::chain::ChainError>> {
            Box::pin(async { Ok(()) })
        }
    }

    #[tokio::test]
    async fn balance_reports_zero_on_adapter_error() {
        let config = temp_config("balance-rpc-error");
        let wallet = Wallet::new(config.clone());
        wallet.initialize(NetworkFamily::Account).await.unwrap();
        let adapter = FakeAdapter {
            balance_result: Err(xpay_core::chain::ChainError::RpcUnavailable("down".to_owned())),
        };
        let asset = Asset::native(9, "SOL");
        assert_eq!(wallet.balance(&adapter, &asset).await.unwrap(), Amount::ZERO);
        std::fs::remove_file(&config.key_path).ok();
    }

    #[tokio::test]
    async fn transfer_fails_insufficient_funds_before_touching_adapter() {
        let config = temp_config("transfer-short");
        let wallet = Wallet::new(config.clone());
        wallet.initialize(NetworkFamily::Account).await.unwrap();
        let adapter = FakeAdapter {
            balance_result: Ok(Amount::from_base_units(10)),
        };
        let asset = Asset::native(9, "SOL");
        let err = wallet
            .transfer(&adapter, Address::Account([2u8; 32]), &asset, Amount::from_base_units(1_000))
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::Chain(xpay_core::chain::ChainError::InsufficientFunds { .. })));
        std::fs::remove_file(&config.key_path).ok();
    }
}
