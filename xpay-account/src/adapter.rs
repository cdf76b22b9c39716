//! The account-model [`ChainAdapter`] implementation, grounded on
//! `r402-svm`'s `SolanaChainProviderLike` RPC usage but reduced to the
//! simpler fetch-and-diff verification model this core uses instead of
//! instruction-level transaction inspection.

use std::str::FromStr;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_commitment_config::CommitmentConfig;
use solana_message::Message;
use solana_pubkey::Pubkey;
use solana_signature::Signature as SolanaSignature;
use solana_transaction::Transaction;
use solana_transaction_status_client_types::{
    EncodedTransaction, UiTransactionEncoding,
};

use xpay_core::address::Address;
use xpay_core::amount::Amount;
use xpay_core::asset::{Asset, AssetKind};
use xpay_core::chain::{BoxFuture, ChainAdapter, ChainError, ParsedTransaction, TxId};
use xpay_core::network::Network;
use xpay_core::signer::Signer;

use crate::deltas::{compute_account_deltas, compute_token_deltas, RawTokenBalance};
use crate::programs::{derive_ata, SYSTEM_PROGRAM_ID};
use crate::signer_bridge::SolanaSignerBridge;

/// The account-model chain adapter: one RPC client bound to one network.
pub struct AccountChainAdapter {
    network: Network,
    rpc: RpcClient,
}

impl AccountChainAdapter {
    /// Builds an adapter talking to `rpc_url` on behalf of `network`.
    #[must_use]
    pub fn new(network: Network, rpc_url: impl Into<String>) -> Self {
        Self {
            network,
            rpc: RpcClient::new(rpc_url.into()),
        }
    }

    fn account_pubkey(address: Address) -> Result<Pubkey, ChainError> {
        match address {
            Address::Account(bytes) => Ok(Pubkey::from(bytes)),
            Address::Evm(_) => Err(ChainError::Malformed("expected an account-model address".to_owned())),
        }
    }

    fn mint_pubkey(asset: &Asset) -> Result<Pubkey, ChainError> {
        let address = asset
            .mint_or_contract
            .ok_or_else(|| ChainError::Malformed("token asset missing mint address".to_owned()))?;
        Self::account_pubkey(address)
    }
}

impl ChainAdapter for AccountChainAdapter {
    fn network(&self) -> Network {
        self.network
    }

    fn fetch_transaction(&self, tx_id: &TxId) -> BoxFuture<'_, Result<Option<ParsedTransaction>, ChainError>> {
        let raw = tx_id.as_str().to_owned();
        let network = self.network;
        Box::pin(async move {
            let signature = SolanaSignature::from_str(&raw)
                .map_err(|e| ChainError::Malformed(format!("bad transaction signature: {e}")))?;
            let config = RpcTransactionConfig {
                encoding: Some(UiTransactionEncoding::Base64),
                commitment: Some(CommitmentConfig::finalized()),
                max_supported_transaction_version: Some(0),
            };
            tracing::debug!(tx_id = %raw, "fetching transaction");
            let response = match self.rpc.get_transaction_with_config(&signature, config).await {
                Ok(response) => response,
                Err(e) if is_not_found(&e) => return Ok(None),
                Err(e) => {
                    tracing::warn!(tx_id = %raw, error = %e, "rpc transaction fetch failed");
                    return Err(ChainError::RpcUnavailable(e.to_string()));
                }
            };

            let Some(meta) = response.transaction.meta else {
                return Err(ChainError::Malformed("transaction missing status metadata".to_owned()));
            };
            let on_chain_error = meta.err.as_ref().map(|err| format!("{err:?}"));
            if let Some(err) = &on_chain_error {
                tracing::info!(tx_id = %raw, %err, "transaction finalized with an instruction error");
            }

            let EncodedTransaction::Json(ui_transaction) = response.transaction.transaction else {
                return Err(ChainError::Malformed("unexpected transaction encoding".to_owned()));
            };
            let solana_transaction_status_client_types::UiMessage::Raw(raw_message) = ui_transaction.message else {
                return Err(ChainError::Malformed("expected a raw (non-parsed) transaction message".to_owned()));
            };
            let account_keys: Vec<[u8; 32]> = raw_message
                .account_keys
                .iter()
                .map(|key| Pubkey::from_str(key).map(|p| p.to_bytes()).unwrap_or_default())
                .collect();

            let pre_token: Vec<RawTokenBalance> = Option::<Vec<_>>::from(meta.pre_token_balances)
                .unwrap_or_default()
                .iter()
                .filter_map(to_raw_token_balance)
                .collect();
            let post_token: Vec<RawTokenBalance> = Option::<Vec<_>>::from(meta.post_token_balances)
                .unwrap_or_default()
                .iter()
                .filter_map(to_raw_token_balance)
                .collect();
            let token_deltas = compute_token_deltas(&pre_token, &post_token);
            let account_deltas = compute_account_deltas(&account_keys, &meta.pre_balances, &meta.post_balances);

            let tx_id = TxId::parse(raw, network)
                .map_err(|e| ChainError::Malformed(format!("tx id shape check failed after fetch: {e}")))?;
            Ok(Some(ParsedTransaction {
                tx_id,
                finalized: true,
                token_deltas,
                account_deltas,
                on_chain_error,
            }))
        })
    }

    fn balance(&self, owner: Address, asset: &Asset) -> BoxFuture<'_, Result<Amount, ChainError>> {
        Box::pin(async move {
            let owner_pubkey = Self::account_pubkey(owner)?;
            match asset.kind {
                AssetKind::Native => {
                    let lamports = self
                        .rpc
                        .get_balance(&owner_pubkey)
                        .await
                        .map_err(|e| ChainError::RpcUnavailable(e.to_string()))?;
                    Ok(Amount::from_base_units(u128::from(lamports)))
                }
                AssetKind::Token => {
                    let mint = Self::mint_pubkey(asset)?;
                    let ata = derive_ata(&owner_pubkey, &mint);
                    let balance = self
                        .rpc
                        .get_token_account_balance(&ata)
                        .await
                        .map_err(|e| ChainError::RpcUnavailable(e.to_string()))?;
                    let units: u128 = balance
                        .amount
                        .parse()
                        .map_err(|_| ChainError::Malformed("non-numeric token balance amount".to_owned()))?;
                    Ok(Amount::from_base_units(units))
                }
            }
        })
    }

    fn transfer(
        &self,
        signer: &dyn Signer,
        to: Address,
        asset: &Asset,
        amount: Amount,
    ) -> BoxFuture<'_, Result<TxId, ChainError>> {
        let to = to;
        let asset = asset.clone();
        Box::pin(async move {
            let bridge = SolanaSignerBridge::new(signer);
            let from_pubkey = solana_signer::Signer::try_pubkey(&bridge)
                .map_err(|e| ChainError::Malformed(format!("signer has no account-model address: {e}")))?;
            let to_pubkey = Self::account_pubkey(to)?;

            let instruction = match asset.kind {
                AssetKind::Native => solana_message::system_instruction::transfer(
                    &from_pubkey,
                    &to_pubkey,
                    u64::try_from(amount.base_units())
                        .map_err(|_| ChainError::Malformed("amount exceeds u64 lamport range".to_owned()))?,
                ),
                AssetKind::Token => {
                    let mint = Self::mint_pubkey(&asset)?;
                    let source = derive_ata(&from_pubkey, &mint);
                    let destination = derive_ata(&to_pubkey, &mint);
                    spl_token::instruction::transfer_checked(
                        &spl_token::ID,
                        &source,
                        &mint,
                        &destination,
                        &from_pubkey,
                        &[],
                        u64::try_from(amount.base_units())
                            .map_err(|_| ChainError::Malformed("amount exceeds u64 base-unit range".to_owned()))?,
                        asset.decimals,
                    )
                    .map_err(|e| ChainError::Malformed(format!("bad transfer instruction: {e}")))?
                }
            };

            let blockhash = self
                .rpc
                .get_latest_blockhash()
                .await
                .map_err(|e| ChainError::RpcUnavailable(e.to_string()))?;
            let message = Message::new(&[instruction], Some(&from_pubkey));
            let transaction = Transaction::new(&[&bridge], message, blockhash);

            tracing::debug!(%to_pubkey, %amount, "submitting transfer");
            let signature = self.rpc.send_and_confirm_transaction(&transaction).await.map_err(|e| {
                tracing::warn!(error = %e, "transfer submission failed");
                ChainError::RpcUnavailable(e.to_string())
            })?;
            tracing::info!(%signature, "transfer confirmed");
            TxId::parse(signature.to_string(), self.network)
                .map_err(|e| ChainError::Malformed(format!("submitted signature failed shape check: {e}")))
        })
    }

    fn probe_health(&self) -> BoxFuture<'_, Result<(), ChainError>> {
        Box::pin(async move {
            self.rpc
                .get_health()
                .await
                .map_err(|e| ChainError::RpcUnavailable(e.to_string()))
        })
    }
}

fn to_raw_token_balance(
    balance: &solana_transaction_status_client_types::UiTransactionTokenBalance,
) -> Option<RawTokenBalance> {
    let owner_str = Option::<String>::from(balance.owner.clone())?;
    let owner = Pubkey::from_str(&owner_str).ok()?.to_bytes();
    let mint = Pubkey::from_str(&balance.mint).ok()?.to_bytes();
    let amount: u128 = balance.ui_token_amount.amount.parse().ok()?;
    Some(RawTokenBalance {
        account_index: balance.account_index as usize,
        owner,
        mint,
        amount,
    })
}

fn is_not_found(error: &solana_client::client_error::ClientError) -> bool {
    error.to_string().to_lowercase().contains("not found")
}
