//! The EVM [`ChainAdapter`] implementation.
//!
//! Deliberately thin: §1 scopes the EVM side of this core down to "the
//! contract is identical" rather than a production settlement path, so this
//! builds and signs legacy (pre-EIP-1559) transactions over a bare
//! JSON-RPC client instead of `r402-evm`'s full Alloy fill-stack provider —
//! fee estimation is a fixed constant rather than a simulated gas quote.

use serde::Deserialize;
use serde_json::json;

use xpay_core::address::Address;
use xpay_core::amount::Amount;
use xpay_core::asset::{Asset, AssetKind};
use xpay_core::chain::{AccountBalanceDelta, BoxFuture, ChainAdapter, ChainError, ParsedTransaction, TxId};
use xpay_core::network::Network;
use xpay_core::signer::Signer;

use crate::events::{decode_transfer_log, RawLog};
use crate::rlp::{encode_bytes, encode_list, encode_uint};
use crate::rpc::JsonRpcClient;

/// A fixed gas limit used for every transfer this adapter submits, in lieu
/// of a live `eth_estimateGas` round trip.
const GAS_LIMIT: u64 = 90_000;

/// The EVM chain adapter: one JSON-RPC client bound to one network.
pub struct EvmChainAdapter {
    network: Network,
    chain_id: u64,
    rpc: JsonRpcClient,
}

impl EvmChainAdapter {
    /// Builds an adapter talking to `rpc_url` on behalf of `network`.
    #[must_use]
    pub fn new(network: Network, rpc_url: url::Url, chain_id: u64) -> Self {
        Self {
            network,
            chain_id,
            rpc: JsonRpcClient::new(rpc_url),
        }
    }

    fn evm_address(address: Address) -> Result<[u8; 20], ChainError> {
        match address {
            Address::Evm(bytes) => Ok(bytes),
            Address::Account(_) => Err(ChainError::Malformed("expected an EVM address".to_owned())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EthLogWire {
    address: String,
    topics: Vec<String>,
    data: String,
}

#[derive(Debug, Deserialize)]
struct EthReceiptWire {
    status: String,
    #[serde(rename = "gasUsed")]
    gas_used: String,
    #[serde(rename = "effectiveGasPrice", default)]
    effective_gas_price: Option<String>,
    logs: Vec<EthLogWire>,
}

#[derive(Debug, Deserialize)]
struct EthTxWire {
    value: String,
    from: String,
    to: Option<String>,
}

fn parse_hex_u128(s: &str) -> Result<u128, ChainError> {
    u128::from_str_radix(s.trim_start_matches("0x"), 16)
        .map_err(|e| ChainError::Malformed(format!("bad hex integer {s:?}: {e}")))
}

fn parse_hex_address(s: &str) -> Result<[u8; 20], ChainError> {
    let bytes = hex::decode(s.trim_start_matches("0x")).map_err(|e| ChainError::Malformed(e.to_string()))?;
    bytes
        .try_into()
        .map_err(|_| ChainError::Malformed(format!("address {s:?} was not 20 bytes")))
}

impl ChainAdapter for EvmChainAdapter {
    fn network(&self) -> Network {
        self.network
    }

    fn fetch_transaction(&self, tx_id: &TxId) -> BoxFuture<'_, Result<Option<ParsedTransaction>, ChainError>> {
        let raw = tx_id.as_str().to_owned();
        let network = self.network;
        Box::pin(async move {
            let receipt: Option<EthReceiptWire> =
                self.rpc.call("eth_getTransactionReceipt", json!([raw])).await?;
            let Some(receipt) = receipt else {
                return Ok(None);
            };
            let tx: EthTxWire = self
                .rpc
                .call("eth_getTransactionByHash", json!([raw]))
                .await?
                .ok_or_else(|| ChainError::Malformed("receipt present but transaction missing".to_owned()))?;

            let reverted = receipt.status != "0x1";
            let on_chain_error = reverted.then(|| "transaction reverted on-chain".to_owned());
            if let Some(err) = &on_chain_error {
                tracing::info!(tx_id = %raw, %err, "transaction finalized with a revert");
                let tx_id = TxId::parse(raw, network)
                    .map_err(|e| ChainError::Malformed(format!("tx id shape check failed after fetch: {e}")))?;
                return Ok(Some(ParsedTransaction {
                    tx_id,
                    finalized: true,
                    token_deltas: Vec::new(),
                    account_deltas: Vec::new(),
                    on_chain_error,
                }));
            }

            let gas_used = parse_hex_u128(&receipt.gas_used)?;
            let gas_price = receipt
                .effective_gas_price
                .as_deref()
                .map(parse_hex_u128)
                .transpose()?
                .unwrap_or(0);
            let value = parse_hex_u128(&tx.value)?;
            let from = parse_hex_address(&tx.from)?;

            let mut account_deltas = Vec::new();
            if value > 0 || gas_used > 0 {
                let fee = gas_used.saturating_mul(gas_price);
                account_deltas.push(AccountBalanceDelta {
                    owner: Address::Evm(from),
                    delta: -(i128::try_from(value + fee).unwrap_or(i128::MAX)),
                });
                if let Some(to) = tx.to.as_deref() {
                    let to_bytes = parse_hex_address(to)?;
                    account_deltas.push(AccountBalanceDelta {
                        owner: Address::Evm(to_bytes),
                        delta: i128::try_from(value).unwrap_or(i128::MAX),
                    });
                }
            }

            let mut token_deltas = Vec::new();
            for log in &receipt.logs {
                let address = parse_hex_address(&log.address)?;
                let topics: Vec<[u8; 32]> = log
                    .topics
                    .iter()
                    .map(|t| {
                        hex::decode(t.trim_start_matches("0x"))
                            .ok()
                            .and_then(|b| b.try_into().ok())
                            .ok_or_else(|| ChainError::Malformed(format!("bad log topic {t:?}")))
                    })
                    .collect::<Result<_, _>>()?;
                let data = hex::decode(log.data.trim_start_matches("0x")).map_err(|e| ChainError::Malformed(e.to_string()))?;
                let raw_log = RawLog { address, topics, data };
                if let Some(deltas) = decode_transfer_log(&raw_log) {
                    token_deltas.extend(deltas);
                }
            }

            let tx_id = TxId::parse(raw, network)
                .map_err(|e| ChainError::Malformed(format!("tx id shape check failed after fetch: {e}")))?;
            Ok(Some(ParsedTransaction {
                tx_id,
                finalized: true,
                token_deltas,
                account_deltas,
                on_chain_error: None,
            }))
        })
    }

    fn balance(&self, owner: Address, asset: &Asset) -> BoxFuture<'_, Result<Amount, ChainError>> {
        let asset = asset.clone();
        Box::pin(async move {
            let owner_bytes = Self::evm_address(owner)?;
            let owner_hex = format!("0x{}", hex::encode(owner_bytes));
            match asset.kind {
                AssetKind::Native => {
                    let balance_hex: String = self.rpc.call("eth_getBalance", json!([owner_hex, "latest"])).await?;
                    Ok(Amount::from_base_units(parse_hex_u128(&balance_hex)?))
                }
                AssetKind::Token => {
                    let mint = Self::evm_address(
                        asset
                            .mint_or_contract
                            .ok_or_else(|| ChainError::Malformed("token asset missing contract address".to_owned()))?,
                    )?;
                    let mut calldata = vec![0x70, 0xa0, 0x82, 0x31]; // balanceOf(address) selector
                    calldata.extend_from_slice(&[0u8; 12]);
                    calldata.extend_from_slice(&owner_bytes);
                    let call = json!({"to": format!("0x{}", hex::encode(mint)), "data": format!("0x{}", hex::encode(calldata))});
                    let result_hex: String = self.rpc.call("eth_call", json!([call, "latest"])).await?;
                    Ok(Amount::from_base_units(parse_hex_u128(&result_hex)?))
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
        let asset = asset.clone();
        Box::pin(async move {
            let from_bytes = Self::evm_address(signer.address())?;
            let to_bytes = Self::evm_address(to)?;
            let from_hex = format!("0x{}", hex::encode(from_bytes));

            let nonce_hex: String = self.rpc.call("eth_getTransactionCount", json!([from_hex, "latest"])).await?;
            let nonce = parse_hex_u128(&nonce_hex)?;
            let gas_price_hex: String = self.rpc.call("eth_gasPrice", json!([])).await?;
            let gas_price = parse_hex_u128(&gas_price_hex)?;

            let (to_field, value, data) = match asset.kind {
                AssetKind::Native => (to_bytes, amount.base_units(), Vec::new()),
                AssetKind::Token => {
                    let mint = Self::evm_address(
                        asset
                            .mint_or_contract
                            .ok_or_else(|| ChainError::Malformed("token asset missing contract address".to_owned()))?,
                    )?;
                    let mut calldata = vec![0xa9, 0x05, 0x9c, 0xbb]; // transfer(address,uint256) selector
                    calldata.extend_from_slice(&[0u8; 12]);
                    calldata.extend_from_slice(&to_bytes);
                    let amount_bytes = amount.base_units().to_be_bytes();
                    calldata.extend_from_slice(&amount_bytes);
                    (mint, 0, calldata)
                }
            };

            let unsigned = encode_list(&[
                encode_uint(nonce),
                encode_uint(gas_price),
                encode_uint(u128::from(GAS_LIMIT)),
                encode_bytes(&to_field),
                encode_uint(value),
                encode_bytes(&data),
                encode_uint(u128::from(self.chain_id)),
                encode_bytes(&[]),
                encode_bytes(&[]),
            ]);

            let signature = signer
                .sign(&unsigned)
                .map_err(|e| ChainError::Signer(e))?;
            if signature.0.len() != 65 {
                return Err(ChainError::Malformed("expected a 65-byte recoverable signature".to_owned()));
            }
            let r = &signature.0[0..32];
            let s = &signature.0[32..64];
            let recovery_id = signature.0[64];
            let v = u128::from(recovery_id) + u128::from(self.chain_id) * 2 + 35;

            let signed = encode_list(&[
                encode_uint(nonce),
                encode_uint(gas_price),
                encode_uint(u128::from(GAS_LIMIT)),
                encode_bytes(&to_field),
                encode_uint(value),
                encode_bytes(&data),
                encode_uint(v),
                encode_bytes(r),
                encode_bytes(s),
            ]);
            let raw_tx = format!("0x{}", hex::encode(signed));

            tracing::debug!(to = %format!("0x{}", hex::encode(to_bytes)), %value, "submitting transfer");
            let tx_hash: String = self.rpc.call("eth_sendRawTransaction", json!([raw_tx])).await?;
            tracing::info!(%tx_hash, "transfer broadcast");
            TxId::parse(tx_hash, self.network)
                .map_err(|e| ChainError::Malformed(format!("submitted tx hash failed shape check: {e}")))
        })
    }

    fn probe_health(&self) -> BoxFuture<'_, Result<(), ChainError>> {
        Box::pin(async move {
            let _: String = self.rpc.call("eth_blockNumber", json!([])).await?;
            Ok(())
        })
    }
}
