//! A minimal JSON-RPC client, just enough of the `eth_*` surface this
//! stubbed adapter needs. `r402-evm`'s provider wires a full Alloy fill
//! stack (nonce manager, gas estimator, round-robin signer) for a
//! production settlement path; this crate needs only request/response and
//! reqwest, already in the workspace for the Client Engine's HTTP fetch, to
//! cover that.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::instrument;

use xpay_core::chain::ChainError;

/// A bare JSON-RPC 2.0 client bound to one endpoint.
pub struct JsonRpcClient {
    http: reqwest::Client,
    url: url::Url,
}

impl JsonRpcClient {
    /// Builds a client for the given endpoint.
    #[must_use]
    pub fn new(url: url::Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }

    /// Invokes `method` with `params` and decodes the `result` field as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::RpcUnavailable`] on a transport failure, or
    /// [`ChainError::Malformed`] if the node returns a JSON-RPC error or a
    /// result this client cannot decode.
    #[instrument(skip(self, params), fields(url = %self.url))]
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ChainError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        tracing::debug!("sending rpc call");
        let response = self.http.post(self.url.clone()).json(&body).send().await.map_err(|e| {
            tracing::warn!(error = %e, "rpc transport failure");
            ChainError::RpcUnavailable(e.to_string())
        })?;
        let envelope: Value = response
            .json()
            .await
            .map_err(|e| ChainError::Malformed(format!("non-JSON rpc response: {e}")))?;
        if let Some(error) = envelope.get("error") {
            tracing::warn!(%error, "rpc node returned an error");
            return Err(ChainError::Malformed(format!("rpc error: {error}")));
        }
        let result = envelope
            .get("result")
            .cloned()
            .ok_or_else(|| ChainError::Malformed("rpc response missing result field".to_owned()))?;
        serde_json::from_value(result).map_err(|e| ChainError::Malformed(format!("unexpected result shape: {e}")))
    }
}
