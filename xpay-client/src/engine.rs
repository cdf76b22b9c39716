//! The Client Engine (C1, §4.1): the three-step 402 handshake — issue the
//! original request, pay if challenged, retry once with a receipt.
//!
//! Grounded on `r402-http::client::X402HttpClient`'s 402-interception shape
//! (decode the challenge, build a payment, retry with a header), rewritten
//! as a plain struct driving [`reqwest::Client`] directly rather than a
//! `reqwest_middleware::Middleware` — this core has one call site per
//! payment, not an arbitrary middleware stack to splice into.

use std::collections::HashMap;
use std::time::Instant;

use reqwest::{Method, StatusCode};
use tracing::instrument;

use xpay_core::amount::Amount;
use xpay_core::chain::ChainAdapter;
use xpay_core::error::PaymentError;
use xpay_core::network::Network;
use xpay_core::payment::{ExecutionResult, Outcome, PaymentIntent, PaymentRequirement};
use xpay_core::wire::{PaymentReceiptWire, PaymentRequiredBody};
use xpay_provider::Router;
use xpay_wallet::Wallet;

const X_PAYMENT_HEADER: &str = "X-Payment";

/// The result of one `pay_and_fetch` HTTP leg: the raw status and body.
struct RawResponse {
    status: StatusCode,
    body: Vec<u8>,
}

/// Drives the 402 handshake for one caller, over one or more networks.
///
/// Each `ClientEngine` is re-entrant and holds no per-request state beyond
/// the call stack (§4.1): the same engine can run concurrent
/// `pay_and_fetch` calls, each racing only at the points the Wallet itself
/// serializes (signing).
pub struct ClientEngine {
    http: reqwest::Client,
    router: Router,
    wallet: Wallet,
    adapters: HashMap<Network, Box<dyn ChainAdapter>>,
}

impl ClientEngine {
    /// Builds an engine over `router` and `wallet`, able to pay on whichever
    /// networks `adapters` covers.
    #[must_use]
    pub fn new(http: reqwest::Client, router: Router, wallet: Wallet, adapters: HashMap<Network, Box<dyn ChainAdapter>>) -> Self {
        Self {
            http,
            router,
            wallet,
            adapters,
        }
    }

    /// Runs the full `pay_and_fetch` handshake (§4.1).
    ///
    /// Returns the final HTTP status and body, plus the [`ExecutionResult`]
    /// of any payment made — `None` if the endpoint was free (never
    /// returned 402).
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError`] for every failure named in §4.1: a
    /// malformed or empty `accepts` list (`Protocol`), no requirement on a
    /// network this engine has an adapter for (`Unsupported`), a required
    /// amount above `max_price` (`PriceCeiling`, wallet untouched), or
    /// whatever [`Router::execute`] itself fails with.
    #[instrument(skip(self, body, deadline), fields(%method, url, %max_price))]
    pub async fn pay_and_fetch(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        max_price: Amount,
        deadline: Instant,
    ) -> Result<(StatusCode, Vec<u8>, Option<ExecutionResult>), PaymentError> {
        let first = self.issue(method.clone(), url, body.as_deref(), None).await?;
        if first.status != StatusCode::PAYMENT_REQUIRED {
            tracing::debug!(status = %first.status, "endpoint did not challenge for payment");
            return Ok((first.status, first.body, None));
        }
        tracing::info!("received 402, negotiating payment");

        let challenge: PaymentRequiredBody = serde_json::from_slice(&first.body)
            .map_err(|e| PaymentError::protocol(format!("malformed 402 body: {e}")))?;
        if challenge.accepts.is_empty() {
            return Err(PaymentError::protocol("402 response carried an empty accepts list"));
        }

        let (adapter, requirement) = challenge
            .accepts
            .iter()
            .find_map(|wire| {
                let network: Network = wire.network.parse().ok()?;
                let adapter = self.adapters.get(&network)?;
                let requirement = PaymentRequirement::try_from(wire).ok()?;
                Some((adapter.as_ref(), requirement))
            })
            .ok_or_else(|| PaymentError::unsupported("none of the offered networks are configured on this engine"))?;

        if requirement.max_amount_required > max_price {
            return Err(PaymentError::price_ceiling(format!(
                "required {} exceeds ceiling {max_price}",
                requirement.max_amount_required
            )));
        }

        let intent = PaymentIntent::new(requirement, max_price)?;
        let result = self.router.execute(&intent, &self.wallet, adapter, deadline).await;
        let receipt = match result.outcome {
            Outcome::Success { receipt } => receipt,
            Outcome::Failure { kind, message } => {
                tracing::warn!(?kind, %message, "payment failed");
                return Err(PaymentError::new(kind, message));
            }
        };
        tracing::info!(tx_id = %receipt.tx_id, "payment confirmed, retrying request");

        let receipt_wire = PaymentReceiptWire::from(&receipt);
        let header_value = serde_json::to_string(&receipt_wire)
            .map_err(|e| PaymentError::internal(format!("failed to encode payment receipt: {e}")))?;
        let second = self.issue(method, url, body.as_deref(), Some(&header_value)).await?;
        if second.status != StatusCode::OK {
            tracing::warn!(status = %second.status, "retried request did not return 200 after a successful payment");
        }

        let outcome = ExecutionResult {
            provider: result.provider,
            outcome: Outcome::Success { receipt },
        };
        Ok((second.status, second.body, Some(outcome)))
    }

    /// Issues one HTTP request, accepting any status below 600 (§4.1 step
    /// 1): a 4xx/5xx response from the downstream resource is the caller's
    /// business, not this engine's.
    #[instrument(skip(self, body, payment_header), fields(%method, url, paying = payment_header.is_some()))]
    async fn issue(&self, method: Method, url: &str, body: Option<&[u8]>, payment_header: Option<&str>) -> Result<RawResponse, PaymentError> {
        let mut request = self.http.request(method, url);
        if let Some(bytes) = body {
            request = request.body(bytes.to_vec());
        }
        if let Some(header_value) = payment_header {
            request = request.header(X_PAYMENT_HEADER, header_value);
        }

        tracing::debug!("sending request");
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "request failed");
            PaymentError::transient(format!("request to {url} failed: {e}"))
        })?;
        let status = response.status();
        if status.as_u16() >= 600 {
            return Err(PaymentError::protocol(format!("server returned an invalid status {status}")));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| PaymentError::transient(format!("failed to read response body from {url}: {e}")))?
            .to_vec();
        tracing::debug!(%status, "received response");
        Ok(RawResponse { status, body })
    }
}

impl std::fmt::Debug for ClientEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientEngine").field("networks", &self.adapters.keys().collect::<Vec<_>>()).finish_non_exhaustive()
    }
}
