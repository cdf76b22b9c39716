//! The facilitator provider (§4.2, §4.4): pre-checks admissibility against a
//! remote facilitator's `/verify` endpoint, then drives the same
//! Wallet-signs/Chain-Adapter-submits path [`crate::direct::DirectProvider`]
//! uses — per §4.4 the facilitator here only pre-validates, it never
//! custodies or submits the transfer itself.
//!
//! Grounded on `r402-http::facilitator::HttpFacilitatorClient`'s shape (a
//! `reqwest::Client` plus a base URL, one POST per call, non-2xx mapped to an
//! error carrying the response body), adapted from its two-phase
//! verify-then-settle protocol to this core's one-phase pre-check.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use xpay_core::amount::Amount;
use xpay_core::chain::{ChainAdapter, TxId};
use xpay_core::config::ProviderConfig;
use xpay_core::error::{FailureKind, PaymentError};
use xpay_core::payment::PaymentIntent;
use xpay_core::wire::PaymentRequirementWire;

use crate::context::ExecutionContext;
use crate::direct::DirectProvider;

/// How long the health probe's facilitator `/list` call is allowed to take
/// (§4.4: "must return 2xx within 5 s").
const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FacilitatorVerifyRequest {
    payer: String,
    requirement: PaymentRequirementWire,
}

#[derive(Debug, Deserialize)]
struct FacilitatorVerifyResponse {
    valid: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// Error returned by [`FacilitatorProvider::new`] for an invalid configuration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FacilitatorConfigError {
    /// `config.facilitator_url` was `None`; a facilitator provider has
    /// nowhere to send its `/verify`/`/list` calls.
    #[error("facilitator provider requires a configured facilitator_url")]
    MissingUrl,
}

/// Pre-checks admissibility with a remote facilitator, then submits the
/// transfer through the caller's own wallet.
pub struct FacilitatorProvider {
    http: reqwest::Client,
    base_url: url::Url,
    max_payment_value: Amount,
    direct: DirectProvider,
}

impl FacilitatorProvider {
    /// Builds a provider talking to `config.facilitator_url`, with
    /// `config.request_timeout` applied to the `/verify` pre-check call and
    /// `config.max_payment_value` enforced as this provider's own ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`FacilitatorConfigError::MissingUrl`] if
    /// `config.facilitator_url` is `None`.
    pub fn new(config: ProviderConfig) -> Result<Self, FacilitatorConfigError> {
        let base_url = config.facilitator_url.clone().ok_or(FacilitatorConfigError::MissingUrl)?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_default();
        let max_payment_value = config.max_payment_value;
        Ok(Self {
            http,
            base_url,
            max_payment_value,
            direct: DirectProvider::new(config),
        })
    }

    /// Posts `intent`'s requirement to the facilitator's `/verify` endpoint;
    /// if the facilitator reports it admissible, submits the transfer
    /// through `ctx`'s wallet exactly as [`DirectProvider`] would.
    ///
    /// # Errors
    ///
    /// Returns [`FailureKind::Transient`] on a connection failure, timeout,
    /// or `5xx`/`429` response; [`FailureKind::Protocol`] on a `4xx`
    /// response, a malformed body, or `valid: false`.
    #[instrument(skip(self, intent, ctx), fields(base_url = %self.base_url))]
    pub async fn submit(&self, intent: &PaymentIntent, ctx: &ExecutionContext<'_>) -> Result<TxId, PaymentError> {
        let requirement = &intent.requirement;
        if requirement.max_amount_required > self.max_payment_value {
            tracing::warn!(
                required = %requirement.max_amount_required,
                ceiling = %self.max_payment_value,
                "requirement exceeds this provider's configured ceiling"
            );
            return Err(PaymentError::price_ceiling(format!(
                "required {} exceeds this provider's configured ceiling {}",
                requirement.max_amount_required, self.max_payment_value
            )));
        }

        let payer = ctx.wallet.address().await.map_err(PaymentError::from)?;
        let body = FacilitatorVerifyRequest {
            payer: payer.to_string(),
            requirement: (&intent.requirement).into(),
        };

        tracing::debug!("posting to facilitator /verify");
        let response = self
            .http
            .post(format!("{}verify", ensure_trailing_slash(self.base_url.as_str())))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "facilitator verify request failed");
                PaymentError::transient(format!("facilitator verify request failed: {e}"))
            })?;

        let status = response.status();
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "facilitator verify returned a transient failure");
            return Err(PaymentError::transient(format!("facilitator verify failed ({status}): {text}")));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(PaymentError::new(
                FailureKind::Protocol,
                format!("facilitator rejected verify ({status}): {text}"),
            ));
        }

        let parsed: FacilitatorVerifyResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::protocol(format!("malformed facilitator verify response: {e}")))?;
        if !parsed.valid {
            tracing::debug!(reason = ?parsed.reason, "facilitator declined the payment");
            return Err(PaymentError::protocol(
                parsed.reason.unwrap_or_else(|| "facilitator declined the payment".to_owned()),
            ));
        }

        tracing::debug!("facilitator admitted the payment, submitting directly");
        self.direct.submit(intent, ctx).await
    }

    /// Probes this facilitator's `/list` endpoint and `adapter`'s chain tip
    /// (§4.4): healthy only if both answer.
    #[instrument(skip(self, adapter), fields(base_url = %self.base_url))]
    pub async fn check_health(&self, adapter: &dyn ChainAdapter) -> xpay_core::health::ProviderHealth {
        let facilitator_check = self
            .http
            .get(format!("{}list", ensure_trailing_slash(self.base_url.as_str())))
            .timeout(HEALTH_PROBE_TIMEOUT)
            .send()
            .await;
        let facilitator_ok = matches!(&facilitator_check, Ok(resp) if resp.status().is_success());
        let chain_ok = adapter.probe_health().await.is_ok();

        if facilitator_ok && chain_ok {
            xpay_core::health::ProviderHealth::observed(true, None)
        } else {
            let message = match facilitator_check {
                Ok(resp) if !facilitator_ok => format!("facilitator /list returned {}", resp.status()),
                Err(e) => format!("facilitator /list unreachable: {e}"),
                Ok(_) if !chain_ok => "chain adapter reported no tip".to_owned(),
                Ok(_) => "facilitator health check failed".to_owned(),
            };
            tracing::warn!(%message, "facilitator health probe failed");
            xpay_core::health::ProviderHealth::observed(false, Some(message))
        }
    }
}

impl std::fmt::Debug for FacilitatorProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacilitatorProvider").field("base_url", &self.base_url.as_str()).finish_non_exhaustive()
    }
}

fn ensure_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_owned()
    } else {
        format!("{url}/")
    }
}
