//! The Router (C2, §4.2): picks a provider, retries transient failures with
//! exponential backoff, fails over to the secondary provider, and caches
//! provider health so a down primary doesn't cost a full attempt on every
//! call.
//!
//! Grounded on `r402-facilitator::local::FacilitatorLocal`'s routing shape
//! (look up a handler, delegate, wrap the error) generalized to add the
//! retry/failover/health-cache policy §4.2 assigns to this component, which
//! `FacilitatorLocal` itself doesn't need since it never calls out to a
//! second facilitator.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::time::sleep;
use tracing::{instrument, warn};

use xpay_core::chain::ChainAdapter;
use xpay_core::config::RouterConfig;
use xpay_core::error::PaymentError;
use xpay_core::health::ProviderHealth;
use xpay_core::payment::{ExecutionResult, Outcome, PaymentIntent, PaymentReceipt, ProviderTag};
use xpay_core::stats::{RouterStats, RouterStatsSnapshot};
use xpay_wallet::Wallet;

use crate::context::ExecutionContext;
use crate::provider::Provider;

/// Routes a [`PaymentIntent`] to the primary provider, retrying and failing
/// over per its [`RouterConfig`].
pub struct Router {
    config: RouterConfig,
    primary: Provider,
    fallback: Option<Provider>,
    health: DashMap<ProviderTag, ProviderHealth>,
    stats: RouterStats,
}

impl Router {
    /// Builds a router over `primary` and an optional `fallback` provider.
    #[must_use]
    pub fn new(config: RouterConfig, primary: Provider, fallback: Option<Provider>) -> Self {
        Self {
            config,
            primary,
            fallback,
            health: DashMap::new(),
            stats: RouterStats::new(),
        }
    }

    /// A snapshot of this router's operational counters.
    #[must_use]
    pub fn stats(&self) -> RouterStatsSnapshot {
        self.stats.snapshot()
    }

    /// Executes `intent`: submits it through the primary provider, retrying
    /// transient failures, then falls over to the secondary provider (if
    /// configured and `auto_failover` is set) when the primary is exhausted
    /// or cached as unhealthy.
    ///
    /// Every submitted transaction is independently re-verified on-chain via
    /// [`xpay_verifier::verify`] before being reported as a success, whether
    /// it came from the facilitator or a direct transfer — a provider's own
    /// claim of success is never trusted on its own.
    #[instrument(skip(self, intent, wallet, adapter, deadline), fields(network = ?intent.requirement.network))]
    pub async fn execute(&self, intent: &PaymentIntent, wallet: &Wallet, adapter: &dyn ChainAdapter, deadline: Instant) -> ExecutionResult {
        let order = self.provider_order();
        let mut last_error: Option<PaymentError> = None;
        let mut last_tag = self.config.primary;

        for (position, tag) in order.iter().enumerate() {
            let Some(provider) = self.provider_for_tag(*tag) else {
                continue;
            };
            last_tag = *tag;

            let health = self.refresh_health_if_stale(*tag, provider, adapter).await;
            if !health.healthy {
                let message = health.message.unwrap_or_default();
                warn!(provider = ?tag, %message, "provider unhealthy, skipping");
                last_error = Some(PaymentError::transient(format!("provider {tag:?} is unhealthy: {message}")));
                continue;
            }

            let ctx = ExecutionContext { wallet, adapter, deadline };
            match self.execute_with_retry(provider, intent, &ctx).await {
                Ok(receipt) => {
                    self.health.insert(*tag, ProviderHealth::observed(true, None));
                    if position > 0 {
                        self.stats.record_fallback();
                    }
                    return ExecutionResult {
                        provider: *tag,
                        outcome: Outcome::Success { receipt },
                    };
                }
                Err(err) => {
                    self.health.insert(*tag, ProviderHealth::observed(false, Some(err.message.clone())));
                    last_error = Some(err);
                }
            }
        }

        let err = last_error.unwrap_or_else(|| PaymentError::internal("no provider was available to execute this payment"));
        ExecutionResult {
            provider: last_tag,
            outcome: Outcome::Failure { kind: err.kind, message: err.message },
        }
    }

    /// The providers to try, in order, for one [`Router::execute`] call.
    fn provider_order(&self) -> Vec<ProviderTag> {
        let mut order = vec![self.config.primary];
        if self.config.auto_failover {
            if let Some(fallback) = self.config.fallback {
                if fallback != self.config.primary {
                    order.push(fallback);
                }
            }
        }
        order
    }

    /// §4.2 step 1: reuse a cached health verdict younger than
    /// [`xpay_core::health::HEALTH_TTL`], or probe `provider` and cache the
    /// fresh result.
    async fn refresh_health_if_stale(&self, tag: ProviderTag, provider: &Provider, adapter: &dyn ChainAdapter) -> ProviderHealth {
        if let Some(cached) = self.health.get(&tag) {
            if cached.is_fresh() {
                return cached.clone();
            }
        }
        let fresh = provider.health(adapter).await;
        self.health.insert(tag, fresh.clone());
        fresh
    }

    fn provider_for_tag(&self, tag: ProviderTag) -> Option<&Provider> {
        if self.primary.tag() == tag {
            Some(&self.primary)
        } else if self.fallback.as_ref().is_some_and(|p| p.tag() == tag) {
            self.fallback.as_ref()
        } else {
            None
        }
    }

    /// Retries [`Provider::submit`] with exponential backoff on
    /// [`FailureKind::is_retryable`] failures, up to `max_retries` attempts.
    ///
    /// Once a transaction has been submitted, a subsequent verification
    /// failure is never retried by resubmitting — resubmitting after a
    /// successful submission would risk a second on-chain transfer.
    #[instrument(skip(self, provider, intent, ctx), fields(provider = ?provider.tag()))]
    async fn execute_with_retry(&self, provider: &Provider, intent: &PaymentIntent, ctx: &ExecutionContext<'_>) -> Result<PaymentReceipt, PaymentError> {
        let mut attempt = 1;
        let mut delay = self.config.base_retry_delay;
        loop {
            match provider.submit(intent, ctx).await {
                Ok(tx_id) => {
                    let verdict = xpay_verifier::verify(ctx.adapter, &intent.requirement, &tx_id, ctx.deadline).await?;
                    return match verdict {
                        xpay_verifier::Verdict::VerifiedOk { tx_id, observed_amount } => {
                            let from = ctx.wallet.address().await.map_err(PaymentError::from)?;
                            Ok(PaymentReceipt {
                                network: intent.requirement.network,
                                tx_id,
                                from,
                                to: intent.requirement.pay_to,
                                amount: observed_amount,
                                asset: intent.requirement.asset.clone(),
                            })
                        }
                        xpay_verifier::Verdict::VerifiedBad { reason } => Err(PaymentError::verification(reason)),
                    };
                }
                Err(err) if err.kind.is_retryable() && attempt < self.config.max_retries => {
                    warn!(attempt, ?delay, error = %err, "retrying after transient failure");
                    sleep(delay).await;
                    attempt += 1;
                    delay = delay.saturating_mul(2);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("primary", &self.config.primary)
            .field("fallback", &self.config.fallback)
            .field("auto_failover", &self.config.auto_failover)
            .finish_non_exhaustive()
    }
}
