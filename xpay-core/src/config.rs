//! Explicit, in-process configuration structs for the Router, Wallet, and
//! Provider components.
//!
//! These are plain serde-`Deserialize`-able structs with no environment
//! reads baked in, following `r402`'s house style of taking configuration as
//! a constructor argument rather than reaching for `std::env` inside a
//! component — callers decide whether that struct comes from a file, env
//! vars, or a hardcoded default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::payment::ProviderTag;

/// Router configuration (§4.2): which provider is primary, which is the
/// fallback, and the retry/failover policy between them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// The provider tried first for every payment.
    pub primary: ProviderTag,
    /// The provider tried if `primary` is unhealthy or exhausts its
    /// retries, when `auto_failover` is set.
    pub fallback: Option<ProviderTag>,
    /// Whether to fall over to `fallback` automatically, or surface the
    /// primary's failure to the caller.
    pub auto_failover: bool,
    /// Maximum attempts against a single provider before giving up or
    /// failing over. Must be at least 1; [`RouterConfig::new`] enforces
    /// this.
    pub max_retries: u32,
    /// The delay before the first retry; each subsequent retry doubles it
    /// (§4.2's exponential backoff).
    pub base_retry_delay: Duration,
}

/// Error returned by [`RouterConfig::new`] for an invalid configuration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RouterConfigError {
    /// `max_retries` was zero; a payment must be attempted at least once.
    #[error("max_retries must be at least 1")]
    ZeroRetries,
}

impl RouterConfig {
    /// Builds a validated router configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RouterConfigError::ZeroRetries`] if `max_retries` is 0.
    pub fn new(
        primary: ProviderTag,
        fallback: Option<ProviderTag>,
        auto_failover: bool,
        max_retries: u32,
        base_retry_delay: Duration,
    ) -> Result<Self, RouterConfigError> {
        if max_retries == 0 {
            return Err(RouterConfigError::ZeroRetries);
        }
        Ok(Self {
            primary,
            fallback,
            auto_failover,
            max_retries,
            base_retry_delay,
        })
    }
}

/// Wallet configuration (§4.4): where key material lives on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Path to the persisted key file. The Wallet enforces owner-only
    /// permissions on this path at initialization.
    pub key_path: std::path::PathBuf,
}

/// Per-provider configuration (§4.2, §4.3): bounds and connection details
/// that don't belong on the shared [`RouterConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The hard ceiling this provider will ever post or accept, independent
    /// of any individual payment's own ceiling — a last line of defense
    /// against a misconfigured or compromised price quote.
    pub max_payment_value: Amount,
    /// Base URL of the facilitator service. Unused by a direct-transfer
    /// provider.
    pub facilitator_url: Option<url::Url>,
    /// Timeout applied to any single RPC or HTTP call this provider makes.
    pub request_timeout: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_config_rejects_zero_retries() {
        let result = RouterConfig::new(ProviderTag::Direct, None, false, 0, Duration::from_millis(100));
        assert!(result.is_err());
    }

    #[test]
    fn router_config_accepts_one_retry() {
        let result = RouterConfig::new(ProviderTag::Direct, None, false, 1, Duration::from_millis(100));
        assert!(result.is_ok());
    }
}
