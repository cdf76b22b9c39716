//! The Router's provider health cache (§4.2): a TTL'd liveness verdict so a
//! down primary doesn't cost a full attempt-then-fail cycle on every call.

use std::time::{Duration, Instant};

/// How long a cached health verdict is trusted before the Router probes
/// again. §4.2 names this window; chosen as 60 seconds to bound how stale a
/// routing decision can be without re-probing on every payment.
pub const HEALTH_TTL: Duration = Duration::from_secs(60);

/// A provider's most recently observed liveness, with the instant it was
/// observed so a cache lookup can tell whether it's still within
/// [`HEALTH_TTL`].
#[derive(Debug, Clone)]
pub struct ProviderHealth {
    /// Whether the provider answered its probe successfully.
    pub healthy: bool,
    /// Why the probe failed, if it did.
    pub message: Option<String>,
    observed_at: Instant,
}

impl ProviderHealth {
    /// Records a fresh health observation, timestamped now.
    #[must_use]
    pub fn observed(healthy: bool, message: Option<String>) -> Self {
        Self {
            healthy,
            message,
            observed_at: Instant::now(),
        }
    }

    /// Returns `true` if this observation is still within [`HEALTH_TTL`] of
    /// being taken.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.observed_at.elapsed() < HEALTH_TTL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_observation_is_fresh() {
        let health = ProviderHealth::observed(true, None);
        assert!(health.is_fresh());
    }

    #[test]
    fn unhealthy_observation_carries_message() {
        let health = ProviderHealth::observed(false, Some("rpc timeout".to_owned()));
        assert!(!health.healthy);
        assert_eq!(health.message.as_deref(), Some("rpc timeout"));
    }
}
