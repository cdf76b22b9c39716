//! The exhaustive failure taxonomy shared by every component (§7).
//!
//! Unlike `r402::error::PaymentError` (which wraps heterogeneous
//! `VerifyError`/`SettleError`/... structs pulled in via `#[from]`), §7 of
//! the spec calls for one flat, *closed* kind enum so the Router's retry
//! predicate can match on the kind alone — REDESIGN FLAG: "Dynamic error
//! messages coerced into control flow... Replaced by a typed failure kind
//! set; the Router's retry predicate matches on the kind, never on the
//! message."

use std::fmt;

/// The seven failure kinds named in §7. This is deliberately exhaustive, not
/// `#[non_exhaustive]`: every caller that matches on `FailureKind` is meant
/// to handle all seven arms, and adding an eighth is a spec change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Malformed 402 body, empty `accepts`, malformed receipt fields.
    Protocol,
    /// Network tag not served by any provider.
    Unsupported,
    /// Posted price exceeds the caller's ceiling.
    PriceCeiling,
    /// Signer balance below the requested amount.
    InsufficientFunds,
    /// HTTP 5xx, timeouts, connection resets, RPC rate limits, or an
    /// unfinalized transaction past its deadline.
    Transient,
    /// `Verifier::verify` returned a bad verdict.
    Verification,
    /// A precondition violation: uninitialized wallet, nil adapter. A bug,
    /// not a recoverable condition.
    Internal,
}

impl FailureKind {
    /// §4.2: kinds the Router retries (`Transient`) or fails over on
    /// (`Transient` and, via `Internal`, truly unexpected states). All other
    /// kinds are non-transient and short-circuit after exactly one attempt.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Transient | Self::Internal)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Protocol => "protocol",
            Self::Unsupported => "unsupported",
            Self::PriceCeiling => "price_ceiling",
            Self::InsufficientFunds => "insufficient_funds",
            Self::Transient => "transient",
            Self::Verification => "verification",
            Self::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// A categorized failure carrying a human-readable message.
///
/// The message must never contain secret key material (§6's logging
/// contract); every producer of `PaymentError` in this workspace builds its
/// message from transaction ids, amounts, and addresses only.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct PaymentError {
    /// The machine-matchable failure kind.
    pub kind: FailureKind,
    /// A human-readable message, safe to log and safe to return to a caller.
    pub message: String,
}

impl PaymentError {
    /// Constructs a new categorized error.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for [`FailureKind::Protocol`].
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Protocol, message)
    }

    /// Shorthand for [`FailureKind::Unsupported`].
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Unsupported, message)
    }

    /// Shorthand for [`FailureKind::PriceCeiling`].
    pub fn price_ceiling(message: impl Into<String>) -> Self {
        Self::new(FailureKind::PriceCeiling, message)
    }

    /// Shorthand for [`FailureKind::InsufficientFunds`].
    pub fn insufficient_funds(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InsufficientFunds, message)
    }

    /// Shorthand for [`FailureKind::Transient`].
    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Transient, message)
    }

    /// Shorthand for [`FailureKind::Verification`].
    pub fn verification(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Verification, message)
    }

    /// Shorthand for [`FailureKind::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Internal, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_and_internal_retry() {
        assert!(FailureKind::Transient.is_retryable());
        assert!(FailureKind::Internal.is_retryable());
        assert!(!FailureKind::PriceCeiling.is_retryable());
        assert!(!FailureKind::InsufficientFunds.is_retryable());
        assert!(!FailureKind::Unsupported.is_retryable());
        assert!(!FailureKind::Protocol.is_retryable());
        assert!(!FailureKind::Verification.is_retryable());
    }

    #[test]
    fn display_never_includes_secret_placeholder() {
        let err = PaymentError::internal("adapter not initialized");
        assert_eq!(err.to_string(), "internal: adapter not initialized");
    }
}
