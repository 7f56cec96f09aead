//! Temporary exclusion of models that recently failed provider-side.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Classification of a retryable completion failure, mapped from the HTTP
/// status that triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// HTTP 429.
    RateLimited,
    /// HTTP 404: the model has no live endpoint for this request.
    EndpointRejected,
    /// HTTP 402.
    PaymentRequired,
    /// Any other retryable rejection.
    Other,
}

impl FailureKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            429 => FailureKind::RateLimited,
            404 => FailureKind::EndpointRejected,
            402 => FailureKind::PaymentRequired,
            _ => FailureKind::Other,
        }
    }

    /// How long the model stays out of selection after this failure.
    pub fn cooldown(self) -> Duration {
        match self {
            FailureKind::RateLimited => Duration::from_secs(300),
            FailureKind::EndpointRejected => Duration::from_secs(180),
            FailureKind::PaymentRequired => Duration::from_secs(1800),
            FailureKind::Other => Duration::from_secs(300),
        }
    }
}

/// In-memory set of models excluded from selection until a cooldown expires.
///
/// The set is process-lifetime only: a restart clears every exclusion. The
/// interior mutex keeps a shared tracker coherent when asks for different
/// conversation slots run concurrently in one process.
#[derive(Debug, Default)]
pub struct AvailabilityTracker {
    exclusions: Mutex<HashMap<String, Instant>>,
}

impl AvailabilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_unavailable(&self, model: &str, kind: FailureKind) {
        self.mark_unavailable_at(model, kind, Instant::now());
    }

    pub fn mark_unavailable_at(&self, model: &str, kind: FailureKind, now: Instant) {
        tracing::debug!(model, kind = ?kind, "excluding model from selection");
        self.exclusions
            .lock()
            .unwrap()
            .insert(model.to_string(), now + kind.cooldown());
    }

    pub fn is_excluded(&self, model: &str) -> bool {
        self.is_excluded_at(model, Instant::now())
    }

    pub fn is_excluded_at(&self, model: &str, now: Instant) -> bool {
        self.exclusions
            .lock()
            .unwrap()
            .get(model)
            .is_some_and(|available_again| *available_again > now)
    }

    /// Drop exclusions whose cooldown has passed. Invoked before every
    /// selection so an expired entry never blocks reselection.
    pub fn prune(&self) {
        self.prune_at(Instant::now());
    }

    pub fn prune_at(&self, now: Instant) {
        self.exclusions
            .lock()
            .unwrap()
            .retain(|_, available_again| *available_again > now);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.exclusions.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_cooldown_expires_after_300_seconds() {
        let tracker = AvailabilityTracker::new();
        let t = Instant::now();
        tracker.mark_unavailable_at("vendor/model", FailureKind::RateLimited, t);

        assert!(tracker.is_excluded_at("vendor/model", t + Duration::from_secs(299)));
        assert!(!tracker.is_excluded_at("vendor/model", t + Duration::from_secs(301)));
    }

    #[test]
    fn cooldowns_depend_on_failure_kind() {
        assert_eq!(
            FailureKind::from_status(429).cooldown(),
            Duration::from_secs(300)
        );
        assert_eq!(
            FailureKind::from_status(404).cooldown(),
            Duration::from_secs(180)
        );
        assert_eq!(
            FailureKind::from_status(402).cooldown(),
            Duration::from_secs(1800)
        );
        // Unrecognized retryable kinds fall back to the rate-limit cooldown.
        assert_eq!(
            FailureKind::from_status(503).cooldown(),
            Duration::from_secs(300)
        );
    }

    #[test]
    fn unknown_models_are_not_excluded() {
        let tracker = AvailabilityTracker::new();
        assert!(!tracker.is_excluded("vendor/model"));
    }

    #[test]
    fn marking_again_overwrites_the_expiry() {
        let tracker = AvailabilityTracker::new();
        let t = Instant::now();
        tracker.mark_unavailable_at("vendor/model", FailureKind::EndpointRejected, t);
        tracker.mark_unavailable_at("vendor/model", FailureKind::PaymentRequired, t);

        assert!(tracker.is_excluded_at("vendor/model", t + Duration::from_secs(1000)));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn prune_removes_only_expired_entries() {
        let tracker = AvailabilityTracker::new();
        let t = Instant::now();
        tracker.mark_unavailable_at("vendor/expired", FailureKind::EndpointRejected, t);
        tracker.mark_unavailable_at("vendor/active", FailureKind::PaymentRequired, t);

        tracker.prune_at(t + Duration::from_secs(200));
        assert_eq!(tracker.len(), 1);
        assert!(tracker.is_excluded_at("vendor/active", t + Duration::from_secs(200)));
        assert!(!tracker.is_excluded_at("vendor/expired", t + Duration::from_secs(200)));
    }
}
