//! The admission gate itself.

use crate::store::{BucketStore, BucketStoreError};
use crate::user_bucket_key;
use shared_types::ServiceError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Named rate-limit profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateProfile {
    /// Maximum tokens in the bucket (burst size).
    pub capacity: u32,
    /// Tokens refilled per second.
    pub refill_per_second: f64,
}

impl GateProfile {
    /// Default profile for ordinary endpoints.
    #[must_use]
    pub fn default_profile() -> Self {
        Self {
            capacity: 20,
            refill_per_second: 10.0,
        }
    }

    /// Strict profile for sensitive endpoints.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            capacity: 5,
            refill_per_second: 1.0,
        }
    }

    /// The retry hint handed to rejected callers.
    #[must_use]
    pub fn retry_after(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.refill_per_second)
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission {
    Allowed,
    Rejected { retry_after: Duration },
}

impl Admission {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Per-identity token-bucket gate over a shared bucket store.
#[derive(Clone)]
pub struct AdmissionGate {
    store: Arc<dyn BucketStore>,
    profile: GateProfile,
    /// Admit when the store is unreachable.
    fail_open: bool,
}

impl AdmissionGate {
    /// Gate with the default profile and fail-open behavior.
    #[must_use]
    pub fn new(store: Arc<dyn BucketStore>) -> Self {
        Self::with_profile(store, GateProfile::default_profile())
    }

    #[must_use]
    pub fn with_profile(store: Arc<dyn BucketStore>, profile: GateProfile) -> Self {
        Self {
            store,
            profile,
            fail_open: true,
        }
    }

    /// Override the fail-open policy (closed gates reject on outage).
    #[must_use]
    pub fn fail_open(mut self, fail_open: bool) -> Self {
        self.fail_open = fail_open;
        self
    }

    #[must_use]
    pub fn profile(&self) -> GateProfile {
        self.profile
    }

    /// Check whether a request from `user_id` at `now_unix` is admitted.
    pub async fn allow(&self, user_id: u64, now_unix: u64) -> Admission {
        let key = user_bucket_key(user_id);

        match self
            .store
            .take(
                &key,
                self.profile.capacity,
                self.profile.refill_per_second,
                now_unix,
            )
            .await
        {
            Ok(true) => {
                debug!(user_id, "Rate limit pass");
                Admission::Allowed
            }
            Ok(false) => {
                let retry_after = self.profile.retry_after();
                debug!(user_id, retry_after_ms = retry_after.as_millis() as u64, "Rate limit exceeded");
                Admission::Rejected { retry_after }
            }
            Err(e) => self.on_store_failure(user_id, &e),
        }
    }

    /// Like `allow`, but mapped onto the shared error taxonomy for
    /// callers that thread `ServiceError` through.
    pub async fn admit(&self, user_id: u64, now_unix: u64) -> Result<(), ServiceError> {
        match self.allow(user_id, now_unix).await {
            Admission::Allowed => Ok(()),
            Admission::Rejected { retry_after } => Err(ServiceError::RateLimited {
                retry_after_secs: retry_after.as_secs_f64(),
            }),
        }
    }

    fn on_store_failure(&self, user_id: u64, error: &BucketStoreError) -> Admission {
        if self.fail_open {
            warn!(user_id, error = %error, "Bucket store unavailable, failing open");
            Admission::Allowed
        } else {
            warn!(user_id, error = %error, "Bucket store unavailable, failing closed");
            Admission::Rejected {
                retry_after: self.profile.retry_after(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryBucketStore;
    use async_trait::async_trait;

    struct FailingBucketStore;

    #[async_trait]
    impl BucketStore for FailingBucketStore {
        async fn take(
            &self,
            _key: &str,
            _capacity: u32,
            _refill_per_second: f64,
            _now_unix: u64,
        ) -> Result<bool, BucketStoreError> {
            Err(BucketStoreError::Unavailable("connection refused".into()))
        }
    }

    #[test]
    fn test_profiles() {
        let default = GateProfile::default_profile();
        assert_eq!(default.capacity, 20);
        assert_eq!(default.refill_per_second, 10.0);

        let strict = GateProfile::strict();
        assert_eq!(strict.capacity, 5);
        assert_eq!(strict.refill_per_second, 1.0);
        assert_eq!(strict.retry_after(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_capacity_plus_one_in_window() {
        // Capacity C, refill R: C+1 requests inside a window shorter
        // than 1/R yield exactly C admissions and 1 rejection.
        let gate = AdmissionGate::with_profile(
            Arc::new(InMemoryBucketStore::new()),
            GateProfile::strict(),
        );

        let mut admitted = 0;
        let mut rejected = 0;
        for _ in 0..6 {
            match gate.allow(7, 1_000).await {
                Admission::Allowed => admitted += 1,
                Admission::Rejected { .. } => rejected += 1,
            }
        }
        assert_eq!(admitted, 5);
        assert_eq!(rejected, 1);
    }

    #[tokio::test]
    async fn test_rejection_carries_retry_hint() {
        let gate = AdmissionGate::with_profile(
            Arc::new(InMemoryBucketStore::new()),
            GateProfile { capacity: 1, refill_per_second: 2.0 },
        );

        assert!(gate.allow(1, 100).await.is_allowed());
        match gate.allow(1, 100).await {
            Admission::Rejected { retry_after } => {
                assert_eq!(retry_after, Duration::from_millis(500));
            }
            Admission::Allowed => panic!("expected rejection"),
        }
    }

    #[tokio::test]
    async fn test_fail_open_on_store_outage() {
        let gate = AdmissionGate::new(Arc::new(FailingBucketStore));
        for _ in 0..50 {
            assert!(gate.allow(1, 100).await.is_allowed());
        }
    }

    #[tokio::test]
    async fn test_fail_closed_when_configured() {
        let gate = AdmissionGate::new(Arc::new(FailingBucketStore)).fail_open(false);
        assert!(!gate.allow(1, 100).await.is_allowed());
    }

    #[tokio::test]
    async fn test_admit_maps_to_service_error() {
        let gate = AdmissionGate::with_profile(
            Arc::new(InMemoryBucketStore::new()),
            GateProfile { capacity: 1, refill_per_second: 1.0 },
        );

        assert!(gate.admit(1, 100).await.is_ok());
        let err = gate.admit(1, 100).await.unwrap_err();
        assert!(matches!(err, ServiceError::RateLimited { .. }));
    }
}
