//! # Admission at the Gate
//!
//! Token-bucket behavior at the wired entry point: burst exhaustion,
//! retry hints, and the fail-open policy under store outage.

#[cfg(test)]
mod tests {
    use crate::support::Harness;
    use admission_gate::{
        Admission, AdmissionGate, BucketStore, BucketStoreError, GateProfile,
    };
    use commerce_runtime::RuntimeConfig;
    use shared_types::ServiceError;
    use std::sync::Arc;

    struct FailingBucketStore;

    #[async_trait::async_trait]
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

    #[tokio::test]
    async fn test_capacity_plus_one_in_window() {
        let h = Harness::start_with(RuntimeConfig {
            gate_profile: GateProfile::strict(),
            ..RuntimeConfig::default()
        })
        .await;

        // Strict profile: capacity 5, refill 1/s. Six requests in the
        // same second yield five admissions and one rejection.
        let mut admitted = 0;
        let mut rejections = Vec::new();
        for _ in 0..6 {
            match h.container.gate.admit(7, 1_000).await {
                Ok(()) => admitted += 1,
                Err(e) => rejections.push(e),
            }
        }
        assert_eq!(admitted, 5);
        assert_eq!(rejections.len(), 1);
        assert!(matches!(
            rejections[0],
            ServiceError::RateLimited { retry_after_secs } if retry_after_secs == 1.0
        ));
    }

    #[tokio::test]
    async fn test_identities_do_not_share_buckets() {
        let h = Harness::start_with(RuntimeConfig {
            gate_profile: GateProfile::strict(),
            ..RuntimeConfig::default()
        })
        .await;

        for _ in 0..5 {
            h.container.gate.admit(7, 1_000).await.unwrap();
        }
        assert!(h.container.gate.admit(7, 1_000).await.is_err());
        // A different user's bucket is untouched
        assert!(h.container.gate.admit(8, 1_000).await.is_ok());
    }

    #[tokio::test]
    async fn test_refill_restores_admission() {
        let h = Harness::start_with(RuntimeConfig {
            gate_profile: GateProfile::strict(),
            ..RuntimeConfig::default()
        })
        .await;

        for _ in 0..5 {
            h.container.gate.admit(7, 1_000).await.unwrap();
        }
        assert!(h.container.gate.admit(7, 1_000).await.is_err());
        // Two seconds later two tokens have refilled
        assert!(h.container.gate.admit(7, 1_002).await.is_ok());
        assert!(h.container.gate.admit(7, 1_002).await.is_ok());
        assert!(h.container.gate.admit(7, 1_002).await.is_err());
    }

    #[tokio::test]
    async fn test_fail_open_on_store_outage() {
        let gate = AdmissionGate::new(Arc::new(FailingBucketStore));
        for _ in 0..50 {
            assert_eq!(gate.allow(7, 1_000).await, Admission::Allowed);
        }
    }
}
