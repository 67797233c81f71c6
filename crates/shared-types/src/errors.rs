//! Service error taxonomy.
//!
//! One closed set of failure conditions shared by every service, so that
//! cross-service calls propagate errors without re-interpretation. Cache
//! failures are deliberately absent: the cache is advisory and no code
//! path may fail a user-visible operation because of it.

use crate::entities::{OrderId, ProductId};
use thiserror::Error;

/// Transport-level rejection class for an error.
///
/// The HTTP boundary (out of scope here) maps these onto status codes:
/// bad input -> 400-class, not found -> 404-class, rate limited -> 429,
/// upstream trouble -> 503, everything else -> 500.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionClass {
    BadRequest,
    NotFound,
    TooManyRequests,
    ServiceUnavailable,
    Internal,
}

/// All failure conditions surfaced by the commerce services.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ServiceError {
    /// Malformed request; rejected before any side effect.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested quantity exceeds available stock. Order creation
    /// aborts before any write.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// A local store transaction failed mid-write; everything was
    /// rolled back and no partial state persisted.
    #[error("transaction failed: {0}")]
    TransactionFailure(String),

    /// A synchronous call to another service timed out or failed.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Webhook signature did not match the recomputed keyed hash.
    #[error("invalid webhook signature")]
    InvalidSignature,

    /// Initiation attempted against an already-completed payment.
    #[error("payment for order {0} already completed")]
    AlreadyCompleted(OrderId),

    /// No payment row exists for the order.
    #[error("payment not found for order {0}")]
    PaymentNotFound(OrderId),

    /// The requested entity does not exist (or is not visible to the
    /// requesting user).
    #[error("{0} not found")]
    NotFound(String),

    /// Rejected by the admission gate; retry after the hinted delay.
    #[error("rate limit exceeded, retry after {retry_after_secs:.1}s")]
    RateLimited { retry_after_secs: f64 },
}

impl ServiceError {
    /// The rejection class the transport boundary should use.
    #[must_use]
    pub fn rejection_class(&self) -> RejectionClass {
        match self {
            Self::Validation(_) | Self::InvalidSignature => RejectionClass::BadRequest,
            Self::InsufficientStock { .. } | Self::AlreadyCompleted(_) => {
                RejectionClass::BadRequest
            }
            Self::NotFound(_) | Self::PaymentNotFound(_) => RejectionClass::NotFound,
            Self::RateLimited { .. } => RejectionClass::TooManyRequests,
            Self::UpstreamUnavailable(_) => RejectionClass::ServiceUnavailable,
            Self::TransactionFailure(_) => RejectionClass::Internal,
        }
    }
}
