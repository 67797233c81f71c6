//! Events that flow through the shared bus.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared_types::entities::{OrderId, UserId};

/// Topics on the bus. One topic per owning producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTopic {
    /// Order lifecycle events, produced by the order coordinator.
    OrderEvents,
}

impl EventTopic {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderEvents => crate::ORDER_EVENTS_TOPIC,
        }
    }
}

/// All events published to the bus.
///
/// The payload carries only what the consumer needs to act without a
/// synchronous read-back: identity, owning user, and the committed total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderEvent {
    /// An order was committed with status pending. Consumed by the
    /// payment reconciler to provision the payment row.
    OrderCreated {
        order_id: OrderId,
        user_id: UserId,
        total_price: Decimal,
    },
}

impl OrderEvent {
    /// The topic this event is published on.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::OrderCreated { .. } => EventTopic::OrderEvents,
        }
    }

    /// The order this event concerns.
    #[must_use]
    pub fn order_id(&self) -> OrderId {
        match self {
            Self::OrderCreated { order_id, .. } => *order_id,
        }
    }
}
