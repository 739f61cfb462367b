use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Billing address of the shopper, as resolved by the host.
///
/// `state_abbreviation` and `country_iso3` are `None` when the host has no
/// state/province or country on record for the address.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BillingAddress {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub phone: String,
    #[serde(default)]
    pub state_abbreviation: Option<String>,
    #[serde(default)]
    pub country_iso3: Option<String>,
}

/// Read-only snapshot of an order handed over by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFacts {
    pub order_id: u32,
    pub order_total: Decimal,
    /// ISO code of the store's primary currency.
    pub currency_code: String,
    pub created_at_utc: DateTime<Utc>,
    pub billing: BillingAddress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Authorized,
    Paid,
    Refunded,
    Voided,
}

impl PaymentStatus {
    /// Paid is reachable from pending or authorized orders.
    pub fn can_mark_paid(self) -> bool {
        matches!(self, Self::Pending | Self::Authorized)
    }

    pub fn can_mark_authorized(self) -> bool {
        self == Self::Pending
    }
}

/// Host-side view of an order used by the callback handlers.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub facts: OrderFacts,
    pub customer_id: u32,
    pub deleted: bool,
    pub payment_status: PaymentStatus,
}

/// Minimum age before a shopper may be sent to the gateway again.
pub fn repost_grace_period() -> Duration {
    Duration::minutes(1)
}

impl OrderRecord {
    pub fn new(facts: OrderFacts, customer_id: u32) -> Self {
        Self {
            facts,
            customer_id,
            deleted: false,
            payment_status: PaymentStatus::Pending,
        }
    }

    pub fn order_id(&self) -> u32 {
        self.facts.order_id
    }

    /// Deleted orders and orders of other customers are invisible to callbacks.
    pub fn visible_to(&self, customer_id: u32) -> bool {
        !self.deleted && self.customer_id == customer_id
    }
}
