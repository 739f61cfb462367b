use crate::domain::order::{OrderRecord, PaymentStatus};
use crate::domain::ports::OrderBook;
use crate::error::ProcessorError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory order book.
///
/// Uses `Arc<RwLock<HashMap<u32, OrderRecord>>>`; clones share the same
/// orders. Stands in for the host's order storage in tests and the CLI.
#[derive(Default, Clone)]
pub struct InMemoryOrderBook {
    orders: Arc<RwLock<HashMap<u32, OrderRecord>>>,
}

impl InMemoryOrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an order, keyed by its id.
    pub async fn insert(&self, order: OrderRecord) {
        let mut orders = self.orders.write().await;
        orders.insert(order.order_id(), order);
    }

    /// Current payment status, `None` for unknown orders.
    pub async fn status(&self, order_id: u32) -> Option<PaymentStatus> {
        let orders = self.orders.read().await;
        orders.get(&order_id).map(|order| order.payment_status)
    }

    async fn set_status(&self, order_id: u32, status: PaymentStatus) -> Result<(), ProcessorError> {
        let mut orders = self.orders.write().await;
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| ProcessorError::OrderBook(format!("order {order_id} not found")))?;
        order.payment_status = status;
        Ok(())
    }
}

#[async_trait]
impl OrderBook for InMemoryOrderBook {
    async fn find(&self, order_id: u32) -> Result<Option<OrderRecord>, ProcessorError> {
        let orders = self.orders.read().await;
        Ok(orders.get(&order_id).cloned())
    }

    async fn mark_paid(&self, order_id: u32) -> Result<(), ProcessorError> {
        self.set_status(order_id, PaymentStatus::Paid).await
    }

    async fn mark_authorized(&self, order_id: u32) -> Result<(), ProcessorError> {
        self.set_status(order_id, PaymentStatus::Authorized).await
    }
}
