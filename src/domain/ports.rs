use super::form::RedirectForm;
use super::order::{OrderFacts, OrderRecord};
use crate::config::GatewayConfig;
use crate::error::{ProcessorError, ReconciliationError};
use async_trait::async_trait;

/// Where the gateway sends the shopper's browser back to.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackUrls {
    pub return_ok: String,
    pub return_fail: String,
}

/// What a redirect-based gateway can do for an order.
#[async_trait]
pub trait RedirectGateway: Send + Sync {
    /// Merchant settings every operation of this gateway runs with.
    fn config(&self) -> &GatewayConfig;

    fn initiate_redirect(&self, order: &OrderFacts, callbacks: &CallbackUrls) -> RedirectForm;

    /// Asks the gateway whether the order was paid. Errors are never "paid".
    async fn reconcile_status(&self, order: &OrderFacts) -> Result<bool, ReconciliationError>;
}

/// Order access the host platform provides to the callback handlers.
#[async_trait]
pub trait OrderBook: Send + Sync {
    async fn find(&self, order_id: u32) -> Result<Option<OrderRecord>, ProcessorError>;
    async fn mark_paid(&self, order_id: u32) -> Result<(), ProcessorError>;
    async fn mark_authorized(&self, order_id: u32) -> Result<(), ProcessorError>;
}

pub type RedirectGatewayBox = Box<dyn RedirectGateway>;
pub type OrderBookBox = Box<dyn OrderBook>;
