use crate::config::GatewayConfig;
use crate::domain::form::RedirectForm;
use crate::domain::order::{OrderFacts, OrderRecord, PaymentStatus, repost_grace_period};
use crate::domain::ports::{CallbackUrls, OrderBookBox, RedirectGatewayBox};
use crate::error::{ProcessorError, UnsupportedOperation};
use crate::gateway::AssistGateway;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

pub const RETURN_ROUTE: &str = "Plugins/PaymentAssist/Return";
pub const FAIL_ROUTE: &str = "Plugins/PaymentAssist/Fail";

/// Query parameter the gateway appends to both callback URLs.
pub const ORDER_NUMBER_PARAM: &str = "ordernumber";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethodType {
    /// The shopper pays off-site and comes back through a callback.
    Redirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurringSupport {
    NotSupported,
}

/// What the host may offer for orders paid through this method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub method_type: PaymentMethodType,
    pub supports_capture: bool,
    pub supports_refund: bool,
    pub supports_partial_refund: bool,
    pub supports_void: bool,
    pub recurring: RecurringSupport,
    pub skip_payment_info: bool,
}

/// Where the host should send the browser after a gateway callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    RedirectHome,
    OrderDetails { order_id: u32 },
    CheckoutCompleted { order_id: u32 },
}

/// Reads the order number from a callback query string.
pub fn parse_order_number(query: &str) -> Option<u32> {
    let query = query.strip_prefix('?').unwrap_or(query);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == ORDER_NUMBER_PARAM)
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// The payment method as the host platform sees it.
///
/// Wraps a [`RedirectGateway`](crate::domain::ports::RedirectGateway) and the
/// host's [`OrderBook`](crate::domain::ports::OrderBook). Everything the
/// gateway cannot do is answered with [`ProcessorError::Unsupported`].
pub struct AssistPaymentProcessor {
    gateway: RedirectGatewayBox,
    orders: OrderBookBox,
}

impl AssistPaymentProcessor {
    /// Creates a processor backed by the Assist gateway for `config`.
    pub fn new(config: GatewayConfig, orders: OrderBookBox) -> Self {
        Self::with_gateway(Box::new(AssistGateway::new(config)), orders)
    }

    /// # Arguments
    ///
    /// * `gateway` - The gateway client used for redirects and reconciliation.
    ///   Its config also drives `authorize_only`, `additional_fee` and
    ///   `verify_on_return` here, so the redirect and the callbacks agree.
    /// * `orders` - The host's order access.
    pub fn with_gateway(gateway: RedirectGatewayBox, orders: OrderBookBox) -> Self {
        Self { gateway, orders }
    }

    fn config(&self) -> &GatewayConfig {
        self.gateway.config()
    }

    /// Redirect payments only: no capture, refunds, voids or recurring billing.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            method_type: PaymentMethodType::Redirection,
            supports_capture: false,
            supports_refund: false,
            supports_partial_refund: false,
            supports_void: false,
            recurring: RecurringSupport::NotSupported,
            skip_payment_info: false,
        }
    }

    /// Orders start out pending; the gateway settles them off-site.
    pub fn process_payment(&self) -> PaymentStatus {
        PaymentStatus::Pending
    }

    /// Builds the redirect for a placed order.
    ///
    /// `store_location` is the public base URL of the store, e.g.
    /// `https://shop.example.com/`.
    pub fn post_process_payment(&self, order: &OrderFacts, store_location: &str) -> RedirectForm {
        let store = store_location.trim_end_matches('/');
        let callbacks = CallbackUrls {
            return_ok: format!("{store}/{RETURN_ROUTE}"),
            return_fail: format!("{store}/{FAIL_ROUTE}"),
        };
        self.gateway.initiate_redirect(order, &callbacks)
    }

    pub fn additional_handling_fee(&self) -> Decimal {
        self.config().additional_fee
    }

    pub fn hide_payment_method(&self) -> bool {
        false
    }

    /// A shopper may retry the redirect only for a pending order that is at
    /// least a minute old, so an in-flight payment is not started twice.
    pub fn can_repost_process_payment(&self, order: &OrderRecord, now: DateTime<Utc>) -> bool {
        order.payment_status == PaymentStatus::Pending
            && now - order.facts.created_at_utc >= repost_grace_period()
    }

    /// Not offered by the gateway.
    pub fn capture(&self) -> Result<(), ProcessorError> {
        Err(ProcessorError::Unsupported(UnsupportedOperation::Capture))
    }

    pub fn refund(&self) -> Result<(), ProcessorError> {
        Err(ProcessorError::Unsupported(UnsupportedOperation::Refund))
    }

    pub fn void(&self) -> Result<(), ProcessorError> {
        Err(ProcessorError::Unsupported(UnsupportedOperation::Void))
    }

    pub fn process_recurring_payment(&self) -> Result<(), ProcessorError> {
        Err(ProcessorError::Unsupported(
            UnsupportedOperation::RecurringPayment,
        ))
    }

    pub fn cancel_recurring_payment(&self) -> Result<(), ProcessorError> {
        Err(ProcessorError::Unsupported(
            UnsupportedOperation::CancelRecurringPayment,
        ))
    }

    async fn visible_order(
        &self,
        query: &str,
        customer_id: u32,
    ) -> Result<Option<OrderRecord>, ProcessorError> {
        let Some(order_id) = parse_order_number(query) else {
            return Ok(None);
        };
        Ok(self
            .orders
            .find(order_id)
            .await?
            .filter(|order| order.visible_to(customer_id)))
    }

    /// Handles the gateway's failure redirect.
    pub async fn handle_fail(
        &self,
        query: &str,
        customer_id: u32,
    ) -> Result<CallbackOutcome, ProcessorError> {
        Ok(match self.visible_order(query, customer_id).await? {
            Some(order) => CallbackOutcome::OrderDetails {
                order_id: order.order_id(),
            },
            None => CallbackOutcome::RedirectHome,
        })
    }

    /// Handles the gateway's success redirect.
    ///
    /// With `verify_on_return` the gateway is asked first and the order is
    /// only marked when it reports the payment as approved.
    pub async fn handle_return(
        &self,
        query: &str,
        customer_id: u32,
    ) -> Result<CallbackOutcome, ProcessorError> {
        let Some(order) = self.visible_order(query, customer_id).await? else {
            return Ok(CallbackOutcome::RedirectHome);
        };
        let order_id = order.order_id();

        if self.config().verify_on_return {
            let approved = match self.gateway.reconcile_status(&order.facts).await {
                Ok(approved) => approved,
                Err(e) => {
                    warn!(order_id, error = %e, "return callback could not be verified");
                    false
                }
            };
            if !approved {
                warn!(order_id, "return callback not confirmed by gateway, order left unchanged");
                return Ok(CallbackOutcome::OrderDetails { order_id });
            }
        }

        if self.config().authorize_only {
            if order.payment_status.can_mark_authorized() {
                self.orders.mark_authorized(order_id).await?;
                info!(order_id, "order marked as authorized");
            }
        } else if order.payment_status.can_mark_paid() {
            self.orders.mark_paid(order_id).await?;
            info!(order_id, "order marked as paid");
        }

        Ok(CallbackOutcome::CheckoutCompleted { order_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::BillingAddress;
    use crate::domain::ports::RedirectGateway;
    use crate::error::ReconciliationError;
    use crate::infrastructure::in_memory::InMemoryOrderBook;
    use async_trait::async_trait;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    struct FixedGateway {
        config: GatewayConfig,
        verdict: Option<bool>,
    }

    #[async_trait]
    impl RedirectGateway for FixedGateway {
        fn config(&self) -> &GatewayConfig {
            &self.config
        }

        fn initiate_redirect(&self, _order: &OrderFacts, callbacks: &CallbackUrls) -> RedirectForm {
            let mut form = RedirectForm::post("https://gw/pay/order.cfm");
            form.add("URL_RETURN", callbacks.return_fail.as_str());
            form.add("URL_RETURN_OK", callbacks.return_ok.as_str());
            form
        }

        async fn reconcile_status(&self, _order: &OrderFacts) -> Result<bool, ReconciliationError> {
            self.verdict
                .ok_or_else(|| ReconciliationError::MalformedXml("no verdict".to_string()))
        }
    }

    fn facts(order_id: u32, created_at_utc: DateTime<Utc>) -> OrderFacts {
        OrderFacts {
            order_id,
            order_total: dec!(250.00),
            currency_code: "RUB".to_string(),
            created_at_utc,
            billing: BillingAddress::default(),
        }
    }

    fn processor(
        config: GatewayConfig,
        verdict: Option<bool>,
        book: InMemoryOrderBook,
    ) -> AssistPaymentProcessor {
        AssistPaymentProcessor::with_gateway(
            Box::new(FixedGateway { config, verdict }),
            Box::new(book),
        )
    }

    #[test]
    fn test_parse_order_number() {
        assert_eq!(parse_order_number("?ordernumber=15"), Some(15));
        assert_eq!(parse_order_number("foo=1&ordernumber=22"), Some(22));
        assert_eq!(parse_order_number("ordernumber=abc"), None);
        assert_eq!(parse_order_number(""), None);
    }

    #[test]
    fn test_callback_urls_from_store_location() {
        let p = processor(GatewayConfig::default(), None, InMemoryOrderBook::new());
        let form = p.post_process_payment(&facts(1, Utc::now()), "https://shop.example.com/");

        assert_eq!(
            form.get("URL_RETURN_OK"),
            Some("https://shop.example.com/Plugins/PaymentAssist/Return")
        );
        assert_eq!(
            form.get("URL_RETURN"),
            Some("https://shop.example.com/Plugins/PaymentAssist/Fail")
        );
    }

    #[test]
    fn test_unsupported_operations() {
        let p = processor(GatewayConfig::default(), None, InMemoryOrderBook::new());
        let caps = p.capabilities();
        assert_eq!(caps.method_type, PaymentMethodType::Redirection);
        assert_eq!(caps.recurring, RecurringSupport::NotSupported);
        assert!(!caps.supports_capture && !caps.supports_refund && !caps.supports_void);

        assert_eq!(p.capture().unwrap_err().to_string(), "Capture method not supported");
        assert_eq!(p.refund().unwrap_err().to_string(), "Refund method not supported");
        assert_eq!(p.void().unwrap_err().to_string(), "Void method not supported");
        assert_eq!(
            p.process_recurring_payment().unwrap_err().to_string(),
            "Recurring payment not supported"
        );
        assert!(p.cancel_recurring_payment().is_err());
        assert_eq!(p.process_payment(), PaymentStatus::Pending);
        assert!(!p.hide_payment_method());
    }

    #[test]
    fn test_additional_fee_from_config() {
        let config = GatewayConfig {
            additional_fee: dec!(15.00),
            ..Default::default()
        };
        let p = processor(config, None, InMemoryOrderBook::new());
        assert_eq!(p.additional_handling_fee(), dec!(15.00));
    }

    #[test]
    fn test_repost_requires_pending_and_grace_period() {
        let p = processor(GatewayConfig::default(), None, InMemoryOrderBook::new());
        let now = Utc::now();

        let fresh = OrderRecord::new(facts(1, now - Duration::seconds(30)), 1);
        assert!(!p.can_repost_process_payment(&fresh, now));

        let mut old = OrderRecord::new(facts(2, now - Duration::minutes(5)), 1);
        assert!(p.can_repost_process_payment(&old, now));

        old.payment_status = PaymentStatus::Paid;
        assert!(!p.can_repost_process_payment(&old, now));
    }

    #[tokio::test]
    async fn test_fail_callback() {
        let book = InMemoryOrderBook::new();
        book.insert(OrderRecord::new(facts(10, Utc::now()), 5)).await;
        let p = processor(GatewayConfig::default(), None, book);

        assert_eq!(
            p.handle_fail("ordernumber=10", 5).await.unwrap(),
            CallbackOutcome::OrderDetails { order_id: 10 }
        );
        assert_eq!(
            p.handle_fail("ordernumber=10", 6).await.unwrap(),
            CallbackOutcome::RedirectHome
        );
        assert_eq!(
            p.handle_fail("ordernumber=99", 5).await.unwrap(),
            CallbackOutcome::RedirectHome
        );
    }

    #[tokio::test]
    async fn test_return_marks_paid_when_verified() {
        let book = InMemoryOrderBook::new();
        book.insert(OrderRecord::new(facts(10, Utc::now()), 5)).await;
        let p = processor(GatewayConfig::default(), Some(true), book.clone());

        assert_eq!(
            p.handle_return("ordernumber=10", 5).await.unwrap(),
            CallbackOutcome::CheckoutCompleted { order_id: 10 }
        );
        assert_eq!(book.status(10).await, Some(PaymentStatus::Paid));
    }

    #[tokio::test]
    async fn test_return_not_confirmed_leaves_order_pending() {
        let book = InMemoryOrderBook::new();
        book.insert(OrderRecord::new(facts(10, Utc::now()), 5)).await;

        for verdict in [Some(false), None] {
            let p = processor(GatewayConfig::default(), verdict, book.clone());
            assert_eq!(
                p.handle_return("ordernumber=10", 5).await.unwrap(),
                CallbackOutcome::OrderDetails { order_id: 10 }
            );
            assert_eq!(book.status(10).await, Some(PaymentStatus::Pending));
        }
    }

    #[tokio::test]
    async fn test_return_without_verification_trusts_redirect() {
        let book = InMemoryOrderBook::new();
        book.insert(OrderRecord::new(facts(10, Utc::now()), 5)).await;
        let config = GatewayConfig {
            verify_on_return: false,
            authorize_only: true,
            ..Default::default()
        };
        let p = processor(config, Some(false), book.clone());

        assert_eq!(
            p.handle_return("?ordernumber=10", 5).await.unwrap(),
            CallbackOutcome::CheckoutCompleted { order_id: 10 }
        );
        assert_eq!(book.status(10).await, Some(PaymentStatus::Authorized));
    }

    #[tokio::test]
    async fn test_return_for_foreign_or_deleted_order() {
        let book = InMemoryOrderBook::new();
        let mut deleted = OrderRecord::new(facts(11, Utc::now()), 5);
        deleted.deleted = true;
        book.insert(deleted).await;
        book.insert(OrderRecord::new(facts(12, Utc::now()), 5)).await;
        let p = processor(GatewayConfig::default(), Some(true), book.clone());

        assert_eq!(
            p.handle_return("ordernumber=11", 5).await.unwrap(),
            CallbackOutcome::RedirectHome
        );
        assert_eq!(
            p.handle_return("ordernumber=12", 6).await.unwrap(),
            CallbackOutcome::RedirectHome
        );
        assert_eq!(book.status(12).await, Some(PaymentStatus::Pending));
    }

    #[tokio::test]
    async fn test_redirect_and_return_share_gateway_config() {
        let book = InMemoryOrderBook::new();
        book.insert(OrderRecord::new(facts(10, Utc::now()), 5)).await;
        let config = GatewayConfig {
            verify_on_return: false,
            authorize_only: true,
            ..Default::default()
        };
        let p = AssistPaymentProcessor::new(config, Box::new(book.clone()));

        let form = p.post_process_payment(&facts(10, Utc::now()), "https://shop.example.com");
        assert_eq!(form.get("Delay"), Some("1"));
        assert_eq!(
            p.handle_return("ordernumber=10", 5).await.unwrap(),
            CallbackOutcome::CheckoutCompleted { order_id: 10 }
        );
        assert_eq!(book.status(10).await, Some(PaymentStatus::Authorized));
    }
}
