//! Client for the Assist payment gateway.
//!
//! Two independent operations share the URL resolution in [`url`]: building
//! the redirect form for the shopper's browser ([`redirect`]) and the
//! server-side order state check ([`reconcile`]).

pub mod reconcile;
pub mod redirect;
pub mod url;

use crate::config::GatewayConfig;
use crate::domain::form::RedirectForm;
use crate::domain::order::OrderFacts;
use crate::domain::ports::{CallbackUrls, RedirectGateway};
use crate::error::ReconciliationError;
use async_trait::async_trait;
use reconcile::StatusReconciler;

/// The Assist gateway bound to one merchant configuration.
#[derive(Debug, Clone)]
pub struct AssistGateway {
    config: GatewayConfig,
    reconciler: StatusReconciler,
}

impl AssistGateway {
    /// Uses a default HTTP client for reconciliation.
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_reconciler(config, StatusReconciler::new())
    }

    /// Lets callers bring their own reconciler, e.g. one with a shared client.
    pub fn with_reconciler(config: GatewayConfig, reconciler: StatusReconciler) -> Self {
        Self { config, reconciler }
    }

    /// Fail-closed status check; errors are logged and reported as unpaid.
    pub async fn check_payment_status(&self, order: &OrderFacts) -> bool {
        self.reconciler
            .check_payment_status(&self.config, order)
            .await
    }
}

#[async_trait]
impl RedirectGateway for AssistGateway {
    fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn initiate_redirect(&self, order: &OrderFacts, callbacks: &CallbackUrls) -> RedirectForm {
        redirect::build_redirect_form(
            &self.config,
            order,
            &callbacks.return_ok,
            &callbacks.return_fail,
        )
    }

    async fn reconcile_status(&self, order: &OrderFacts) -> Result<bool, ReconciliationError> {
        self.reconciler
            .try_check_payment_status(&self.config, order)
            .await
    }
}
