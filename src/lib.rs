//! Client for the Assist redirect payment gateway.
//!
//! * [`gateway::redirect`] builds the form that sends a shopper to the
//!   gateway's payment page.
//! * [`gateway::reconcile`] asks the gateway, server to server, whether an
//!   order was really paid. Every failure resolves to "not approved".
//! * [`application::processor`] is the adapter a host checkout talks to.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod infrastructure;
pub mod interfaces;

pub use config::GatewayConfig;
pub use error::{GatewayError, ReconciliationError, Result};
pub use gateway::AssistGateway;
