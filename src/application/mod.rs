//! Host-facing layer.
//!
//! `AssistPaymentProcessor` is what an e-commerce platform plugs into its
//! checkout: it builds redirects, answers the gateway's callbacks and reports
//! the operations this gateway does not support.

pub mod processor;
