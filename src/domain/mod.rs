//! Domain types shared by the gateway client and the host-facing adapter.

pub mod amount;
pub mod form;
pub mod order;
pub mod ports;
