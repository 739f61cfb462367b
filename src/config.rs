use crate::error::ConfigError;
use crate::gateway::url::TEST_GATEWAY_URL;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default bound on a single gateway round trip.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Merchant settings for the Assist gateway.
///
/// Passed by value into every call; nothing in the crate mutates it. The
/// defaults are the settings of a fresh install: test mode on, pointing at
/// the gateway's test endpoint.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub merchant_id: String,
    pub login: String,
    pub password: String,
    pub test_mode: bool,
    /// Production gateway base. Ignored while `test_mode` is set.
    pub live_url: String,
    /// Ask the gateway to authorize only (`Delay=1`) instead of charging.
    pub authorize_only: bool,
    pub additional_fee: Decimal,
    pub request_timeout_secs: u64,
    /// Reconcile with the gateway before trusting a success redirect.
    pub verify_on_return: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            merchant_id: String::new(),
            login: String::new(),
            password: String::new(),
            test_mode: true,
            live_url: TEST_GATEWAY_URL.to_string(),
            authorize_only: false,
            additional_fee: Decimal::ZERO,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            verify_on_return: true,
        }
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("merchant_id", &self.merchant_id)
            .field("login", &self.login)
            .field("password", &"***")
            .field("test_mode", &self.test_mode)
            .field("live_url", &self.live_url)
            .field("authorize_only", &self.authorize_only)
            .field("additional_fee", &self.additional_fee)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("verify_on_return", &self.verify_on_return)
            .finish()
    }
}

impl GatewayConfig {
    /// Loads settings from a JSON file. Missing keys keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Reads `ASSIST_*` environment variables on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(v) = lookup("ASSIST_MERCHANT_ID") {
            config.merchant_id = v;
        }
        if let Some(v) = lookup("ASSIST_LOGIN") {
            config.login = v;
        }
        if let Some(v) = lookup("ASSIST_PASSWORD") {
            config.password = v;
        }
        if let Some(v) = lookup("ASSIST_GATEWAY_URL") {
            config.live_url = v;
        }
        if let Some(v) = lookup("ASSIST_TEST_MODE") {
            config.test_mode = parse_flag("ASSIST_TEST_MODE", v)?;
        }
        if let Some(v) = lookup("ASSIST_AUTHORIZE_ONLY") {
            config.authorize_only = parse_flag("ASSIST_AUTHORIZE_ONLY", v)?;
        }
        if let Some(v) = lookup("ASSIST_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = v.parse().map_err(|_| ConfigError::InvalidVar {
                name: "ASSIST_REQUEST_TIMEOUT_SECS",
                value: v,
            })?;
        }

        Ok(config)
    }

    /// Bound applied to each reconciliation request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_flag(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidVar { name, value }),
    }
}
