use crate::config::GatewayConfig;

/// Gateway base used whenever test mode is on.
pub const TEST_GATEWAY_URL: &str = "https://test.paysecure.ru/";
/// Payment page the shopper is redirected to.
pub const PAYMENT_COMMAND: &str = "pay/order.cfm";
/// Server-side order state query.
pub const ORDERSTATE_COMMAND: &str = "orderstate/orderstate.cfm";

/// Gateway base for this config, without a trailing slash.
pub fn resolve_base_url(config: &GatewayConfig) -> String {
    let server = if config.test_mode {
        TEST_GATEWAY_URL
    } else {
        config.live_url.as_str()
    };
    server.trim_end_matches('/').to_string()
}

/// Full URL of a gateway command such as [`PAYMENT_COMMAND`].
pub fn build_command_url(config: &GatewayConfig, command: &str) -> String {
    format!("{}/{}", resolve_base_url(config), command)
}
