#![allow(dead_code)]

use assist_gateway::config::GatewayConfig;
use assist_gateway::domain::order::{BillingAddress, OrderFacts};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

pub fn live_config(server_uri: &str) -> GatewayConfig {
    GatewayConfig {
        merchant_id: "700001".to_string(),
        login: "shop".to_string(),
        password: "secret".to_string(),
        test_mode: false,
        live_url: format!("{server_uri}/"),
        request_timeout_secs: 2,
        ..Default::default()
    }
}

pub fn order(order_id: u32, total: Decimal) -> OrderFacts {
    OrderFacts {
        order_id,
        order_total: total,
        currency_code: "RUB".to_string(),
        created_at_utc: Utc.with_ymd_and_hms(2024, 3, 7, 23, 59, 0).unwrap(),
        billing: BillingAddress {
            first_name: "Ivan".to_string(),
            last_name: "Petrov".to_string(),
            email: "ivan@example.com".to_string(),
            address: "Lenina 1".to_string(),
            city: "Moscow".to_string(),
            zip: "101000".to_string(),
            phone: "+74950000000".to_string(),
            state_abbreviation: None,
            country_iso3: Some("RUS".to_string()),
        },
    }
}

pub fn order_state_xml(amount: &str, state: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <result><order><ordernumber>1001</ordernumber>\
         <orderamount>{amount}</orderamount><orderstate>{state}</orderstate>\
         </order></result>"
    )
}
