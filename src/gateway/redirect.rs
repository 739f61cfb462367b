use super::url::{PAYMENT_COMMAND, build_command_url};
use crate::config::GatewayConfig;
use crate::domain::amount::format_amount;
use crate::domain::form::RedirectForm;
use crate::domain::order::OrderFacts;

/// Builds the form that sends the shopper to the gateway's payment page.
///
/// The host is expected to have validated the billing data already. `State`
/// and `Country` are only sent when the host resolved them.
pub fn build_redirect_form(
    config: &GatewayConfig,
    order: &OrderFacts,
    return_ok_url: &str,
    return_fail_url: &str,
) -> RedirectForm {
    let billing = &order.billing;
    let mut form = RedirectForm::post(build_command_url(config, PAYMENT_COMMAND));

    form.add("Merchant_ID", config.merchant_id.as_str());
    form.add("Delay", if config.authorize_only { "1" } else { "0" });
    form.add("OrderNumber", order.order_id.to_string());
    form.add("OrderAmount", format_amount(order.order_total));
    form.add("OrderCurrency", order.currency_code.as_str());
    form.add("URL_RETURN", return_fail_url);
    form.add("URL_RETURN_OK", return_ok_url);
    form.add("FirstName", billing.first_name.as_str());
    form.add("LastName", billing.last_name.as_str());
    form.add("Email", billing.email.as_str());
    form.add("Address", billing.address.as_str());
    form.add("City", billing.city.as_str());
    form.add("Zip", billing.zip.as_str());
    form.add("Phone", billing.phone.as_str());

    if let Some(state) = &billing.state_abbreviation {
        form.add("State", state.as_str());
    }
    if let Some(country) = &billing.country_iso3 {
        form.add("Country", country.as_str());
    }

    form
}
