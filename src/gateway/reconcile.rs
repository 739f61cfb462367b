use super::url::{ORDERSTATE_COMMAND, build_command_url};
use crate::config::GatewayConfig;
use crate::domain::amount::format_amount;
use crate::domain::order::OrderFacts;
use crate::error::ReconciliationError;
use chrono::Datelike;
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Gateway response format code for XML.
pub const XML_FORMAT: u8 = 3;

/// State token the gateway reports for a successful payment.
pub const APPROVED_STATE: &str = "Approved";

const DEFAULT_ORDER_AMOUNT: &str = "0.00";

/// Body of an order-state request.
///
/// The search window starts at midnight of the day the order was created.
#[derive(Clone, PartialEq)]
pub struct ReconciliationQuery {
    pub merchant_id: String,
    pub login: String,
    pub password: String,
    pub order_number: u32,
    pub start_year: i32,
    pub start_month: u32,
    pub start_day: u32,
    pub start_hour: u32,
    pub start_min: u32,
    pub format: u8,
}

impl std::fmt::Debug for ReconciliationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconciliationQuery")
            .field("merchant_id", &self.merchant_id)
            .field("login", &self.login)
            .field("password", &"***")
            .field("order_number", &self.order_number)
            .field("start_year", &self.start_year)
            .field("start_month", &self.start_month)
            .field("start_day", &self.start_day)
            .finish_non_exhaustive()
    }
}

impl ReconciliationQuery {
    /// Builds the query for `order` with the merchant credentials of `config`.
    pub fn new(config: &GatewayConfig, order: &OrderFacts) -> Self {
        let search_from = order.created_at_utc;
        Self {
            merchant_id: config.merchant_id.clone(),
            login: config.login.clone(),
            password: config.password.clone(),
            order_number: order.order_id,
            start_year: search_from.year(),
            start_month: search_from.month(),
            start_day: search_from.day(),
            start_hour: 0,
            start_min: 0,
            format: XML_FORMAT,
        }
    }

    /// Form fields in the order the gateway documents them.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Merchant_ID", self.merchant_id.clone()),
            ("Login", self.login.clone()),
            ("Password", self.password.clone()),
            ("OrderNumber", self.order_number.to_string()),
            ("StartYear", self.start_year.to_string()),
            ("StartMonth", self.start_month.to_string()),
            ("StartDay", self.start_day.to_string()),
            ("StartHour", self.start_hour.to_string()),
            ("StartMin", self.start_min.to_string()),
            ("Format", self.format.to_string()),
        ]
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Amount,
    State,
}

/// `orderamount` and `orderstate` of the first `order` under the root.
#[derive(Debug, Default, PartialEq)]
struct OrderState {
    amount: Option<String>,
    state: Option<String>,
}

fn malformed(reason: impl std::fmt::Display) -> ReconciliationError {
    ReconciliationError::MalformedXml(reason.to_string())
}

/// Name match for elements outside any namespace, like `Root.Element("order")`.
fn is_plain(e: &BytesStart<'_>, unbound: bool, name: &[u8]) -> bool {
    unbound && e.local_name().as_ref() == name
}

fn parse_order_state(xml: &str) -> Result<OrderState, ReconciliationError> {
    let mut reader = NsReader::from_str(xml);
    let mut parsed = OrderState::default();

    let mut first_event = true;
    let mut depth = 0usize;
    let mut root_seen = false;
    let mut order_seen = false;
    let mut in_order = false;
    let mut capturing: Option<Field> = None;

    loop {
        let (ns, event) = reader.read_resolved_event().map_err(malformed)?;
        let unbound = match ns {
            ResolveResult::Unbound => true,
            ResolveResult::Bound(_) => false,
            ResolveResult::Unknown(prefix) => {
                return Err(malformed(format!(
                    "undeclared namespace prefix {}",
                    String::from_utf8_lossy(&prefix)
                )));
            }
        };
        let at_start = std::mem::replace(&mut first_event, false);

        match event {
            Event::Decl(_) if !at_start => {
                return Err(malformed("XML declaration is not at the start"));
            }
            Event::Start(ref e) | Event::Empty(ref e) => {
                for attr in e.attributes() {
                    attr.map_err(malformed)?;
                }

                let is_empty = matches!(event, Event::Empty(_));
                depth += 1;
                if depth == 1 {
                    if root_seen {
                        return Err(malformed("multiple root elements"));
                    }
                    root_seen = true;
                }

                if depth == 2 && !order_seen && is_plain(e, unbound, b"order") {
                    order_seen = true;
                    in_order = !is_empty;
                } else if in_order && depth == 3 && capturing.is_none() {
                    let slot = if is_plain(e, unbound, b"orderamount") {
                        Some((Field::Amount, &mut parsed.amount))
                    } else if is_plain(e, unbound, b"orderstate") {
                        Some((Field::State, &mut parsed.state))
                    } else {
                        None
                    };
                    if let Some((field, value)) = slot
                        && value.is_none()
                    {
                        *value = Some(String::new());
                        if !is_empty {
                            capturing = Some(field);
                        }
                    }
                }

                if is_empty {
                    depth -= 1;
                }
            }
            Event::End(_) => {
                if depth == 0 {
                    return Err(malformed("unmatched end tag"));
                }
                if depth == 3 {
                    capturing = None;
                }
                if depth == 2 {
                    in_order = false;
                }
                depth -= 1;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(malformed)?;
                if depth == 0 && !text.trim().is_empty() {
                    return Err(malformed("text outside the root element"));
                }
                append(&mut parsed, capturing, &text);
            }
            Event::CData(data) => {
                let raw = data.into_inner();
                let text = std::str::from_utf8(&raw).map_err(malformed)?;
                append(&mut parsed, capturing, text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !root_seen {
        return Err(malformed("no root element"));
    }
    if depth != 0 {
        return Err(malformed("unexpected end of document"));
    }
    Ok(parsed)
}

fn append(parsed: &mut OrderState, capturing: Option<Field>, text: &str) {
    let target = match capturing {
        Some(Field::Amount) => parsed.amount.as_mut(),
        Some(Field::State) => parsed.state.as_mut(),
        None => None,
    };
    if let Some(value) = target {
        value.push_str(text);
    }
}

/// Decides whether an order-state response proves the order was paid.
///
/// Bodies that are not XML at all (an HTML error page, say) are rejected
/// without parsing. The amount must match the two-digit formatting of
/// `expected_total` textually and the state must be exactly `Approved`.
pub fn evaluate_order_state(
    body: &str,
    expected_total: Decimal,
) -> Result<bool, ReconciliationError> {
    if !body.contains("?xml") {
        return Ok(false);
    }

    let parsed = parse_order_state(body)?;
    let amount = parsed.amount.as_deref().unwrap_or(DEFAULT_ORDER_AMOUNT);
    let state = parsed.state.as_deref().unwrap_or_default();

    Ok(format_amount(expected_total) == amount && state == APPROVED_STATE)
}

/// Server-to-server check of an order's payment state.
///
/// Holds a pooled HTTP client; safe to share between tasks.
#[derive(Debug, Clone, Default)]
pub struct StatusReconciler {
    client: reqwest::Client,
}

impl StatusReconciler {
    /// Creates a reconciler with a default `reqwest::Client`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuses a client configured by the caller (proxy, TLS roots, pool).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Posts the order-state query and evaluates the reply.
    ///
    /// Transport failures, non-2xx replies and malformed XML come back as errors.
    pub async fn try_check_payment_status(
        &self,
        config: &GatewayConfig,
        order: &OrderFacts,
    ) -> Result<bool, ReconciliationError> {
        let query = ReconciliationQuery::new(config, order);
        let url = build_command_url(config, ORDERSTATE_COMMAND);
        debug!(order_id = order.order_id, %url, "requesting order state");

        let body = self
            .client
            .post(&url)
            .form(&query.form_fields())
            .timeout(config.request_timeout())
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(transport_error)?
            .text()
            .await
            .map_err(transport_error)?;

        let approved = evaluate_order_state(&body, order.order_total)?;
        debug!(order_id = order.order_id, approved, "order state evaluated");
        Ok(approved)
    }

    /// Fail-closed variant: any error is logged and reported as not approved.
    pub async fn check_payment_status(&self, config: &GatewayConfig, order: &OrderFacts) -> bool {
        match self.try_check_payment_status(config, order).await {
            Ok(approved) => approved,
            Err(e) => {
                warn!(
                    order_id = order.order_id,
                    error = %e,
                    "order state check failed, treating order as not approved"
                );
                false
            }
        }
    }
}

fn transport_error(e: reqwest::Error) -> ReconciliationError {
    if e.is_timeout() {
        ReconciliationError::Timeout(e)
    } else {
        ReconciliationError::Transport(e)
    }
}
