use crate::domain::order::{BillingAddress, OrderFacts};
use crate::error::{GatewayError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One CSV row. Billing columns may be left out entirely when only
/// reconciliation is needed.
#[derive(Debug, Deserialize)]
struct OrderRow {
    order_id: u32,
    order_total: Decimal,
    currency_code: String,
    created_at_utc: DateTime<Utc>,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    zip: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl From<OrderRow> for OrderFacts {
    fn from(row: OrderRow) -> Self {
        Self {
            order_id: row.order_id,
            order_total: row.order_total,
            currency_code: row.currency_code,
            created_at_utc: row.created_at_utc,
            billing: BillingAddress {
                first_name: row.first_name,
                last_name: row.last_name,
                email: row.email,
                address: row.address,
                city: row.city,
                zip: row.zip,
                phone: row.phone,
                state_abbreviation: row.state,
                country_iso3: row.country,
            },
        }
    }
}

/// Reads order snapshots from a CSV source.
///
/// Wraps `csv::Reader`, trimming whitespace and tolerating short records.
pub struct OrderReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OrderReader<R> {
    /// Reads orders from CSV with a header row.
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes one order per row.
    pub fn orders(self) -> impl Iterator<Item = Result<OrderFacts>> {
        self.reader
            .into_deserialize::<OrderRow>()
            .map(|result| result.map(OrderFacts::from).map_err(GatewayError::from))
    }
}
