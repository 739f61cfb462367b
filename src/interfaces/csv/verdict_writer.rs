use crate::domain::amount::format_amount;
use crate::domain::order::OrderFacts;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct VerdictRow<'a> {
    order_id: u32,
    order_amount: &'a str,
    approved: bool,
}

/// Writes reconciliation verdicts as CSV.
pub struct VerdictWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> VerdictWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes one verdict row; the header goes out with the first row.
    pub fn write(&mut self, order: &OrderFacts, approved: bool) -> Result<()> {
        let amount = format_amount(order.order_total);
        self.writer.serialize(VerdictRow {
            order_id: order.order_id,
            order_amount: &amount,
            approved,
        })?;
        Ok(())
    }

    /// Flushes buffered rows to the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
