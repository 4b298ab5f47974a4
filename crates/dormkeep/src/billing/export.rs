use std::io::Write;

use serde::Serialize;

use super::engine::{BillingEngine, BillingError};
use super::notifier::PaymentNotifier;
use super::period::format_period;
use crate::domain::{PaymentId, TenantId};
use crate::store::DormitoryStore;

const HEADER: [&str; 6] = ["payment_id", "payment_date", "amount", "method", "period", "receipt"];

#[derive(Debug, Serialize)]
struct PaymentRow<'a> {
    payment_id: PaymentId,
    payment_date: String,
    amount: String,
    method: &'static str,
    period: String,
    receipt: &'a str,
}

impl<S, N> BillingEngine<S, N>
where
    S: DormitoryStore + 'static,
    N: PaymentNotifier + 'static,
{
    /// Write a tenant's history as CSV, newest first. The header is written even
    /// when there are no payments. Returns the number of data rows.
    pub fn export_history_csv<W: Write>(
        &self,
        tenant_id: TenantId,
        writer: W,
    ) -> Result<usize, BillingError> {
        let history = self.payment_history(tenant_id)?;
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        csv_writer.write_record(HEADER)?;

        for payment in &history {
            csv_writer.serialize(PaymentRow {
                payment_id: payment.id,
                payment_date: payment.payment_date.format("%Y-%m-%d").to_string(),
                amount: payment.amount.to_string(),
                method: payment.method.label(),
                period: format_period(payment.period_covered_start, payment.period_covered_end),
                receipt: payment.receipt_reference.as_deref().unwrap_or(""),
            })?;
        }
        csv_writer.flush().map_err(csv::Error::from)?;

        Ok(history.len())
    }
}
