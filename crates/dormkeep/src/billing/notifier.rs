use serde::Serialize;
use tracing::info;

use super::period::format_period;
use crate::domain::money::format_currency;
use crate::domain::{Payment, Tenant};

/// Outbound hook for receipts, SMS confirmations or printing. Only ever sees
/// payments that are already validated and persisted.
pub trait PaymentNotifier: Send + Sync {
    fn payment_recorded(&self, payment: &Payment, tenant: &Tenant)
        -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum NotificationStatus {
    Delivered,
    Failed(String),
}

/// Writes the receipt message to the trace log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl PaymentNotifier for LogNotifier {
    fn payment_recorded(
        &self,
        payment: &Payment,
        tenant: &Tenant,
    ) -> Result<(), NotificationError> {
        info!(payment = %payment.id, tenant = %tenant.id, "{}", receipt_message(payment, tenant));
        Ok(())
    }
}

/// Human-readable confirmation handed to the notification collaborator.
pub fn receipt_message(payment: &Payment, tenant: &Tenant) -> String {
    let mut message = format!(
        "Payment of {} received from {} for {} via {} on {}.",
        format_currency(payment.amount),
        tenant.full_name(),
        format_period(payment.period_covered_start, payment.period_covered_end),
        payment.method.label(),
        payment.payment_date.format("%b %d, %Y"),
    );
    if let Some(reference) = &payment.receipt_reference {
        message.push_str(&format!(" Ref: {reference}."));
    }
    message
}
