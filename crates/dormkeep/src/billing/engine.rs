use std::cmp::Reverse;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use super::notifier::{NotificationStatus, PaymentNotifier};
use super::period::{first_of_month, same_month};
use crate::domain::{NewPayment, Payment, Tenant, TenantId, ValidationError};
use crate::store::{DormitoryStore, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordedPayment {
    pub payment: Payment,
    pub notification: NotificationStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("tenant {0} not found")]
    TenantNotFound(TenantId),
    #[error("range start {start} is after range end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("failed to write payment export: {0}")]
    Export(#[from] csv::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Rent is covered for the month of `as_of` when a payment's period contains the
/// first of that month, or a payment was made during that month. Amounts are not
/// compared with the room rate.
pub fn rent_due_from(payments: &[Payment], as_of: NaiveDate) -> bool {
    let month_start = first_of_month(as_of);
    !payments
        .iter()
        .any(|payment| payment.covers(month_start) || same_month(payment.payment_date, as_of))
}

pub struct BillingEngine<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
}

impl<S, N> BillingEngine<S, N>
where
    S: DormitoryStore + 'static,
    N: PaymentNotifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    /// Validate and append a payment, then hand it to the notifier. A notifier
    /// failure is reported on the result; the payment stays recorded.
    pub fn record_payment(&self, input: NewPayment) -> Result<RecordedPayment, BillingError> {
        let payment = input.into_payment(Local::now().naive_local())?;
        let tenant = self.tenant(payment.tenant_id)?;
        if let Some(user_id) = payment.user_id {
            if self.store.fetch_user(user_id)?.is_none() {
                return Err(
                    ValidationError::new("user_id", format!("unknown user {user_id}")).into(),
                );
            }
        }

        let payment = self.store.insert_payment(payment)?;
        info!(
            payment = %payment.id,
            tenant = %payment.tenant_id,
            amount = %payment.amount,
            "payment recorded"
        );

        let notification = match self.notifier.payment_recorded(&payment, &tenant) {
            Ok(()) => NotificationStatus::Delivered,
            Err(err) => {
                warn!(payment = %payment.id, %err, "payment notification failed");
                NotificationStatus::Failed(err.to_string())
            }
        };

        Ok(RecordedPayment {
            payment,
            notification,
        })
    }

    pub fn is_rent_due(&self, tenant_id: TenantId, as_of: NaiveDate) -> Result<bool, BillingError> {
        self.tenant(tenant_id)?;
        let payments = self.store.payments_for_tenant(tenant_id)?;
        Ok(rent_due_from(&payments, as_of))
    }

    /// Sum of amounts paid within `start..=end`. Zero when nothing matches.
    pub fn sum_revenue(&self, start: NaiveDate, end: NaiveDate) -> Result<Decimal, BillingError> {
        if start > end {
            return Err(BillingError::InvalidRange { start, end });
        }
        let total = self
            .store
            .list_payments()?
            .iter()
            .filter(|payment| start <= payment.payment_date && payment.payment_date <= end)
            .map(|payment| payment.amount)
            .sum::<Decimal>();
        Ok(crate::domain::money::normalize(total))
    }

    /// Most recent payment date first; payments on the same day newest-recorded first.
    pub fn payment_history(&self, tenant_id: TenantId) -> Result<Vec<Payment>, BillingError> {
        self.tenant(tenant_id)?;
        let mut payments = self.store.payments_for_tenant(tenant_id)?;
        payments.sort_by_key(|payment| {
            Reverse((payment.payment_date, payment.created_at, payment.id))
        });
        Ok(payments)
    }

    pub fn last_payment_date(&self, tenant_id: TenantId) -> Result<Option<NaiveDate>, BillingError> {
        self.tenant(tenant_id)?;
        Ok(self
            .store
            .payments_for_tenant(tenant_id)?
            .iter()
            .map(|payment| payment.payment_date)
            .max())
    }

    fn tenant(&self, tenant_id: TenantId) -> Result<Tenant, BillingError> {
        self.store
            .fetch_tenant(tenant_id)?
            .ok_or(BillingError::TenantNotFound(tenant_id))
    }
}
