use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::{PaymentId, TenantId, UserId};
use super::validation::{optional_text, positive_amount, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Gcash,
    Maya,
    Other,
}

impl PaymentMethod {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::BankTransfer => "Bank Transfer",
            Self::Gcash => "GCash",
            Self::Maya => "Maya",
            Self::Other => "Other",
        }
    }
}

/// Append-only payment fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub tenant_id: TenantId,
    pub user_id: Option<UserId>,
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub period_covered_start: NaiveDate,
    pub period_covered_end: NaiveDate,
    pub receipt_reference: Option<String>,
    pub qr_payload: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Payment {
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.period_covered_start <= day && day <= self.period_covered_end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub tenant_id: TenantId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub payment_date: NaiveDate,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub period_covered_start: NaiveDate,
    pub period_covered_end: NaiveDate,
    #[serde(default)]
    pub receipt_reference: Option<String>,
    #[serde(default)]
    pub qr_payload: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewPayment {
    /// Validate and stamp the record. The store assigns the id on insert.
    pub fn into_payment(self, created_at: NaiveDateTime) -> Result<Payment, ValidationError> {
        let amount = positive_amount("amount", self.amount)?;
        if self.period_covered_end < self.period_covered_start {
            return Err(ValidationError::new(
                "period_covered_end",
                format!(
                    "must not be before period_covered_start ({})",
                    self.period_covered_start
                ),
            ));
        }

        Ok(Payment {
            id: PaymentId(0),
            tenant_id: self.tenant_id,
            user_id: self.user_id,
            payment_date: self.payment_date,
            amount,
            method: self.method,
            period_covered_start: self.period_covered_start,
            period_covered_end: self.period_covered_end,
            receipt_reference: optional_text(self.receipt_reference),
            qr_payload: optional_text(self.qr_payload),
            notes: optional_text(self.notes),
            created_at,
        })
    }
}
