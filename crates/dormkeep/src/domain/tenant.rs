use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::{EmergencyContactId, GuardianId, RoomId, TenantId, UserId};
use super::validation::{non_negative_amount, optional_text, required_text, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepositStatus {
    Paid,
    Pending,
    Refunded,
    PartialRefund,
}

impl DepositStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Pending => "Pending",
            Self::Refunded => "Refunded",
            Self::PartialRefund => "Partial Refund",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub first_name: String,
    pub last_name: String,
    pub contact_number: Option<String>,
    /// Written only by the lifecycle service, always paired with one ledger call.
    pub room_id: Option<RoomId>,
    pub guardian_id: Option<GuardianId>,
    pub emergency_contact_id: Option<EmergencyContactId>,
    pub user_id: Option<UserId>,
    pub lease_start_date: Option<NaiveDate>,
    pub lease_end_date: Option<NaiveDate>,
    pub security_deposit_amount: Decimal,
    pub deposit_status: DepositStatus,
    pub active: bool,
}

impl Tenant {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// The room whose slot this tenant currently consumes. Inactive tenants keep
    /// their last `room_id` for audit but no longer hold a slot.
    pub fn held_room(&self) -> Option<RoomId> {
        if self.active {
            self.room_id
        } else {
            None
        }
    }
}

/// Editable personal, lease, and deposit details. Room placement is not part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantDetails {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub lease_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub lease_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub security_deposit_amount: Decimal,
    pub deposit_status: DepositStatus,
}

impl TenantDetails {
    pub(crate) fn validated(self) -> Result<Self, ValidationError> {
        let first_name = required_text("first_name", &self.first_name)?;
        let last_name = required_text("last_name", &self.last_name)?;
        if let (Some(start), Some(end)) = (self.lease_start_date, self.lease_end_date) {
            if end < start {
                return Err(ValidationError::new(
                    "lease_end_date",
                    format!("must not be before lease_start_date ({start})"),
                ));
            }
        }
        let security_deposit_amount =
            non_negative_amount("security_deposit_amount", self.security_deposit_amount)?;

        Ok(Self {
            first_name,
            last_name,
            contact_number: optional_text(self.contact_number),
            lease_start_date: self.lease_start_date,
            lease_end_date: self.lease_end_date,
            security_deposit_amount,
            deposit_status: self.deposit_status,
        })
    }

    pub(crate) fn apply_to(self, tenant: &mut Tenant) {
        tenant.first_name = self.first_name;
        tenant.last_name = self.last_name;
        tenant.contact_number = self.contact_number;
        tenant.lease_start_date = self.lease_start_date;
        tenant.lease_end_date = self.lease_end_date;
        tenant.security_deposit_amount = self.security_deposit_amount;
        tenant.deposit_status = self.deposit_status;
    }
}

/// Input for tenant creation. `room_id` is a request, honoured only if a slot is granted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTenant {
    pub details: TenantDetails,
    #[serde(default)]
    pub room_id: Option<RoomId>,
    #[serde(default)]
    pub guardian_id: Option<GuardianId>,
    #[serde(default)]
    pub emergency_contact_id: Option<EmergencyContactId>,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> TenantDetails {
        TenantDetails {
            first_name: "Maria".to_string(),
            last_name: "Santos".to_string(),
            contact_number: Some("  ".to_string()),
            lease_start_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            lease_end_date: NaiveDate::from_ymd_opt(2025, 5, 31),
            security_deposit_amount: Decimal::new(500000, 2),
            deposit_status: DepositStatus::Paid,
        }
    }

    #[test]
    fn validation_blanks_empty_contact_number() {
        let validated = details().validated().expect("valid details");
        assert_eq!(validated.contact_number, None);
    }

    #[test]
    fn lease_end_before_start_names_the_field() {
        let mut input = details();
        input.lease_end_date = NaiveDate::from_ymd_opt(2024, 5, 1);
        let err = input.validated().expect_err("inverted lease rejected");
        assert_eq!(err.field, "lease_end_date");
    }

    #[test]
    fn inactive_tenants_hold_no_slot() {
        let mut tenant = Tenant {
            id: TenantId(1),
            first_name: "Maria".to_string(),
            last_name: "Santos".to_string(),
            contact_number: None,
            room_id: Some(RoomId(3)),
            guardian_id: None,
            emergency_contact_id: None,
            user_id: None,
            lease_start_date: None,
            lease_end_date: None,
            security_deposit_amount: Decimal::ZERO,
            deposit_status: DepositStatus::Pending,
            active: true,
        };
        assert_eq!(tenant.held_room(), Some(RoomId(3)));
        tenant.active = false;
        assert_eq!(tenant.held_room(), None);
        assert_eq!(tenant.full_name(), "Maria Santos");
    }
}
