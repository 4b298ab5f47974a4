use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::domain::TenantId;

/// Share of active rooms with at least one occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupancyRate {
    Percent(u32),
    /// No active rooms to divide by.
    NotApplicable,
}

impl OccupancyRate {
    /// Integer percentage, rounded half up.
    pub fn from_counts(occupied: usize, total: usize) -> Self {
        if total == 0 {
            return Self::NotApplicable;
        }
        let percent = (occupied * 200 + total) / (total * 2);
        Self::Percent(percent as u32)
    }

    pub fn label(&self) -> String {
        match self {
            Self::Percent(value) => format!("{value}%"),
            Self::NotApplicable => "N/A".to_string(),
        }
    }
}

impl Serialize for OccupancyRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverdueEntry {
    pub tenant_id: TenantId,
    pub tenant_name: String,
    pub room_number: Option<String>,
    /// `None` when the tenant has never paid; those sort first.
    pub last_payment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub as_of: NaiveDate,
    pub active_tenants: usize,
    pub occupied_rooms: usize,
    pub active_rooms: usize,
    pub occupancy_rate: OccupancyRate,
    pub monthly_revenue: Decimal,
    pub monthly_revenue_label: String,
    pub overdue: Vec<OverdueEntry>,
}

/// One line of the tenant listing, with inactive references rendered distinctly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantRow {
    pub tenant_id: TenantId,
    pub name: String,
    pub room: String,
    pub guardian: String,
    pub emergency_contact: String,
    pub deposit: String,
    pub lease: String,
}
