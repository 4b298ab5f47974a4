//! Dashboard summaries composed from fresh reads of the ledger, tenants, and
//! payments. Nothing here is cached.

mod dashboard;
pub mod views;

pub use dashboard::{DashboardService, ReportingError};
pub use views::{DashboardSummary, OccupancyRate, OverdueEntry, TenantRow};
