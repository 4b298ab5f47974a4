//! Occupancy and billing core for dormitory administration.
//!
//! Rooms hand out slots through the [`occupancy::OccupancyLedger`], tenants move
//! between rooms through the [`tenancy::TenantLifecycleService`], and payments are
//! reconciled against calendar months by the [`billing::BillingEngine`]. The
//! [`reporting::DashboardService`] composes all three for dashboard views.

pub mod billing;
pub mod config;
pub mod domain;
pub mod error;
pub mod import;
pub mod occupancy;
pub mod registry;
pub mod reporting;
pub mod store;
pub mod telemetry;
pub mod tenancy;
