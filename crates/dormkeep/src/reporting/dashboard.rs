use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

use super::views::{DashboardSummary, OccupancyRate, OverdueEntry, TenantRow};
use crate::billing::period::{first_of_month, last_of_month};
use crate::billing::{BillingEngine, BillingError, PaymentNotifier};
use crate::domain::money::format_currency;
use crate::domain::{Room, RoomId, Tenant};
use crate::store::{DormitoryStore, StoreError};
use crate::tenancy::{resolve_links, LifecycleError, TenantLifecycleService};

#[derive(Debug, thiserror::Error)]
pub enum ReportingError {
    #[error(transparent)]
    Billing(#[from] BillingError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct DashboardService<S, N> {
    store: Arc<S>,
    lifecycle: Arc<TenantLifecycleService<S>>,
    billing: Arc<BillingEngine<S, N>>,
}

impl<S, N> DashboardService<S, N>
where
    S: DormitoryStore + 'static,
    N: PaymentNotifier + 'static,
{
    pub fn new(
        store: Arc<S>,
        lifecycle: Arc<TenantLifecycleService<S>>,
        billing: Arc<BillingEngine<S, N>>,
    ) -> Self {
        Self {
            store,
            lifecycle,
            billing,
        }
    }

    pub fn summary(&self, today: NaiveDate) -> Result<DashboardSummary, ReportingError> {
        let tenants = self.lifecycle.active_tenants()?;
        let rooms = self.rooms_by_id()?;
        let active_rooms = rooms.values().filter(|room| room.active).count();
        let occupied_rooms = rooms
            .values()
            .filter(|room| room.active && room.has_occupants())
            .count();
        let monthly_revenue = self
            .billing
            .sum_revenue(first_of_month(today), last_of_month(today))?;
        let overdue = self.overdue(&tenants, &rooms, today)?;

        Ok(DashboardSummary {
            as_of: today,
            active_tenants: tenants.len(),
            occupied_rooms,
            active_rooms,
            occupancy_rate: OccupancyRate::from_counts(occupied_rooms, active_rooms),
            monthly_revenue,
            monthly_revenue_label: format_currency(monthly_revenue),
            overdue,
        })
    }

    /// Active tenants whose rent is due, stalest payer first and never-paid before everyone.
    pub fn overdue_list(&self, today: NaiveDate) -> Result<Vec<OverdueEntry>, ReportingError> {
        let tenants = self.lifecycle.active_tenants()?;
        let rooms = self.rooms_by_id()?;
        self.overdue(&tenants, &rooms, today)
    }

    pub fn tenant_rows(&self) -> Result<Vec<TenantRow>, ReportingError> {
        let mut rows = Vec::new();
        for tenant in self.lifecycle.active_tenants()? {
            let links = resolve_links(self.store.as_ref(), &tenant)?;
            rows.push(TenantRow {
                tenant_id: tenant.id,
                name: tenant.full_name(),
                room: links
                    .room
                    .map(|link| link.label(|room| room.room_number.clone()))
                    .unwrap_or_else(|| "Unassigned".to_string()),
                guardian: links
                    .guardian
                    .map(|link| link.label(|guardian| guardian.name.clone()))
                    .unwrap_or_default(),
                emergency_contact: links
                    .emergency_contact
                    .map(|link| link.label(|contact| contact.name.clone()))
                    .unwrap_or_default(),
                deposit: format!(
                    "{} ({})",
                    format_currency(tenant.security_deposit_amount),
                    tenant.deposit_status.label()
                ),
                lease: lease_label(&tenant),
            });
        }
        Ok(rows)
    }

    fn rooms_by_id(&self) -> Result<HashMap<RoomId, Room>, ReportingError> {
        Ok(self
            .store
            .list_rooms()?
            .into_iter()
            .map(|room| (room.id, room))
            .collect())
    }

    fn overdue(
        &self,
        tenants: &[Tenant],
        rooms: &HashMap<RoomId, Room>,
        today: NaiveDate,
    ) -> Result<Vec<OverdueEntry>, ReportingError> {
        let mut overdue = Vec::new();
        for tenant in tenants {
            if !self.billing.is_rent_due(tenant.id, today)? {
                continue;
            }
            overdue.push(OverdueEntry {
                tenant_id: tenant.id,
                tenant_name: tenant.full_name(),
                room_number: tenant
                    .room_id
                    .and_then(|id| rooms.get(&id))
                    .map(|room| room.room_number.clone()),
                last_payment_date: self.billing.last_payment_date(tenant.id)?,
            });
        }
        overdue.sort_by_key(|entry| (entry.last_payment_date, entry.tenant_id));
        Ok(overdue)
    }
}

fn lease_label(tenant: &Tenant) -> String {
    match (tenant.lease_start_date, tenant.lease_end_date) {
        (Some(start), Some(end)) => format!(
            "{} - {}",
            start.format("%b %d, %Y"),
            end.format("%b %d, %Y")
        ),
        (Some(start), None) => format!("from {}", start.format("%b %d, %Y")),
        (None, Some(end)) => format!("until {}", end.format("%b %d, %Y")),
        (None, None) => "No lease on file".to_string(),
    }
}
