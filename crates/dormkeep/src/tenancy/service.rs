use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::links::{Link, LinksUpdate, TenantLinks};
use super::locks::TenantLocks;
use crate::domain::{
    EmergencyContactId, GuardianId, NewTenant, RoomId, SoftDelete, Tenant, TenantDetails,
    TenantId, UserId, ValidationError,
};
use crate::occupancy::{Occupancy, OccupancyError, OccupancyLedger};
use crate::store::{DormitoryStore, StoreError};

/// What happened to the room requested at creation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RoomPlacement {
    NotRequested,
    Assigned { occupancy: Occupancy },
    /// The tenant was created without a room; the caller must pick another one.
    Rejected {
        room_id: RoomId,
        #[serde(serialize_with = "serialize_display")]
        reason: OccupancyError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantCreation {
    pub tenant: Tenant,
    pub placement: RoomPlacement,
}

impl TenantCreation {
    /// The tenant row exists but the requested room was not granted.
    pub fn is_partial(&self) -> bool {
        matches!(self.placement, RoomPlacement::Rejected { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RoomAssignment {
    /// Same room, or clearing a tenant that had none. No ledger call was made.
    Unchanged,
    Assigned { to: Occupancy },
    Moved { from: Occupancy, to: Occupancy },
    Released { from: Occupancy },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SlotRelease {
    NoRoom,
    Released { from: Occupancy },
    /// The ledger refused the release. The tenant is still deactivated; the room
    /// counter needs an audit.
    Anomaly {
        room_id: RoomId,
        #[serde(serialize_with = "serialize_display")]
        reason: OccupancyError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deactivation {
    pub tenant: Tenant,
    /// `false` when the tenant was already inactive and nothing changed.
    pub changed: bool,
    pub release: SlotRelease,
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("tenant {0} not found")]
    TenantNotFound(TenantId),
    #[error("tenant {0} is inactive")]
    TenantInactive(TenantId),
    #[error("{field} refers to unknown record {id}")]
    ReferenceNotFound { field: &'static str, id: String },
    #[error(transparent)]
    Occupancy(#[from] OccupancyError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Sole writer of `Tenant::room_id`. Every room change is gated by the ledger.
pub struct TenantLifecycleService<S> {
    store: Arc<S>,
    ledger: OccupancyLedger<S>,
    locks: TenantLocks,
}

impl<S> TenantLifecycleService<S>
where
    S: DormitoryStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        let ledger = OccupancyLedger::new(Arc::clone(&store));
        Self {
            store,
            ledger,
            locks: TenantLocks::default(),
        }
    }

    pub fn ledger(&self) -> &OccupancyLedger<S> {
        &self.ledger
    }

    /// Validate, claim the requested slot, then persist. A refused slot still
    /// creates the tenant, roomless, and says so in the placement.
    pub fn create_tenant(&self, input: NewTenant) -> Result<TenantCreation, LifecycleError> {
        let details = input.details.validated()?;
        self.check_guardian(input.guardian_id)?;
        self.check_emergency_contact(input.emergency_contact_id)?;
        self.check_user(input.user_id)?;

        let (room_id, placement) = match input.room_id {
            None => (None, RoomPlacement::NotRequested),
            Some(room_id) => match self.ledger.assign_slot(room_id) {
                Ok(occupancy) => (Some(room_id), RoomPlacement::Assigned { occupancy }),
                Err(OccupancyError::Store(err)) => return Err(err.into()),
                Err(reason) => {
                    warn!(room = %room_id, %reason, "requested room refused; creating tenant without a room");
                    (None, RoomPlacement::Rejected { room_id, reason })
                }
            },
        };

        let tenant = Tenant {
            id: TenantId(0),
            first_name: details.first_name,
            last_name: details.last_name,
            contact_number: details.contact_number,
            room_id,
            guardian_id: input.guardian_id,
            emergency_contact_id: input.emergency_contact_id,
            user_id: input.user_id,
            lease_start_date: details.lease_start_date,
            lease_end_date: details.lease_end_date,
            security_deposit_amount: details.security_deposit_amount,
            deposit_status: details.deposit_status,
            active: true,
        };

        let tenant = match self.store.insert_tenant(tenant) {
            Ok(tenant) => tenant,
            Err(err) => {
                if let Some(room_id) = room_id {
                    self.compensate_release(room_id);
                }
                return Err(err.into());
            }
        };

        info!(tenant = %tenant.id, room = ?tenant.room_id, "tenant created");
        Ok(TenantCreation { tenant, placement })
    }

    /// Move a tenant to `new_room`, or out of any room with `None`.
    ///
    /// The new slot is claimed before the old one is released, so a refused
    /// assignment leaves the tenant where they were instead of roomless.
    pub fn assign_room(
        &self,
        tenant_id: TenantId,
        new_room: Option<RoomId>,
    ) -> Result<RoomAssignment, LifecycleError> {
        self.locks.serialize(tenant_id, || self.move_tenant(tenant_id, new_room))
    }

    fn move_tenant(
        &self,
        tenant_id: TenantId,
        new_room: Option<RoomId>,
    ) -> Result<RoomAssignment, LifecycleError> {
        let mut tenant = self.active_tenant(tenant_id)?;
        let current = tenant.room_id;
        if current == new_room {
            return Ok(RoomAssignment::Unchanged);
        }

        let acquired = match new_room {
            Some(room_id) => Some(self.ledger.assign_slot(room_id)?),
            None => None,
        };

        let released = match current {
            Some(old_room) => match self.ledger.release_slot(old_room) {
                Ok(occupancy) => Some(occupancy),
                Err(err) => {
                    if let Some(to) = &acquired {
                        self.compensate_release(to.room_id);
                    }
                    return Err(err.into());
                }
            },
            None => None,
        };

        tenant.room_id = new_room;
        if let Err(err) = self.store.update_tenant(tenant) {
            if let Some(to) = &acquired {
                self.compensate_release(to.room_id);
            }
            if let Some(from) = &released {
                self.compensate_assign(from.room_id);
            }
            return Err(err.into());
        }

        let outcome = match (released, acquired) {
            (Some(from), Some(to)) => RoomAssignment::Moved { from, to },
            (None, Some(to)) => RoomAssignment::Assigned { to },
            (Some(from), None) => RoomAssignment::Released { from },
            (None, None) => RoomAssignment::Unchanged,
        };
        info!(tenant = %tenant_id, from = ?current, to = ?new_room, "tenant room changed");
        Ok(outcome)
    }

    /// Soft-delete a tenant and give back their slot. References are kept for audit.
    pub fn deactivate(&self, tenant_id: TenantId) -> Result<Deactivation, LifecycleError> {
        self.locks.serialize(tenant_id, || self.deactivate_tenant(tenant_id))
    }

    fn deactivate_tenant(&self, tenant_id: TenantId) -> Result<Deactivation, LifecycleError> {
        let mut tenant = self.tenant(tenant_id)?;
        if !tenant.active {
            return Ok(Deactivation {
                tenant,
                changed: false,
                release: SlotRelease::NoRoom,
            });
        }

        let release = match tenant.room_id {
            None => SlotRelease::NoRoom,
            Some(room_id) => match self.ledger.release_slot(room_id) {
                Ok(from) => SlotRelease::Released { from },
                Err(OccupancyError::Store(err)) => return Err(err.into()),
                Err(reason) => {
                    warn!(tenant = %tenant_id, room = %room_id, %reason, "slot release refused during deactivation");
                    SlotRelease::Anomaly { room_id, reason }
                }
            },
        };

        tenant.active = false;
        if let Err(err) = self.store.update_tenant(tenant.clone()) {
            if let SlotRelease::Released { from } = &release {
                self.compensate_assign(from.room_id);
            }
            return Err(err.into());
        }

        info!(tenant = %tenant_id, "tenant deactivated");
        Ok(Deactivation {
            tenant,
            changed: true,
            release,
        })
    }

    /// Bring a tenant back. They start without a room and must be placed again.
    pub fn reactivate(&self, tenant_id: TenantId) -> Result<Tenant, LifecycleError> {
        self.locks.serialize(tenant_id, || {
            let mut tenant = self.tenant(tenant_id)?;
            if tenant.active {
                return Ok(tenant);
            }

            tenant.active = true;
            tenant.room_id = None;
            self.store.update_tenant(tenant.clone())?;
            info!(tenant = %tenant_id, "tenant reactivated without a room");
            Ok(tenant)
        })
    }

    pub fn update_details(
        &self,
        tenant_id: TenantId,
        details: TenantDetails,
    ) -> Result<Tenant, LifecycleError> {
        let details = details.validated()?;
        self.locks.serialize(tenant_id, || {
            let mut tenant = self.tenant(tenant_id)?;
            details.apply_to(&mut tenant);
            self.store.update_tenant(tenant.clone())?;
            Ok(tenant)
        })
    }

    pub fn link_guardian(
        &self,
        tenant_id: TenantId,
        guardian_id: Option<GuardianId>,
    ) -> Result<Tenant, LifecycleError> {
        let update = LinksUpdate {
            guardian_id: Some(guardian_id),
            ..LinksUpdate::default()
        };
        self.relink(tenant_id, &update)
    }

    pub fn link_emergency_contact(
        &self,
        tenant_id: TenantId,
        contact_id: Option<EmergencyContactId>,
    ) -> Result<Tenant, LifecycleError> {
        let update = LinksUpdate {
            emergency_contact_id: Some(contact_id),
            ..LinksUpdate::default()
        };
        self.relink(tenant_id, &update)
    }

    pub fn link_user(
        &self,
        tenant_id: TenantId,
        user_id: Option<UserId>,
    ) -> Result<Tenant, LifecycleError> {
        let update = LinksUpdate {
            user_id: Some(user_id),
            ..LinksUpdate::default()
        };
        self.relink(tenant_id, &update)
    }

    /// Apply several reference changes as one write. Every supplied target is
    /// checked first; a single rejected field leaves the tenant untouched.
    pub fn relink(
        &self,
        tenant_id: TenantId,
        update: &LinksUpdate,
    ) -> Result<Tenant, LifecycleError> {
        self.locks.serialize(tenant_id, || {
            let mut tenant = self.tenant(tenant_id)?;
            if let Some(guardian_id) = update.guardian_id {
                self.check_guardian(guardian_id)?;
            }
            if let Some(contact_id) = update.emergency_contact_id {
                self.check_emergency_contact(contact_id)?;
            }
            if let Some(user_id) = update.user_id {
                self.check_user(user_id)?;
            }

            update.apply_to(&mut tenant);
            self.store.update_tenant(tenant.clone())?;
            info!(tenant = %tenant_id, "tenant references updated");
            Ok(tenant)
        })
    }

    /// Resolve every reference of a tenant, including inactive or missing targets.
    pub fn resolve_links(&self, tenant_id: TenantId) -> Result<TenantLinks, LifecycleError> {
        let tenant = self.tenant(tenant_id)?;
        resolve_links(self.store.as_ref(), &tenant).map_err(LifecycleError::from)
    }

    pub fn tenant(&self, tenant_id: TenantId) -> Result<Tenant, LifecycleError> {
        self.store
            .fetch_tenant(tenant_id)?
            .ok_or(LifecycleError::TenantNotFound(tenant_id))
    }

    pub fn active_tenants(&self) -> Result<Vec<Tenant>, LifecycleError> {
        Ok(self
            .store
            .list_tenants()?
            .into_iter()
            .filter(|tenant| tenant.active)
            .collect())
    }

    fn active_tenant(&self, tenant_id: TenantId) -> Result<Tenant, LifecycleError> {
        let tenant = self.tenant(tenant_id)?;
        if !tenant.active {
            return Err(LifecycleError::TenantInactive(tenant_id));
        }
        Ok(tenant)
    }

    fn check_guardian(&self, id: Option<GuardianId>) -> Result<(), LifecycleError> {
        let Some(id) = id else { return Ok(()) };
        let record = self.store.fetch_guardian(id)?;
        require_active("guardian_id", id, record)
    }

    fn check_emergency_contact(
        &self,
        id: Option<EmergencyContactId>,
    ) -> Result<(), LifecycleError> {
        let Some(id) = id else { return Ok(()) };
        let record = self.store.fetch_emergency_contact(id)?;
        require_active("emergency_contact_id", id, record)
    }

    fn check_user(&self, id: Option<UserId>) -> Result<(), LifecycleError> {
        let Some(id) = id else { return Ok(()) };
        let record = self.store.fetch_user(id)?;
        require_active("user_id", id, record)
    }

    fn compensate_release(&self, room_id: RoomId) {
        if let Err(err) = self.ledger.release_slot(room_id) {
            warn!(room = %room_id, %err, "could not return slot after failed tenant write");
        }
    }

    fn compensate_assign(&self, room_id: RoomId) {
        if let Err(err) = self.ledger.assign_slot(room_id) {
            warn!(room = %room_id, %err, "could not reclaim slot after failed tenant write");
        }
    }
}

/// New links must point at active records; clearing a link is always allowed.
fn require_active<T, I>(field: &'static str, id: I, record: Option<T>) -> Result<(), LifecycleError>
where
    T: SoftDelete,
    I: std::fmt::Display,
{
    match record {
        None => Err(LifecycleError::ReferenceNotFound {
            field,
            id: id.to_string(),
        }),
        Some(record) if !record.is_active() => Err(ValidationError::new(
            field,
            format!("{id} is inactive and cannot be linked"),
        )
        .into()),
        Some(_) => Ok(()),
    }
}

pub(crate) fn resolve_links<S>(store: &S, tenant: &Tenant) -> Result<TenantLinks, StoreError>
where
    S: DormitoryStore + ?Sized,
{
    let room = match tenant.room_id {
        Some(id) => Some(Link::resolve(id, store.fetch_room(id)?)),
        None => None,
    };
    let guardian = match tenant.guardian_id {
        Some(id) => Some(Link::resolve(id, store.fetch_guardian(id)?)),
        None => None,
    };
    let emergency_contact = match tenant.emergency_contact_id {
        Some(id) => Some(Link::resolve(id, store.fetch_emergency_contact(id)?)),
        None => None,
    };
    let user = match tenant.user_id {
        Some(id) => Some(Link::resolve(id, store.fetch_user(id)?)),
        None => None,
    };

    Ok(TenantLinks {
        room,
        guardian,
        emergency_contact,
        user,
    })
}

fn serialize_display<T, Ser>(value: &T, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
where
    T: std::fmt::Display,
    Ser: serde::Serializer,
{
    serializer.collect_str(value)
}
