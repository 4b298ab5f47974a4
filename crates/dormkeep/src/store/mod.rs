//! Persistence boundary. Services only see the [`DormitoryStore`] trait; the
//! in-memory implementation backs the API service, the demo, and the tests.

mod memory;

pub use memory::InMemoryStore;

use crate::domain::{
    EmergencyContact, EmergencyContactId, Guardian, GuardianId, Payment, Room, RoomId, Tenant,
    TenantId, User, UserId,
};

/// Outcome of a conditional room write.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionalUpdate {
    /// Predicate held and the change was written. Carries the row after the write.
    Applied(Room),
    /// Predicate failed; nothing was written. Carries the row as observed.
    Rejected(Room),
    Missing,
}

/// Storage abstraction keyed by identifier.
///
/// Rooms have no unconditional update: every room write goes through
/// [`DormitoryStore::update_room_if`], which evaluates the predicate and applies
/// the change as one atomic step.
pub trait DormitoryStore: Send + Sync {
    fn insert_room(&self, room: Room) -> Result<Room, StoreError>;
    fn fetch_room(&self, id: RoomId) -> Result<Option<Room>, StoreError>;
    fn list_rooms(&self) -> Result<Vec<Room>, StoreError>;
    fn update_room_if(
        &self,
        id: RoomId,
        predicate: &dyn Fn(&Room) -> bool,
        apply: &dyn Fn(&mut Room),
    ) -> Result<ConditionalUpdate, StoreError>;

    fn insert_tenant(&self, tenant: Tenant) -> Result<Tenant, StoreError>;
    fn update_tenant(&self, tenant: Tenant) -> Result<(), StoreError>;
    fn fetch_tenant(&self, id: TenantId) -> Result<Option<Tenant>, StoreError>;
    fn list_tenants(&self) -> Result<Vec<Tenant>, StoreError>;

    fn insert_guardian(&self, guardian: Guardian) -> Result<Guardian, StoreError>;
    fn update_guardian(&self, guardian: Guardian) -> Result<(), StoreError>;
    fn fetch_guardian(&self, id: GuardianId) -> Result<Option<Guardian>, StoreError>;

    fn insert_emergency_contact(
        &self,
        contact: EmergencyContact,
    ) -> Result<EmergencyContact, StoreError>;
    fn update_emergency_contact(&self, contact: EmergencyContact) -> Result<(), StoreError>;
    fn fetch_emergency_contact(
        &self,
        id: EmergencyContactId,
    ) -> Result<Option<EmergencyContact>, StoreError>;

    fn insert_user(&self, user: User) -> Result<User, StoreError>;
    fn update_user(&self, user: User) -> Result<(), StoreError>;
    fn fetch_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Payments are append-only: there is no update.
    fn insert_payment(&self, payment: Payment) -> Result<Payment, StoreError>;
    fn list_payments(&self) -> Result<Vec<Payment>, StoreError>;
    fn payments_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<Payment>, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists: {0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
