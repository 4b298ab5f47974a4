use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{ConditionalUpdate, DormitoryStore, StoreError};
use crate::domain::{
    EmergencyContact, EmergencyContactId, Guardian, GuardianId, Payment, PaymentId, Room, RoomId,
    Tenant, TenantId, User, UserId,
};

#[derive(Debug, Default)]
struct Tables {
    next_id: u64,
    rooms: BTreeMap<RoomId, Room>,
    tenants: BTreeMap<TenantId, Tenant>,
    guardians: BTreeMap<GuardianId, Guardian>,
    contacts: BTreeMap<EmergencyContactId, EmergencyContact>,
    users: BTreeMap<UserId, User>,
    payments: BTreeMap<PaymentId, Payment>,
}

impl Tables {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Mutex-guarded tables. The room predicate and write share one critical section.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

fn replace<K: Ord, V>(map: &mut BTreeMap<K, V>, key: K, value: V) -> Result<(), StoreError> {
    match map.get_mut(&key) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(StoreError::NotFound),
    }
}

impl DormitoryStore for InMemoryStore {
    fn insert_room(&self, mut room: Room) -> Result<Room, StoreError> {
        let mut tables = self.tables()?;
        if tables
            .rooms
            .values()
            .any(|existing| existing.room_number.eq_ignore_ascii_case(&room.room_number))
        {
            return Err(StoreError::Conflict(format!(
                "room number {}",
                room.room_number
            )));
        }
        room.id = RoomId(tables.allocate());
        tables.rooms.insert(room.id, room.clone());
        Ok(room)
    }

    fn fetch_room(&self, id: RoomId) -> Result<Option<Room>, StoreError> {
        Ok(self.tables()?.rooms.get(&id).cloned())
    }

    fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        Ok(self.tables()?.rooms.values().cloned().collect())
    }

    fn update_room_if(
        &self,
        id: RoomId,
        predicate: &dyn Fn(&Room) -> bool,
        apply: &dyn Fn(&mut Room),
    ) -> Result<ConditionalUpdate, StoreError> {
        let mut tables = self.tables()?;
        let Some(room) = tables.rooms.get_mut(&id) else {
            return Ok(ConditionalUpdate::Missing);
        };
        if !predicate(room) {
            return Ok(ConditionalUpdate::Rejected(room.clone()));
        }
        apply(room);
        room.id = id;
        Ok(ConditionalUpdate::Applied(room.clone()))
    }

    fn insert_tenant(&self, mut tenant: Tenant) -> Result<Tenant, StoreError> {
        let mut tables = self.tables()?;
        tenant.id = TenantId(tables.allocate());
        tables.tenants.insert(tenant.id, tenant.clone());
        Ok(tenant)
    }

    fn update_tenant(&self, tenant: Tenant) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        replace(&mut tables.tenants, tenant.id, tenant)
    }

    fn fetch_tenant(&self, id: TenantId) -> Result<Option<Tenant>, StoreError> {
        Ok(self.tables()?.tenants.get(&id).cloned())
    }

    fn list_tenants(&self) -> Result<Vec<Tenant>, StoreError> {
        Ok(self.tables()?.tenants.values().cloned().collect())
    }

    fn insert_guardian(&self, mut guardian: Guardian) -> Result<Guardian, StoreError> {
        let mut tables = self.tables()?;
        guardian.id = GuardianId(tables.allocate());
        tables.guardians.insert(guardian.id, guardian.clone());
        Ok(guardian)
    }

    fn update_guardian(&self, guardian: Guardian) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        replace(&mut tables.guardians, guardian.id, guardian)
    }

    fn fetch_guardian(&self, id: GuardianId) -> Result<Option<Guardian>, StoreError> {
        Ok(self.tables()?.guardians.get(&id).cloned())
    }

    fn insert_emergency_contact(
        &self,
        mut contact: EmergencyContact,
    ) -> Result<EmergencyContact, StoreError> {
        let mut tables = self.tables()?;
        contact.id = EmergencyContactId(tables.allocate());
        tables.contacts.insert(contact.id, contact.clone());
        Ok(contact)
    }

    fn update_emergency_contact(&self, contact: EmergencyContact) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        replace(&mut tables.contacts, contact.id, contact)
    }

    fn fetch_emergency_contact(
        &self,
        id: EmergencyContactId,
    ) -> Result<Option<EmergencyContact>, StoreError> {
        Ok(self.tables()?.contacts.get(&id).cloned())
    }

    fn insert_user(&self, mut user: User) -> Result<User, StoreError> {
        let mut tables = self.tables()?;
        if tables
            .users
            .values()
            .any(|existing| existing.username.eq_ignore_ascii_case(&user.username))
        {
            return Err(StoreError::Conflict(format!("username {}", user.username)));
        }
        user.id = UserId(tables.allocate());
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn update_user(&self, user: User) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        replace(&mut tables.users, user.id, user)
    }

    fn fetch_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.tables()?.users.get(&id).cloned())
    }

    fn insert_payment(&self, mut payment: Payment) -> Result<Payment, StoreError> {
        let mut tables = self.tables()?;
        payment.id = PaymentId(tables.allocate());
        tables.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    fn list_payments(&self) -> Result<Vec<Payment>, StoreError> {
        Ok(self.tables()?.payments.values().cloned().collect())
    }

    fn payments_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<Payment>, StoreError> {
        Ok(self
            .tables()?
            .payments
            .values()
            .filter(|payment| payment.tenant_id == tenant_id)
            .cloned()
            .collect())
    }
}
