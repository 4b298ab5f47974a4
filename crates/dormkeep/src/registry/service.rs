use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use crate::domain::validation::non_negative_amount;
use crate::domain::{
    EmergencyContact, EmergencyContactId, Guardian, GuardianId, NewContact, NewRoom, NewUser,
    Room, RoomId, RoomStatus, User, UserId, ValidationError,
};
use crate::store::{ConditionalUpdate, DormitoryStore, StoreError};

/// Rate and maintenance edits. Slot counts are owned by the occupancy ledger.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RoomUpdate {
    #[serde(default)]
    pub monthly_rate: Option<Decimal>,
    #[serde(default)]
    pub under_maintenance: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0} already exists")]
    Duplicate(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("room {room_id} still has {occupied} occupant(s)")]
    RoomOccupied { room_id: RoomId, occupied: u32 },
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(detail) => Self::Duplicate(detail),
            other => Self::Store(other),
        }
    }
}

pub struct RegistryService<S> {
    store: Arc<S>,
}

impl<S> RegistryService<S>
where
    S: DormitoryStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create_room(&self, input: NewRoom) -> Result<Room, RegistryError> {
        let room = self.store.insert_room(input.into_room()?)?;
        info!(room = %room.id, number = %room.room_number, capacity = room.capacity, "room created");
        Ok(room)
    }

    pub fn rooms(&self) -> Result<Vec<Room>, RegistryError> {
        Ok(self.store.list_rooms()?)
    }

    pub fn update_room(&self, room_id: RoomId, update: RoomUpdate) -> Result<Room, RegistryError> {
        let rate = update
            .monthly_rate
            .map(|rate| non_negative_amount("monthly_rate", rate))
            .transpose()?;
        let maintenance = update.under_maintenance;

        let outcome = self.store.update_room_if(
            room_id,
            &|_| true,
            &|room| {
                if let Some(rate) = rate {
                    room.monthly_rate = rate;
                }
                match maintenance {
                    Some(true) => room.status = RoomStatus::UnderMaintenance,
                    Some(false) => {
                        room.status = if room.has_occupants() {
                            RoomStatus::Occupied
                        } else {
                            RoomStatus::Vacant
                        }
                    }
                    None => {}
                }
            },
        )?;

        match outcome {
            ConditionalUpdate::Applied(room) | ConditionalUpdate::Rejected(room) => Ok(room),
            ConditionalUpdate::Missing => Err(RegistryError::NotFound(room_id.to_string())),
        }
    }

    /// Only an empty room can be retired; otherwise its tenants would hold dead slots.
    pub fn deactivate_room(&self, room_id: RoomId) -> Result<Room, RegistryError> {
        let outcome = self.store.update_room_if(
            room_id,
            &|room| !room.has_occupants(),
            &|room| room.active = false,
        )?;

        match outcome {
            ConditionalUpdate::Applied(room) => {
                info!(room = %room_id, "room deactivated");
                Ok(room)
            }
            ConditionalUpdate::Rejected(room) => Err(RegistryError::RoomOccupied {
                room_id,
                occupied: room.occupied_slots(),
            }),
            ConditionalUpdate::Missing => Err(RegistryError::NotFound(room_id.to_string())),
        }
    }

    pub fn reactivate_room(&self, room_id: RoomId) -> Result<Room, RegistryError> {
        match self
            .store
            .update_room_if(room_id, &|_| true, &|room| room.active = true)?
        {
            ConditionalUpdate::Applied(room) | ConditionalUpdate::Rejected(room) => Ok(room),
            ConditionalUpdate::Missing => Err(RegistryError::NotFound(room_id.to_string())),
        }
    }

    pub fn create_guardian(&self, input: NewContact) -> Result<Guardian, RegistryError> {
        Ok(self.store.insert_guardian(input.into_guardian()?)?)
    }

    pub fn set_guardian_active(
        &self,
        id: GuardianId,
        active: bool,
    ) -> Result<Guardian, RegistryError> {
        let mut guardian = self
            .store
            .fetch_guardian(id)?
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        guardian.active = active;
        self.store.update_guardian(guardian.clone())?;
        Ok(guardian)
    }

    pub fn create_emergency_contact(
        &self,
        input: NewContact,
    ) -> Result<EmergencyContact, RegistryError> {
        Ok(self
            .store
            .insert_emergency_contact(input.into_emergency_contact()?)?)
    }

    pub fn set_emergency_contact_active(
        &self,
        id: EmergencyContactId,
        active: bool,
    ) -> Result<EmergencyContact, RegistryError> {
        let mut contact = self
            .store
            .fetch_emergency_contact(id)?
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        contact.active = active;
        self.store.update_emergency_contact(contact.clone())?;
        Ok(contact)
    }

    pub fn create_user(&self, input: NewUser) -> Result<User, RegistryError> {
        let user = self.store.insert_user(input.into_user()?)?;
        info!(user = %user.id, role = user.role.label(), "user account created");
        Ok(user)
    }

    pub fn set_user_active(&self, id: UserId, active: bool) -> Result<User, RegistryError> {
        let mut user = self
            .store
            .fetch_user(id)?
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        user.active = active;
        self.store.update_user(user.clone())?;
        Ok(user)
    }
}
