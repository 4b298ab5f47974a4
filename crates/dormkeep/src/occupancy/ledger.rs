use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::domain::{Room, RoomId, RoomStatus};
use crate::store::{ConditionalUpdate, DormitoryStore, StoreError};

/// Snapshot of a room's slot counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occupancy {
    pub room_id: RoomId,
    pub capacity: u32,
    pub slots_available: u32,
    pub status: RoomStatus,
}

impl Occupancy {
    pub fn occupied(&self) -> u32 {
        self.capacity.saturating_sub(self.slots_available)
    }
}

impl From<&Room> for Occupancy {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.id,
            capacity: room.capacity,
            slots_available: room.slots_available,
            status: room.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OccupancyError {
    #[error("room {0} is full")]
    Full(RoomId),
    /// Releasing into a room with every slot free means an earlier release was counted twice.
    #[error("room {0} already has every slot available")]
    AtCapacity(RoomId),
    #[error("room {0} not found or inactive")]
    NotFound(RoomId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct OccupancyLedger<S> {
    store: Arc<S>,
}

impl<S> Clone for OccupancyLedger<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> OccupancyLedger<S>
where
    S: DormitoryStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Take one slot in an active room.
    pub fn assign_slot(&self, room_id: RoomId) -> Result<Occupancy, OccupancyError> {
        let outcome = self.store.update_room_if(
            room_id,
            &|room| room.active && room.slots_available > 0,
            &|room| {
                room.slots_available -= 1;
                room.status = RoomStatus::derive(room.status, room.capacity, room.slots_available);
            },
        )?;

        match outcome {
            ConditionalUpdate::Applied(room) => {
                debug!(room = %room_id, slots_available = room.slots_available, "slot assigned");
                Ok(Occupancy::from(&room))
            }
            ConditionalUpdate::Rejected(room) if !room.active => {
                Err(OccupancyError::NotFound(room_id))
            }
            ConditionalUpdate::Rejected(_) => Err(OccupancyError::Full(room_id)),
            ConditionalUpdate::Missing => Err(OccupancyError::NotFound(room_id)),
        }
    }

    /// Give one slot back. Inactive rooms accept releases so departing tenants never strand a slot.
    pub fn release_slot(&self, room_id: RoomId) -> Result<Occupancy, OccupancyError> {
        let outcome = self.store.update_room_if(
            room_id,
            &|room| room.slots_available < room.capacity,
            &|room| {
                room.slots_available += 1;
                room.status = RoomStatus::derive(room.status, room.capacity, room.slots_available);
            },
        )?;

        match outcome {
            ConditionalUpdate::Applied(room) => {
                debug!(room = %room_id, slots_available = room.slots_available, "slot released");
                Ok(Occupancy::from(&room))
            }
            ConditionalUpdate::Rejected(_) => Err(OccupancyError::AtCapacity(room_id)),
            ConditionalUpdate::Missing => Err(OccupancyError::NotFound(room_id)),
        }
    }

    pub fn query_occupancy(&self, room_id: RoomId) -> Result<Occupancy, OccupancyError> {
        self.store
            .fetch_room(room_id)?
            .map(|room| Occupancy::from(&room))
            .ok_or(OccupancyError::NotFound(room_id))
    }
}
