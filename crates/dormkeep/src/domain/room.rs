use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::RoomId;
use super::validation::{non_negative_amount, required_text, ValidationError};

/// Advisory label for a room. The slot counter is the binding truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Vacant,
    Occupied,
    UnderMaintenance,
}

impl RoomStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Vacant => "Vacant",
            Self::Occupied => "Occupied",
            Self::UnderMaintenance => "Under Maintenance",
        }
    }

    /// Status implied by a slot count. Maintenance is sticky until cleared explicitly.
    pub(crate) fn derive(current: Self, capacity: u32, slots_available: u32) -> Self {
        if current == Self::UnderMaintenance {
            return current;
        }
        if slots_available < capacity {
            Self::Occupied
        } else {
            Self::Vacant
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub room_number: String,
    pub capacity: u32,
    pub slots_available: u32,
    pub monthly_rate: Decimal,
    pub status: RoomStatus,
    pub active: bool,
}

impl Room {
    pub fn occupied_slots(&self) -> u32 {
        self.capacity.saturating_sub(self.slots_available)
    }

    pub fn has_occupants(&self) -> bool {
        self.slots_available < self.capacity
    }
}

/// Unvalidated room input coming from a form or import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRoom {
    pub room_number: String,
    pub capacity: u32,
    pub monthly_rate: Decimal,
    #[serde(default)]
    pub under_maintenance: bool,
}

impl NewRoom {
    /// Validate and build the room record. The store assigns the id on insert.
    pub fn into_room(self) -> Result<Room, ValidationError> {
        let room_number = required_text("room_number", &self.room_number)?;
        if self.capacity == 0 {
            return Err(ValidationError::new("capacity", "must be at least 1"));
        }
        let monthly_rate = non_negative_amount("monthly_rate", self.monthly_rate)?;
        let status = if self.under_maintenance {
            RoomStatus::UnderMaintenance
        } else {
            RoomStatus::Vacant
        };

        Ok(Room {
            id: RoomId(0),
            room_number,
            capacity: self.capacity,
            slots_available: self.capacity,
            monthly_rate,
            status,
            active: true,
        })
    }
}
