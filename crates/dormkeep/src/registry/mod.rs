//! Creation and soft deactivation of rooms, guardians, emergency contacts and
//! user accounts. Room edits here never touch the slot counter.

mod service;

pub use service::{RegistryError, RegistryService, RoomUpdate};
