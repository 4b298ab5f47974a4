//! Room slot accounting.
//!
//! [`OccupancyLedger`] is the only writer of `Room::slots_available`. Each
//! mutation is a single conditional store write, so two callers racing for the
//! last slot cannot both win.

mod ledger;


pub use ledger::{Occupancy, OccupancyError, OccupancyLedger};
