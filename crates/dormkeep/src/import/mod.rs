//! Room roster import from CSV exports (`Room Number,Capacity,Monthly Rate,Status`).

mod parser;

use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::Room;
use crate::registry::{RegistryError, RegistryService};
use crate::store::DormitoryStore;

#[derive(Debug, thiserror::Error)]
pub enum RosterImportError {
    #[error("failed to read room roster: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid room roster CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Rows that made it in and rows that were refused, with the reason.
#[derive(Debug, Default, Serialize)]
pub struct RosterImportSummary {
    pub created: Vec<Room>,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug, Serialize)]
pub struct SkippedRow {
    /// 1-based data row, header excluded.
    pub row: usize,
    pub room_number: String,
    pub reason: String,
}

pub struct RoomRosterImporter;

impl RoomRosterImporter {
    pub fn from_path<P, S>(
        path: P,
        registry: &RegistryService<S>,
    ) -> Result<RosterImportSummary, RosterImportError>
    where
        P: AsRef<Path>,
        S: DormitoryStore + 'static,
    {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, registry)
    }

    /// Parse the whole file first, then create rooms one by one. A malformed file
    /// creates nothing; a row the registry refuses is skipped and reported.
    pub fn from_reader<R, S>(
        reader: R,
        registry: &RegistryService<S>,
    ) -> Result<RosterImportSummary, RosterImportError>
    where
        R: Read,
        S: DormitoryStore + 'static,
    {
        let rows = parser::parse_rows(reader)?;
        let mut summary = RosterImportSummary::default();

        for (index, input) in rows.into_iter().enumerate() {
            let room_number = input.room_number.clone();
            match registry.create_room(input) {
                Ok(room) => summary.created.push(room),
                Err(err @ (RegistryError::Validation(_) | RegistryError::Duplicate(_))) => {
                    warn!(row = index + 1, %room_number, %err, "skipping roster row");
                    summary.skipped.push(SkippedRow {
                        row: index + 1,
                        room_number,
                        reason: err.to_string(),
                    });
                }
                Err(err) => {
                    warn!(%err, "room roster import aborted");
                    summary.skipped.push(SkippedRow {
                        row: index + 1,
                        room_number,
                        reason: err.to_string(),
                    });
                    break;
                }
            }
        }

        info!(
            created = summary.created.len(),
            skipped = summary.skipped.len(),
            "room roster imported"
        );
        Ok(summary)
    }
}
