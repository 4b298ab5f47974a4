use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::domain::NewRoom;

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "Room Number")]
    room_number: String,
    #[serde(rename = "Capacity")]
    capacity: u32,
    #[serde(rename = "Monthly Rate")]
    monthly_rate: Decimal,
    #[serde(rename = "Status", default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
}

impl RosterRow {
    fn under_maintenance(&self) -> bool {
        self.status
            .as_deref()
            .map(|status| {
                let normalized = status.trim().to_ascii_lowercase().replace(['_', '-'], " ");
                normalized == "under maintenance" || normalized == "maintenance"
            })
            .unwrap_or(false)
    }
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<NewRoom>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rooms = Vec::new();

    for record in csv_reader.deserialize::<RosterRow>() {
        let row = record?;
        let under_maintenance = row.under_maintenance();
        rooms.push(NewRoom {
            room_number: row.room_number,
            capacity: row.capacity,
            monthly_rate: row.monthly_rate,
            under_maintenance,
        });
    }

    Ok(rooms)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
