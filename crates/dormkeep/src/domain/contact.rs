use serde::{Deserialize, Serialize};

use super::ids::{EmergencyContactId, GuardianId};
use super::validation::{optional_text, required_text, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guardian {
    pub id: GuardianId,
    pub name: String,
    pub relationship: Option<String>,
    pub contact_number: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: EmergencyContactId,
    pub name: String,
    pub relationship: Option<String>,
    pub contact_number: String,
    pub address: Option<String>,
    pub active: bool,
}

/// Shared form input for guardians and emergency contacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    #[serde(default)]
    pub relationship: Option<String>,
    pub contact_number: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl NewContact {
    pub fn into_guardian(self) -> Result<Guardian, ValidationError> {
        Ok(Guardian {
            id: GuardianId(0),
            name: required_text("name", &self.name)?,
            relationship: optional_text(self.relationship),
            contact_number: required_text("contact_number", &self.contact_number)?,
            email: optional_text(self.email),
            address: optional_text(self.address),
            active: true,
        })
    }

    /// Emergency contacts carry no e-mail; one supplied on the form is dropped.
    pub fn into_emergency_contact(self) -> Result<EmergencyContact, ValidationError> {
        Ok(EmergencyContact {
            id: EmergencyContactId(0),
            name: required_text("name", &self.name)?,
            relationship: optional_text(self.relationship),
            contact_number: required_text("contact_number", &self.contact_number)?,
            address: optional_text(self.address),
            active: true,
        })
    }
}
