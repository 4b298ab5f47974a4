use serde::{Deserialize, Serialize};

use super::ids::UserId;
use super::validation::{required_text, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Landlord,
    Tenant,
}

impl UserRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Landlord => "Landlord",
            Self::Tenant => "Tenant",
        }
    }
}

/// Account record. `password_hash` is produced by the authentication collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
}

impl NewUser {
    pub fn into_user(self) -> Result<User, ValidationError> {
        Ok(User {
            id: UserId(0),
            username: required_text("username", &self.username)?,
            password_hash: required_text("password_hash", &self.password_hash)?,
            role: self.role,
            active: true,
        })
    }
}
