use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{
    EmergencyContact, EmergencyContactId, Guardian, GuardianId, Room, SoftDelete, User, UserId,
};

/// A reference from a tenant to another record, resolved at lookup time.
///
/// Pointing at an inactive record is valid data; it is surfaced as
/// [`Link::Inactive`] so views can render it distinctly.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "record", rename_all = "snake_case")]
pub enum Link<T> {
    Active(T),
    Inactive(T),
    /// The id is set but the store has no such record. Carries the display id.
    Dangling(String),
}

impl<T: SoftDelete> Link<T> {
    pub fn resolve<I: std::fmt::Display>(id: I, record: Option<T>) -> Self {
        match record {
            Some(record) if record.is_active() => Self::Active(record),
            Some(record) => Self::Inactive(record),
            None => Self::Dangling(id.to_string()),
        }
    }
}

impl<T> Link<T> {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// Display label with inactive references suffixed and dangling ones marked missing.
    pub fn label<F>(&self, name: F) -> String
    where
        F: Fn(&T) -> String,
    {
        match self {
            Self::Active(record) => name(record),
            Self::Inactive(record) => format!("{} (inactive)", name(record)),
            Self::Dangling(id) => format!("{id} (missing)"),
        }
    }
}

/// Every outbound reference of one tenant. `None` means the reference is unset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenantLinks {
    pub room: Option<Link<Room>>,
    pub guardian: Option<Link<Guardian>>,
    pub emergency_contact: Option<Link<EmergencyContact>>,
    pub user: Option<Link<User>>,
}

/// One edit to a tenant's guardian, emergency contact, and user references.
///
/// The outer `Option` says whether the field is touched at all; the inner one
/// sets or clears it. In JSON an absent field is left alone and `null` clears.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LinksUpdate {
    #[serde(default, deserialize_with = "present")]
    pub guardian_id: Option<Option<GuardianId>>,
    #[serde(default, deserialize_with = "present")]
    pub emergency_contact_id: Option<Option<EmergencyContactId>>,
    #[serde(default, deserialize_with = "present")]
    pub user_id: Option<Option<UserId>>,
}

impl LinksUpdate {
    pub(crate) fn apply_to(&self, tenant: &mut crate::domain::Tenant) {
        if let Some(guardian_id) = self.guardian_id {
            tenant.guardian_id = guardian_id;
        }
        if let Some(contact_id) = self.emergency_contact_id {
            tenant.emergency_contact_id = contact_id;
        }
        if let Some(user_id) = self.user_id {
            tenant.user_id = user_id;
        }
    }
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_are_untouched_and_null_clears() {
        let update: LinksUpdate =
            serde_json::from_str(r#"{"guardian_id": 4, "user_id": null}"#).expect("parses");
        assert_eq!(update.guardian_id, Some(Some(GuardianId(4))));
        assert_eq!(update.emergency_contact_id, None);
        assert_eq!(update.user_id, Some(None));
    }

    #[test]
    fn dangling_links_name_the_missing_record() {
        let link: Link<Guardian> = Link::resolve(GuardianId(9), None);
        assert_eq!(link, Link::Dangling("guardian-0009".to_string()));
        assert_eq!(
            link.label(|guardian| guardian.name.clone()),
            "guardian-0009 (missing)"
        );
    }
}
