use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{:04}", $prefix, self.0)
            }
        }
    };
}

entity_id!(
    /// Store-assigned identifier for a room.
    RoomId,
    "room"
);
entity_id!(
    /// Store-assigned identifier for a tenant.
    TenantId,
    "tenant"
);
entity_id!(
    /// Store-assigned identifier for a payment record.
    PaymentId,
    "payment"
);
entity_id!(GuardianId, "guardian");
entity_id!(EmergencyContactId, "contact");
entity_id!(UserId, "user");
