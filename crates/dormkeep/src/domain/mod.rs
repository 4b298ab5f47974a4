//! Entity model: rooms, tenants, payments, contacts and user accounts.
//!
//! Every entity carries its own `active` flag. References between entities are
//! plain ids and stay valid after the referenced record is deactivated.

pub mod contact;
pub mod ids;
pub mod money;
pub mod payment;
pub mod room;
pub mod tenant;
pub mod user;
pub mod validation;

pub use contact::{EmergencyContact, Guardian, NewContact};
pub use ids::{EmergencyContactId, GuardianId, PaymentId, RoomId, TenantId, UserId};
pub use payment::{NewPayment, Payment, PaymentMethod};
pub use room::{NewRoom, Room, RoomStatus};
pub use tenant::{DepositStatus, NewTenant, Tenant, TenantDetails};
pub use user::{NewUser, User, UserRole};
pub use validation::ValidationError;

/// Entities that are deactivated instead of removed.
pub trait SoftDelete {
    fn is_active(&self) -> bool;
}

macro_rules! soft_delete {
    ($($entity:ty),* $(,)?) => {
        $(impl SoftDelete for $entity {
            fn is_active(&self) -> bool {
                self.active
            }
        })*
    };
}

soft_delete!(Room, Tenant, Guardian, EmergencyContact, User);
