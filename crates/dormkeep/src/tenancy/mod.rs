//! Tenant lifecycle: creation, room placement, soft deactivation, and links to
//! guardians, emergency contacts, and user accounts.

mod links;
mod locks;
mod service;

#[cfg(test)]
mod tests;

pub use links::{Link, LinksUpdate, TenantLinks};
pub(crate) use service::resolve_links;
pub use service::{
    Deactivation, LifecycleError, RoomAssignment, RoomPlacement, SlotRelease, TenantCreation,
    TenantLifecycleService,
};
