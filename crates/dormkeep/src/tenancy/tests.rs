use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::*;
use crate::domain::{
    DepositStatus, EmergencyContact, EmergencyContactId, Guardian, GuardianId, NewContact,
    NewRoom, NewTenant, Payment, Room, RoomId, Tenant, TenantDetails, TenantId, User, UserId,
};
use crate::occupancy::OccupancyError;
use crate::store::{ConditionalUpdate, DormitoryStore, InMemoryStore, StoreError};

struct Fixture {
    store: Arc<InMemoryStore>,
    service: TenantLifecycleService<InMemoryStore>,
}

impl Fixture {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let service = TenantLifecycleService::new(store.clone());
        Self { store, service }
    }

    fn room(&self, number: &str, capacity: u32) -> Room {
        self.store
            .insert_room(
                NewRoom {
                    room_number: number.to_string(),
                    capacity,
                    monthly_rate: Decimal::new(350000, 2),
                    under_maintenance: false,
                }
                .into_room()
                .expect("valid room"),
            )
            .expect("insert room")
    }

    fn slots(&self, room_id: RoomId) -> u32 {
        self.store
            .fetch_room(room_id)
            .expect("fetch room")
            .expect("room exists")
            .slots_available
    }

    fn tenant(&self, first_name: &str, room_id: Option<RoomId>) -> TenantCreation {
        self.service
            .create_tenant(new_tenant(first_name, room_id))
            .expect("tenant created")
    }
}

/// Delegates to [`InMemoryStore`] but fails tenant writes on demand.
#[derive(Default)]
struct FlakyStore {
    inner: InMemoryStore,
    fail_insert_tenant: AtomicBool,
    fail_update_tenant: AtomicBool,
}

impl FlakyStore {
    fn outage(flag: &AtomicBool) -> Result<(), StoreError> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        Ok(())
    }
}

impl DormitoryStore for FlakyStore {
    fn insert_room(&self, room: Room) -> Result<Room, StoreError> {
        self.inner.insert_room(room)
    }

    fn fetch_room(&self, id: RoomId) -> Result<Option<Room>, StoreError> {
        self.inner.fetch_room(id)
    }

    fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        self.inner.list_rooms()
    }

    fn update_room_if(
        &self,
        id: RoomId,
        predicate: &dyn Fn(&Room) -> bool,
        apply: &dyn Fn(&mut Room),
    ) -> Result<ConditionalUpdate, StoreError> {
        self.inner.update_room_if(id, predicate, apply)
    }

    fn insert_tenant(&self, tenant: Tenant) -> Result<Tenant, StoreError> {
        Self::outage(&self.fail_insert_tenant)?;
        self.inner.insert_tenant(tenant)
    }

    fn update_tenant(&self, tenant: Tenant) -> Result<(), StoreError> {
        Self::outage(&self.fail_update_tenant)?;
        self.inner.update_tenant(tenant)
    }

    fn fetch_tenant(&self, id: TenantId) -> Result<Option<Tenant>, StoreError> {
        self.inner.fetch_tenant(id)
    }

    fn list_tenants(&self) -> Result<Vec<Tenant>, StoreError> {
        self.inner.list_tenants()
    }

    fn insert_guardian(&self, guardian: Guardian) -> Result<Guardian, StoreError> {
        self.inner.insert_guardian(guardian)
    }

    fn update_guardian(&self, guardian: Guardian) -> Result<(), StoreError> {
        self.inner.update_guardian(guardian)
    }

    fn fetch_guardian(&self, id: GuardianId) -> Result<Option<Guardian>, StoreError> {
        self.inner.fetch_guardian(id)
    }

    fn insert_emergency_contact(
        &self,
        contact: EmergencyContact,
    ) -> Result<EmergencyContact, StoreError> {
        self.inner.insert_emergency_contact(contact)
    }

    fn update_emergency_contact(&self, contact: EmergencyContact) -> Result<(), StoreError> {
        self.inner.update_emergency_contact(contact)
    }

    fn fetch_emergency_contact(
        &self,
        id: EmergencyContactId,
    ) -> Result<Option<EmergencyContact>, StoreError> {
        self.inner.fetch_emergency_contact(id)
    }

    fn insert_user(&self, user: User) -> Result<User, StoreError> {
        self.inner.insert_user(user)
    }

    fn update_user(&self, user: User) -> Result<(), StoreError> {
        self.inner.update_user(user)
    }

    fn fetch_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        self.inner.fetch_user(id)
    }

    fn insert_payment(&self, payment: Payment) -> Result<Payment, StoreError> {
        self.inner.insert_payment(payment)
    }

    fn list_payments(&self) -> Result<Vec<Payment>, StoreError> {
        self.inner.list_payments()
    }

    fn payments_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<Payment>, StoreError> {
        self.inner.payments_for_tenant(tenant_id)
    }
}

struct FlakyFixture {
    store: Arc<FlakyStore>,
    service: TenantLifecycleService<FlakyStore>,
}

impl FlakyFixture {
    fn new() -> Self {
        let store = Arc::new(FlakyStore::default());
        let service = TenantLifecycleService::new(store.clone());
        Self { store, service }
    }

    fn room(&self, number: &str, capacity: u32) -> RoomId {
        self.store
            .insert_room(
                NewRoom {
                    room_number: number.to_string(),
                    capacity,
                    monthly_rate: Decimal::new(350000, 2),
                    under_maintenance: false,
                }
                .into_room()
                .expect("valid room"),
            )
            .expect("insert room")
            .id
    }

    fn slots(&self, room_id: RoomId) -> u32 {
        self.store
            .fetch_room(room_id)
            .expect("fetch room")
            .expect("room exists")
            .slots_available
    }
}

fn contact(name: &str) -> NewContact {
    NewContact {
        name: name.to_string(),
        relationship: Some("Mother".to_string()),
        contact_number: "09181112222".to_string(),
        email: None,
        address: None,
    }
}

fn details(first_name: &str) -> TenantDetails {
    TenantDetails {
        first_name: first_name.to_string(),
        last_name: "Dela Cruz".to_string(),
        contact_number: Some("09171234567".to_string()),
        lease_start_date: NaiveDate::from_ymd_opt(2024, 6, 1),
        lease_end_date: None,
        security_deposit_amount: Decimal::new(350000, 2),
        deposit_status: DepositStatus::Paid,
    }
}

fn new_tenant(first_name: &str, room_id: Option<RoomId>) -> NewTenant {
    NewTenant {
        details: details(first_name),
        room_id,
        guardian_id: None,
        emergency_contact_id: None,
        user_id: None,
    }
}

#[test]
fn create_with_room_takes_a_slot() {
    let fx = Fixture::new();
    let room = fx.room("101", 2);

    let created = fx.tenant("Ana", Some(room.id));

    assert_eq!(created.tenant.room_id, Some(room.id));
    assert!(matches!(created.placement, RoomPlacement::Assigned { .. }));
    assert_eq!(fx.slots(room.id), 1);
}

#[test]
fn create_into_full_room_keeps_tenant_roomless_and_reports_it() {
    let fx = Fixture::new();
    let room = fx.room("102", 1);
    fx.tenant("Ana", Some(room.id));

    let created = fx.tenant("Ben", Some(room.id));

    assert!(created.is_partial());
    assert_eq!(created.tenant.room_id, None);
    match created.placement {
        RoomPlacement::Rejected { room_id, reason } => {
            assert_eq!(room_id, room.id);
            assert_eq!(reason, OccupancyError::Full(room.id));
        }
        other => panic!("expected rejected placement, got {other:?}"),
    }
    assert_eq!(fx.slots(room.id), 0);
}

#[test]
fn invalid_input_is_rejected_before_any_slot_is_taken() {
    let fx = Fixture::new();
    let room = fx.room("103", 2);
    let input = new_tenant("  ", Some(room.id));

    match fx.service.create_tenant(input) {
        Err(LifecycleError::Validation(err)) => assert_eq!(err.field, "first_name"),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(fx.slots(room.id), 2);
    assert!(fx.store.list_tenants().expect("list").is_empty());
}

#[test]
fn unknown_guardian_reference_fails_before_any_write() {
    let fx = Fixture::new();
    let room = fx.room("104", 2);
    let mut input = new_tenant("Ana", Some(room.id));
    input.guardian_id = Some(crate::domain::GuardianId(77));

    match fx.service.create_tenant(input) {
        Err(LifecycleError::ReferenceNotFound { field, .. }) => assert_eq!(field, "guardian_id"),
        other => panic!("expected missing reference, got {other:?}"),
    }
    assert_eq!(fx.slots(room.id), 2);
}

#[test]
fn clearing_room_of_unassigned_tenant_is_a_no_op() {
    let fx = Fixture::new();
    let room = fx.room("105", 1);
    let created = fx.tenant("Ana", None);

    let outcome = fx
        .service
        .assign_room(created.tenant.id, None)
        .expect("no-op succeeds");

    assert_eq!(outcome, RoomAssignment::Unchanged);
    assert_eq!(fx.slots(room.id), 1);
}

#[test]
fn reassigning_to_the_same_room_does_not_double_decrement() {
    let fx = Fixture::new();
    let room = fx.room("106", 3);
    let created = fx.tenant("Ana", Some(room.id));

    let outcome = fx
        .service
        .assign_room(created.tenant.id, Some(room.id))
        .expect("same room");

    assert_eq!(outcome, RoomAssignment::Unchanged);
    assert_eq!(fx.slots(room.id), 2);
}

#[test]
fn moving_between_rooms_releases_old_and_takes_new() {
    let fx = Fixture::new();
    let old = fx.room("201", 2);
    let new = fx.room("202", 2);
    let created = fx.tenant("Ana", Some(old.id));

    let outcome = fx
        .service
        .assign_room(created.tenant.id, Some(new.id))
        .expect("move succeeds");

    match outcome {
        RoomAssignment::Moved { from, to } => {
            assert_eq!(from.room_id, old.id);
            assert_eq!(to.room_id, new.id);
        }
        other => panic!("expected move, got {other:?}"),
    }
    assert_eq!(fx.slots(old.id), 2);
    assert_eq!(fx.slots(new.id), 1);
    let stored = fx.service.tenant(created.tenant.id).expect("tenant");
    assert_eq!(stored.room_id, Some(new.id));
}

#[test]
fn refused_move_leaves_tenant_in_original_room() {
    let fx = Fixture::new();
    let old = fx.room("301", 2);
    let full = fx.room("302", 1);
    fx.tenant("Occupant", Some(full.id));
    let created = fx.tenant("Ana", Some(old.id));

    match fx.service.assign_room(created.tenant.id, Some(full.id)) {
        Err(LifecycleError::Occupancy(OccupancyError::Full(room_id))) => {
            assert_eq!(room_id, full.id)
        }
        other => panic!("expected full room, got {other:?}"),
    }

    let stored = fx.service.tenant(created.tenant.id).expect("tenant");
    assert_eq!(stored.room_id, Some(old.id));
    assert_eq!(fx.slots(old.id), 1);
    assert_eq!(fx.slots(full.id), 0);
}

#[test]
fn unassigning_releases_the_slot() {
    let fx = Fixture::new();
    let room = fx.room("401", 2);
    let created = fx.tenant("Ana", Some(room.id));

    let outcome = fx
        .service
        .assign_room(created.tenant.id, None)
        .expect("release succeeds");

    assert!(matches!(outcome, RoomAssignment::Released { .. }));
    assert_eq!(fx.slots(room.id), 2);
}

#[test]
fn deactivation_releases_exactly_one_slot_and_hides_tenant() {
    let fx = Fixture::new();
    let room = fx.room("501", 2);
    let created = fx.tenant("Ana", Some(room.id));
    fx.tenant("Ben", Some(room.id));
    assert_eq!(fx.slots(room.id), 0);

    let deactivation = fx.service.deactivate(created.tenant.id).expect("deactivate");
    assert!(deactivation.changed);
    assert!(matches!(deactivation.release, SlotRelease::Released { .. }));
    assert_eq!(deactivation.tenant.room_id, Some(room.id), "room kept for audit");
    assert_eq!(fx.slots(room.id), 1);

    let again = fx.service.deactivate(created.tenant.id).expect("idempotent");
    assert!(!again.changed);
    assert_eq!(fx.slots(room.id), 1);

    let active = fx.service.active_tenants().expect("list");
    assert_eq!(active.len(), 1);
    assert!(active.iter().all(|tenant| tenant.id != created.tenant.id));
}

#[test]
fn deactivate_unknown_tenant_is_not_found() {
    let fx = Fixture::new();
    match fx.service.deactivate(TenantId(9)) {
        Err(LifecycleError::TenantNotFound(id)) => assert_eq!(id, TenantId(9)),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn reactivated_tenants_start_roomless() {
    let fx = Fixture::new();
    let room = fx.room("601", 1);
    let created = fx.tenant("Ana", Some(room.id));
    fx.service.deactivate(created.tenant.id).expect("deactivate");

    match fx.service.assign_room(created.tenant.id, Some(room.id)) {
        Err(LifecycleError::TenantInactive(_)) => {}
        other => panic!("inactive tenants cannot be placed, got {other:?}"),
    }

    let tenant = fx.service.reactivate(created.tenant.id).expect("reactivate");
    assert!(tenant.active);
    assert_eq!(tenant.room_id, None);
    assert_eq!(fx.slots(room.id), 1);

    fx.service
        .assign_room(created.tenant.id, Some(room.id))
        .expect("placed again");
    assert_eq!(fx.slots(room.id), 0);
}

#[test]
fn capacity_scenario_frees_a_slot_after_deactivation() {
    let fx = Fixture::new();
    let room_a = fx.room("A", 2);
    let t1 = fx.tenant("One", None).tenant.id;
    let t2 = fx.tenant("Two", None).tenant.id;
    let t3 = fx.tenant("Three", None).tenant.id;

    fx.service.assign_room(t1, Some(room_a.id)).expect("t1 placed");
    assert_eq!(fx.slots(room_a.id), 1);
    fx.service.assign_room(t2, Some(room_a.id)).expect("t2 placed");
    assert_eq!(fx.slots(room_a.id), 0);

    match fx.service.assign_room(t3, Some(room_a.id)) {
        Err(LifecycleError::Occupancy(OccupancyError::Full(_))) => {}
        other => panic!("expected full, got {other:?}"),
    }

    fx.service.deactivate(t1).expect("t1 leaves");
    assert_eq!(fx.slots(room_a.id), 1);
    fx.service.assign_room(t3, Some(room_a.id)).expect("t3 placed");
    assert_eq!(fx.slots(room_a.id), 0);
}

#[test]
fn links_to_deactivated_guardians_resolve_as_inactive() {
    let fx = Fixture::new();
    let mut guardian = fx
        .store
        .insert_guardian(contact("Rosa Dela Cruz").into_guardian().expect("valid guardian"))
        .expect("insert guardian");
    let created = fx.tenant("Ana", None);
    fx.service
        .link_guardian(created.tenant.id, Some(guardian.id))
        .expect("link active guardian");

    guardian.active = false;
    fx.store.update_guardian(guardian.clone()).expect("deactivate");

    let links = fx.service.resolve_links(created.tenant.id).expect("resolve");
    let link = links.guardian.expect("guardian linked");
    assert!(!link.is_active());
    assert_eq!(
        link.label(|guardian| guardian.name.clone()),
        "Rosa Dela Cruz (inactive)"
    );
    assert!(links.room.is_none());

    match fx.service.link_guardian(created.tenant.id, Some(guardian.id)) {
        Err(LifecycleError::Validation(err)) => assert_eq!(err.field, "guardian_id"),
        other => panic!("linking inactive guardian should fail, got {other:?}"),
    }
    fx.service
        .link_guardian(created.tenant.id, None)
        .expect("clearing is always allowed");
}

#[test]
fn update_details_never_touches_room() {
    let fx = Fixture::new();
    let room = fx.room("701", 2);
    let created = fx.tenant("Ana", Some(room.id));

    let mut edited = details("Anabel");
    edited.deposit_status = DepositStatus::PartialRefund;
    let tenant = fx
        .service
        .update_details(created.tenant.id, edited)
        .expect("update");

    assert_eq!(tenant.first_name, "Anabel");
    assert_eq!(tenant.room_id, Some(room.id));
    assert_eq!(fx.slots(room.id), 1);
}

#[test]
fn concurrent_moves_of_one_tenant_keep_counts_consistent() {
    let fx = Arc::new(Fixture::new());
    let rooms: Vec<RoomId> = (0..4).map(|n| fx.room(&format!("C{n}"), 2).id).collect();
    let tenant = fx.tenant("Ana", Some(rooms[0])).tenant.id;

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let fx = Arc::clone(&fx);
            let rooms = rooms.clone();
            std::thread::spawn(move || {
                for step in 0..50 {
                    let target = rooms[(worker + step) % rooms.len()];
                    let _ = fx.service.assign_room(tenant, Some(target));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker completes");
    }

    let occupied: u32 = rooms.iter().map(|room| 2 - fx.slots(*room)).sum();
    assert_eq!(occupied, 1);
    let placed = fx.service.tenant(tenant).expect("tenant").room_id;
    let placed = placed.expect("tenant still placed");
    assert_eq!(fx.slots(placed), 1);
}

#[test]
fn rejected_relink_writes_no_field() {
    let fx = Fixture::new();
    let guardian = fx
        .store
        .insert_guardian(contact("Rosa Dela Cruz").into_guardian().expect("valid guardian"))
        .expect("insert guardian");
    let mut emergency = fx
        .store
        .insert_emergency_contact(
            contact("Jose Dela Cruz")
                .into_emergency_contact()
                .expect("valid contact"),
        )
        .expect("insert contact");
    emergency.active = false;
    fx.store
        .update_emergency_contact(emergency.clone())
        .expect("deactivate contact");
    let tenant = fx.tenant("Ana", None).tenant.id;

    let update = LinksUpdate {
        guardian_id: Some(Some(guardian.id)),
        emergency_contact_id: Some(Some(emergency.id)),
        user_id: None,
    };
    match fx.service.relink(tenant, &update) {
        Err(LifecycleError::Validation(err)) => assert_eq!(err.field, "emergency_contact_id"),
        other => panic!("inactive contact should be refused, got {other:?}"),
    }

    let stored = fx.service.tenant(tenant).expect("tenant");
    assert_eq!(stored.guardian_id, None);
    assert_eq!(stored.emergency_contact_id, None);

    let update = LinksUpdate {
        emergency_contact_id: None,
        ..update
    };
    let linked = fx.service.relink(tenant, &update).expect("guardian alone links");
    assert_eq!(linked.guardian_id, Some(guardian.id));
}

#[test]
fn failed_tenant_insert_gives_the_slot_back() {
    let fx = FlakyFixture::new();
    let room = fx.room("801", 1);
    fx.store.fail_insert_tenant.store(true, Ordering::SeqCst);

    let err = fx
        .service
        .create_tenant(new_tenant("Ana", Some(room)))
        .expect_err("insert fails");

    assert!(matches!(err, LifecycleError::Store(StoreError::Unavailable(_))));
    assert_eq!(fx.slots(room), 1);
    assert!(fx.store.list_tenants().expect("list").is_empty());
}

#[test]
fn failed_move_restores_both_rooms() {
    let fx = FlakyFixture::new();
    let from = fx.room("802", 2);
    let to = fx.room("803", 2);
    let tenant = fx
        .service
        .create_tenant(new_tenant("Ana", Some(from)))
        .expect("tenant created")
        .tenant
        .id;
    fx.store.fail_update_tenant.store(true, Ordering::SeqCst);

    let err = fx
        .service
        .assign_room(tenant, Some(to))
        .expect_err("update fails");

    assert!(matches!(err, LifecycleError::Store(StoreError::Unavailable(_))));
    assert_eq!(fx.slots(from), 1);
    assert_eq!(fx.slots(to), 2);
    assert_eq!(fx.service.tenant(tenant).expect("tenant").room_id, Some(from));
}

#[test]
fn failed_deactivation_keeps_the_tenant_placed() {
    let fx = FlakyFixture::new();
    let room = fx.room("804", 2);
    let tenant = fx
        .service
        .create_tenant(new_tenant("Ana", Some(room)))
        .expect("tenant created")
        .tenant
        .id;
    fx.store.fail_update_tenant.store(true, Ordering::SeqCst);

    let err = fx.service.deactivate(tenant).expect_err("update fails");

    assert!(matches!(err, LifecycleError::Store(StoreError::Unavailable(_))));
    assert_eq!(fx.slots(room), 1);
    assert!(fx.service.tenant(tenant).expect("tenant").active);
}

#[test]
fn refused_release_of_old_room_returns_the_new_slot() {
    let fx = Fixture::new();
    let from = fx.room("805", 2);
    let to = fx.room("806", 2);
    let tenant = fx.tenant("Ana", Some(from.id)).tenant.id;
    fx.service
        .ledger()
        .release_slot(from.id)
        .expect("counter drifts to full capacity");

    let err = fx
        .service
        .assign_room(tenant, Some(to.id))
        .expect_err("old room cannot release");

    assert!(matches!(
        err,
        LifecycleError::Occupancy(OccupancyError::AtCapacity(room)) if room == from.id
    ));
    assert_eq!(fx.slots(to.id), 2);
    assert_eq!(fx.slots(from.id), 2);
    assert_eq!(fx.service.tenant(tenant).expect("tenant").room_id, Some(from.id));
}

#[test]
fn deactivating_from_a_drifted_room_reports_an_anomaly() {
    let fx = Fixture::new();
    let room = fx.room("807", 2);
    let tenant = fx.tenant("Ana", Some(room.id)).tenant.id;
    fx.service
        .ledger()
        .release_slot(room.id)
        .expect("counter drifts to full capacity");

    let outcome = fx.service.deactivate(tenant).expect("deactivation proceeds");

    assert!(outcome.changed);
    assert!(!outcome.tenant.active);
    assert_eq!(
        outcome.release,
        SlotRelease::Anomaly {
            room_id: room.id,
            reason: OccupancyError::AtCapacity(room.id),
        }
    );
    assert_eq!(fx.slots(room.id), 2);
}
