//! Tests for the assignment service.

use std::sync::Arc;

use chrono::NaiveDate;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockAssignmentRepository, MockLocationRepository, MockStatusSyncRepository,
    MockUserRepository,
};
use crate::domain::{
    AssignmentKind, ErrorCode, FullName, Locality, StatusSyncOutcome, Store, StoreDraft, User,
    UserRole, UserStatus,
};

type TestService = AssignmentService<
    MockAssignmentRepository,
    MockUserRepository,
    MockLocationRepository,
    MockStatusSyncRepository,
>;

#[derive(Default)]
struct Mocks {
    assignments: MockAssignmentRepository,
    users: MockUserRepository,
    locations: MockLocationRepository,
    sync: MockStatusSyncRepository,
}

impl Mocks {
    fn into_service(self) -> TestService {
        AssignmentService::new(
            Arc::new(self.assignments),
            Arc::new(self.users),
            Arc::new(self.locations),
            Arc::new(self.sync),
        )
    }
}

struct World {
    locality: Locality,
    lead: User,
    member: User,
}

fn user(name: &str, role: UserRole) -> User {
    User::new(
        UserId::random(),
        FullName::new(name).expect("valid name"),
        role,
        None,
        UserStatus::Available,
    )
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, day).expect("valid date")
}

#[fixture]
fn world() -> World {
    World {
        locality: Locality::new(LocalityId::random(), "Chitila", "Ilfov", None)
            .expect("valid locality"),
        lead: user("Ion Popescu", UserRole::TeamLead),
        member: user("Vlad Marin", UserRole::Technician),
    }
}

fn request(world: &World) -> NewAssignment {
    NewAssignment {
        kind: AssignmentKind::Installation,
        locality_id: world.locality.id(),
        store_id: None,
        team_lead_id: world.lead.id(),
        member_ids: vec![world.member.id()],
        status: None,
        start_date: date(10),
        end_date: Some(date(12)),
        car_plate: None,
        notes: None,
    }
}

fn existing(world: &World, status: AssignmentStatus) -> Assignment {
    Assignment::new(AssignmentDraft {
        id: AssignmentId::random(),
        kind: AssignmentKind::Maintenance,
        locality_id: world.locality.id(),
        store_id: None,
        team_lead_id: world.lead.id(),
        member_ids: vec![world.member.id()],
        status,
        start_date: date(10),
        end_date: None,
        car_plate: None,
        distance_km: None,
        travel_minutes: None,
        departure_at: None,
        return_at: None,
        notes: None,
    })
    .expect("valid assignment")
}

fn expect_references(mocks: &mut Mocks, world: &World) {
    let locality = world.locality.clone();
    mocks
        .locations
        .expect_find_locality()
        .return_once(move |_| Ok(Some(locality)));
    let team = vec![world.lead.clone(), world.member.clone()];
    mocks
        .users
        .expect_find_many()
        .return_once(move |_| Ok(team));
}

#[rstest]
#[tokio::test]
async fn create_defaults_to_planned_without_resync(world: World) {
    let mut mocks = Mocks::default();
    expect_references(&mut mocks, &world);
    mocks
        .assignments
        .expect_insert()
        .withf(|a| a.status() == AssignmentStatus::Planned)
        .times(1)
        .return_once(|_| Ok(()));
    mocks.sync.expect_sync_users().never();

    let created = mocks
        .into_service()
        .create_assignment(request(&world))
        .await
        .expect("created");
    assert_eq!(created.team(), vec![world.lead.id(), world.member.id()]);
}

#[rstest]
#[tokio::test]
async fn create_active_resyncs_team(world: World) {
    let mut mocks = Mocks::default();
    expect_references(&mut mocks, &world);
    mocks.assignments.expect_insert().return_once(|_| Ok(()));
    let expected_team = vec![world.lead.id(), world.member.id()];
    mocks
        .sync
        .expect_sync_users()
        .withf(move |users| users == expected_team.as_slice())
        .times(1)
        .return_once(|_| {
            Ok(StatusSyncOutcome {
                promoted: 2,
                released: 0,
            })
        });

    let mut active = request(&world);
    active.status = Some(AssignmentStatus::Active);
    mocks
        .into_service()
        .create_assignment(active)
        .await
        .expect("created");
}

#[rstest]
#[tokio::test]
async fn create_rejects_completed_initial_status(world: World) {
    let mut completed = request(&world);
    completed.status = Some(AssignmentStatus::Completed);
    let err = Mocks::default()
        .into_service()
        .create_assignment(completed)
        .await
        .expect_err("invalid status");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn create_rejects_store_from_another_locality(world: World) {
    let mut mocks = Mocks::default();
    let locality = world.locality.clone();
    mocks
        .locations
        .expect_find_locality()
        .return_once(move |_| Ok(Some(locality)));
    let store = Store::new(StoreDraft {
        id: StoreId::random(),
        code: "S-1".into(),
        name: "Elsewhere".into(),
        address: None,
        locality_id: LocalityId::random(),
        coordinates: None,
    })
    .expect("valid store");
    let store_id = store.id();
    mocks
        .locations
        .expect_find_store()
        .return_once(move |_| Ok(Some(store)));
    mocks.assignments.expect_insert().never();

    let mut with_store = request(&world);
    with_store.store_id = Some(store_id);
    let err = mocks
        .into_service()
        .create_assignment(with_store)
        .await
        .expect_err("mismatch");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details().and_then(|d| d.get("field")).and_then(|f| f.as_str()),
        Some("storeId")
    );
}

#[rstest]
#[tokio::test]
async fn create_rejects_unknown_member(world: World) {
    let mut mocks = Mocks::default();
    let locality = world.locality.clone();
    mocks
        .locations
        .expect_find_locality()
        .return_once(move |_| Ok(Some(locality)));
    let only_lead = vec![world.lead.clone()];
    mocks
        .users
        .expect_find_many()
        .return_once(move |_| Ok(only_lead));
    mocks.assignments.expect_insert().never();

    let err = mocks
        .into_service()
        .create_assignment(request(&world))
        .await
        .expect_err("unknown member");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn create_rejects_lead_listed_as_member(world: World) {
    let mut bad = request(&world);
    bad.member_ids.push(world.lead.id());
    let err = Mocks::default()
        .into_service()
        .create_assignment(bad)
        .await
        .expect_err("lead as member");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn change_status_persists_and_resyncs(world: World) {
    let planned = existing(&world, AssignmentStatus::Planned);
    let id = planned.id();
    let mut mocks = Mocks::default();
    mocks
        .assignments
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(planned)));
    mocks
        .assignments
        .expect_update()
        .withf(|a| a.status() == AssignmentStatus::Active)
        .times(1)
        .return_once(|_| Ok(true));
    mocks
        .sync
        .expect_sync_users()
        .times(1)
        .return_once(|_| Ok(StatusSyncOutcome::default()));

    let updated = mocks
        .into_service()
        .change_status(id, AssignmentStatus::Active)
        .await
        .expect("activated");
    assert_eq!(updated.status(), AssignmentStatus::Active);
}

#[rstest]
#[tokio::test]
async fn change_status_rejects_reopening_completed(world: World) {
    let completed = existing(&world, AssignmentStatus::Completed);
    let id = completed.id();
    let mut mocks = Mocks::default();
    mocks
        .assignments
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(completed)));
    mocks.assignments.expect_update().never();

    let err = mocks
        .into_service()
        .change_status(id, AssignmentStatus::Active)
        .await
        .expect_err("terminal");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn delete_resyncs_former_team(world: World) {
    let team = vec![world.lead.id(), world.member.id()];
    let expected = team.clone();
    let mut mocks = Mocks::default();
    mocks
        .assignments
        .expect_delete()
        .return_once(move |_| Ok(Some(team)));
    mocks
        .sync
        .expect_sync_users()
        .withf(move |users| users == expected.as_slice())
        .times(1)
        .return_once(|_| Ok(StatusSyncOutcome::default()));

    mocks
        .into_service()
        .delete_assignment(AssignmentId::random())
        .await
        .expect("deleted");
}

#[rstest]
#[tokio::test]
async fn delete_reports_missing_assignment() {
    let mut mocks = Mocks::default();
    mocks.assignments.expect_delete().return_once(|_| Ok(None));
    mocks.sync.expect_sync_users().never();

    let err = mocks
        .into_service()
        .delete_assignment(AssignmentId::random())
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn list_rejects_inverted_range() {
    let err = Mocks::default()
        .into_service()
        .list_assignments(AssignmentFilter {
            from: Some(date(12)),
            to: Some(date(10)),
            ..AssignmentFilter::default()
        })
        .await
        .expect_err("inverted");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}
