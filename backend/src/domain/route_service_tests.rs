//! Tests for the route service.

use std::sync::Arc;

use chrono::NaiveDate;
use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockAssignmentRepository, MockDirectionsProvider, MockGeocoder, MockLocationRepository,
};
use crate::domain::{
    AssignmentDraft, AssignmentKind, AssignmentStatus, ErrorCode, LocalityId, RouteLeg,
    StoreDraft, StoreId, UserId,
};

fn coords(lat: f64, lng: f64) -> Coordinates {
    Coordinates::new(lat, lng).expect("valid coordinates")
}

#[fixture]
fn depot() -> Coordinates {
    coords(44.5086, 25.9817)
}

#[derive(Default)]
struct Mocks {
    geocoder: MockGeocoder,
    directions: MockDirectionsProvider,
    assignments: MockAssignmentRepository,
    locations: MockLocationRepository,
}

impl Mocks {
    fn into_service(
        self,
        depot: Coordinates,
    ) -> RouteService<MockAssignmentRepository, MockLocationRepository> {
        RouteService::new(
            Arc::new(self.geocoder),
            Arc::new(self.directions),
            Arc::new(self.assignments),
            Arc::new(self.locations),
            depot,
        )
    }
}

fn locality(coordinates: Option<Coordinates>) -> Locality {
    Locality::new(LocalityId::random(), "Buftea", "Ilfov", coordinates).expect("valid locality")
}

fn assignment_to(locality: &Locality, store_id: Option<StoreId>) -> Assignment {
    Assignment::new(AssignmentDraft {
        id: AssignmentId::random(),
        kind: AssignmentKind::Inspection,
        locality_id: locality.id(),
        store_id,
        team_lead_id: UserId::random(),
        member_ids: Vec::new(),
        status: AssignmentStatus::Planned,
        start_date: NaiveDate::from_ymd_opt(2025, 7, 1).expect("date"),
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

#[rstest]
fn destination_query_includes_store_address() {
    let town = locality(None);
    let store = Store::new(StoreDraft {
        id: StoreId::random(),
        code: "S-9".into(),
        name: "Buftea Centru".into(),
        address: Some("Str. Studioului 5".into()),
        locality_id: town.id(),
        coordinates: None,
    })
    .expect("store");
    assert_eq!(
        destination_query(&town, Some(&store)),
        "Str. Studioului 5, Buftea, Ilfov, Romania"
    );
    assert_eq!(destination_query(&town, None), "Buftea, Ilfov, Romania");
}

#[rstest]
#[tokio::test]
async fn estimate_defaults_origin_to_depot(depot: Coordinates) {
    let target = coords(44.57, 25.95);
    let mut mocks = Mocks::default();
    mocks
        .geocoder
        .expect_geocode()
        .with(eq("Buftea, Ilfov"))
        .times(1)
        .return_once(move |_| Ok(target));
    mocks
        .directions
        .expect_directions()
        .with(eq(depot), eq(target))
        .return_once(|_, _| {
            Ok(RouteLeg {
                distance_meters: 12_340.0,
                duration_seconds: 930.0,
            })
        });

    let response = mocks
        .into_service(depot)
        .estimate_route(None, "  Buftea, Ilfov ".into())
        .await
        .expect("estimate");
    assert_eq!(response.origin, depot);
    assert!((response.estimate.one_way_km - 12.3).abs() < 1e-9);
    assert!((response.estimate.round_trip_km - 24.6).abs() < 1e-9);
    assert_eq!(response.estimate.one_way_minutes, 16);
}

#[rstest]
#[case(RouteProviderError::unavailable("timeout"), ErrorCode::ServiceUnavailable)]
#[case(RouteProviderError::no_match("ZERO_RESULTS"), ErrorCode::NotFound)]
#[case(RouteProviderError::rejected("REQUEST_DENIED"), ErrorCode::InternalError)]
#[case(RouteProviderError::decode("expected value at line 1"), ErrorCode::InternalError)]
#[tokio::test]
async fn provider_errors_map_to_domain_codes(
    depot: Coordinates,
    #[case] failure: RouteProviderError,
    #[case] expected: ErrorCode,
) {
    let mut mocks = Mocks::default();
    mocks
        .geocoder
        .expect_geocode()
        .return_once(move |_| Err(failure));
    let err = mocks
        .into_service(depot)
        .estimate_route(None, "Nowhere".into())
        .await
        .expect_err("provider failure");
    assert_eq!(err.code(), expected);
}

#[rstest]
#[tokio::test]
async fn recalculation_uses_locality_coordinates_without_geocoding(depot: Coordinates) {
    let target = coords(44.57, 25.95);
    let town = locality(Some(target));
    let assignment = assignment_to(&town, None);
    let id = assignment.id();

    let mut mocks = Mocks::default();
    mocks
        .assignments
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(assignment)));
    mocks
        .locations
        .expect_find_locality()
        .return_once(move |_| Ok(Some(town)));
    mocks.geocoder.expect_geocode().never();
    mocks
        .directions
        .expect_directions()
        .with(eq(depot), eq(target))
        .return_once(|_, _| {
            Ok(RouteLeg {
                distance_meters: 20_000.0,
                duration_seconds: 1_500.0,
            })
        });
    mocks
        .assignments
        .expect_update()
        .withf(|a| a.distance_km() == Some(40.0) && a.travel_minutes() == Some(25))
        .times(1)
        .return_once(|_| Ok(true));

    let updated = mocks
        .into_service(depot)
        .recalculate_assignment_route(id)
        .await
        .expect("recalculated");
    assert_eq!(updated.distance_km(), Some(40.0));
}

#[rstest]
#[tokio::test]
async fn recalculation_geocodes_when_no_coordinates_are_stored(depot: Coordinates) {
    let town = locality(None);
    let assignment = assignment_to(&town, None);
    let id = assignment.id();
    let target = coords(44.57, 25.95);

    let mut mocks = Mocks::default();
    mocks
        .assignments
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(assignment)));
    mocks
        .locations
        .expect_find_locality()
        .return_once(move |_| Ok(Some(town)));
    mocks
        .geocoder
        .expect_geocode()
        .with(eq("Buftea, Ilfov, Romania"))
        .times(1)
        .return_once(move |_| Ok(target));
    mocks.directions.expect_directions().return_once(|_, _| {
        Ok(RouteLeg {
            distance_meters: 1_000.0,
            duration_seconds: 60.0,
        })
    });
    mocks.assignments.expect_update().return_once(|_| Ok(true));

    mocks
        .into_service(depot)
        .recalculate_assignment_route(id)
        .await
        .expect("recalculated");
}
