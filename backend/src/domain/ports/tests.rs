use super::*;
use chrono::NaiveDate;
use rstest::{fixture, rstest};

use crate::domain::{
    Assignment, AssignmentDraft, AssignmentId, AssignmentKind, AssignmentStatus, LocalityId,
    UserId,
};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, day).expect("valid date")
}

struct Team {
    lead: UserId,
    member: UserId,
}

#[fixture]
fn team() -> Team {
    Team {
        lead: UserId::random(),
        member: UserId::random(),
    }
}

fn assignment(team: &Team, start: u32, end: Option<u32>) -> Assignment {
    Assignment::new(AssignmentDraft {
        id: AssignmentId::random(),
        kind: AssignmentKind::Maintenance,
        locality_id: LocalityId::random(),
        store_id: None,
        team_lead_id: team.lead,
        member_ids: vec![team.member],
        status: AssignmentStatus::Active,
        start_date: date(start),
        end_date: end.map(date),
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
#[case(Some(1), Some(10), true)]
#[case(Some(12), Some(20), true)]
#[case(Some(16), None, false)]
#[case(None, Some(9), false)]
#[case(None, None, true)]
fn date_filter_selects_overlapping_spans(
    team: Team,
    #[case] from: Option<u32>,
    #[case] to: Option<u32>,
    #[case] expected: bool,
) {
    let span = assignment(&team, 10, Some(15));
    let filter = AssignmentFilter {
        from: from.map(date),
        to: to.map(date),
        ..AssignmentFilter::default()
    };
    assert_eq!(filter.matches(&span), expected);
}

#[rstest]
fn open_ended_assignment_covers_only_its_start_day(team: Team) {
    let single_day = assignment(&team, 10, None);
    let filter = AssignmentFilter {
        from: Some(date(11)),
        ..AssignmentFilter::default()
    };
    assert!(!filter.matches(&single_day));
}

#[rstest]
fn user_filter_matches_lead_and_members(team: Team) {
    let trip = assignment(&team, 10, None);
    for user in [team.lead, team.member] {
        let filter = AssignmentFilter {
            user_id: Some(user),
            ..AssignmentFilter::default()
        };
        assert!(filter.matches(&trip));
    }
    let outsider = AssignmentFilter {
        user_id: Some(UserId::random()),
        ..AssignmentFilter::default()
    };
    assert!(!outsider.matches(&trip));
}

#[rstest]
fn port_error_constructors_accept_str() {
    let err = UserPersistenceError::referenced("assignments.team_lead_id");
    assert_eq!(
        err.to_string(),
        "user is still referenced: assignments.team_lead_id"
    );
    let err = RouteProviderError::no_match("Chitila");
    assert_eq!(err.to_string(), "route provider found no result: Chitila");
}
