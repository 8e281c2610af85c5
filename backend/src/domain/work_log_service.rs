//! Work log service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use tracing::info;

use crate::domain::assignment_service::{assignment_not_found, map_assignment_repository_error};
use crate::domain::ports::{
    AssignmentRepository, NewWorkLog, WorkLogFilter, WorkLogPersistenceError, WorkLogRepository,
    WorkLogs,
};
use crate::domain::{Error, UserHours, WorkLog, WorkLogId, rank_user_hours};

pub(crate) fn map_work_log_repository_error(error: WorkLogPersistenceError) -> Error {
    match error {
        WorkLogPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("work log repository unavailable: {message}"))
        }
        WorkLogPersistenceError::Query { message } => {
            Error::internal(format!("work log repository error: {message}"))
        }
    }
}

pub(crate) fn check_range(from: NaiveDate, to: NaiveDate) -> Result<(), Error> {
    if to < from {
        return Err(Error::invalid_request("`to` must not be before `from`")
            .with_details(json!({ "from": from, "to": to })));
    }
    Ok(())
}

/// Service implementing [`WorkLogs`].
#[derive(Clone)]
pub struct WorkLogService<W, A> {
    work_log_repo: Arc<W>,
    assignment_repo: Arc<A>,
}

impl<W, A> WorkLogService<W, A> {
    pub fn new(work_log_repo: Arc<W>, assignment_repo: Arc<A>) -> Self {
        Self {
            work_log_repo,
            assignment_repo,
        }
    }
}

#[async_trait]
impl<W, A> WorkLogs for WorkLogService<W, A>
where
    W: WorkLogRepository,
    A: AssignmentRepository,
{
    async fn log_hours(&self, request: NewWorkLog) -> Result<WorkLog, Error> {
        let assignment = self
            .assignment_repo
            .find_by_id(&request.assignment_id)
            .await
            .map_err(map_assignment_repository_error)?
            .ok_or_else(|| assignment_not_found(request.assignment_id))?;
        if !assignment.involves(request.user_id) {
            return Err(Error::invalid_request(format!(
                "user {} is not on assignment {}",
                request.user_id, request.assignment_id
            ))
            .with_details(json!({ "field": "userId", "code": "not_on_assignment" })));
        }

        let log = WorkLog {
            id: WorkLogId::random(),
            user_id: request.user_id,
            assignment_id: request.assignment_id,
            work_date: request.work_date,
            hours: request.hours,
            description: request
                .description
                .map(|text| text.trim().to_owned())
                .filter(|text| !text.is_empty()),
        };
        self.work_log_repo
            .insert(&log)
            .await
            .map_err(map_work_log_repository_error)?;
        info!(
            work_log_id = %log.id,
            user_id = %log.user_id,
            assignment_id = %log.assignment_id,
            hours = log.hours.get(),
            "hours logged"
        );
        Ok(log)
    }

    async fn list_work_logs(&self, filter: WorkLogFilter) -> Result<Vec<WorkLog>, Error> {
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            check_range(from, to)?;
        }
        self.work_log_repo
            .list(&filter)
            .await
            .map_err(map_work_log_repository_error)
    }

    async fn delete_work_log(&self, id: WorkLogId) -> Result<(), Error> {
        let deleted = self
            .work_log_repo
            .delete(&id)
            .await
            .map_err(map_work_log_repository_error)?;
        if !deleted {
            return Err(Error::not_found(format!("work log {id} not found")));
        }
        Ok(())
    }

    async fn hours_by_user(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<UserHours>, Error> {
        check_range(from, to)?;
        let mut rows = self
            .work_log_repo
            .hours_by_user(from, to)
            .await
            .map_err(map_work_log_repository_error)?;
        rank_user_hours(&mut rows);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockAssignmentRepository, MockWorkLogRepository};
    use crate::domain::{
        Assignment, AssignmentDraft, AssignmentId, AssignmentKind, AssignmentStatus, ErrorCode,
        Hours, LocalityId, UserId,
    };
    use rstest::{fixture, rstest};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, day).expect("valid date")
    }

    #[fixture]
    fn assignment() -> Assignment {
        Assignment::new(AssignmentDraft {
            id: AssignmentId::random(),
            kind: AssignmentKind::Delivery,
            locality_id: LocalityId::random(),
            store_id: None,
            team_lead_id: UserId::random(),
            member_ids: vec![UserId::random()],
            status: AssignmentStatus::Active,
            start_date: date(1),
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

    fn request(assignment: &Assignment, user_id: UserId) -> NewWorkLog {
        NewWorkLog {
            user_id,
            assignment_id: assignment.id(),
            work_date: date(1),
            hours: Hours::new(7.5).expect("valid hours"),
            description: Some("  wiring  ".into()),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn member_can_log_hours(assignment: Assignment) {
        let member = assignment.member_ids()[0];
        let req = request(&assignment, member);
        let mut assignments = MockAssignmentRepository::new();
        assignments
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(assignment)));
        let mut logs = MockWorkLogRepository::new();
        logs.expect_insert().times(1).return_once(|_| Ok(()));

        let log = WorkLogService::new(Arc::new(logs), Arc::new(assignments))
            .log_hours(req)
            .await
            .expect("logged");
        assert_eq!(log.user_id, member);
        assert_eq!(log.description.as_deref(), Some("wiring"));
    }

    #[rstest]
    #[tokio::test]
    async fn outsider_cannot_log_hours(assignment: Assignment) {
        let req = request(&assignment, UserId::random());
        let mut assignments = MockAssignmentRepository::new();
        assignments
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(assignment)));
        let mut logs = MockWorkLogRepository::new();
        logs.expect_insert().never();

        let err = WorkLogService::new(Arc::new(logs), Arc::new(assignments))
            .log_hours(req)
            .await
            .expect_err("outsider");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_missing_log_is_not_found() {
        let mut logs = MockWorkLogRepository::new();
        logs.expect_delete().return_once(|_| Ok(false));
        let err = WorkLogService::new(Arc::new(logs), Arc::new(MockAssignmentRepository::new()))
            .delete_work_log(WorkLogId::random())
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn hours_by_user_are_ranked() {
        let mut logs = MockWorkLogRepository::new();
        logs.expect_hours_by_user().return_once(|_, _| {
            Ok(vec![
                UserHours {
                    user_id: UserId::random(),
                    full_name: "Ana".into(),
                    total_hours: 4.0,
                    entries: 1,
                },
                UserHours {
                    user_id: UserId::random(),
                    full_name: "Dan".into(),
                    total_hours: 16.0,
                    entries: 2,
                },
            ])
        });
        let rows = WorkLogService::new(Arc::new(logs), Arc::new(MockAssignmentRepository::new()))
            .hours_by_user(date(1), date(31))
            .await
            .expect("totals");
        assert_eq!(rows[0].full_name, "Dan");
    }
}
