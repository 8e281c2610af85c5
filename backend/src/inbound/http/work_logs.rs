//! Work hour handlers.

use actix_web::{HttpResponse, delete, get, post, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{NewWorkLog, WorkLogFilter};
use crate::domain::{Error, Hours, UserHours, WorkLog, WorkLogId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, missing_field_error, parse_date, parse_id,
    parse_optional_date, parse_optional_id,
};

const ASSIGNMENT_ID: FieldName = FieldName::new("assignmentId");
const FROM: FieldName = FieldName::new("from");
const HOURS: FieldName = FieldName::new("hours");
const TO: FieldName = FieldName::new("to");
const USER_ID: FieldName = FieldName::new("userId");
const WORK_DATE: FieldName = FieldName::new("workDate");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkLogResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub assignment_id: Uuid,
    pub work_date: NaiveDate,
    #[schema(example = 7.5)]
    pub hours: f64,
    pub description: Option<String>,
}

impl From<WorkLog> for WorkLogResponse {
    fn from(log: WorkLog) -> Self {
        Self {
            id: *log.id.as_uuid(),
            user_id: *log.user_id.as_uuid(),
            assignment_id: *log.assignment_id.as_uuid(),
            work_date: log.work_date,
            hours: log.hours.get(),
            description: log.description,
        }
    }
}

/// Hours logged by one user over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserHoursResponse {
    pub user_id: Uuid,
    pub full_name: String,
    pub total_hours: f64,
    /// Number of work log entries summed.
    pub entries: i64,
}

impl From<UserHours> for UserHoursResponse {
    fn from(row: UserHours) -> Self {
        Self {
            user_id: *row.user_id.as_uuid(),
            full_name: row.full_name,
            total_hours: row.total_hours,
            entries: row.entries,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListWorkLogsQuery {
    pub user_id: Option<String>,
    pub assignment_id: Option<String>,
    /// Inclusive `YYYY-MM-DD` lower bound on the work date.
    pub from: Option<String>,
    /// Inclusive `YYYY-MM-DD` upper bound on the work date.
    pub to: Option<String>,
}

impl TryFrom<&ListWorkLogsQuery> for WorkLogFilter {
    type Error = Error;

    fn try_from(query: &ListWorkLogsQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: parse_optional_id(query.user_id.as_deref(), USER_ID)?,
            assignment_id: parse_optional_id(query.assignment_id.as_deref(), ASSIGNMENT_ID)?,
            from: parse_optional_date(query.from.as_deref(), FROM)?,
            to: parse_optional_date(query.to.as_deref(), TO)?,
        })
    }
}

/// Required `[from, to]` period.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PeriodQuery {
    /// Inclusive `YYYY-MM-DD` start.
    pub from: Option<String>,
    /// Inclusive `YYYY-MM-DD` end.
    pub to: Option<String>,
}

impl PeriodQuery {
    pub(crate) fn parse(&self) -> Result<(NaiveDate, NaiveDate), Error> {
        let from = self
            .from
            .as_deref()
            .ok_or_else(|| missing_field_error(FROM))
            .and_then(|raw| parse_date(raw, FROM))?;
        let to = self
            .to
            .as_deref()
            .ok_or_else(|| missing_field_error(TO))
            .and_then(|raw| parse_date(raw, TO))?;
        Ok((from, to))
    }
}

/// Body for `POST /api/v1/work-logs`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkLogRequest {
    pub user_id: String,
    pub assignment_id: String,
    #[schema(example = "2025-03-10")]
    pub work_date: String,
    /// Greater than 0 and at most 24.
    #[schema(example = 8.0)]
    pub hours: f64,
    pub description: Option<String>,
}

impl TryFrom<CreateWorkLogRequest> for NewWorkLog {
    type Error = Error;

    fn try_from(value: CreateWorkLogRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: parse_id(&value.user_id, USER_ID)?,
            assignment_id: parse_id(&value.assignment_id, ASSIGNMENT_ID)?,
            work_date: parse_date(&value.work_date, WORK_DATE)?,
            hours: Hours::new(value.hours).map_err(|err| invalid_field_error(HOURS, err))?,
            description: value.description,
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/work-logs",
    params(ListWorkLogsQuery),
    responses(
        (status = 200, description = "Work logs, newest first", body = [WorkLogResponse]),
        (status = 400, description = "Invalid filter", body = ErrorSchema)
    ),
    tags = ["work-logs"],
    operation_id = "listWorkLogs"
)]
#[get("/work-logs")]
pub async fn list_work_logs(
    state: web::Data<HttpState>,
    query: web::Query<ListWorkLogsQuery>,
) -> ApiResult<web::Json<Vec<WorkLogResponse>>> {
    let filter = WorkLogFilter::try_from(&*query)?;
    let logs = state.work_logs.list_work_logs(filter).await?;
    Ok(web::Json(logs.into_iter().map(WorkLogResponse::from).collect()))
}

/// Log hours; the user must lead or belong to the assignment.
#[utoipa::path(
    post,
    path = "/api/v1/work-logs",
    request_body = CreateWorkLogRequest,
    responses(
        (status = 201, description = "Logged", body = WorkLogResponse),
        (status = 400, description = "Invalid request or user not on the team", body = ErrorSchema),
        (status = 404, description = "User or assignment missing", body = ErrorSchema)
    ),
    tags = ["work-logs"],
    operation_id = "logHours"
)]
#[post("/work-logs")]
pub async fn log_hours(
    state: web::Data<HttpState>,
    payload: web::Json<CreateWorkLogRequest>,
) -> ApiResult<HttpResponse> {
    let request = NewWorkLog::try_from(payload.into_inner())?;
    let log = state.work_logs.log_hours(request).await?;
    Ok(HttpResponse::Created().json(WorkLogResponse::from(log)))
}

/// Per-user totals over a period, most hours first.
#[utoipa::path(
    get,
    path = "/api/v1/work-logs/hours-by-user",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Totals per user", body = [UserHoursResponse]),
        (status = 400, description = "Missing or inverted period", body = ErrorSchema)
    ),
    tags = ["work-logs"],
    operation_id = "hoursByUser"
)]
#[get("/work-logs/hours-by-user")]
pub async fn hours_by_user(
    state: web::Data<HttpState>,
    query: web::Query<PeriodQuery>,
) -> ApiResult<web::Json<Vec<UserHoursResponse>>> {
    let (from, to) = query.parse()?;
    let rows = state.work_logs.hours_by_user(from, to).await?;
    Ok(web::Json(rows.into_iter().map(UserHoursResponse::from).collect()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/work-logs/{id}",
    params(("id" = Uuid, Path, description = "Work log identifier")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["work-logs"],
    operation_id = "deleteWorkLog"
)]
#[delete("/work-logs/{id}")]
pub async fn delete_work_log(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: WorkLogId = parse_id(&path, FieldName::new("id"))?;
    state.work_logs.delete_work_log(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AssignmentId, UserId};
    use crate::inbound::http::test_utils::{MockPorts, error_detail, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use mockall::predicate::eq;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn api() -> actix_web::Scope {
        web::scope("/api/v1")
            .service(list_work_logs)
            .service(log_hours)
            .service(hours_by_user)
            .service(delete_work_log)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).expect("date")
    }

    #[rstest]
    #[actix_web::test]
    async fn log_hours_returns_created_entry() {
        let user = UserId::random();
        let assignment = AssignmentId::random();
        let mut ports = MockPorts::default();
        ports
            .work_logs
            .expect_log_hours()
            .withf(move |request| {
                request.user_id == user
                    && request.assignment_id == assignment
                    && request.work_date == date(10)
                    && request.hours.get() > 7.0
            })
            .return_once(|request| {
                Ok(WorkLog {
                    id: WorkLogId::random(),
                    user_id: request.user_id,
                    assignment_id: request.assignment_id,
                    work_date: request.work_date,
                    hours: request.hours,
                    description: request.description,
                })
            });
        let app = test::init_service(test_app(ports, api())).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/work-logs")
                .set_json(json!({
                    "userId": user.to_string(),
                    "assignmentId": assignment.to_string(),
                    "workDate": "2025-03-10",
                    "hours": 7.5,
                    "description": "mounted shelves",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["hours"], 7.5);
        assert_eq!(body["workDate"], "2025-03-10");
    }

    #[rstest]
    #[case(0.0)]
    #[case(24.5)]
    #[actix_web::test]
    async fn log_hours_rejects_out_of_range_hours(#[case] hours: f64) {
        let app = test::init_service(test_app(MockPorts::default(), api())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/work-logs")
                .set_json(json!({
                    "userId": UserId::random().to_string(),
                    "assignmentId": AssignmentId::random().to_string(),
                    "workDate": "2025-03-10",
                    "hours": hours,
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(error_detail(&body, "field"), Some(&json!("hours")));
    }

    #[rstest]
    #[actix_web::test]
    async fn hours_by_user_requires_both_bounds() {
        let app = test::init_service(test_app(MockPorts::default(), api())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/work-logs/hours-by-user?from=2025-03-01")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(error_detail(&body, "field"), Some(&json!("to")));
        assert_eq!(error_detail(&body, "code"), Some(&json!("missing_field")));
    }

    #[rstest]
    #[actix_web::test]
    async fn hours_by_user_serialises_totals() {
        let user = UserId::random();
        let mut ports = MockPorts::default();
        ports
            .work_logs
            .expect_hours_by_user()
            .with(eq(date(1)), eq(date(31)))
            .return_once(move |_, _| {
                Ok(vec![UserHours {
                    user_id: user,
                    full_name: "Maria Ionescu".into(),
                    total_hours: 41.5,
                    entries: 6,
                }])
            });
        let app = test::init_service(test_app(ports, api())).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/work-logs/hours-by-user?from=2025-03-01&to=2025-03-31")
                .to_request(),
        )
        .await;
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body[0]["fullName"], "Maria Ionescu");
        assert_eq!(body[0]["totalHours"], 41.5);
        assert_eq!(body[0]["entries"], 6);
    }

    #[rstest]
    #[actix_web::test]
    async fn list_forwards_filter() {
        let assignment = AssignmentId::random();
        let mut ports = MockPorts::default();
        ports
            .work_logs
            .expect_list_work_logs()
            .with(eq(WorkLogFilter {
                assignment_id: Some(assignment),
                ..WorkLogFilter::default()
            }))
            .return_once(|_| Ok(Vec::new()));
        let app = test::init_service(test_app(ports, api())).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/work-logs?assignmentId={assignment}"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn delete_missing_entry_is_404() {
        let mut ports = MockPorts::default();
        ports
            .work_logs
            .expect_delete_work_log()
            .return_once(|id| Err(Error::not_found(format!("work log {id} not found"))));
        let app = test::init_service(test_app(ports, api())).await;

        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/v1/work-logs/{}", WorkLogId::random()))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
