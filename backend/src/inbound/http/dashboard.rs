//! Dashboard handlers.

use actix_web::{get, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{DashboardStats, StatusCount};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_optional_field};
use crate::inbound::http::work_logs::{PeriodQuery, UserHoursResponse};

const LIMIT: FieldName = FieldName::new("limit");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCountResponse {
    #[schema(example = "available")]
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatsResponse {
    /// One entry per user status, zero counts included.
    pub users: Vec<StatusCountResponse>,
    /// One entry per assignment status, zero counts included.
    pub assignments: Vec<StatusCountResponse>,
    /// First day of the current month in the configured timezone.
    pub month_start: NaiveDate,
    pub hours_this_month: f64,
}

impl From<DashboardStats> for DashboardStatsResponse {
    fn from(stats: DashboardStats) -> Self {
        let users = stats
            .users
            .into_iter()
            .map(|StatusCount { status, count }| StatusCountResponse {
                status: status.as_str().to_owned(),
                count,
            })
            .collect();
        let assignments = stats
            .assignments
            .into_iter()
            .map(|StatusCount { status, count }| StatusCountResponse {
                status: status.as_str().to_owned(),
                count,
            })
            .collect();
        Self {
            users,
            assignments,
            month_start: stats.month_start,
            hours_this_month: stats.hours_this_month,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TopWorkersQuery {
    /// Inclusive `YYYY-MM-DD` start.
    pub from: Option<String>,
    /// Inclusive `YYYY-MM-DD` end.
    pub to: Option<String>,
    /// Defaults to 5, clamped to 1..=50.
    pub limit: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/stats",
    responses(
        (status = 200, description = "Counts and hours for the current month", body = DashboardStatsResponse),
        (status = 503, description = "Database unavailable", body = ErrorSchema)
    ),
    tags = ["dashboard"],
    operation_id = "dashboardStats"
)]
#[get("/dashboard/stats")]
pub async fn dashboard_stats(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<DashboardStatsResponse>> {
    let stats = state.dashboard.stats().await?;
    Ok(web::Json(stats.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/top-workers",
    params(TopWorkersQuery),
    responses(
        (status = 200, description = "Users ranked by hours", body = [UserHoursResponse]),
        (status = 400, description = "Invalid period or limit", body = ErrorSchema)
    ),
    tags = ["dashboard"],
    operation_id = "topWorkers"
)]
#[get("/dashboard/top-workers")]
pub async fn top_workers(
    state: web::Data<HttpState>,
    query: web::Query<TopWorkersQuery>,
) -> ApiResult<web::Json<Vec<UserHoursResponse>>> {
    let TopWorkersQuery { from, to, limit } = query.into_inner();
    let (from, to) = PeriodQuery { from, to }.parse()?;
    let limit = parse_optional_field::<u32>(limit.as_deref(), LIMIT)?;
    let rows = state.dashboard.top_workers(from, to, limit).await?;
    Ok(web::Json(rows.into_iter().map(UserHoursResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AssignmentStatus, Error, UserHours, UserId, UserStatus};
    use crate::inbound::http::test_utils::{MockPorts, error_detail, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use mockall::predicate::eq;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn api() -> actix_web::Scope {
        web::scope("/api/v1")
            .service(dashboard_stats)
            .service(top_workers)
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).expect("date")
    }

    #[rstest]
    #[actix_web::test]
    async fn stats_use_wire_status_names() {
        let mut ports = MockPorts::default();
        ports.dashboard.expect_stats().return_once(|| {
            Ok(DashboardStats {
                users: vec![StatusCount {
                    status: UserStatus::OnAssignment,
                    count: 4,
                }],
                assignments: vec![StatusCount {
                    status: AssignmentStatus::Active,
                    count: 2,
                }],
                month_start: date(4, 1),
                hours_this_month: 96.5,
            })
        });
        let app = test::init_service(test_app(ports, api())).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/dashboard/stats")
                .to_request(),
        )
        .await;
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["users"][0], json!({ "status": "on_assignment", "count": 4 }));
        assert_eq!(body["assignments"][0]["status"], "active");
        assert_eq!(body["monthStart"], "2025-04-01");
        assert_eq!(body["hoursThisMonth"], 96.5);
    }

    #[rstest]
    #[case("", None)]
    #[case("&limit=3", Some(3))]
    #[actix_web::test]
    async fn top_workers_forward_limit(#[case] extra: &str, #[case] limit: Option<u32>) {
        let mut ports = MockPorts::default();
        ports
            .dashboard
            .expect_top_workers()
            .with(eq(date(4, 1)), eq(date(4, 30)), eq(limit))
            .return_once(|_, _, _| {
                Ok(vec![UserHours {
                    user_id: UserId::random(),
                    full_name: "Dan Rusu".into(),
                    total_hours: 12.0,
                    entries: 2,
                }])
            });
        let app = test::init_service(test_app(ports, api())).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!(
                    "/api/v1/dashboard/top-workers?from=2025-04-01&to=2025-04-30{extra}"
                ))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body[0]["fullName"], "Dan Rusu");
    }

    #[rstest]
    #[actix_web::test]
    async fn top_workers_reject_non_numeric_limit() {
        let app = test::init_service(test_app(MockPorts::default(), api())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/dashboard/top-workers?from=2025-04-01&to=2025-04-30&limit=many")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(error_detail(&body, "field"), Some(&json!("limit")));
    }

    #[rstest]
    #[actix_web::test]
    async fn inverted_period_is_rejected_by_service() {
        let mut ports = MockPorts::default();
        ports
            .dashboard
            .expect_top_workers()
            .return_once(|_, _, _| Err(Error::invalid_request("from must not be after to")));
        let app = test::init_service(test_app(ports, api())).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/dashboard/top-workers?from=2025-04-30&to=2025-04-01")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
