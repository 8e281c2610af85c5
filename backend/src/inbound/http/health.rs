//! Liveness and readiness checks for orchestrators and load balancers.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;

/// Health state shared by all workers.
///
/// The server starts live but not ready; `main` flips readiness once
/// migrations ran and the listener is bound, and clears liveness when a
/// shutdown signal arrives so traffic drains before the process exits.
#[derive(Debug)]
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn mark_draining(&self) {
        self.ready.store(false, Ordering::Release);
        self.live.store(false, Ordering::Release);
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

fn health_check(ok: bool, up: &'static str, down: &'static str) -> HttpResponse {
    let mut builder = if ok {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    builder
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(HealthBody {
            status: if ok { up } else { down },
        })
}

/// Readiness check: 200 once the database is migrated and the server accepts
/// traffic, 503 otherwise.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is starting or draining")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    health_check(state.is_ready(), "ready", "starting")
}

/// Liveness check: 200 while the process runs, 503 once it is draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    health_check(state.is_live(), "live", "draining")
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::Value;

    async fn call(state: web::Data<HealthState>, uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(App::new().app_data(state).service(ready).service(live)).await;
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = res.status();
        assert_eq!(
            res.headers().get(header::CACHE_CONTROL).map(|v| v.as_bytes()),
            Some(&b"no-store"[..])
        );
        (status, test::read_body_json(res).await)
    }

    #[rstest]
    #[actix_web::test]
    async fn not_ready_until_marked() {
        let state = web::Data::new(HealthState::new());
        let (status, body) = call(state.clone(), "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "starting");

        state.mark_ready();
        let (status, body) = call(state, "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }

    #[rstest]
    #[actix_web::test]
    async fn draining_fails_both_checks() {
        let state = web::Data::new(HealthState::new());
        state.mark_ready();
        state.mark_draining();
        let (ready_status, _) = call(state.clone(), "/health/ready").await;
        let (live_status, body) = call(state, "/health/live").await;
        assert_eq!(ready_status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(live_status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "draining");
    }
}
