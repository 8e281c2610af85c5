//! Tests for team member handlers.

use actix_web::http::StatusCode;
use actix_web::{test, web};
use mockall::predicate::eq;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::*;
use crate::inbound::http::test_utils::{MockPorts, error_detail, test_app};

fn api() -> actix_web::Scope {
    web::scope("/api/v1")
        .service(list_users)
        .service(create_user)
        .service(get_user)
        .service(update_user)
        .service(set_user_status)
        .service(delete_user)
}

#[fixture]
fn ion() -> User {
    User::new(
        UserId::random(),
        FullName::new("Ion Popescu").expect("name"),
        UserRole::Technician,
        Some(PhoneNumber::new("+40 722 123 456").expect("phone")),
        UserStatus::Available,
    )
}

#[rstest]
#[actix_web::test]
async fn list_passes_status_filter_and_returns_camel_case(ion: User) {
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_list_users()
        .with(eq(Some(UserStatus::OnLeave)))
        .return_once(move |_| Ok(vec![ion]));
    let app = test::init_service(test_app(ports, api())).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/users?status=on_leave")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body[0]["fullName"], "Ion Popescu");
    assert_eq!(body[0]["role"], "technician");
    assert!(body[0].get("full_name").is_none());
}

#[rstest]
#[actix_web::test]
async fn list_rejects_unknown_status() {
    let app = test::init_service(test_app(MockPorts::default(), api())).await;
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/users?status=sleeping")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(error_detail(&body, "field"), Some(&json!("status")));
    assert_eq!(error_detail(&body, "value"), Some(&json!("sleeping")));
}

#[rstest]
#[actix_web::test]
async fn create_returns_201_with_validated_fields(ion: User) {
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_create_user()
        .withf(|request| {
            request.full_name.as_ref() == "Ion Popescu"
                && request.role == UserRole::Technician
                && request.phone.is_none()
        })
        .return_once(move |_| Ok(ion));
    let app = test::init_service(test_app(ports, api())).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(json!({ "fullName": "  Ion Popescu ", "role": "technician" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[rstest]
#[case(json!({ "fullName": "I", "role": "driver" }), "fullName")]
#[case(json!({ "fullName": "Ion Popescu", "role": "pilot" }), "role")]
#[case(json!({ "fullName": "Ion Popescu", "role": "driver", "phone": "call me" }), "phone")]
#[actix_web::test]
async fn create_reports_the_invalid_field(#[case] body: Value, #[case] field: &str) {
    let app = test::init_service(test_app(MockPorts::default(), api())).await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(body)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(error_detail(&body, "field"), Some(&json!(field)));
}

#[rstest]
#[actix_web::test]
async fn malformed_json_is_a_domain_error() {
    let app = test::init_service(test_app(MockPorts::default(), api())).await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/users")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"fullName\":")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(error_detail(&body, "code"), Some(&json!("invalid_body")));
}

#[rstest]
#[actix_web::test]
async fn patch_with_null_phone_clears_it(ion: User) {
    let id = ion.id();
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_update_user()
        .withf(move |user_id, patch| {
            *user_id == id && patch.phone == Some(None) && patch.full_name.is_none()
        })
        .return_once(move |_, _| Ok(ion));
    let app = test::init_service(test_app(ports, api())).await;

    let res = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/users/{id}"))
            .set_json(json!({ "phone": null }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn set_status_forwards_manual_override(ion: User) {
    let id = ion.id();
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_set_user_status()
        .with(eq(id), eq(UserStatus::OnLeave))
        .return_once(move |_, status| Ok(ion.with_status(status)));
    let app = test::init_service(test_app(ports, api())).await;

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/users/{id}/status"))
            .set_json(json!({ "status": "on_leave" }))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "on_leave");
}

#[rstest]
#[actix_web::test]
async fn invalid_path_id_is_rejected() {
    let app = test::init_service(test_app(MockPorts::default(), api())).await;
    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/users/42").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(error_detail(&body, "code"), Some(&json!("invalid_uuid")));
}

#[rstest]
#[actix_web::test]
async fn delete_conflict_maps_to_409() {
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_delete_user()
        .return_once(|_| Err(Error::conflict("user leads an active assignment")));
    let app = test::init_service(test_app(ports, api())).await;

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/users/{}", UserId::random()))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[rstest]
#[actix_web::test]
async fn delete_returns_204() {
    let mut ports = MockPorts::default();
    ports.users.expect_delete_user().return_once(|_| Ok(()));
    let app = test::init_service(test_app(ports, api())).await;

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/users/{}", UserId::random()))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}
