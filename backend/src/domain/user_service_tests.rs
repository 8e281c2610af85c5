//! Tests for the user service.

use std::sync::Arc;

use mockall::predicate::eq;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::MockUserRepository;
use crate::domain::{ErrorCode, FullName, UserRole};

#[fixture]
fn technician() -> User {
    User::new(
        UserId::random(),
        FullName::new("Ion Popescu").expect("valid name"),
        UserRole::Technician,
        None,
        UserStatus::Available,
    )
}

fn make_service(repo: MockUserRepository) -> UserService<MockUserRepository> {
    UserService::new(Arc::new(repo))
}

#[rstest]
#[tokio::test]
async fn create_user_starts_available() {
    let mut repo = MockUserRepository::new();
    repo.expect_insert()
        .withf(|user| user.status() == UserStatus::Available)
        .times(1)
        .return_once(|_| Ok(()));

    let user = make_service(repo)
        .create_user(NewUser {
            full_name: FullName::new("Maria Ionescu").expect("valid name"),
            role: UserRole::Driver,
            phone: None,
        })
        .await
        .expect("user created");

    assert_eq!(user.full_name().as_ref(), "Maria Ionescu");
    assert_eq!(user.role(), UserRole::Driver);
}

#[rstest]
#[tokio::test]
async fn get_user_reports_missing_user(technician: User) {
    let id = technician.id();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .with(eq(id))
        .return_once(|_| Ok(None));

    let err = make_service(repo).get_user(id).await.expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn set_status_persists_override(technician: User) {
    let id = technician.id();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .return_once(move |_| Ok(Some(technician)));
    repo.expect_update()
        .withf(|user| user.status() == UserStatus::OnLeave)
        .times(1)
        .return_once(|_| Ok(true));

    let user = make_service(repo)
        .set_user_status(id, UserStatus::OnLeave)
        .await
        .expect("status set");
    assert_eq!(user.status(), UserStatus::OnLeave);
}

#[rstest]
#[tokio::test]
async fn update_applies_patch(technician: User) {
    let id = technician.id();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .return_once(move |_| Ok(Some(technician)));
    repo.expect_update().return_once(|_| Ok(true));

    let user = make_service(repo)
        .update_user(
            id,
            UserPatch {
                role: Some(UserRole::TeamLead),
                ..UserPatch::default()
            },
        )
        .await
        .expect("updated");
    assert_eq!(user.role(), UserRole::TeamLead);
    assert_eq!(user.full_name().as_ref(), "Ion Popescu");
}

#[rstest]
#[tokio::test]
async fn delete_is_refused_while_on_open_assignment(technician: User) {
    let mut repo = MockUserRepository::new();
    repo.expect_has_open_assignments().return_once(|_| Ok(true));
    repo.expect_delete_with_history().never();

    let err = make_service(repo)
        .delete_user(technician.id())
        .await
        .expect_err("conflict");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn delete_removes_idle_user(technician: User) {
    let mut repo = MockUserRepository::new();
    repo.expect_has_open_assignments().return_once(|_| Ok(false));
    repo.expect_delete_with_history()
        .times(1)
        .return_once(|_| Ok(true));

    make_service(repo)
        .delete_user(technician.id())
        .await
        .expect("deleted");
}

#[rstest]
#[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(UserPersistenceError::query("syntax"), ErrorCode::InternalError)]
#[case(UserPersistenceError::referenced("assignments"), ErrorCode::Conflict)]
#[tokio::test]
async fn repository_errors_map_to_domain_codes(
    #[case] failure: UserPersistenceError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_list().return_once(move |_| Err(failure));

    let err = make_service(repo)
        .list_users(None)
        .await
        .expect_err("repository failure");
    assert_eq!(err.code(), expected);
}
