use std::{env, path::PathBuf, sync::Arc};

use platform_api::{ApiClient, Role};
use platform_authn::{LoginFailure, LoginOutcome, SESSION_KEY, SessionStore};
use platform_storage::{FileStorage, Storage};
use serde_json::json;
use suite_tests::{ADMIN_PASSWORD, ADMIN_USERNAME, StubApi, StubState, sample_employees};
use uuid::Uuid;

fn scratch_dir() -> PathBuf {
    env::temp_dir().join(format!("peoplepulse-session-{}", Uuid::new_v4()))
}

fn store(api: &StubApi, dir: &PathBuf) -> (SessionStore, Arc<dyn Storage>) {
    let client = ApiClient::new(&api.base_url()).unwrap();
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(dir));
    (SessionStore::new(client, storage.clone()), storage)
}

#[tokio::test]
async fn login_persists_and_survives_a_restart() {
    let api = StubApi::spawn(StubState::default().with_employees(sample_employees())).await;
    let dir = scratch_dir();

    let (session, storage) = store(&api, &dir);
    session.restore();
    assert!(!session.snapshot().is_authenticated());

    let outcome = session.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let LoginOutcome::Success(identity) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(identity.role, Role::Admin);
    assert_eq!(identity.employee.name, "Alex Admin");
    assert_eq!(identity.employee.department.as_deref(), Some("Operations"));
    assert!(storage.get_item(SESSION_KEY).unwrap().is_some());

    let (restarted, _) = store(&api, &dir);
    restarted.restore();
    let snapshot = restarted.snapshot();
    assert!(!snapshot.loading);
    assert_eq!(snapshot.identity, Some(identity));

    restarted.logout();
    assert_eq!(storage.get_item(SESSION_KEY).unwrap(), None);
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn wrong_password_is_rejected_with_server_message() {
    let api = StubApi::spawn(StubState::default()).await;
    let dir = scratch_dir();
    let (session, storage) = store(&api, &dir);
    session.restore();

    let outcome = session.login("alice", "wrong").await;
    assert_eq!(
        outcome,
        LoginOutcome::Failure {
            kind: LoginFailure::Rejected,
            error: "Invalid credentials".into(),
        }
    );
    assert!(!session.snapshot().is_authenticated());
    assert_eq!(storage.get_item(SESSION_KEY).unwrap(), None);
}

#[tokio::test]
async fn profile_falls_back_to_the_account_without_an_employee_record() {
    let api = StubApi::spawn(StubState::default()).await;
    let dir = scratch_dir();
    let (session, _) = store(&api, &dir);

    let outcome = session.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
    let LoginOutcome::Success(identity) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(identity.employee.id, 1);
    assert_eq!(identity.employee.name, ADMIN_USERNAME);
    assert_eq!(identity.employee.designation.as_deref(), Some("Administrator"));
    assert_eq!(
        api.state.requests(),
        ["POST /api/auth/login", "GET /api/employees/1"]
    );
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn tampered_session_file_is_discarded() {
    let api = StubApi::spawn(StubState::default()).await;
    let dir = scratch_dir();
    let (session, storage) = store(&api, &dir);
    storage
        .set_item(SESSION_KEY, &json!({"username": "ghost"}).to_string())
        .unwrap();

    session.restore();
    assert!(!session.snapshot().is_authenticated());
    assert_eq!(storage.get_item(SESSION_KEY).unwrap(), None);
    let _ = std::fs::remove_dir_all(&dir);
}
