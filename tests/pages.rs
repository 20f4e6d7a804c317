use std::{sync::Arc, time::Duration};

use axum::http::StatusCode;
use chrono::{NaiveDate, NaiveDateTime};
use peoplepulse::shell::{PageOptions, Shell};
use platform_api::ApiClient;
use platform_authn::{Profile, SessionStore};
use platform_authz::{Resolution, Route};
use platform_storage::MemoryStorage;
use platform_ui::{NotificationCenter, NotificationKind};
use products_hr::{AppContext, ClockError, Dashboard, NewMember, TeamDirectory};
use serde_json::{Value, json};
use suite_tests::{ADMIN_PASSWORD, ADMIN_USERNAME, StubApi, StubState, sample_employees};

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 14)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn context(api: &StubApi) -> AppContext {
    let client = ApiClient::new(&api.base_url()).unwrap();
    let session = SessionStore::new(client.clone(), Arc::new(MemoryStorage::new()));
    session.restore();
    AppContext::new(client, session, NotificationCenter::new(Duration::from_secs(5)))
}

fn admin_profile() -> Profile {
    Profile {
        id: 1,
        name: "Alex Admin".into(),
        designation: Some("Operations Lead".into()),
        department: Some("Operations".into()),
        join_date: None,
    }
}

fn latest_message(ctx: &AppContext) -> (NotificationKind, String) {
    let latest = ctx.notifications.active().into_iter().next().expect("a notification");
    (latest.kind, latest.message)
}

#[tokio::test]
async fn clock_in_then_out_issues_create_then_update() {
    let api = StubApi::spawn(StubState::default().with_employees(sample_employees())).await;
    let ctx = context(&api);
    let mut dashboard = Dashboard::new(Some(admin_profile()));

    dashboard.load(&ctx, at(8, 55)).await;
    assert!(!dashboard.is_offline());
    assert_eq!(dashboard.summary().total_employees, 4);
    assert_eq!(
        latest_message(&ctx),
        (NotificationKind::Info, "Dashboard data loaded successfully".into())
    );

    dashboard.clock_in(&ctx, at(9, 0)).await.unwrap();
    assert_eq!(dashboard.clocked_in_since(), Some(at(9, 0)));
    assert_eq!(dashboard.summary().clocked_in, 1);
    assert_eq!(
        latest_message(&ctx),
        (NotificationKind::Success, "Successfully clocked in!".into())
    );

    dashboard.clock_out(&ctx, at(17, 30)).await.unwrap();
    assert_eq!(dashboard.clocked_in_since(), None);
    assert_eq!(dashboard.summary().clocked_in, 0);
    assert_eq!(
        latest_message(&ctx),
        (NotificationKind::Success, "Successfully clocked out!".into())
    );

    let records = api.state.attendance();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record["employee"]["id"], json!(1));
    assert_eq!(record["clockIn"], json!("2024-03-14T09:00:00"));
    assert_eq!(record["clockOut"], json!("2024-03-14T17:30:00"));
    let id = record["id"].as_i64().unwrap();

    let writes = api
        .state
        .requests()
        .into_iter()
        .filter(|request| !request.starts_with("GET"))
        .collect::<Vec<_>>();
    assert_eq!(
        writes,
        vec!["POST /api/attendance".to_string(), format!("PUT /api/attendance/{id}")]
    );
}

#[tokio::test]
async fn open_shift_from_server_is_picked_up_on_load() {
    let state = StubState::default()
        .with_employees(sample_employees())
        .with_attendance(vec![
            json!({
                "id": 5, "employeeId": 1, "date": "2024-03-14", "clockIn": "2024-03-14T08:45:00"
            }),
            json!({
                "id": 6, "employeeId": 11, "date": "2024-03-14", "clockIn": "2024-03-14T08:30:00"
            }),
        ])
        .with_performance(vec![
            json!({"id": 1, "employeeId": 1, "score": 90.0}),
            json!({"id": 2, "employeeId": 11, "score": 70.0}),
        ]);
    let api = StubApi::spawn(state).await;
    let ctx = context(&api);
    let mut dashboard = Dashboard::new(Some(admin_profile()));

    dashboard.load(&ctx, at(10, 0)).await;
    assert_eq!(dashboard.clocked_in_since(), Some(at(8, 45)));
    let summary = dashboard.summary();
    assert_eq!(summary.attendance_rate, Some(50));
    assert_eq!(summary.performance_rating, Some(8.0));

    let err = dashboard.clock_in(&ctx, at(10, 5)).await.unwrap_err();
    assert!(matches!(err, ClockError::AlreadyClockedIn(since) if since == at(8, 45)));
    assert_eq!(latest_message(&ctx).0, NotificationKind::Warning);
    assert!(!api.state.requests().iter().any(|r| r.starts_with("POST")));
}

#[tokio::test]
async fn failed_load_switches_to_offline_mode() {
    let api = StubApi::spawn(StubState::default().with_employees(sample_employees())).await;
    api.state.set_outage(Some(StatusCode::SERVICE_UNAVAILABLE));
    let ctx = context(&api);
    let mut dashboard = Dashboard::new(Some(admin_profile()));

    dashboard.load(&ctx, at(9, 0)).await;
    assert!(dashboard.is_offline());
    assert_eq!(dashboard.summary().total_employees, 0);
    assert_eq!(
        latest_message(&ctx),
        (
            NotificationKind::Error,
            "Failed to load dashboard data. Using offline mode.".into()
        )
    );
    assert!(dashboard.render().unwrap().contains("offline"));
}

#[tokio::test]
async fn failed_clock_in_reports_generic_error() {
    let api = StubApi::spawn(StubState::default()).await;
    let ctx = context(&api);
    let mut dashboard = Dashboard::new(Some(admin_profile()));
    dashboard.load(&ctx, at(9, 0)).await;

    api.state.set_outage(Some(StatusCode::INTERNAL_SERVER_ERROR));
    let err = dashboard.clock_in(&ctx, at(9, 1)).await.unwrap_err();
    assert!(matches!(err, ClockError::Api(_)));
    assert_eq!(dashboard.clocked_in_since(), None);
    assert_eq!(
        latest_message(&ctx),
        (
            NotificationKind::Error,
            "Failed to update attendance. Please try again.".into()
        )
    );
}

#[tokio::test]
async fn guest_is_sent_to_login_and_unknown_paths_go_home() {
    let api = StubApi::spawn(StubState::default()).await;
    let mut shell = Shell::new(context(&api), false);
    let options = PageOptions::default();

    let rendered = shell.open("/dashboard", &options, at(9, 0)).await;
    assert_eq!(rendered.resolution, Resolution::Redirect(Route::Login));
    assert!(rendered.body.contains("peoplepulse login"));

    let rendered = shell.open("/nowhere", &options, at(9, 0)).await;
    assert_eq!(rendered.resolution, Resolution::Redirect(Route::Home));
    assert!(rendered.body.contains("Not signed in"));

    // Nothing protected was fetched on the guest's behalf.
    assert!(api.state.requests().is_empty());
}

#[tokio::test]
async fn signed_in_user_browses_team_and_hierarchy() {
    let api = StubApi::spawn(StubState::default().with_employees(sample_employees())).await;
    let ctx = context(&api);
    assert!(ctx.session.login(ADMIN_USERNAME, ADMIN_PASSWORD).await.is_success());
    let mut shell = Shell::new(ctx, false);

    let rendered = shell.open("/login", &PageOptions::default(), at(9, 0)).await;
    assert_eq!(rendered.resolution, Resolution::Redirect(Route::Dashboard));
    assert!(rendered.body.contains("Welcome back, Alex Admin"));

    let options = PageOptions {
        search: Some("engineer".into()),
        department: Some("Engineering".into()),
    };
    let rendered = shell.open("/team", &options, at(9, 0)).await;
    assert_eq!(rendered.resolution, Resolution::Render(Route::Team));
    assert!(rendered.body.contains("Team (2 of 4)"));
    assert!(rendered.body.contains("Sarah Johnson"));
    assert!(!rendered.body.contains("Emily Rodriguez"));

    let rendered = shell.open("/hierarchy", &PageOptions::default(), at(9, 0)).await;
    assert!(rendered.body.contains("Sarah Johnson (Engineering Manager) [2 reports]"));
    assert!(rendered.body.contains("└─ James Wilson"));
}

#[tokio::test]
async fn team_page_survives_a_bad_payload() {
    let state = StubState::default().with_employees(vec![Value::String("not an employee".into())]);
    let api = StubApi::spawn(state).await;
    let ctx = context(&api);
    assert!(ctx.session.login(ADMIN_USERNAME, ADMIN_PASSWORD).await.is_success());
    let mut shell = Shell::new(ctx.clone(), false);

    let rendered = shell.open("/team", &PageOptions::default(), at(9, 0)).await;
    assert!(rendered.body.contains("No team members match."));
    assert_eq!(latest_message(&ctx).0, NotificationKind::Error);
}

#[tokio::test]
async fn team_members_are_added_and_removed_on_the_server() {
    let api = StubApi::spawn(StubState::default().with_employees(sample_employees())).await;
    let ctx = context(&api);
    let mut team = TeamDirectory::new();
    team.load(&ctx).await.unwrap();

    let added = team
        .add_member(
            &ctx,
            NewMember {
                name: "  Priya Natarajan ".into(),
                designation: Some("Controller".into()),
                department: Some("Finance".into()),
                email: Some("priya@company.com".into()),
                ..NewMember::default()
            },
        )
        .await
        .unwrap();
    let id = added.id.unwrap();
    assert_eq!(added.name, "Priya Natarajan");
    assert_eq!(team.members().len(), 5);
    assert_eq!(
        latest_message(&ctx),
        (NotificationKind::Success, "Priya Natarajan added to the team".into())
    );
    let stored = api.state.employees();
    let stored = stored.iter().find(|e| e["id"] == json!(id)).unwrap();
    assert_eq!(stored["isActive"], json!(true));
    assert_eq!(stored["department"], json!("Finance"));

    team.remove_member(&ctx, 11).await.unwrap();
    assert!(team.members().iter().all(|m| m.id != Some(11)));
    assert_eq!(
        latest_message(&ctx),
        (NotificationKind::Success, "Team member removed".into())
    );
    assert_eq!(api.state.employees().len(), 4);
    assert!(api.state.requests().contains(&"DELETE /api/employees/11".to_string()));
}

#[tokio::test]
async fn removing_an_unknown_member_keeps_the_list() {
    let api = StubApi::spawn(StubState::default().with_employees(sample_employees())).await;
    let ctx = context(&api);
    let mut team = TeamDirectory::new();
    team.load(&ctx).await.unwrap();

    let err = team.remove_member(&ctx, 77).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(team.members().len(), 4);
    assert_eq!(
        latest_message(&ctx),
        (
            NotificationKind::Error,
            "Failed to remove team member: Employee not found with id: 77".into()
        )
    );
}
