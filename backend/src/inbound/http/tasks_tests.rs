//! Tests for task HTTP handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use chrono::TimeZone;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::TaskPage;
use crate::domain::{AchievementType, ErrorCode, UserId};
use crate::inbound::http::test_utils::{MockPorts, error_field, json_body, sign_in, test_app};

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 4, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn sample_task(user_id: &UserId, priority: TaskPriority) -> Task {
    let content = TaskContent::new(TaskContentDraft {
        title: "Write report".to_owned(),
        description: None,
        due_date: Some(at(17)),
        priority,
        category: None,
    })
    .expect("valid content");
    Task::create(Uuid::new_v4(), user_id.clone(), content, at(9))
}

fn detail_code(error: &Error) -> Option<&str> {
    error
        .details()
        .and_then(|details| details.get("code"))
        .and_then(Value::as_str)
}

fn detail_field(error: &Error) -> Option<&str> {
    error
        .details()
        .and_then(|details| details.get("field"))
        .and_then(Value::as_str)
}

#[rstest]
#[case(CreateTaskPayload { priority: Some("High".into()), ..Default::default() }, "title")]
#[case(CreateTaskPayload { title: Some("Plan".into()), ..Default::default() }, "priority")]
fn create_requires_title_and_priority(#[case] payload: CreateTaskPayload, #[case] field: &str) {
    let error = parse_create_payload(payload).expect_err("missing field");
    assert_eq!(detail_field(&error), Some(field));
    assert_eq!(detail_code(&error), Some("missing_field"));
}

#[rstest]
fn create_rejects_unknown_priority() {
    let error = parse_create_payload(CreateTaskPayload {
        title: Some("Plan".into()),
        priority: Some("Critical".into()),
        ..Default::default()
    })
    .expect_err("unknown priority");
    assert_eq!(detail_code(&error), Some("invalid_enum"));
}

#[rstest]
fn create_rejects_non_rfc3339_due_dates() {
    let error = parse_create_payload(CreateTaskPayload {
        title: Some("Plan".into()),
        priority: Some("low".into()),
        due_date: Some("next friday".into()),
        ..Default::default()
    })
    .expect_err("bad timestamp");
    assert_eq!(detail_field(&error), Some("dueDate"));
}

#[rstest]
fn create_caps_category_ids() {
    let ids = (0..11).map(|_| Uuid::new_v4().to_string()).collect();
    let error = parse_create_payload(CreateTaskPayload {
        title: Some("Plan".into()),
        priority: Some("Medium".into()),
        category_ids: Some(ids),
        ..Default::default()
    })
    .expect_err("too many categories");
    assert_eq!(detail_field(&error), Some("categoryIds"));
}

#[rstest]
fn create_trims_the_title() {
    let (content, tags) = parse_create_payload(CreateTaskPayload {
        title: Some("  Plan sprint ".into()),
        priority: Some("urgent".into()),
        ..Default::default()
    })
    .expect("valid payload");
    assert_eq!(content.title.as_str(), "Plan sprint");
    assert_eq!(content.priority, TaskPriority::Urgent);
    assert_eq!(tags, TagAssignment::default());
}

#[rstest]
fn update_distinguishes_null_from_absent() {
    let payload: UpdateTaskPayload =
        serde_json::from_value(json!({"description": null, "priority": "Low"}))
            .expect("valid json");
    let (edit, _) = parse_update_payload(payload).expect("valid edit");
    assert_eq!(edit.description, Some(None));
    assert_eq!(edit.due_date, None);
    assert_eq!(edit.category, None);
    assert_eq!(edit.priority, Some(TaskPriority::Low));
}

#[rstest]
fn update_clears_due_dates_with_null() {
    let payload: UpdateTaskPayload =
        serde_json::from_value(json!({"dueDate": null})).expect("valid json");
    let (edit, _) = parse_update_payload(payload).expect("valid edit");
    assert_eq!(edit.due_date, Some(None));
}

#[rstest]
fn list_params_parse_filters() {
    let query = parse_list_params(TaskListParams {
        status: Some("open".into()),
        priority: Some("High,Urgent".into()),
        categories: Some("Work, Home".into()),
        page: Some(2),
        limit: Some(10),
        ..Default::default()
    })
    .expect("valid params");
    assert_eq!(query.status, Some(TaskStatus::Open));
    assert_eq!(query.priorities, vec![TaskPriority::High, TaskPriority::Urgent]);
    assert_eq!(query.categories, vec!["Work".to_owned(), "Home".to_owned()]);
    assert!(query.labels.is_empty());
    assert_eq!((query.page.page(), query.page.limit()), (2, 10));
}

#[rstest]
#[case(TaskListParams { limit: Some(20), ..Default::default() }, "limit")]
#[case(TaskListParams { page: Some(0), ..Default::default() }, "page")]
#[case(TaskListParams { status: Some("done".into()), ..Default::default() }, "status")]
#[case(TaskListParams { priority: Some("High,Huge".into()), ..Default::default() }, "priority")]
fn list_params_reject_bad_values(#[case] params: TaskListParams, #[case] field: &str) {
    let error = parse_list_params(params).expect_err("invalid params");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(detail_field(&error), Some(field));
}

#[rstest]
#[actix_web::test]
async fn tasks_require_a_session() {
    let app = actix_test::init_service(test_app(MockPorts::default())).await;
    let request = actix_test::TestRequest::get().uri("/api/v1/tasks").to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn create_returns_the_stored_task() {
    let user_id = UserId::random();
    let mut ports = MockPorts::default();
    ports
        .tasks
        .expect_create()
        .withf(|request| request.content.priority == TaskPriority::High)
        .times(1)
        .returning(|request| {
            Ok(Task::create(
                Uuid::new_v4(),
                request.user_id,
                request.content,
                at(9),
            ))
        });
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = sign_in(&app, &user_id).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/tasks")
        .cookie(cookie)
        .set_json(json!({"title": "Ship release", "priority": "High"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body.get("xpValue").and_then(Value::as_i64), Some(50));
    assert_eq!(body.get("status").and_then(Value::as_str), Some("open"));
    assert_eq!(body.get("priority").and_then(Value::as_str), Some("High"));
}

#[rstest]
#[actix_web::test]
async fn list_returns_the_pagination_envelope() {
    let user_id = UserId::random();
    let tasks = vec![
        sample_task(&user_id, TaskPriority::Urgent),
        sample_task(&user_id, TaskPriority::Low),
    ];
    let mut ports = MockPorts::default();
    ports
        .tasks_query
        .expect_list()
        .times(1)
        .returning(move |_, query| {
            assert_eq!(query.page.limit(), 10);
            Ok(TaskPage {
                tasks: tasks.clone(),
                total: 12,
            })
        });
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = sign_in(&app, &user_id).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/tasks?status=open&limit=10")
        .cookie(cookie)
        .to_request();
    let body = json_body(actix_test::call_service(&app, request).await).await;

    assert_eq!(body.get("data").and_then(Value::as_array).map(Vec::len), Some(2));
    assert_eq!(body.pointer("/pagination/total").and_then(Value::as_u64), Some(12));
    assert_eq!(
        body.pointer("/pagination/totalPages").and_then(Value::as_u64),
        Some(2)
    );
    let next = body
        .pointer("/links/next")
        .and_then(Value::as_str)
        .expect("next link");
    assert!(next.contains("status=open"));
    assert!(next.contains("page=2"));
}

#[rstest]
#[actix_web::test]
async fn completion_reports_xp_and_unlocks() {
    let user_id = UserId::random();
    let task = sample_task(&user_id, TaskPriority::Medium);
    let task_id = task.id();
    let mut ports = MockPorts::default();
    ports.tasks.expect_complete().returning(move |_, _| {
        let mut completed = task.clone();
        completed.complete(at(12)).expect("open task completes");
        Ok(CompleteTaskResponse {
            task: completed,
            xp_awarded: 25,
            new_total_xp: 25,
            new_level: 1,
            leveled_up: false,
            new_achievements: vec![Achievement {
                id: Uuid::new_v4(),
                name: "First Steps".to_owned(),
                description: "Complete your first task".to_owned(),
                achievement_type: AchievementType::TaskMilestone,
                requirement_value: Some(1),
            }],
        })
    });
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = sign_in(&app, &user_id).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/tasks/{task_id}/complete"))
        .cookie(cookie)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(body.get("xpAwarded").and_then(Value::as_i64), Some(25));
    assert_eq!(body.get("leveledUp").and_then(Value::as_bool), Some(false));
    assert_eq!(
        body.pointer("/task/status").and_then(Value::as_str),
        Some("completed")
    );
    assert_eq!(
        body.pointer("/newAchievements/0/achievementType")
            .and_then(Value::as_str),
        Some("task_milestone")
    );
}

#[rstest]
#[actix_web::test]
async fn repeated_completion_is_a_conflict() {
    let user_id = UserId::random();
    let mut ports = MockPorts::default();
    ports
        .tasks
        .expect_complete()
        .returning(|_, _| Err(Error::conflict("task is already completed")));
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = sign_in(&app, &user_id).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/tasks/{}/complete", Uuid::new_v4()))
        .cookie(cookie)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[rstest]
#[actix_web::test]
async fn malformed_task_ids_are_rejected() {
    let user_id = UserId::random();
    let mut ports = MockPorts::default();
    ports.tasks_query.expect_get().times(0);
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = sign_in(&app, &user_id).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/tasks/not-a-uuid")
        .cookie(cookie)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_field(&json_body(response).await), Some("id"));
}

#[rstest]
#[actix_web::test]
async fn deleting_returns_no_content() {
    let user_id = UserId::random();
    let mut ports = MockPorts::default();
    ports.tasks.expect_delete().times(1).returning(|_, _| Ok(()));
    let app = actix_test::init_service(test_app(ports)).await;
    let cookie = sign_in(&app, &user_id).await;

    let request = actix_test::TestRequest::delete()
        .uri(&format!("/api/v1/tasks/{}", Uuid::new_v4()))
        .cookie(cookie)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
