//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use rollcall_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

async fn app() -> Router {
  let store = SqliteStore::open_in_memory().await.unwrap();
  api_router(Arc::new(store))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

async fn create_class(app: &Router, grade: &str, name: &str) -> String {
  let (status, class) = send(
    app,
    "POST",
    "/classes",
    Some(json!({ "grade": grade, "name": name })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  class["class_id"].as_str().unwrap().to_owned()
}

async fn create_student(app: &Router, body: Value) -> Value {
  let (status, created) = send(app, "POST", "/students", Some(body)).await;
  assert_eq!(status, StatusCode::CREATED, "{created}");
  created
}

// ─── Students ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_fetch_student() {
  let app = app().await;
  let class_id = create_class(&app, "middle", "1").await;

  let created = create_student(&app, json!({ "name": "  Kim ", "class_id": class_id })).await;
  assert_eq!(created["student"]["name"], "Kim");
  assert_eq!(created["notices"], json!([]));
  let id = created["student"]["student_id"].as_str().unwrap();

  let (status, fetched) = send(&app, "GET", &format!("/students/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(fetched["class_id"], class_id.as_str());
  assert_eq!(fetched["warnings"], json!([]));
}

#[tokio::test]
async fn empty_name_is_rejected() {
  let app = app().await;
  let (status, body) = send(&app, "POST", "/students", Some(json!({ "name": "   " }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn same_name_requires_confirmation() {
  let app = app().await;
  let class_id = create_class(&app, "high", "2").await;
  let first = create_student(&app, json!({ "name": "Lee", "class_id": class_id })).await;
  let first_id = first["student"]["student_id"].as_str().unwrap().to_owned();

  let (status, body) = send(&app, "POST", "/students", Some(json!({ "name": "Lee" }))).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["existing"]["student_id"], first_id.as_str());

  // Nothing changed.
  let (_, students) = send(&app, "GET", "/students", None).await;
  assert_eq!(students.as_array().unwrap().len(), 1);
  assert_eq!(students[0]["name"], "Lee");

  let created = create_student(&app, json!({ "name": "Lee", "confirm_same_name": true })).await;
  assert_eq!(created["student"]["name"], "LeeB");
  assert_eq!(created["rename"]["new_name"], "LeeA");
  assert_eq!(created["notices"][0]["kind"], "renamed");
  assert_eq!(created["notices"][0]["class_label"], "High 2");

  let (_, renamed) = send(&app, "GET", &format!("/students/{first_id}"), None).await;
  assert_eq!(renamed["name"], "LeeA");
}

#[tokio::test]
async fn list_students_by_tag() {
  let app = app().await;
  create_student(
    &app,
    json!({ "name": "Ahn", "tags": ["new-friend"], "reference_date": "2024-03-03" }),
  )
  .await;
  create_student(&app, json!({ "name": "Bae", "tags": ["special-group"] })).await;

  let (status, list) = send(&app, "GET", "/students?tag=new-friend", None).await;
  assert_eq!(status, StatusCode::OK);
  let list = list.as_array().unwrap();
  assert_eq!(list.len(), 1);
  assert_eq!(list[0]["name"], "Ahn");
  assert_eq!(list[0]["first_visit_date"], "2024-03-03");
}

#[tokio::test]
async fn deactivate_then_delete() {
  let app = app().await;
  let created = create_student(&app, json!({ "name": "Yoo" })).await;
  let id = created["student"]["student_id"].as_str().unwrap();

  let (status, t) = send(&app, "POST", &format!("/students/{id}/deactivate"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(t["student"]["is_active"], false);
  assert_eq!(t["changed"], json!({ "is_active": false }));

  let (_, active) = send(&app, "GET", "/students", None).await;
  assert!(active.as_array().unwrap().is_empty());

  let (status, _) = send(&app, "DELETE", &format!("/students/{id}"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = send(&app, "GET", &format!("/students/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Roster transitions ──────────────────────────────────────────────────────

#[tokio::test]
async fn new_friend_lifecycle_through_rosters() {
  let app = app().await;
  let class_id = create_class(&app, "middle", "2").await;
  let created = create_student(&app, json!({ "name": "Song" })).await;
  let id = created["student"]["student_id"].as_str().unwrap();

  let (status, tagged) = send(
    &app,
    "POST",
    &format!("/students/{id}/new-friend"),
    Some(json!({ "date": "2024-05-05" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(tagged["hides_history"], false);

  let (_, before) = send(&app, "GET", "/new-friends?date=2024-05-04", None).await;
  assert!(before["students"].as_array().unwrap().is_empty());
  let (_, during) = send(&app, "GET", "/new-friends?date=2024-05-12", None).await;
  assert_eq!(during["students"].as_array().unwrap().len(), 1);

  let (status, _) = send(
    &app,
    "POST",
    &format!("/students/{id}/assign"),
    Some(json!({ "class_id": class_id, "date": "2024-05-19" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let roster = |date: &str| format!("/classes/{class_id}/roster?date={date}");
  let (_, early) = send(&app, "GET", &roster("2024-05-12"), None).await;
  assert!(early["students"].as_array().unwrap().is_empty());
  let (_, late) = send(&app, "GET", &roster("2024-05-19"), None).await;
  assert_eq!(late["students"][0]["name"], "Song");

  // Past new-friend rosters keep the student after graduation.
  let (_, past) = send(&app, "GET", "/new-friends?date=2024-05-12", None).await;
  assert_eq!(past["students"].as_array().unwrap().len(), 1);
  let (_, now) = send(&app, "GET", "/new-friends?date=2024-05-19", None).await;
  assert!(now["students"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn assigning_before_first_visit_is_unprocessable() {
  let app = app().await;
  let class_id = create_class(&app, "high", "1").await;
  let created = create_student(
    &app,
    json!({ "name": "Noh", "tags": ["new-friend"], "reference_date": "2024-06-09" }),
  )
  .await;
  let id = created["student"]["student_id"].as_str().unwrap();

  let (status, _) = send(
    &app,
    "POST",
    &format!("/students/{id}/assign"),
    Some(json!({ "class_id": class_id, "date": "2024-06-02" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn assign_to_missing_class_is_not_found() {
  let app = app().await;
  let created = create_student(&app, json!({ "name": "Heo" })).await;
  let id = created["student"]["student_id"].as_str().unwrap();

  let (status, _) = send(
    &app,
    "POST",
    &format!("/students/{id}/assign"),
    Some(json!({ "class_id": uuid::Uuid::new_v4() })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tags_can_be_added_and_removed() {
  let app = app().await;
  let created = create_student(&app, json!({ "name": "Gu" })).await;
  let id = created["student"]["student_id"].as_str().unwrap();

  let (status, t) = send(&app, "PUT", &format!("/students/{id}/tags/special-group"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(t["student"]["tags"], json!(["special-group"]));

  let (status, t) =
    send(&app, "DELETE", &format!("/students/{id}/tags/special-group"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(t["student"]["tags"], json!([]));
}

// ─── Logs and reports ────────────────────────────────────────────────────────

#[tokio::test]
async fn attendance_creates_log_and_feeds_snapshot() {
  let app = app().await;
  let class_id = create_class(&app, "middle", "1").await;
  let kim = create_student(&app, json!({ "name": "Kim", "class_id": class_id })).await;
  create_student(&app, json!({ "name": "Park", "class_id": class_id })).await;
  let kim_id = kim["student"]["student_id"].as_str().unwrap();

  let (status, _) = send(&app, "GET", "/logs/2024-07-07/snapshot", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, row) = send(
    &app,
    "PUT",
    &format!("/logs/2024-07-07/attendance/{kim_id}"),
    Some(json!({ "status": "present" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(row["status"], "present");

  let (status, _) = send(
    &app,
    "PUT",
    "/logs/2024-07-07/offerings",
    Some(json!({ "kind": "tithe", "amount": 30000 })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, snap) = send(&app, "GET", "/logs/2024-07-07/snapshot", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(snap["middle"][0]["label"], "Middle 1");
  assert_eq!(snap["middle"][0]["registered"], 2);
  assert_eq!(snap["middle"][0]["attending"], json!(["Kim"]));
  assert_eq!(snap["total"], json!({ "registered": 2, "attended": 1 }));
  assert_eq!(snap["offering_total"], 30000);
}

#[tokio::test]
async fn log_details_upsert_by_date() {
  let app = app().await;
  let (status, first) = send(
    &app,
    "PUT",
    "/logs/2024-08-04",
    Some(json!({ "preacher": "Rev. Ha", "coupon_recipient_count": 10, "coupons_per_person": 3 })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (_, second) = send(
    &app,
    "PUT",
    "/logs/2024-08-04",
    Some(json!({ "sermon_title": "Hope" })),
  )
  .await;
  assert_eq!(first["log_id"], second["log_id"]);
  assert_eq!(second["preacher"], "");

  let (_, logs) = send(&app, "GET", "/logs?from=2024-08-01&to=2024-08-31", None).await;
  assert_eq!(logs.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn staff_marks_show_in_snapshot_by_role() {
  let app = app().await;
  let (_, teacher) = send(
    &app,
    "POST",
    "/teachers",
    Some(json!({ "name": "Ms. Oh", "role": "teacher" })),
  )
  .await;
  let (_, staff) = send(
    &app,
    "POST",
    "/teachers",
    Some(json!({ "name": "Mr. Jin", "role": "staff" })),
  )
  .await;

  for t in [&teacher, &staff] {
    let id = t["teacher_id"].as_str().unwrap();
    let (status, _) = send(&app, "PUT", &format!("/logs/2024-09-01/staff/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
  }

  let (_, snap) = send(&app, "GET", "/logs/2024-09-01/snapshot", None).await;
  assert_eq!(snap["teachers"], json!(["Ms. Oh"]));
  assert_eq!(snap["staff"], json!(["Mr. Jin"]));

  let id = staff["teacher_id"].as_str().unwrap();
  let (status, t) = send(
    &app,
    "PUT",
    &format!("/teachers/{id}"),
    Some(json!({ "is_active": false })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(t["is_active"], false);
  let (_, active) = send(&app, "GET", "/teachers", None).await;
  assert_eq!(active.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn stats_over_a_range() {
  let app = app().await;
  let a = create_student(&app, json!({ "name": "Cha" })).await;
  create_student(&app, json!({ "name": "Do" })).await;
  let a_id = a["student"]["student_id"].as_str().unwrap();

  for date in ["2024-10-06", "2024-10-13"] {
    send(
      &app,
      "PUT",
      &format!("/logs/{date}/attendance/{a_id}"),
      Some(json!({ "status": "online" })),
    )
    .await;
  }

  let (status, stats) = send(&app, "GET", "/stats", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(stats[0]["name"], "Cha");
  assert_eq!(stats[0]["present"], 2);
  assert_eq!(stats[0]["is_perfect"], true);
  assert_eq!(stats[1]["present"], 0);

  let (status, report) = send(
    &app,
    "GET",
    &format!("/stats/{a_id}?from=2024-10-10"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(report["services"], 1);
  assert_eq!(report["history"][0]["status"], "online");
}
