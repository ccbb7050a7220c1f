//! Router tests driven with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Method, Request, StatusCode},
};
use cadence_core::{
  directory::EmployeeRegistry,
  employee::{Employee, NewEmployee, Role},
  engine::ReviewEngine,
  event::TracingNotifier,
};
use cadence_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::{ACTOR_HEADER, api_router};

type Engine = ReviewEngine<SqliteStore, SqliteStore, TracingNotifier>;

struct Fixture {
  engine:  Arc<Engine>,
  store:   SqliteStore,
  admin:   Employee,
  manager: Employee,
  report:  Employee,
}

async fn fixture() -> Fixture {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let engine = Arc::new(ReviewEngine::new(store.clone(), store.clone(), TracingNotifier));
  let admin = engine
    .bootstrap_admin("Admin".into(), "admin@example.com".into())
    .await
    .unwrap();
  let manager = store
    .insert_employee(NewEmployee {
      name:       "Morgan".into(),
      email:      "morgan@example.com".into(),
      role:       Role::Manager,
      manager_id: None,
    })
    .await
    .unwrap();
  let report = store
    .insert_employee(NewEmployee {
      name:       "Riley".into(),
      email:      "riley@example.com".into(),
      role:       Role::Employee,
      manager_id: Some(manager.employee_id),
    })
    .await
    .unwrap();
  Fixture { engine, store, admin, manager, report }
}

async fn call(
  f: &Fixture,
  method: Method,
  uri: &str,
  actor: Option<Uuid>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(actor) = actor {
    builder = builder.header(ACTOR_HEADER, actor.to_string());
  }
  let req = match body {
    Some(body) => builder
      .header("content-type", "application/json")
      .body(Body::from(body.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let resp = api_router(f.engine.clone()).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

fn quarter() -> Value {
  json!({ "name": "2026 Q1", "start_date": "2026-01-01", "end_date": "2026-03-31" })
}

/// Create and activate a cycle; returns its id and the report's assessment id.
async fn active_cycle(f: &Fixture) -> (String, String) {
  let admin = Some(f.admin.employee_id);
  let (status, cycle) = call(f, Method::POST, "/cycles", admin, Some(quarter())).await;
  assert_eq!(status, StatusCode::CREATED);
  let cycle_id = cycle["cycle_id"].as_str().unwrap().to_owned();

  let (status, _) =
    call(f, Method::POST, &format!("/cycles/{cycle_id}/activate"), admin, None).await;
  assert_eq!(status, StatusCode::OK);

  let (_, mine) = call(
    f,
    Method::GET,
    &format!("/cycles/{cycle_id}/assessments"),
    Some(f.report.employee_id),
    None,
  )
  .await;
  let assessment_id = mine[0]["assessment_id"].as_str().unwrap().to_owned();
  (cycle_id, assessment_id)
}

// ─── Identity ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_actor_header_is_unauthorized() {
  let f = fixture().await;
  let (status, body) = call(&f, Method::GET, "/cycles", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(body["kind"], "unauthenticated");
}

#[tokio::test]
async fn unknown_actor_is_unauthorized() {
  let f = fixture().await;
  let (status, _) = call(&f, Method::GET, "/cycles", Some(Uuid::new_v4()), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deactivated_actor_is_forbidden() {
  let f = fixture().await;
  let uri = format!("/employees/{}/deactivate", f.report.employee_id);
  let (status, _) = call(&f, Method::POST, &uri, Some(f.admin.employee_id), None).await;
  assert_eq!(status, StatusCode::OK);

  let (status, body) =
    call(&f, Method::GET, "/cycles", Some(f.report.employee_id), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["reason"], "inactive_actor");
}

// ─── Cycles ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn only_admins_create_cycles() {
  let f = fixture().await;
  let (status, body) =
    call(&f, Method::POST, "/cycles", Some(f.manager.employee_id), Some(quarter())).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["kind"], "permission_denied");
  assert_eq!(body["reason"], "admin_only");
}

#[tokio::test]
async fn invalid_cycle_dates_are_unprocessable() {
  let f = fixture().await;
  let body = json!({ "name": "Backwards", "start_date": "2026-03-31", "end_date": "2026-01-01" });
  let (status, body) =
    call(&f, Method::POST, "/cycles", Some(f.admin.employee_id), Some(body)).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["fields"], json!(["end_date"]));
}

#[tokio::test]
async fn activation_is_idempotent_over_http() {
  let f = fixture().await;
  let admin = Some(f.admin.employee_id);
  let (_, cycle) = call(&f, Method::POST, "/cycles", admin, Some(quarter())).await;
  let uri = format!("/cycles/{}/activate", cycle["cycle_id"].as_str().unwrap());

  let (status, first) = call(&f, Method::POST, &uri, admin, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(first["assessments_created"], 3);
  assert_eq!(first["assessments_total"], 3);

  let (_, second) = call(&f, Method::POST, &uri, admin, None).await;
  assert_eq!(second["assessments_created"], 0);
  assert_eq!(second["assessments_total"], 3);

  let (_, active) = call(&f, Method::GET, "/cycles?status=active", admin, None).await;
  assert_eq!(active.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn closing_reports_unacknowledged_count() {
  let f = fixture().await;
  let (cycle_id, _) = active_cycle(&f).await;
  let (status, closure) = call(
    &f,
    Method::POST,
    &format!("/cycles/{cycle_id}/close"),
    Some(f.admin.employee_id),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(closure["cycle"]["status"], "closed");
  assert_eq!(closure["unacknowledged"], 3);
}

// ─── Assessments ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn review_flow_end_to_end() {
  let f = fixture().await;
  let (_, id) = active_cycle(&f).await;
  let report = Some(f.report.employee_id);
  let manager = Some(f.manager.employee_id);

  let (status, view) =
    call(&f, Method::POST, &format!("/assessments/{id}/start"), report, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["stage"], "in_progress");

  let partial = json!({ "strengths": "Calm under pressure" });
  let (status, body) = call(
    &f,
    Method::POST,
    &format!("/assessments/{id}/submit"),
    report,
    Some(partial),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["fields"], json!(["improvements"]));

  let full = json!({ "strengths": "Calm under pressure", "improvements": "Delegate more" });
  let (status, view) =
    call(&f, Method::POST, &format!("/assessments/{id}/submit"), report, Some(full)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["stage"], "employee_complete");

  let review = json!({ "feedback": "Strong quarter", "development_plan": "Lead a migration" });
  let (status, view) = call(
    &f,
    Method::POST,
    &format!("/assessments/{id}/manager-review"),
    manager,
    Some(review),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["stage"], "manager_complete");

  let (status, view) =
    call(&f, Method::POST, &format!("/assessments/{id}/acknowledge"), report, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["stage"], "acknowledged");
  assert_eq!(view["manager_content"]["feedback"], "Strong quarter");
}

#[tokio::test]
async fn premature_manager_review_conflicts() {
  let f = fixture().await;
  let (_, id) = active_cycle(&f).await;
  let review = json!({ "feedback": "Early", "development_plan": "Wait" });
  let (status, body) = call(
    &f,
    Method::POST,
    &format!("/assessments/{id}/manager-review"),
    Some(f.manager.employee_id),
    Some(review),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["kind"], "precondition_failed");
  assert_eq!(body["rule"], "self_assessment_incomplete");
}

#[tokio::test]
async fn unknown_assessment_is_not_found() {
  let f = fixture().await;
  let uri = format!("/assessments/{}", Uuid::new_v4());
  let (status, _) = call(&f, Method::GET, &uri, Some(f.admin.employee_id), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn override_is_audited() {
  let f = fixture().await;
  let (_, id) = active_cycle(&f).await;
  let admin = Some(f.admin.employee_id);

  let body = json!({ "target": "employee_complete", "reason": "paper form" });
  let (status, view) =
    call(&f, Method::POST, &format!("/assessments/{id}/override"), admin, Some(body)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["stage"], "employee_complete");

  let (status, trail) =
    call(&f, Method::GET, &format!("/assessments/{id}/audit"), admin, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(trail[0]["from_stage"], "not_started");
  assert_eq!(trail[0]["reason"], "paper form");

  let (status, _) = call(
    &f,
    Method::GET,
    &format!("/assessments/{id}/audit"),
    Some(f.report.employee_id),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}

// ─── Employees ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn admin_manages_employees() {
  let f = fixture().await;
  let admin = Some(f.admin.employee_id);
  let body = json!({
    "name": "Dana",
    "email": "dana@example.com",
    "role": "employee",
    "manager_id": f.manager.employee_id,
  });
  let (status, dana) = call(&f, Method::POST, "/employees", admin, Some(body)).await;
  assert_eq!(status, StatusCode::CREATED);
  let dana_id = dana["employee_id"].as_str().unwrap().to_owned();

  let (status, updated) = call(
    &f,
    Method::PATCH,
    &format!("/employees/{dana_id}"),
    admin,
    Some(json!({ "role": "manager" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["role"], "manager");

  let (_, all) = call(&f, Method::GET, "/employees", admin, None).await;
  assert_eq!(all.as_array().unwrap().len(), 4);
  assert_eq!(f.store.list_employees(false).await.unwrap().len(), 4);
}

#[tokio::test]
async fn manager_with_reports_cannot_be_deactivated_over_http() {
  let f = fixture().await;
  let (status, body) = call(
    &f,
    Method::POST,
    &format!("/employees/{}/deactivate", f.manager.employee_id),
    Some(f.admin.employee_id),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["kind"], "invalid_state");
}
