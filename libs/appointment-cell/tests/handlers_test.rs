use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::Form;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::handlers::*;
use appointment_cell::models::AppointmentForm;
use shared_utils::test_utils::{redirect_target, response_json, MockRows, TestConfig, TestIdentity};

async fn mount_doctor_choices(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("role", "eq.doctor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "d1", "name": "Dr. Adams" },
            { "id": "d2", "name": "Dr. Baker" },
        ])))
        .mount(server)
        .await;
}

fn checkup_form() -> AppointmentForm {
    AppointmentForm {
        patient_id: String::new(),
        doctor_id: "d1".to_string(),
        date: "2024-05-10".to_string(),
        time: "09:00".to_string(),
        reason: "Checkup".to_string(),
        status: String::new(),
        notes: String::new(),
    }
}

#[tokio::test]
async fn staff_booking_defaults_to_scheduled_and_stamps_creator() {
    let server = MockServer::start().await;
    mount_doctor_choices(&server).await;

    let staff = TestIdentity::staff();
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({
            "doctor_id": "d1",
            "date": "2024-05-10",
            "time": "09:00",
            "reason": "Checkup",
            "status": "scheduled",
            "created_by": staff.id,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockRows::appointment("a1", "p1", "d1", "scheduled")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response =
        schedule_appointment(State(config), Extension(staff), Form(checkup_form())).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(redirect_target(&response).as_deref(), Some("/appointments"));
}

#[tokio::test]
async fn booking_from_patient_profile_returns_there() {
    let server = MockServer::start().await;
    mount_doctor_choices(&server).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockRows::appointment("a1", "p7", "d1", "scheduled")
        ])))
        .mount(&server)
        .await;

    let mut form = checkup_form();
    form.patient_id = "p7".to_string();

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response =
        schedule_appointment(State(config), Extension(TestIdentity::staff()), Form(form)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(redirect_target(&response).as_deref(), Some("/patients/view/p7"));
}

#[tokio::test]
async fn booking_rejects_doctor_outside_fetched_set() {
    let server = MockServer::start().await;
    mount_doctor_choices(&server).await;
    // No insert may happen for an invalid submission.
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let mut form = checkup_form();
    form.doctor_id = "d9".to_string();

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response =
        schedule_appointment(State(config), Extension(TestIdentity::staff()), Form(form)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    assert!(body["errors"]["doctor_id"].is_array());
}

#[tokio::test]
async fn schedule_form_prefills_patient_context() {
    let server = MockServer::start().await;
    mount_doctor_choices(&server).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", "eq.p7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([MockRows::patient("p7", "Tom Doyle")])),
        )
        .mount(&server)
        .await;

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response = schedule_form(
        State(config),
        Extension(TestIdentity::staff()),
        Query(ScheduleQuery {
            patient_id: Some("p7".to_string()),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["form"]["patient_id"], "p7");
    assert_eq!(body["patient"]["name"], "Tom Doyle");
    assert_eq!(body["doctors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn edit_form_reads_stored_time_with_seconds() {
    let server = MockServer::start().await;
    mount_doctor_choices(&server).await;

    let mut row = MockRows::appointment("a1", "p1", "d1", "confirmed");
    row["time"] = json!("14:30:00");
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([MockRows::patient("p1", "Maeve Lynch")])),
        )
        .mount(&server)
        .await;

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response = edit_appointment_form(
        State(config),
        Extension(TestIdentity::staff()),
        Path("a1".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    // Stored HH:MM:SS reads back as the canonical HH:MM form value.
    assert_eq!(body["form"]["time"], "14:30");
}

#[tokio::test]
async fn cancel_sets_only_the_status_field() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.a1"))
        .and(body_json(json!({ "status": "cancelled" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response = cancel_appointment(
        State(config),
        Extension(TestIdentity::staff()),
        Path("a1".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        redirect_target(&response).as_deref(),
        Some("/appointments/view/a1")
    );
    let body = response_json(response).await;
    assert_eq!(body["flash"]["category"], "success");
}

#[tokio::test]
async fn cancel_failure_reports_danger_and_returns_to_view() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(500).set_body_string("constraint violation"))
        .mount(&server)
        .await;

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response = cancel_appointment(
        State(config),
        Extension(TestIdentity::staff()),
        Path("a1".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let body = response_json(response).await;
    assert_eq!(body["flash"]["category"], "danger");
    assert!(body["flash"]["message"]
        .as_str()
        .unwrap()
        .contains("constraint violation"));
}

#[tokio::test]
async fn list_expands_related_names() {
    let server = MockServer::start().await;
    let mut row = MockRows::appointment("a1", "p1", "d1", "scheduled");
    row["patients"] = json!({ "name": "Maeve Lynch" });
    row["users"] = json!({ "name": "Dr. Adams" });
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&server)
        .await;

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response = list_appointments(State(config), Extension(TestIdentity::staff())).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["appointments"][0]["patients"]["name"], "Maeve Lynch");
}
