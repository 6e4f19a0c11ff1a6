use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::Form;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::handlers::*;
use doctor_cell::models::DoctorForm;
use shared_utils::test_utils::{redirect_target, response_json, MockRows, TestConfig, TestIdentity};

fn quinn_form() -> DoctorForm {
    DoctorForm {
        name: "Dr. Nora Quinn".to_string(),
        email: "nora.quinn@hospital.example".to_string(),
        phone: "555-0142".to_string(),
        specialty: "Interventional cardiology".to_string(),
        department: "cardiology".to_string(),
        qualification: "MB BCh BAO, MRCPI".to_string(),
        experience: "12".to_string(),
        bio: String::new(),
    }
}

#[tokio::test]
async fn staff_cannot_add_doctors() {
    let server = MockServer::start().await;
    // Neither the provider nor the store may be touched.
    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response = add_doctor(
        State(config),
        Extension(TestIdentity::staff()),
        Form(quinn_form()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(redirect_target(&response).as_deref(), Some("/doctors"));
    let body = response_json(response).await;
    assert_eq!(body["flash"]["category"], "warning");
    assert_eq!(
        body["flash"]["message"],
        "You do not have permission to add doctors."
    );
}

#[tokio::test]
async fn admin_provisions_account_then_inserts_row() {
    let server = MockServer::start().await;
    let admin = TestIdentity::admin();

    Mock::given(method("POST"))
        .and(path("/auth/v1/admin/users"))
        .and(body_partial_json(json!({
            "email": "nora.quinn@hospital.example",
            "email_confirm": true,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "prov-77",
            "email": "nora.quinn@hospital.example",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .and(body_partial_json(json!({
            "user_id": "prov-77",
            "role": "doctor",
            "department": "cardiology",
            "created_by": admin.id,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockRows::user("u9", "nora.quinn@hospital.example", "Dr. Nora Quinn", "doctor")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response = add_doctor(State(config), Extension(admin), Form(quinn_form())).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(redirect_target(&response).as_deref(), Some("/doctors"));
    let body = response_json(response).await;
    assert_eq!(body["flash"]["category"], "success");
    assert!(body["flash"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Doctor added successfully! Temporary password: "));
}

#[tokio::test]
async fn manager_may_edit_a_doctor() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", "eq.u9"))
        .and(query_param("role", "eq.doctor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::user("u9", "nora.quinn@hospital.example", "Dr. Nora Quinn", "doctor")
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", "eq.u9"))
        .and(body_partial_json(json!({ "specialty": "Interventional cardiology" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response = edit_doctor(
        State(config),
        Extension(TestIdentity::manager()),
        Path("u9".to_string()),
        Form(quinn_form()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(redirect_target(&response).as_deref(), Some("/doctors/view/u9"));
}

#[tokio::test]
async fn view_combines_doctor_and_upcoming_appointments() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", "eq.u9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::user("u9", "nora.quinn@hospital.example", "Dr. Nora Quinn", "doctor")
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", "eq.u9"))
        .and(query_param("order", "date.asc"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment("a1", "p1", "u9", "scheduled"),
            MockRows::appointment("a2", "p2", "u9", "confirmed"),
        ])))
        .mount(&server)
        .await;

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response = view_doctor(
        State(config),
        Extension(TestIdentity::staff()),
        Path("u9".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["doctor"]["name"], "Dr. Nora Quinn");
    assert_eq!(body["appointments"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn missing_doctor_redirects_to_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response = view_doctor(
        State(config),
        Extension(TestIdentity::staff()),
        Path("nope".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(redirect_target(&response).as_deref(), Some("/doctors"));
    let body = response_json(response).await;
    assert_eq!(body["flash"]["message"], "Doctor not found.");
}
