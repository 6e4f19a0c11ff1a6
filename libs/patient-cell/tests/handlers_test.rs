use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::Form;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use patient_cell::handlers::*;
use patient_cell::models::PatientForm;
use shared_utils::test_utils::{redirect_target, response_json, MockRows, TestConfig, TestIdentity};

fn valid_form() -> PatientForm {
    PatientForm {
        name: "Maeve Lynch".to_string(),
        email: "maeve@example.com".to_string(),
        phone: "555-0199".to_string(),
        date_of_birth: "1975-11-23".to_string(),
        gender: "female".to_string(),
        blood_group: "AB-".to_string(),
        address: "4 Quay Street".to_string(),
        medical_history: String::new(),
    }
}

#[tokio::test]
async fn list_returns_patients() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::patient("p1", "Maeve Lynch"),
            MockRows::patient("p2", "Tom Doyle"),
        ])))
        .mount(&server)
        .await;

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response = list_patients(State(config), Extension(TestIdentity::staff())).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["patients"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn list_survives_store_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
        .mount(&server)
        .await;

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response = list_patients(State(config), Extension(TestIdentity::staff())).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["patients"].as_array().unwrap().len(), 0);
    assert_eq!(body["flash"]["category"], "danger");
}

#[tokio::test]
async fn add_reports_field_errors_without_touching_store() {
    let config = TestConfig::default().to_arc();
    let response = add_patient(
        State(config),
        Extension(TestIdentity::staff()),
        Form(PatientForm::default()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response_json(response).await;
    for field in ["name", "phone", "date_of_birth"] {
        assert!(body["errors"][field].is_array(), "missing error for {}", field);
    }
}

#[tokio::test]
async fn add_stamps_registering_identity_and_redirects() {
    let server = MockServer::start().await;
    let identity = TestIdentity::staff();

    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .and(body_partial_json(json!({
            "name": "Maeve Lynch",
            "date_of_birth": "1975-11-23",
            "registered_by": identity.id,
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([MockRows::patient("p1", "Maeve Lynch")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response = add_patient(State(config), Extension(identity), Form(valid_form())).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(redirect_target(&response).as_deref(), Some("/patients"));
    let body = response_json(response).await;
    assert_eq!(body["flash"]["category"], "success");
}

#[tokio::test]
async fn view_missing_patient_redirects_with_warning() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", "eq.nope"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response = view_patient(
        State(config),
        Extension(TestIdentity::staff()),
        Path("nope".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(redirect_target(&response).as_deref(), Some("/patients"));
    let body = response_json(response).await;
    assert_eq!(body["flash"]["category"], "warning");
    assert_eq!(body["flash"]["message"], "Patient not found.");
}

#[tokio::test]
async fn edit_form_prefills_stored_values() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", "eq.p1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([MockRows::patient("p1", "Maeve Lynch")])),
        )
        .mount(&server)
        .await;

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response = edit_patient_form(
        State(config),
        Extension(TestIdentity::staff()),
        Path("p1".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["form"]["name"], "Maeve Lynch");
    assert_eq!(body["form"]["date_of_birth"], "1980-06-02");
}

#[tokio::test]
async fn edit_submits_canonical_dates_and_lands_on_view() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", "eq.p1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([MockRows::patient("p1", "Maeve Lynch")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", "eq.p1"))
        .and(body_partial_json(json!({ "date_of_birth": "1975-11-23" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response = edit_patient(
        State(config),
        Extension(TestIdentity::staff()),
        Path("p1".to_string()),
        Form(valid_form()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(redirect_target(&response).as_deref(), Some("/patients/view/p1"));
}
