use axum::extract::{Extension, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dashboard_cell::handlers::dashboard;
use shared_utils::test_utils::{response_json, TestConfig, TestIdentity};

fn counted(total: i64) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-range", format!("0-0/{}", total).as_str())
        .set_body_json(json!([]))
}

#[tokio::test]
async fn dashboard_reports_all_four_counts() {
    let server = MockServer::start().await;
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(counted(42))
        .mount(&server)
        .await;
    // Today's appointments first: it is the more specific match.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("date", format!("eq.{}", today)))
        .respond_with(counted(3))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(counted(128))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("role", "eq.doctor"))
        .respond_with(counted(7))
        .mount(&server)
        .await;

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response = dashboard(State(config), Extension(TestIdentity::staff())).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["patient_count"], 42);
    assert_eq!(body["appointment_count"], 128);
    assert_eq!(body["today_appointment_count"], 3);
    assert_eq!(body["doctor_count"], 7);
}

#[tokio::test]
async fn count_failure_renders_zeroed_stats_with_banner() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
        .mount(&server)
        .await;

    let config = TestConfig::with_url(&server.uri()).to_arc();
    let response = dashboard(State(config), Extension(TestIdentity::staff())).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["patient_count"], 0);
    assert_eq!(body["flash"]["category"], "danger");
}
