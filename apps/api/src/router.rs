use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    response::Response,
    routing::get,
    Router,
};

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use billing_cell::router::billing_routes;
use dashboard_cell::router::dashboard_routes;
use doctor_cell::router::doctor_routes;
use patient_cell::router::patient_routes;
use records_cell::router::record_routes;
use settings_cell::router::settings_routes;
use shared_config::AppConfig;
use shared_models::flash;
use shared_utils::jwt::validate_token;

/// Landing route: a valid session goes to the dashboard, everything else
/// to the login page.
async fn index(State(config): State<Arc<AppConfig>>, headers: HeaderMap) -> Response {
    let has_session = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| validate_token(token, &config.supabase_jwt_secret).is_ok())
        .unwrap_or(false);

    if has_session {
        flash::redirect_silent("/dashboard")
    } else {
        flash::redirect_silent("/auth/login")
    }
}

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(index))
        .with_state(state.clone())
        .nest("/auth", auth_routes(state.clone()))
        .nest("/dashboard", dashboard_routes(state.clone()))
        .nest("/patients", patient_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/medical-records", record_routes(state.clone()))
        .nest("/billing", billing_routes(state.clone()))
        .nest("/settings", settings_routes(state))
}
