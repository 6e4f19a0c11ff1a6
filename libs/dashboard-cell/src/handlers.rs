use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    response::Response,
};
use chrono::Utc;
use serde_json::json;

use shared_config::AppConfig;
use shared_database::supabase::{Filter, SupabaseClient};
use shared_models::auth::Identity;
use shared_models::flash::{self, Flash};

/// Landing-page statistics: four sequential exact counts. Any failure
/// renders the page with zeroed stats and a danger banner rather than
/// failing the request.
#[axum::debug_handler]
pub async fn dashboard(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
) -> Response {
    let supabase = SupabaseClient::new(&config);
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();

    let counts = async {
        let patients = supabase.count("patients", &[]).await?;
        let appointments = supabase.count("appointments", &[]).await?;
        let today_appointments = supabase
            .count("appointments", &[Filter::eq("date", &today)])
            .await?;
        let doctors = supabase
            .count("users", &[Filter::eq("role", "doctor")])
            .await?;
        Ok::<_, shared_models::error::RemoteError>((
            patients,
            appointments,
            today_appointments,
            doctors,
        ))
    }
    .await;

    match counts {
        Ok((patients, appointments, today_appointments, doctors)) => flash::page(json!({
            "identity": identity,
            "patient_count": patients,
            "appointment_count": appointments,
            "today_appointment_count": today_appointments,
            "doctor_count": doctors,
        })),
        Err(err) => flash::page_with_flash(
            json!({
                "identity": identity,
                "patient_count": 0,
                "appointment_count": 0,
                "today_appointment_count": 0,
                "doctor_count": 0,
            }),
            Flash::danger(format!("Error loading dashboard data: {}", err)),
        ),
    }
}
