use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    response::Response,
    Form,
};
use serde::Deserialize;
use serde_json::json;

use shared_config::AppConfig;
use shared_models::auth::Identity;
use shared_models::flash::{self, Flash};

use crate::models::{AppointmentError, AppointmentForm, STATUSES};
use crate::services::AppointmentService;

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub patient_id: Option<String>,
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
) -> Response {
    let service = AppointmentService::new(&config);
    match service.list().await {
        Ok(appointments) => flash::page(json!({ "appointments": appointments })),
        Err(err) => flash::page_with_flash(
            json!({ "appointments": [] }),
            Flash::danger(format!("Error fetching appointments: {}", err)),
        ),
    }
}

/// Blank scheduling form: doctor dropdown from a fresh query, plus the
/// originating patient when the form was opened from a profile.
#[axum::debug_handler]
pub async fn schedule_form(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
    Query(query): Query<ScheduleQuery>,
) -> Response {
    let service = AppointmentService::new(&config);

    let (doctors, doctor_flash) = match service.doctor_choices().await {
        Ok(doctors) => (doctors, None),
        Err(err) => (
            Vec::new(),
            Some(Flash::danger(format!("Error fetching doctors: {}", err))),
        ),
    };

    let mut form = AppointmentForm::default();
    let mut patient = None;
    if let Some(patient_id) = query.patient_id {
        form.patient_id = patient_id.clone();
        match service.patient_context(&patient_id).await {
            Ok(found) => patient = found,
            Err(err) => {
                return flash::page_with_flash(
                    json!({ "form": form, "doctors": doctors, "statuses": STATUSES }),
                    Flash::warning(format!("Error fetching patient details: {}", err)),
                );
            }
        }
    }

    let body = json!({
        "form": form,
        "doctors": doctors,
        "statuses": STATUSES,
        "patient": patient,
    });
    match doctor_flash {
        Some(f) => flash::page_with_flash(body, f),
        None => flash::page(body),
    }
}

#[axum::debug_handler]
pub async fn schedule_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
    Form(form): Form<AppointmentForm>,
) -> Response {
    let service = AppointmentService::new(&config);

    let doctors = match service.doctor_choices().await {
        Ok(doctors) => doctors,
        Err(err) => {
            return flash::page_with_flash(
                json!({ "form": form, "doctors": [], "statuses": STATUSES }),
                Flash::danger(format!("Error fetching doctors: {}", err)),
            );
        }
    };

    let validated = match form.validate(&doctors) {
        Ok(validated) => validated,
        Err(errors) => return flash::form_errors(json!(form), &errors),
    };

    // Scheduling from a patient profile returns there; otherwise the list.
    let destination = match &validated.patient_id {
        Some(patient_id) => format!("/patients/view/{}", patient_id),
        None => "/appointments".to_string(),
    };

    match service.create(validated, &identity.id).await {
        Ok(_) => flash::redirect(&destination, Flash::success("Appointment scheduled successfully!")),
        Err(err) => flash::page_with_flash(
            json!({ "form": form, "doctors": doctors, "statuses": STATUSES }),
            Flash::danger(format!("Error scheduling appointment: {}", err)),
        ),
    }
}

#[axum::debug_handler]
pub async fn view_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Response {
    let service = AppointmentService::new(&config);
    match service.get(&id).await {
        Ok(appointment) => flash::page(json!({ "appointment": appointment })),
        Err(AppointmentError::NotFound) => {
            flash::redirect("/appointments", Flash::warning("Appointment not found."))
        }
        Err(err) => flash::redirect(
            "/appointments",
            Flash::danger(format!("Error fetching appointment details: {}", err)),
        ),
    }
}

#[axum::debug_handler]
pub async fn edit_appointment_form(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Response {
    let service = AppointmentService::new(&config);

    let appointment = match service.get_typed(&id).await {
        Ok(appointment) => appointment,
        Err(AppointmentError::NotFound) => {
            return flash::redirect("/appointments", Flash::warning("Appointment not found."));
        }
        Err(err) => {
            return flash::redirect(
                "/appointments",
                Flash::danger(format!("Error processing request: {}", err)),
            );
        }
    };

    let (doctors, doctor_flash) = match service.doctor_choices().await {
        Ok(doctors) => (doctors, None),
        Err(err) => (
            Vec::new(),
            Some(Flash::danger(format!("Error fetching doctors: {}", err))),
        ),
    };

    let patient = match service.patient_context(&appointment.patient_id).await {
        Ok(patient) => patient,
        Err(_) => None,
    };

    let body = json!({
        "form": AppointmentForm::from_appointment(&appointment),
        "appointment": appointment,
        "doctors": doctors,
        "statuses": STATUSES,
        "patient": patient,
    });
    match doctor_flash {
        Some(f) => flash::page_with_flash(body, f),
        None => flash::page(body),
    }
}

#[axum::debug_handler]
pub async fn edit_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
    Path(id): Path<String>,
    Form(form): Form<AppointmentForm>,
) -> Response {
    let service = AppointmentService::new(&config);

    match service.get_typed(&id).await {
        Ok(_) => {}
        Err(AppointmentError::NotFound) => {
            return flash::redirect("/appointments", Flash::warning("Appointment not found."));
        }
        Err(err) => {
            return flash::redirect(
                "/appointments",
                Flash::danger(format!("Error processing request: {}", err)),
            );
        }
    }

    let doctors = match service.doctor_choices().await {
        Ok(doctors) => doctors,
        Err(err) => {
            return flash::page_with_flash(
                json!({ "form": form, "doctors": [], "statuses": STATUSES }),
                Flash::danger(format!("Error fetching doctors: {}", err)),
            );
        }
    };

    let validated = match form.validate(&doctors) {
        Ok(validated) => validated,
        Err(errors) => return flash::form_errors(json!(form), &errors),
    };

    match service.update(&id, validated).await {
        Ok(()) => flash::redirect(
            &format!("/appointments/view/{}", id),
            Flash::success("Appointment updated successfully!"),
        ),
        Err(err) => flash::page_with_flash(
            json!({ "form": form, "doctors": doctors, "statuses": STATUSES }),
            Flash::danger(format!("Error updating appointment: {}", err)),
        ),
    }
}

/// Force `status = cancelled` with a single-field update; no form
/// validation applies and every other field keeps its value.
#[axum::debug_handler]
pub async fn cancel_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Response {
    let service = AppointmentService::new(&config);
    let destination = format!("/appointments/view/{}", id);
    match service.cancel(&id).await {
        Ok(()) => flash::redirect(&destination, Flash::success("Appointment cancelled successfully!")),
        Err(err) => flash::redirect(
            &destination,
            Flash::danger(format!("Error cancelling appointment: {}", err)),
        ),
    }
}
