use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    response::Response,
    Form,
};
use serde_json::json;

use shared_config::AppConfig;
use shared_models::auth::Identity;
use shared_models::flash::{self, Flash};

use crate::models::{PatientError, PatientForm, BLOOD_GROUPS, GENDERS};
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn list_patients(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
) -> Response {
    let service = PatientService::new(&config);
    match service.list().await {
        Ok(patients) => flash::page(json!({ "patients": patients })),
        Err(err) => flash::page_with_flash(
            json!({ "patients": [] }),
            Flash::danger(format!("Error fetching patients: {}", err)),
        ),
    }
}

#[axum::debug_handler]
pub async fn add_patient_form(
    State(_config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
) -> Response {
    flash::page(json!({
        "form": PatientForm::default(),
        "genders": GENDERS,
        "blood_groups": BLOOD_GROUPS,
    }))
}

#[axum::debug_handler]
pub async fn add_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
    Form(form): Form<PatientForm>,
) -> Response {
    let validated = match form.validate() {
        Ok(validated) => validated,
        Err(errors) => return flash::form_errors(json!(form), &errors),
    };

    let service = PatientService::new(&config);
    match service.create(validated, &identity.id).await {
        Ok(_) => flash::redirect("/patients", Flash::success("Patient added successfully!")),
        Err(err) => flash::page_with_flash(
            json!({ "form": form }),
            Flash::danger(format!("Error adding patient: {}", err)),
        ),
    }
}

#[axum::debug_handler]
pub async fn view_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Response {
    let service = PatientService::new(&config);
    match service.get(&id).await {
        Ok(patient) => flash::page(json!({ "patient": patient })),
        Err(PatientError::NotFound) => {
            flash::redirect("/patients", Flash::warning("Patient not found."))
        }
        Err(err) => flash::redirect(
            "/patients",
            Flash::danger(format!("Error fetching patient details: {}", err)),
        ),
    }
}

#[axum::debug_handler]
pub async fn edit_patient_form(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Response {
    let service = PatientService::new(&config);
    match service.get_typed(&id).await {
        Ok(patient) => flash::page(json!({
            "form": PatientForm::from_patient(&patient),
            "patient": patient,
            "genders": GENDERS,
            "blood_groups": BLOOD_GROUPS,
        })),
        Err(PatientError::NotFound) => {
            flash::redirect("/patients", Flash::warning("Patient not found."))
        }
        Err(err) => flash::redirect(
            "/patients",
            Flash::danger(format!("Error processing request: {}", err)),
        ),
    }
}

#[axum::debug_handler]
pub async fn edit_patient(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
    Path(id): Path<String>,
    Form(form): Form<PatientForm>,
) -> Response {
    let service = PatientService::new(&config);

    // Confirm the row still exists before accepting the overwrite.
    match service.get(&id).await {
        Ok(_) => {}
        Err(PatientError::NotFound) => {
            return flash::redirect("/patients", Flash::warning("Patient not found."));
        }
        Err(err) => {
            return flash::redirect(
                "/patients",
                Flash::danger(format!("Error processing request: {}", err)),
            );
        }
    }

    let validated = match form.validate() {
        Ok(validated) => validated,
        Err(errors) => return flash::form_errors(json!(form), &errors),
    };

    match service.update(&id, validated).await {
        Ok(()) => flash::redirect(
            &format!("/patients/view/{}", id),
            Flash::success("Patient updated successfully!"),
        ),
        Err(err) => flash::page_with_flash(
            json!({ "form": form }),
            Flash::danger(format!("Error updating patient: {}", err)),
        ),
    }
}
