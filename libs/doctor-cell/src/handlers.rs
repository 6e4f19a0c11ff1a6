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
use shared_utils::authorize::{permits, Action};

use crate::models::{DoctorError, DoctorForm, DEPARTMENTS};
use crate::services::DoctorService;

#[axum::debug_handler]
pub async fn list_doctors(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
) -> Response {
    let service = DoctorService::new(&config);
    match service.list().await {
        Ok(doctors) => flash::page(json!({ "doctors": doctors })),
        Err(err) => flash::page_with_flash(
            json!({ "doctors": [] }),
            Flash::danger(format!("Error fetching doctors: {}", err)),
        ),
    }
}

#[axum::debug_handler]
pub async fn add_doctor_form(
    State(_config): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
) -> Response {
    if !permits(Action::AddDoctor, &identity) {
        return flash::redirect(
            "/doctors",
            Flash::warning("You do not have permission to add doctors."),
        );
    }
    flash::page(json!({
        "form": DoctorForm::default(),
        "departments": DEPARTMENTS,
    }))
}

#[axum::debug_handler]
pub async fn add_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
    Form(form): Form<DoctorForm>,
) -> Response {
    if !permits(Action::AddDoctor, &identity) {
        return flash::redirect(
            "/doctors",
            Flash::warning("You do not have permission to add doctors."),
        );
    }

    let validated = match form.validate() {
        Ok(validated) => validated,
        Err(errors) => return flash::form_errors(json!(form), &errors),
    };

    let service = DoctorService::new(&config);
    match service.create(validated, &identity.id).await {
        Ok(temp_password) => flash::redirect(
            "/doctors",
            Flash::success(format!(
                "Doctor added successfully! Temporary password: {}",
                temp_password
            )),
        ),
        Err(err) => flash::page_with_flash(
            json!({ "form": form, "departments": DEPARTMENTS }),
            Flash::danger(format!("Error adding doctor: {}", err)),
        ),
    }
}

#[axum::debug_handler]
pub async fn view_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Response {
    let service = DoctorService::new(&config);

    let doctor = match service.get(&id).await {
        Ok(doctor) => doctor,
        Err(DoctorError::NotFound) => {
            return flash::redirect("/doctors", Flash::warning("Doctor not found."));
        }
        Err(err) => {
            return flash::redirect(
                "/doctors",
                Flash::danger(format!("Error fetching doctor details: {}", err)),
            );
        }
    };

    let appointments = match service.upcoming_appointments(&id).await {
        Ok(appointments) => appointments,
        Err(err) => {
            return flash::redirect(
                "/doctors",
                Flash::danger(format!("Error fetching doctor details: {}", err)),
            );
        }
    };

    flash::page(json!({ "doctor": doctor, "appointments": appointments }))
}

#[axum::debug_handler]
pub async fn edit_doctor_form(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Response {
    if !permits(Action::EditDoctor, &identity) {
        return flash::redirect(
            "/doctors",
            Flash::warning("You do not have permission to edit doctors."),
        );
    }

    let service = DoctorService::new(&config);
    match service.get_typed(&id).await {
        Ok(doctor) => flash::page(json!({
            "form": DoctorForm::from_doctor(&doctor),
            "doctor": doctor,
            "departments": DEPARTMENTS,
        })),
        Err(DoctorError::NotFound) => {
            flash::redirect("/doctors", Flash::warning("Doctor not found."))
        }
        Err(err) => flash::redirect(
            "/doctors",
            Flash::danger(format!("Error processing request: {}", err)),
        ),
    }
}

#[axum::debug_handler]
pub async fn edit_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Form(form): Form<DoctorForm>,
) -> Response {
    if !permits(Action::EditDoctor, &identity) {
        return flash::redirect(
            "/doctors",
            Flash::warning("You do not have permission to edit doctors."),
        );
    }

    let service = DoctorService::new(&config);
    match service.get(&id).await {
        Ok(_) => {}
        Err(DoctorError::NotFound) => {
            return flash::redirect("/doctors", Flash::warning("Doctor not found."));
        }
        Err(err) => {
            return flash::redirect(
                "/doctors",
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
            &format!("/doctors/view/{}", id),
            Flash::success("Doctor information updated successfully!"),
        ),
        Err(err) => flash::page_with_flash(
            json!({ "form": form, "departments": DEPARTMENTS }),
            Flash::danger(format!("Error updating doctor: {}", err)),
        ),
    }
}
