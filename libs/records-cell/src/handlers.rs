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
use shared_utils::authorize::{permits, Action};

use crate::models::{MedicalRecordForm, RecordError, RECORD_TYPES};
use crate::services::RecordService;

#[derive(Debug, Deserialize)]
pub struct PatientQuery {
    pub patient_id: Option<String>,
}

#[axum::debug_handler]
pub async fn list_records(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
) -> Response {
    let service = RecordService::new(&config);
    match service.list().await {
        Ok(records) => flash::page(json!({ "records": records })),
        Err(err) => flash::page_with_flash(
            json!({ "records": [] }),
            Flash::danger(format!("Error fetching medical records: {}", err)),
        ),
    }
}

/// Blank record form. The patient and doctor dropdowns come from fresh
/// queries; an originating patient profile pre-selects the patient.
#[axum::debug_handler]
pub async fn add_record_form(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
    Query(query): Query<PatientQuery>,
) -> Response {
    let service = RecordService::new(&config);

    let mut flash_message = None;
    let doctors = match service.doctor_choices().await {
        Ok(doctors) => doctors,
        Err(err) => {
            flash_message = Some(Flash::danger(format!("Error fetching doctors: {}", err)));
            Vec::new()
        }
    };
    let patients = match service.patient_choices().await {
        Ok(patients) => patients,
        Err(err) => {
            flash_message = Some(Flash::danger(format!("Error fetching patients: {}", err)));
            Vec::new()
        }
    };

    let mut form = MedicalRecordForm::default();
    let mut patient = None;
    if let Some(patient_id) = query.patient_id {
        form.patient_id = patient_id.clone();
        match service.patient_context(&patient_id).await {
            Ok(found) => patient = found,
            Err(err) => {
                flash_message = Some(Flash::warning(format!(
                    "Error retrieving patient information: {}",
                    err
                )));
            }
        }
    }

    let body = json!({
        "form": form,
        "patients": patients,
        "doctors": doctors,
        "record_types": RECORD_TYPES,
        "patient": patient,
    });
    match flash_message {
        Some(f) => flash::page_with_flash(body, f),
        None => flash::page(body),
    }
}

/// Create a record, uploading the optional attachment first. The upload
/// and the insert are independent calls: an insert failure after a
/// successful upload leaves the blob unreferenced, by design of the
/// store boundary (no compensation).
#[axum::debug_handler]
pub async fn add_record(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
    Form(form): Form<MedicalRecordForm>,
) -> Response {
    let service = RecordService::new(&config);

    let (patients, doctors) = match (service.patient_choices().await, service.doctor_choices().await)
    {
        (Ok(patients), Ok(doctors)) => (patients, doctors),
        (Err(err), _) | (_, Err(err)) => {
            return flash::page_with_flash(
                json!({ "form": form, "record_types": RECORD_TYPES }),
                Flash::danger(format!("Error fetching choices: {}", err)),
            );
        }
    };

    let validated = match form.validate(&patients, &doctors) {
        Ok(validated) => validated,
        Err(errors) => return flash::form_errors(json!(form), &errors),
    };

    let attachment_url = match &validated.attachment {
        Some(attachment) => match service.store_attachment(attachment).await {
            Ok(url) => Some(url),
            Err(err) => {
                return flash::page_with_flash(
                    json!({ "form": form, "patients": patients, "doctors": doctors, "record_types": RECORD_TYPES }),
                    Flash::danger(format!("Error adding medical record: {}", err)),
                );
            }
        },
        None => None,
    };

    let destination = format!("/medical-records/patient/{}", validated.patient_id);
    match service.create(validated, attachment_url, &identity.id).await {
        Ok(_) => flash::redirect(&destination, Flash::success("Medical record added successfully!")),
        Err(err) => flash::page_with_flash(
            json!({ "form": form, "patients": patients, "doctors": doctors, "record_types": RECORD_TYPES }),
            Flash::danger(format!("Database error: {}", err)),
        ),
    }
}

#[axum::debug_handler]
pub async fn view_record(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Response {
    let service = RecordService::new(&config);
    match service.get(&id).await {
        Ok(record) => flash::page(json!({ "record": record })),
        Err(RecordError::NotFound) => {
            flash::redirect("/medical-records", Flash::warning("Medical record not found."))
        }
        Err(err) => flash::redirect(
            "/medical-records",
            Flash::danger(format!("Error fetching medical record details: {}", err)),
        ),
    }
}

/// A patient's record history, newest first.
#[axum::debug_handler]
pub async fn patient_records(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
    Path(patient_id): Path<String>,
) -> Response {
    let service = RecordService::new(&config);

    let patient = match service.patient_context(&patient_id).await {
        Ok(Some(patient)) => patient,
        Ok(None) => return flash::redirect("/patients", Flash::warning("Patient not found.")),
        Err(err) => {
            return flash::redirect(
                "/patients",
                Flash::danger(format!("Error fetching patient medical records: {}", err)),
            );
        }
    };

    match service.list_for_patient(&patient_id).await {
        Ok(records) => flash::page(json!({ "patient": patient, "records": records })),
        Err(err) => flash::redirect(
            "/patients",
            Flash::danger(format!("Error fetching patient medical records: {}", err)),
        ),
    }
}

#[axum::debug_handler]
pub async fn edit_record_form(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Response {
    let service = RecordService::new(&config);

    let record = match service.get_typed(&id).await {
        Ok(record) => record,
        Err(RecordError::NotFound) => {
            return flash::redirect("/medical-records", Flash::warning("Medical record not found."));
        }
        Err(err) => {
            return flash::redirect(
                "/medical-records",
                Flash::danger(format!("Error processing request: {}", err)),
            );
        }
    };

    let (patients, doctors) = match (service.patient_choices().await, service.doctor_choices().await)
    {
        (Ok(patients), Ok(doctors)) => (patients, doctors),
        (Err(err), _) | (_, Err(err)) => {
            return flash::redirect(
                "/medical-records",
                Flash::danger(format!("Error fetching choices: {}", err)),
            );
        }
    };

    flash::page(json!({
        "form": MedicalRecordForm::from_record(&record),
        "record": record,
        "patients": patients,
        "doctors": doctors,
        "record_types": RECORD_TYPES,
    }))
}

/// Full-form edit. A newly submitted file replaces the stored attachment
/// URL; otherwise the existing one is carried over unchanged.
#[axum::debug_handler]
pub async fn edit_record(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Form(form): Form<MedicalRecordForm>,
) -> Response {
    let service = RecordService::new(&config);

    let record = match service.get_typed(&id).await {
        Ok(record) => record,
        Err(RecordError::NotFound) => {
            return flash::redirect("/medical-records", Flash::warning("Medical record not found."));
        }
        Err(err) => {
            return flash::redirect(
                "/medical-records",
                Flash::danger(format!("Error processing request: {}", err)),
            );
        }
    };

    let (patients, doctors) = match (service.patient_choices().await, service.doctor_choices().await)
    {
        (Ok(patients), Ok(doctors)) => (patients, doctors),
        (Err(err), _) | (_, Err(err)) => {
            return flash::redirect(
                "/medical-records",
                Flash::danger(format!("Error fetching choices: {}", err)),
            );
        }
    };

    let validated = match form.validate(&patients, &doctors) {
        Ok(validated) => validated,
        Err(errors) => return flash::form_errors(json!(form), &errors),
    };

    let attachment_url = match &validated.attachment {
        Some(attachment) => match service.store_attachment(attachment).await {
            Ok(url) => Some(url),
            Err(err) => {
                return flash::page_with_flash(
                    json!({ "form": form, "patients": patients, "doctors": doctors, "record_types": RECORD_TYPES }),
                    Flash::danger(format!("Error updating medical record: {}", err)),
                );
            }
        },
        None => record.attachment_url.clone(),
    };

    match service.update(&id, validated, attachment_url, &identity.id).await {
        Ok(()) => flash::redirect(
            &format!("/medical-records/view/{}", id),
            Flash::success("Medical record updated successfully!"),
        ),
        Err(err) => flash::page_with_flash(
            json!({ "form": form, "patients": patients, "doctors": doctors, "record_types": RECORD_TYPES }),
            Flash::danger(format!("Error updating medical record: {}", err)),
        ),
    }
}

/// Role-gated delete: admin or doctor only. The linked blob is removed
/// best-effort before the row goes; a missing blob still counts as
/// success.
#[axum::debug_handler]
pub async fn delete_record(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    Query(query): Query<PatientQuery>,
) -> Response {
    if !permits(Action::DeleteMedicalRecord, &identity) {
        return flash::redirect(
            "/medical-records",
            Flash::warning("You do not have permission to delete medical records."),
        );
    }

    let destination = match &query.patient_id {
        Some(patient_id) => format!("/medical-records/patient/{}", patient_id),
        None => "/medical-records".to_string(),
    };

    let service = RecordService::new(&config);
    match service.delete(&id).await {
        Ok(()) => flash::redirect(&destination, Flash::success("Medical record deleted successfully!")),
        Err(RecordError::NotFound) => {
            flash::redirect(&destination, Flash::warning("Medical record not found."))
        }
        Err(err) => flash::redirect(
            "/medical-records",
            Flash::danger(format!("Error deleting medical record: {}", err)),
        ),
    }
}
