use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    response::Response,
    Form,
};
use chrono::{Duration, Utc};
use serde_json::json;

use shared_config::AppConfig;
use shared_models::auth::Identity;
use shared_models::flash::{self, Flash};

use crate::models::{InvoiceError, InvoiceForm, InvoiceListQuery, INVOICE_STATUSES};
use crate::services::InvoiceService;

#[axum::debug_handler]
pub async fn list_invoices(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
    Query(query): Query<InvoiceListQuery>,
) -> Response {
    let service = InvoiceService::new(&config);
    match service.list(&query).await {
        Ok(invoices) => flash::page(json!({ "invoices": invoices, "filters": {
            "status": query.status,
            "start_date": query.start_date,
            "end_date": query.end_date,
        }})),
        Err(err) => flash::page_with_flash(
            json!({ "invoices": [] }),
            Flash::danger(format!("Error fetching invoices: {}", err)),
        ),
    }
}

/// Blank invoice form with the billing defaults: dated today, due in 30
/// days.
#[axum::debug_handler]
pub async fn create_invoice_form(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
) -> Response {
    let service = InvoiceService::new(&config);

    let (patients, patient_flash) = match service.patient_choices().await {
        Ok(patients) => (patients, None),
        Err(err) => (
            Vec::new(),
            Some(Flash::danger(format!("Error fetching patients: {}", err))),
        ),
    };

    let today = Utc::now().date_naive();
    let form = InvoiceForm {
        invoice_date: today.format("%Y-%m-%d").to_string(),
        due_date: (today + Duration::days(30)).format("%Y-%m-%d").to_string(),
        status: "pending".to_string(),
        ..Default::default()
    };

    let body = json!({
        "form": form,
        "patients": patients,
        "statuses": INVOICE_STATUSES,
    });
    match patient_flash {
        Some(f) => flash::page_with_flash(body, f),
        None => flash::page(body),
    }
}

#[axum::debug_handler]
pub async fn create_invoice(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
    Form(form): Form<InvoiceForm>,
) -> Response {
    let service = InvoiceService::new(&config);

    let patients = match service.patient_choices().await {
        Ok(patients) => patients,
        Err(err) => {
            return flash::page_with_flash(
                json!({ "form": form, "patients": [], "statuses": INVOICE_STATUSES }),
                Flash::danger(format!("Error fetching patients: {}", err)),
            );
        }
    };

    let validated = match form.validate(&patients) {
        Ok(validated) => validated,
        Err(errors) => return flash::form_errors(json!(form), &errors),
    };

    match service.create(validated, &identity.id).await {
        Ok(_) => flash::redirect("/billing", Flash::success("Invoice created successfully!")),
        Err(err) => flash::page_with_flash(
            json!({ "form": form, "patients": patients, "statuses": INVOICE_STATUSES }),
            Flash::danger(format!("Error creating invoice: {}", err)),
        ),
    }
}

#[axum::debug_handler]
pub async fn view_invoice(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Response {
    let service = InvoiceService::new(&config);
    match service.get(&id).await {
        Ok(invoice) => flash::page(json!({ "invoice": invoice })),
        Err(InvoiceError::NotFound) => {
            flash::redirect("/billing", Flash::warning("Invoice not found."))
        }
        Err(err) => flash::redirect(
            "/billing",
            Flash::danger(format!("Error fetching invoice details: {}", err)),
        ),
    }
}

#[axum::debug_handler]
pub async fn edit_invoice_form(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Response {
    let service = InvoiceService::new(&config);

    let invoice = match service.get_typed(&id).await {
        Ok(invoice) => invoice,
        Err(InvoiceError::NotFound) => {
            return flash::redirect("/billing", Flash::warning("Invoice not found."));
        }
        Err(err) => {
            return flash::redirect(
                "/billing",
                Flash::danger(format!("Error updating invoice: {}", err)),
            );
        }
    };

    let (patients, patient_flash) = match service.patient_choices().await {
        Ok(patients) => (patients, None),
        Err(err) => (
            Vec::new(),
            Some(Flash::danger(format!("Error fetching patients: {}", err))),
        ),
    };

    let body = json!({
        "form": InvoiceForm::from_invoice(&invoice),
        "invoice": invoice,
        "patients": patients,
        "statuses": INVOICE_STATUSES,
    });
    match patient_flash {
        Some(f) => flash::page_with_flash(body, f),
        None => flash::page(body),
    }
}

#[axum::debug_handler]
pub async fn edit_invoice(
    State(config): State<Arc<AppConfig>>,
    Extension(_identity): Extension<Identity>,
    Path(id): Path<String>,
    Form(form): Form<InvoiceForm>,
) -> Response {
    let service = InvoiceService::new(&config);

    match service.get_typed(&id).await {
        Ok(_) => {}
        Err(InvoiceError::NotFound) => {
            return flash::redirect("/billing", Flash::warning("Invoice not found."));
        }
        Err(err) => {
            return flash::redirect(
                "/billing",
                Flash::danger(format!("Error updating invoice: {}", err)),
            );
        }
    }

    let patients = match service.patient_choices().await {
        Ok(patients) => patients,
        Err(err) => {
            return flash::page_with_flash(
                json!({ "form": form, "patients": [], "statuses": INVOICE_STATUSES }),
                Flash::danger(format!("Error fetching patients: {}", err)),
            );
        }
    };

    let validated = match form.validate(&patients) {
        Ok(validated) => validated,
        Err(errors) => return flash::form_errors(json!(form), &errors),
    };

    match service.update(&id, validated).await {
        Ok(()) => flash::redirect(
            &format!("/billing/view/{}", id),
            Flash::success("Invoice updated successfully!"),
        ),
        Err(err) => flash::page_with_flash(
            json!({ "form": form, "patients": patients, "statuses": INVOICE_STATUSES }),
            Flash::danger(format!("Error updating invoice: {}", err)),
        ),
    }
}
