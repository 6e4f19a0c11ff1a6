use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shared_forms::{self as forms, Choice, FormErrors};

pub const INVOICE_STATUSES: [&str; 4] = ["pending", "paid", "overdue", "cancelled"];

/// Smallest billable amount; stored values carry two decimal places.
pub const MIN_AMOUNT: f64 = 0.01;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub patient_id: String,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub amount: f64,
    pub status: String,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceForm {
    pub patient_id: String,
    pub invoice_date: String,
    pub due_date: String,
    pub amount: String,
    pub status: String,
    pub notes: String,
}

#[derive(Debug, Clone)]
pub struct ValidatedInvoice {
    pub patient_id: String,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub amount: f64,
    pub status: String,
    pub notes: Option<String>,
}

impl InvoiceForm {
    pub fn validate(&self, patients: &[Choice]) -> Result<ValidatedInvoice, FormErrors> {
        let mut errors = FormErrors::new();
        forms::required("patient_id", &self.patient_id, &mut errors);
        forms::member_of("patient_id", &self.patient_id, patients, &mut errors);
        forms::required("invoice_date", &self.invoice_date, &mut errors);
        let invoice_date = forms::parse_date("invoice_date", &self.invoice_date, &mut errors);
        forms::required("due_date", &self.due_date, &mut errors);
        let due_date = forms::parse_date("due_date", &self.due_date, &mut errors);
        forms::required("amount", &self.amount, &mut errors);
        let amount = forms::parse_amount("amount", &self.amount, MIN_AMOUNT, &mut errors);
        let status = if self.status.is_empty() {
            "pending".to_string()
        } else {
            self.status.clone()
        };
        forms::one_of("status", &status, &INVOICE_STATUSES, &mut errors);

        let (Some(invoice_date), Some(due_date), Some(amount)) = (invoice_date, due_date, amount)
        else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ValidatedInvoice {
            patient_id: self.patient_id.clone(),
            invoice_date,
            due_date,
            amount,
            status,
            notes: forms::optional_text(&self.notes),
        })
    }

    pub fn from_invoice(invoice: &Invoice) -> Self {
        Self {
            patient_id: invoice.patient_id.clone(),
            invoice_date: invoice.invoice_date.format("%Y-%m-%d").to_string(),
            due_date: invoice.due_date.format("%Y-%m-%d").to_string(),
            amount: format!("{:.2}", invoice.amount),
            status: invoice.status.clone(),
            notes: invoice.notes.clone().unwrap_or_default(),
        }
    }
}

/// List filters arriving as query parameters; empty strings mean "no
/// filter", the way the page submits them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvoiceListQuery {
    pub status: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    #[error("Invoice not found")]
    NotFound,

    #[error("{0}")]
    Database(String),
}

impl From<shared_models::error::RemoteError> for InvoiceError {
    fn from(err: shared_models::error::RemoteError) -> Self {
        InvoiceError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patients() -> Vec<Choice> {
        vec![Choice::new("p1", "Maeve Lynch")]
    }

    fn valid_form() -> InvoiceForm {
        InvoiceForm {
            patient_id: "p1".to_string(),
            invoice_date: "2024-03-01".to_string(),
            due_date: "2024-03-31".to_string(),
            amount: "120.50".to_string(),
            status: "pending".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn accepts_positive_amount() {
        let validated = valid_form().validate(&patients()).unwrap();
        assert_eq!(validated.amount, 120.50);
    }

    #[test]
    fn rejects_zero_and_negative_amounts() {
        for bad in ["0", "0.00", "-5"] {
            let mut form = valid_form();
            form.amount = bad.to_string();
            let errors = form.validate(&patients()).unwrap_err();
            assert!(errors.has("amount"), "expected rejection of {}", bad);
        }
    }

    #[test]
    fn accepts_minimum_amount_and_rounds() {
        let mut form = valid_form();
        form.amount = "0.01".to_string();
        assert_eq!(form.validate(&patients()).unwrap().amount, 0.01);

        form.amount = "10.006".to_string();
        assert_eq!(form.validate(&patients()).unwrap().amount, 10.01);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut form = valid_form();
        form.status = "refunded".to_string();
        assert!(form.validate(&patients()).unwrap_err().has("status"));
    }
}
