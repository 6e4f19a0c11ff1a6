use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shared_forms::{self as forms, FormErrors};

pub const GENDERS: [&str; 3] = ["male", "female", "other"];
pub const BLOOD_GROUPS: [&str; 8] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub blood_group: String,
    pub address: Option<String>,
    pub medical_history: Option<String>,
    pub registered_by: Option<String>,
}

/// Raw form submission; every field arrives as text and is validated as a
/// whole before anything is written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub gender: String,
    pub blood_group: String,
    pub address: String,
    pub medical_history: String,
}

#[derive(Debug, Clone)]
pub struct ValidatedPatient {
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub blood_group: String,
    pub address: Option<String>,
    pub medical_history: Option<String>,
}

impl PatientForm {
    pub fn validate(&self) -> Result<ValidatedPatient, FormErrors> {
        let mut errors = FormErrors::new();
        forms::required("name", &self.name, &mut errors);
        forms::email_format("email", &self.email, &mut errors);
        forms::required("phone", &self.phone, &mut errors);
        forms::required("date_of_birth", &self.date_of_birth, &mut errors);
        let date_of_birth = forms::parse_date("date_of_birth", &self.date_of_birth, &mut errors);
        forms::required("gender", &self.gender, &mut errors);
        forms::one_of("gender", &self.gender, &GENDERS, &mut errors);
        forms::required("blood_group", &self.blood_group, &mut errors);
        forms::one_of("blood_group", &self.blood_group, &BLOOD_GROUPS, &mut errors);

        let Some(date_of_birth) = date_of_birth else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ValidatedPatient {
            name: self.name.trim().to_string(),
            email: forms::optional_text(&self.email),
            phone: self.phone.trim().to_string(),
            date_of_birth,
            gender: self.gender.clone(),
            blood_group: self.blood_group.clone(),
            address: forms::optional_text(&self.address),
            medical_history: forms::optional_text(&self.medical_history),
        })
    }

    /// Prefill for the edit screen from a stored patient.
    pub fn from_patient(patient: &Patient) -> Self {
        Self {
            name: patient.name.clone(),
            email: patient.email.clone().unwrap_or_default(),
            phone: patient.phone.clone(),
            date_of_birth: patient.date_of_birth.format("%Y-%m-%d").to_string(),
            gender: patient.gender.clone(),
            blood_group: patient.blood_group.clone(),
            address: patient.address.clone().unwrap_or_default(),
            medical_history: patient.medical_history.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("{0}")]
    Database(String),
}

impl From<shared_models::error::RemoteError> for PatientError {
    fn from(err: shared_models::error::RemoteError) -> Self {
        PatientError::Database(err.to_string())
    }
}
