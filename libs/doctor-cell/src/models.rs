use serde::{Deserialize, Serialize};

use shared_forms::{self as forms, FormErrors};

pub const DEPARTMENTS: [&str; 10] = [
    "cardiology",
    "neurology",
    "orthopedics",
    "pediatrics",
    "general_medicine",
    "gynecology",
    "ophthalmology",
    "dermatology",
    "psychiatry",
    "ent",
];

/// A doctor is a `users` row with `role = doctor` plus the professional
/// fields below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub department: Option<String>,
    pub qualification: Option<String>,
    pub experience: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DoctorForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialty: String,
    pub department: String,
    pub qualification: String,
    pub experience: String,
    pub bio: String,
}

#[derive(Debug, Clone)]
pub struct ValidatedDoctor {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialty: String,
    pub department: String,
    pub qualification: String,
    pub experience: String,
    pub bio: Option<String>,
}

impl DoctorForm {
    pub fn validate(&self) -> Result<ValidatedDoctor, FormErrors> {
        let mut errors = FormErrors::new();
        forms::required("name", &self.name, &mut errors);
        forms::required("email", &self.email, &mut errors);
        forms::email_format("email", &self.email, &mut errors);
        forms::required("phone", &self.phone, &mut errors);
        forms::required("specialty", &self.specialty, &mut errors);
        forms::required("department", &self.department, &mut errors);
        forms::one_of("department", &self.department, &DEPARTMENTS, &mut errors);
        forms::required("qualification", &self.qualification, &mut errors);
        forms::required("experience", &self.experience, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ValidatedDoctor {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            specialty: self.specialty.trim().to_string(),
            department: self.department.clone(),
            qualification: self.qualification.trim().to_string(),
            experience: self.experience.trim().to_string(),
            bio: forms::optional_text(&self.bio),
        })
    }

    pub fn from_doctor(doctor: &Doctor) -> Self {
        Self {
            name: doctor.name.clone(),
            email: doctor.email.clone(),
            phone: doctor.phone.clone().unwrap_or_default(),
            specialty: doctor.specialty.clone().unwrap_or_default(),
            department: doctor.department.clone().unwrap_or_default(),
            qualification: doctor.qualification.clone().unwrap_or_default(),
            experience: doctor.experience.clone().unwrap_or_default(),
            bio: doctor.bio.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("{0}")]
    Provisioning(String),

    #[error("{0}")]
    Database(String),
}

impl From<shared_models::error::RemoteError> for DoctorError {
    fn from(err: shared_models::error::RemoteError) -> Self {
        DoctorError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> DoctorForm {
        DoctorForm {
            name: "Dr. Nora Quinn".to_string(),
            email: "nora.quinn@hospital.example".to_string(),
            phone: "555-0142".to_string(),
            specialty: "Interventional cardiology".to_string(),
            department: "cardiology".to_string(),
            qualification: "MB BCh BAO, MRCPI".to_string(),
            experience: "12".to_string(),
            bio: String::new(),
        }
    }

    #[test]
    fn accepts_complete_submission() {
        let validated = valid_form().validate().unwrap();
        assert_eq!(validated.department, "cardiology");
        assert_eq!(validated.bio, None);
    }

    #[test]
    fn department_must_be_declared() {
        let mut form = valid_form();
        form.department = "radiology".to_string();
        assert!(form.validate().unwrap_err().has("department"));
    }

    #[test]
    fn email_is_mandatory_for_provisioning() {
        let mut form = valid_form();
        form.email = String::new();
        assert!(form.validate().unwrap_err().has("email"));
    }
}
