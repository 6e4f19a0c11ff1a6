use serde::{Deserialize, Serialize};

use shared_forms::{self as forms, FormErrors};

/// Both settings forms post to the same route; `form_type` picks the one
/// being submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsForm {
    pub form_type: String,

    // Profile fields
    pub name: String,
    pub email: String,
    pub phone: String,

    // Password fields
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone)]
pub struct ValidatedProfile {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValidatedPasswordChange {
    pub current_password: String,
    pub new_password: String,
}

impl SettingsForm {
    pub fn validate_profile(&self) -> Result<ValidatedProfile, FormErrors> {
        let mut errors = FormErrors::new();
        forms::required("name", &self.name, &mut errors);
        forms::length_between("name", &self.name, 2, 100, &mut errors);
        forms::required("email", &self.email, &mut errors);
        forms::email_format("email", &self.email, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ValidatedProfile {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: forms::optional_text(&self.phone),
        })
    }

    pub fn validate_password(&self) -> Result<ValidatedPasswordChange, FormErrors> {
        let mut errors = FormErrors::new();
        forms::required("current_password", &self.current_password, &mut errors);
        forms::required("new_password", &self.new_password, &mut errors);
        forms::min_length(
            "new_password",
            &self.new_password,
            8,
            "Password must be at least 8 characters",
            &mut errors,
        );
        forms::required("confirm_password", &self.confirm_password, &mut errors);
        forms::equals(
            "confirm_password",
            &self.confirm_password,
            &self.new_password,
            "Passwords must match",
            &mut errors,
        );

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ValidatedPasswordChange {
            current_password: self.current_password.clone(),
            new_password: self.new_password.clone(),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("User profile not found")]
    NotFound,

    #[error("Current password is incorrect")]
    InvalidCurrentPassword,

    #[error("{0}")]
    Provider(String),

    #[error("{0}")]
    Database(String),
}

impl From<shared_models::error::RemoteError> for SettingsError {
    fn from(err: shared_models::error::RemoteError) -> Self {
        SettingsError::Database(err.to_string())
    }
}
