use serde::{Deserialize, Serialize};

use shared_forms::{self as forms, FormErrors};

/// Roles a user can register with. The role gate governs what each role
/// may do later; registration only checks membership.
pub const ROLES: [&str; 3] = ["admin", "doctor", "staff"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        forms::required("email", &self.email, &mut errors);
        forms::email_format("email", &self.email, &mut errors);
        forms::required("password", &self.password, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: String,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            role: "staff".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidatedRegistration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<ValidatedRegistration, FormErrors> {
        let mut errors = FormErrors::new();
        forms::required("name", &self.name, &mut errors);
        forms::required("email", &self.email, &mut errors);
        forms::email_format("email", &self.email, &mut errors);
        forms::required("password", &self.password, &mut errors);
        forms::required("confirm_password", &self.confirm_password, &mut errors);
        forms::equals(
            "confirm_password",
            &self.confirm_password,
            &self.password,
            "Passwords must match.",
            &mut errors,
        );
        forms::one_of("role", &self.role, &ROLES, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ValidatedRegistration {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            role: self.role.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_requires_matching_passwords() {
        let form = RegisterForm {
            name: "Ada Ward".to_string(),
            email: "ada@hospital.example".to_string(),
            password: "hunter2hunter2".to_string(),
            confirm_password: "different".to_string(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.has("confirm_password"));
    }

    #[test]
    fn register_rejects_unknown_role() {
        let form = RegisterForm {
            name: "Ada Ward".to_string(),
            email: "ada@hospital.example".to_string(),
            password: "hunter2hunter2".to_string(),
            confirm_password: "hunter2hunter2".to_string(),
            role: "superuser".to_string(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.has("role"));
    }

    #[test]
    fn register_defaults_to_staff() {
        assert_eq!(RegisterForm::default().role, "staff");
    }
}
