use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use shared_forms::{self as forms, Choice, FormErrors};

/// Any declared status may be set through edit; there is no transition
/// graph. Cancel is the only action that forces a value.
pub const STATUSES: [&str; 4] = ["scheduled", "confirmed", "completed", "cancelled"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub date: NaiveDate,
    pub time: String,
    pub reason: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

impl Appointment {
    /// Stored time, tolerant of both `HH:MM` and `HH:MM:SS` column
    /// states.
    pub fn parsed_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.time, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(&self.time, "%H:%M"))
            .ok()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppointmentForm {
    pub patient_id: String,
    pub doctor_id: String,
    pub date: String,
    pub time: String,
    pub reason: String,
    pub status: String,
    pub notes: String,
}

#[derive(Debug, Clone)]
pub struct ValidatedAppointment {
    pub patient_id: Option<String>,
    pub doctor_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub reason: String,
    pub status: String,
    pub notes: Option<String>,
}

impl AppointmentForm {
    /// The doctor dropdown is validated against the set fetched for this
    /// request, not a static list.
    pub fn validate(&self, doctors: &[Choice]) -> Result<ValidatedAppointment, FormErrors> {
        let mut errors = FormErrors::new();
        forms::required("doctor_id", &self.doctor_id, &mut errors);
        forms::member_of("doctor_id", &self.doctor_id, doctors, &mut errors);
        forms::required("date", &self.date, &mut errors);
        let date = forms::parse_date("date", &self.date, &mut errors);
        forms::required("time", &self.time, &mut errors);
        let time = forms::parse_time("time", &self.time, &mut errors);
        forms::required("reason", &self.reason, &mut errors);
        let status = if self.status.is_empty() {
            "scheduled".to_string()
        } else {
            self.status.clone()
        };
        forms::one_of("status", &status, &STATUSES, &mut errors);

        let (Some(date), Some(time)) = (date, time) else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ValidatedAppointment {
            patient_id: forms::optional_text(&self.patient_id),
            doctor_id: self.doctor_id.clone(),
            date,
            time,
            reason: self.reason.trim().to_string(),
            status,
            notes: forms::optional_text(&self.notes),
        })
    }

    pub fn from_appointment(appointment: &Appointment) -> Self {
        Self {
            patient_id: appointment.patient_id.clone(),
            doctor_id: appointment.doctor_id.clone(),
            date: appointment.date.format("%Y-%m-%d").to_string(),
            time: appointment
                .parsed_time()
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_else(|| appointment.time.clone()),
            reason: appointment.reason.clone(),
            status: appointment.status.clone(),
            notes: appointment.notes.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("{0}")]
    Database(String),
}

impl From<shared_models::error::RemoteError> for AppointmentError {
    fn from(err: shared_models::error::RemoteError) -> Self {
        AppointmentError::Database(err.to_string())
    }
}
