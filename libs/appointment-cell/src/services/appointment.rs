use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::{Filter, SelectOptions, SupabaseClient};
use shared_forms::Choice;

use crate::models::{Appointment, AppointmentError, ValidatedAppointment};

/// Embedded-resource lists for appointment reads: the patient's name and
/// the doctor row behind the doctor_id foreign key.
const LIST_EXPAND: &str = "*, patients(name), users!doctor_id(name)";
const VIEW_EXPAND: &str = "*, patients(name, email, phone), users!doctor_id(name)";

pub struct AppointmentService {
    supabase: SupabaseClient,
}

impl AppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list(&self) -> Result<Vec<Value>, AppointmentError> {
        let rows = self
            .supabase
            .select(
                "appointments",
                &[],
                SelectOptions::new().expand(LIST_EXPAND),
            )
            .await?;
        Ok(rows)
    }

    /// Doctor dropdown for the scheduling form, fetched per request.
    pub async fn doctor_choices(&self) -> Result<Vec<Choice>, AppointmentError> {
        let rows = self
            .supabase
            .select(
                "users",
                &[Filter::eq("role", "doctor")],
                SelectOptions::new().expand("id, name"),
            )
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| {
                Some(Choice::new(
                    row.get("id")?.as_str()?,
                    row.get("name")?.as_str()?,
                ))
            })
            .collect())
    }

    pub async fn patient_context(&self, patient_id: &str) -> Result<Option<Value>, AppointmentError> {
        let row = self.supabase.find_by_id("patients", patient_id, None).await?;
        Ok(row)
    }

    pub async fn create(
        &self,
        appointment: ValidatedAppointment,
        created_by: &str,
    ) -> Result<Value, AppointmentError> {
        debug!(
            "scheduling appointment with doctor {} on {}",
            appointment.doctor_id, appointment.date
        );
        let row = json!({
            "patient_id": appointment.patient_id,
            "doctor_id": appointment.doctor_id,
            "date": appointment.date.format("%Y-%m-%d").to_string(),
            "time": appointment.time.format("%H:%M").to_string(),
            "reason": appointment.reason,
            "status": appointment.status,
            "notes": appointment.notes,
            "created_by": created_by,
        });
        let created = self.supabase.insert("appointments", row).await?;
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> Result<Value, AppointmentError> {
        self.supabase
            .find_by_id("appointments", id, Some(VIEW_EXPAND))
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    pub async fn get_typed(&self, id: &str) -> Result<Appointment, AppointmentError> {
        let row = self
            .supabase
            .find_by_id("appointments", id, None)
            .await?
            .ok_or(AppointmentError::NotFound)?;
        serde_json::from_value(row).map_err(|e| AppointmentError::Database(e.to_string()))
    }

    pub async fn update(
        &self,
        id: &str,
        appointment: ValidatedAppointment,
    ) -> Result<(), AppointmentError> {
        debug!("updating appointment {}", id);
        let patch = json!({
            "doctor_id": appointment.doctor_id,
            "date": appointment.date.format("%Y-%m-%d").to_string(),
            "time": appointment.time.format("%H:%M").to_string(),
            "reason": appointment.reason,
            "status": appointment.status,
            "notes": appointment.notes,
            "updated_at": Utc::now().to_rfc3339(),
        });
        self.supabase.update("appointments", id, patch).await?;
        Ok(())
    }

    /// Cancellation is a single-field update; the rest of the row is left
    /// untouched and no form validation applies.
    pub async fn cancel(&self, id: &str) -> Result<(), AppointmentError> {
        debug!("cancelling appointment {}", id);
        self.supabase
            .update("appointments", id, json!({ "status": "cancelled" }))
            .await?;
        Ok(())
    }
}
