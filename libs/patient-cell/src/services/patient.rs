use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::{SelectOptions, SupabaseClient};

use crate::models::{Patient, PatientError, ValidatedPatient};

pub struct PatientService {
    supabase: SupabaseClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list(&self) -> Result<Vec<Value>, PatientError> {
        let rows = self
            .supabase
            .select("patients", &[], SelectOptions::new())
            .await?;
        Ok(rows)
    }

    pub async fn create(
        &self,
        patient: ValidatedPatient,
        registered_by: &str,
    ) -> Result<Value, PatientError> {
        debug!("registering patient {}", patient.name);
        let row = json!({
            "name": patient.name,
            "email": patient.email,
            "phone": patient.phone,
            "date_of_birth": patient.date_of_birth.format("%Y-%m-%d").to_string(),
            "gender": patient.gender,
            "blood_group": patient.blood_group,
            "address": patient.address,
            "medical_history": patient.medical_history,
            "registered_by": registered_by,
        });
        let created = self.supabase.insert("patients", row).await?;
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> Result<Value, PatientError> {
        self.supabase
            .find_by_id("patients", id, None)
            .await?
            .ok_or(PatientError::NotFound)
    }

    /// Typed fetch for the edit screen, where stored date text has to be
    /// parsed back into form fields.
    pub async fn get_typed(&self, id: &str) -> Result<Patient, PatientError> {
        let row = self.get(id).await?;
        serde_json::from_value(row).map_err(|e| PatientError::Database(e.to_string()))
    }

    pub async fn update(&self, id: &str, patient: ValidatedPatient) -> Result<(), PatientError> {
        debug!("updating patient {}", id);
        let patch = json!({
            "name": patient.name,
            "email": patient.email,
            "phone": patient.phone,
            "date_of_birth": patient.date_of_birth.format("%Y-%m-%d").to_string(),
            "gender": patient.gender,
            "blood_group": patient.blood_group,
            "address": patient.address,
            "medical_history": patient.medical_history,
            "updated_at": Utc::now().to_rfc3339(),
        });
        self.supabase.update("patients", id, patch).await?;
        Ok(())
    }
}
