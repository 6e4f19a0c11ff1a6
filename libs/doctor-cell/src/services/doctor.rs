use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::auth::AuthClient;
use shared_database::supabase::{Filter, SelectOptions, SupabaseClient};

use crate::models::{Doctor, DoctorError, ValidatedDoctor};

pub struct DoctorService {
    supabase: SupabaseClient,
    auth: AuthClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            auth: AuthClient::new(config),
        }
    }

    pub async fn list(&self) -> Result<Vec<Value>, DoctorError> {
        let rows = self
            .supabase
            .select(
                "users",
                &[Filter::eq("role", "doctor")],
                SelectOptions::new(),
            )
            .await?;
        Ok(rows)
    }

    /// Provision a doctor: an identity-provider account under a generated
    /// temporary password, then the application user row. The two steps
    /// are independent; if the row insert fails the provider account is
    /// left in place and the failure is surfaced.
    pub async fn create(
        &self,
        doctor: ValidatedDoctor,
        created_by: &str,
    ) -> Result<String, DoctorError> {
        let temp_password: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();

        debug!("provisioning doctor account for {}", doctor.email);
        let provider_user = self
            .auth
            .admin_create_user(&doctor.email, &temp_password, true)
            .await
            .map_err(|e| DoctorError::Provisioning(e.to_string()))?;

        let row = json!({
            "user_id": provider_user.id,
            "name": doctor.name,
            "email": doctor.email,
            "phone": doctor.phone,
            "role": "doctor",
            "specialty": doctor.specialty,
            "department": doctor.department,
            "qualification": doctor.qualification,
            "experience": doctor.experience,
            "bio": doctor.bio,
            "created_at": Utc::now().to_rfc3339(),
            "created_by": created_by,
        });
        self.supabase.insert("users", row).await?;

        Ok(temp_password)
    }

    pub async fn get(&self, id: &str) -> Result<Value, DoctorError> {
        let rows = self
            .supabase
            .select(
                "users",
                &[Filter::eq("id", id), Filter::eq("role", "doctor")],
                SelectOptions::new().limit(1),
            )
            .await?;
        rows.into_iter().next().ok_or(DoctorError::NotFound)
    }

    pub async fn get_typed(&self, id: &str) -> Result<Doctor, DoctorError> {
        let row = self.get(id).await?;
        serde_json::from_value(row).map_err(|e| DoctorError::Database(e.to_string()))
    }

    /// The doctor's next few appointments, patient names included.
    pub async fn upcoming_appointments(&self, doctor_id: &str) -> Result<Vec<Value>, DoctorError> {
        let rows = self
            .supabase
            .select(
                "appointments",
                &[Filter::eq("doctor_id", doctor_id)],
                SelectOptions::new()
                    .expand("*, patients(name)")
                    .order_asc("date")
                    .limit(5),
            )
            .await?;
        Ok(rows)
    }

    pub async fn update(&self, id: &str, doctor: ValidatedDoctor) -> Result<(), DoctorError> {
        debug!("updating doctor {}", id);
        let patch = json!({
            "name": doctor.name,
            "email": doctor.email,
            "phone": doctor.phone,
            "specialty": doctor.specialty,
            "department": doctor.department,
            "qualification": doctor.qualification,
            "experience": doctor.experience,
            "bio": doctor.bio,
            "updated_at": Utc::now().to_rfc3339(),
        });
        self.supabase.update("users", id, patch).await?;
        Ok(())
    }
}
