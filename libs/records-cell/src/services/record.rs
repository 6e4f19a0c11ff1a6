use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::storage::StorageClient;
use shared_database::supabase::{Filter, SelectOptions, SupabaseClient};
use shared_forms::Choice;
use shared_utils::filename::sanitize_filename;

use crate::models::{AttachmentUpload, MedicalRecord, RecordError, ValidatedRecord};

pub const ATTACHMENT_BUCKET: &str = "medical-attachments";

const LIST_EXPAND: &str = "*, patients(name), users!doctor_id(name)";
const VIEW_EXPAND: &str = "*, patients(name, email, phone), users!doctor_id(name)";
const PATIENT_EXPAND: &str = "*, users!doctor_id(name)";

pub struct RecordService {
    supabase: SupabaseClient,
    storage: StorageClient,
}

impl RecordService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            storage: StorageClient::new(config),
        }
    }

    pub async fn list(&self) -> Result<Vec<Value>, RecordError> {
        let rows = self
            .supabase
            .select(
                "medical_records",
                &[],
                SelectOptions::new()
                    .expand(LIST_EXPAND)
                    .order_desc("record_date"),
            )
            .await?;
        Ok(rows)
    }

    pub async fn doctor_choices(&self) -> Result<Vec<Choice>, RecordError> {
        let rows = self
            .supabase
            .select(
                "users",
                &[Filter::eq("role", "doctor")],
                SelectOptions::new().expand("id, name"),
            )
            .await?;
        Ok(choices_from_rows(rows))
    }

    pub async fn patient_choices(&self) -> Result<Vec<Choice>, RecordError> {
        let rows = self
            .supabase
            .select("patients", &[], SelectOptions::new().expand("id, name"))
            .await?;
        Ok(choices_from_rows(rows))
    }

    pub async fn patient_context(&self, patient_id: &str) -> Result<Option<Value>, RecordError> {
        let row = self.supabase.find_by_id("patients", patient_id, None).await?;
        Ok(row)
    }

    /// Push the submitted file to the blob store under a
    /// collision-resistant name and return its public URL. The caller
    /// inserts the row afterwards; if that insert fails the blob stays
    /// behind unreferenced.
    pub async fn store_attachment(
        &self,
        attachment: &AttachmentUpload,
    ) -> Result<String, RecordError> {
        let object = format!(
            "{}_{}",
            Uuid::new_v4(),
            sanitize_filename(&attachment.original_name)
        );
        debug!("uploading attachment as {}", object);
        self.storage
            .upload(
                ATTACHMENT_BUCKET,
                &object,
                attachment.bytes.clone(),
                attachment.content_type(),
            )
            .await?;
        Ok(self.storage.public_url(ATTACHMENT_BUCKET, &object))
    }

    pub async fn create(
        &self,
        record: ValidatedRecord,
        attachment_url: Option<String>,
        created_by: &str,
    ) -> Result<Value, RecordError> {
        debug!("creating medical record for patient {}", record.patient_id);
        let row = json!({
            "patient_id": record.patient_id,
            "doctor_id": record.doctor_id,
            "record_type": record.record_type,
            "diagnosis": record.diagnosis,
            "treatment": record.treatment,
            "notes": record.notes,
            "record_date": record.record_date.format("%Y-%m-%d").to_string(),
            "attachment_url": attachment_url,
            "created_by": created_by,
            "created_at": Utc::now().to_rfc3339(),
        });
        let created = self.supabase.insert("medical_records", row).await?;
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> Result<Value, RecordError> {
        self.supabase
            .find_by_id("medical_records", id, Some(VIEW_EXPAND))
            .await?
            .ok_or(RecordError::NotFound)
    }

    pub async fn get_typed(&self, id: &str) -> Result<MedicalRecord, RecordError> {
        let row = self
            .supabase
            .find_by_id("medical_records", id, None)
            .await?
            .ok_or(RecordError::NotFound)?;
        serde_json::from_value(row).map_err(|e| RecordError::Database(e.to_string()))
    }

    pub async fn list_for_patient(&self, patient_id: &str) -> Result<Vec<Value>, RecordError> {
        let rows = self
            .supabase
            .select(
                "medical_records",
                &[Filter::eq("patient_id", patient_id)],
                SelectOptions::new()
                    .expand(PATIENT_EXPAND)
                    .order_desc("record_date"),
            )
            .await?;
        Ok(rows)
    }

    pub async fn update(
        &self,
        id: &str,
        record: ValidatedRecord,
        attachment_url: Option<String>,
        updated_by: &str,
    ) -> Result<(), RecordError> {
        debug!("updating medical record {}", id);
        let patch = json!({
            "doctor_id": record.doctor_id,
            "record_type": record.record_type,
            "diagnosis": record.diagnosis,
            "treatment": record.treatment,
            "notes": record.notes,
            "record_date": record.record_date.format("%Y-%m-%d").to_string(),
            "attachment_url": attachment_url,
            "updated_by": updated_by,
            "updated_at": Utc::now().to_rfc3339(),
        });
        self.supabase.update("medical_records", id, patch).await?;
        Ok(())
    }

    /// Delete the record. Its blob is removed first, best-effort: a blob
    /// that is already gone never blocks the row delete.
    pub async fn delete(&self, id: &str) -> Result<(), RecordError> {
        let record = self.get_typed(id).await?;

        if let Some(object) = record.attachment_object() {
            self.storage.remove(ATTACHMENT_BUCKET, object).await;
        }

        self.supabase.delete("medical_records", id).await?;
        Ok(())
    }
}

fn choices_from_rows(rows: Vec<Value>) -> Vec<Choice> {
    rows.iter()
        .filter_map(|row| {
            Some(Choice::new(
                row.get("id")?.as_str()?,
                row.get("name")?.as_str()?,
            ))
        })
        .collect()
}
