use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shared_forms::{self as forms, Choice, FormErrors};

pub const RECORD_TYPES: [&str; 7] = [
    "consultation",
    "lab_test",
    "prescription",
    "imaging",
    "surgery",
    "discharge",
    "other",
];

pub const ALLOWED_ATTACHMENT_EXTENSIONS: [&str; 5] = ["jpg", "png", "pdf", "doc", "docx"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub record_type: String,
    pub diagnosis: String,
    pub treatment: String,
    pub notes: Option<String>,
    pub record_date: NaiveDate,
    pub attachment_url: Option<String>,
    pub created_by: Option<String>,
}

impl MedicalRecord {
    /// Object name in the blob store, derived from the stored URL's final
    /// path segment.
    pub fn attachment_object(&self) -> Option<&str> {
        self.attachment_url
            .as_deref()
            .and_then(|url| url.rsplit('/').next())
            .filter(|name| !name.is_empty())
    }
}

/// A decoded file submission, ready for the blob store.
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

impl AttachmentUpload {
    pub fn content_type(&self) -> &'static str {
        let ext = self
            .original_name
            .rsplit('.')
            .next()
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "pdf" => "application/pdf",
            "doc" => "application/msword",
            "docx" => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            _ => "application/octet-stream",
        }
    }
}

/// Attachments travel as a base64 payload plus the original filename.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalRecordForm {
    pub patient_id: String,
    pub doctor_id: String,
    pub record_type: String,
    pub diagnosis: String,
    pub treatment: String,
    pub notes: String,
    pub record_date: String,
    pub attachment_name: String,
    pub attachment_data: String,
}

#[derive(Debug, Clone)]
pub struct ValidatedRecord {
    pub patient_id: String,
    pub doctor_id: String,
    pub record_type: String,
    pub diagnosis: String,
    pub treatment: String,
    pub notes: Option<String>,
    pub record_date: NaiveDate,
    pub attachment: Option<AttachmentUpload>,
}

impl MedicalRecordForm {
    pub fn validate(
        &self,
        patients: &[Choice],
        doctors: &[Choice],
    ) -> Result<ValidatedRecord, FormErrors> {
        let mut errors = FormErrors::new();
        forms::required("patient_id", &self.patient_id, &mut errors);
        forms::member_of("patient_id", &self.patient_id, patients, &mut errors);
        forms::required("doctor_id", &self.doctor_id, &mut errors);
        forms::member_of("doctor_id", &self.doctor_id, doctors, &mut errors);
        forms::required("record_type", &self.record_type, &mut errors);
        forms::one_of("record_type", &self.record_type, &RECORD_TYPES, &mut errors);
        forms::required("diagnosis", &self.diagnosis, &mut errors);
        forms::required("treatment", &self.treatment, &mut errors);
        forms::required("record_date", &self.record_date, &mut errors);
        let record_date = forms::parse_date("record_date", &self.record_date, &mut errors);

        let attachment = self.decode_attachment(&mut errors);

        let Some(record_date) = record_date else {
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ValidatedRecord {
            patient_id: self.patient_id.clone(),
            doctor_id: self.doctor_id.clone(),
            record_type: self.record_type.clone(),
            diagnosis: self.diagnosis.trim().to_string(),
            treatment: self.treatment.trim().to_string(),
            notes: forms::optional_text(&self.notes),
            record_date,
            attachment,
        })
    }

    fn decode_attachment(&self, errors: &mut FormErrors) -> Option<AttachmentUpload> {
        if self.attachment_data.is_empty() {
            return None;
        }

        forms::allowed_extension(
            "attachments",
            &self.attachment_name,
            &ALLOWED_ATTACHMENT_EXTENSIONS,
            "Images and documents only!",
            errors,
        );
        if errors.has("attachments") {
            return None;
        }

        // Strip a data-URL prefix when the page layer sends one.
        let payload = self
            .attachment_data
            .split(";base64,")
            .nth(1)
            .unwrap_or(&self.attachment_data);
        match BASE64.decode(payload) {
            Ok(bytes) => Some(AttachmentUpload {
                original_name: self.attachment_name.clone(),
                bytes,
            }),
            Err(_) => {
                errors.add("attachments", "Could not decode the uploaded file.");
                None
            }
        }
    }

    pub fn from_record(record: &MedicalRecord) -> Self {
        Self {
            patient_id: record.patient_id.clone(),
            doctor_id: record.doctor_id.clone(),
            record_type: record.record_type.clone(),
            diagnosis: record.diagnosis.clone(),
            treatment: record.treatment.clone(),
            notes: record.notes.clone().unwrap_or_default(),
            record_date: record.record_date.format("%Y-%m-%d").to_string(),
            attachment_name: String::new(),
            attachment_data: String::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Medical record not found")]
    NotFound,

    #[error("{0}")]
    Database(String),
}

impl From<shared_models::error::RemoteError> for RecordError {
    fn from(err: shared_models::error::RemoteError) -> Self {
        RecordError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patients() -> Vec<Choice> {
        vec![Choice::new("p1", "Maeve Lynch")]
    }

    fn doctors() -> Vec<Choice> {
        vec![Choice::new("d1", "Dr. Adams")]
    }

    fn valid_form() -> MedicalRecordForm {
        MedicalRecordForm {
            patient_id: "p1".to_string(),
            doctor_id: "d1".to_string(),
            record_type: "consultation".to_string(),
            diagnosis: "Seasonal rhinitis".to_string(),
            treatment: "Antihistamines".to_string(),
            notes: String::new(),
            record_date: "2024-02-20".to_string(),
            attachment_name: String::new(),
            attachment_data: String::new(),
        }
    }

    #[test]
    fn accepts_record_without_attachment() {
        let validated = valid_form().validate(&patients(), &doctors()).unwrap();
        assert!(validated.attachment.is_none());
    }

    #[test]
    fn decodes_base64_attachment() {
        let mut form = valid_form();
        form.attachment_name = "scan.pdf".to_string();
        form.attachment_data = BASE64.encode(b"%PDF-1.4 test");
        let validated = form.validate(&patients(), &doctors()).unwrap();
        let attachment = validated.attachment.unwrap();
        assert_eq!(attachment.original_name, "scan.pdf");
        assert_eq!(attachment.bytes, b"%PDF-1.4 test");
        assert_eq!(attachment.content_type(), "application/pdf");
    }

    #[test]
    fn rejects_disallowed_extension() {
        let mut form = valid_form();
        form.attachment_name = "malware.exe".to_string();
        form.attachment_data = BASE64.encode(b"MZ");
        let errors = form.validate(&patients(), &doctors()).unwrap_err();
        assert_eq!(
            errors.field("attachments").unwrap()[0],
            "Images and documents only!"
        );
    }

    #[test]
    fn dropdowns_check_fetched_sets() {
        let mut form = valid_form();
        form.patient_id = "p9".to_string();
        let errors = form.validate(&patients(), &doctors()).unwrap_err();
        assert!(errors.has("patient_id"));
    }

    #[test]
    fn attachment_object_is_final_url_segment() {
        let record = MedicalRecord {
            id: "r1".to_string(),
            patient_id: "p1".to_string(),
            doctor_id: "d1".to_string(),
            record_type: "imaging".to_string(),
            diagnosis: "x".to_string(),
            treatment: "y".to_string(),
            notes: None,
            record_date: NaiveDate::from_ymd_opt(2024, 2, 20).unwrap(),
            attachment_url: Some(
                "http://store.example/storage/v1/object/public/medical-attachments/abc_scan.pdf"
                    .to_string(),
            ),
            created_by: None,
        };
        assert_eq!(record.attachment_object(), Some("abc_scan.pdf"));
    }
}
