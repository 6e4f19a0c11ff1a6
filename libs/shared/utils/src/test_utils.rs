use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::Identity;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-session-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            supabase_anon_key: "test-anon-key".to_string(),
            supabase_jwt_secret: self.jwt_secret.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestIdentity;

impl TestIdentity {
    pub fn with_role(role: &str) -> Identity {
        Identity {
            id: Uuid::new_v4().to_string(),
            email: format!("{}@hospital.example", role),
            name: format!("Test {}", role),
            role: role.to_string(),
            active: true,
        }
    }

    pub fn admin() -> Identity {
        Self::with_role("admin")
    }

    pub fn manager() -> Identity {
        Self::with_role("manager")
    }

    pub fn doctor() -> Identity {
        Self::with_role("doctor")
    }

    pub fn staff() -> Identity {
        Self::with_role("staff")
    }
}

pub struct SessionTestUtils;

impl SessionTestUtils {
    fn sign(secret: &str, header: &Value, claims: &Value) -> String {
        let header_b64 = URL_SAFE_NO_PAD.encode(header.to_string());
        let claims_b64 = URL_SAFE_NO_PAD.encode(claims.to_string());
        let signed_input = format!("{}.{}", header_b64, claims_b64);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(signed_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{}.{}", signed_input, signature)
    }

    /// A well-formed provider session token for the given provider user id.
    pub fn create_token(provider_user_id: &str, email: &str, secret: &str) -> String {
        let header = json!({ "alg": "HS256", "typ": "JWT" });
        let now = Utc::now();
        let claims = json!({
            "sub": provider_user_id,
            "email": email,
            "iat": now.timestamp(),
            "exp": (now + Duration::hours(24)).timestamp(),
        });
        Self::sign(secret, &header, &claims)
    }

    pub fn create_expired_token(provider_user_id: &str, email: &str, secret: &str) -> String {
        let header = json!({ "alg": "HS256", "typ": "JWT" });
        let past = Utc::now() - Duration::hours(2);
        let claims = json!({
            "sub": provider_user_id,
            "email": email,
            "iat": past.timestamp(),
            "exp": (past + Duration::hours(1)).timestamp(),
        });
        Self::sign(secret, &header, &claims)
    }

    pub fn create_invalid_signature_token(provider_user_id: &str, email: &str) -> String {
        Self::create_token(provider_user_id, email, "some-other-secret-entirely")
    }
}

/// Drain a handler response into its JSON body.
pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    serde_json::from_slice(&bytes).expect("JSON response body")
}

/// The Location header of a redirect outcome.
pub fn redirect_target(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get(axum::http::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Canned store rows for wiremock responses.
pub struct MockRows;

impl MockRows {
    pub fn user(id: &str, email: &str, name: &str, role: &str) -> Value {
        json!({
            "id": id,
            "user_id": Uuid::new_v4().to_string(),
            "email": email,
            "name": name,
            "role": role,
            "active": true,
            "created_at": "2024-01-15T09:00:00Z",
        })
    }

    pub fn patient(id: &str, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "email": "patient@example.com",
            "phone": "555-0101",
            "date_of_birth": "1980-06-02",
            "gender": "female",
            "blood_group": "O+",
            "address": "12 Harbour Road",
            "medical_history": null,
            "registered_by": Uuid::new_v4().to_string(),
        })
    }

    pub fn appointment(id: &str, patient_id: &str, doctor_id: &str, status: &str) -> Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "date": "2024-05-10",
            "time": "09:00",
            "reason": "Checkup",
            "status": status,
            "notes": null,
            "created_by": Uuid::new_v4().to_string(),
        })
    }

    pub fn invoice(id: &str, patient_id: &str, amount: f64, status: &str) -> Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "invoice_date": "2024-03-01",
            "due_date": "2024-03-31",
            "amount": amount,
            "status": status,
            "notes": null,
        })
    }

    pub fn medical_record(id: &str, patient_id: &str, doctor_id: &str, attachment_url: Option<&str>) -> Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "record_type": "consultation",
            "diagnosis": "Seasonal rhinitis",
            "treatment": "Antihistamines",
            "notes": null,
            "record_date": "2024-02-20",
            "attachment_url": attachment_url,
            "created_by": Uuid::new_v4().to_string(),
        })
    }
}
