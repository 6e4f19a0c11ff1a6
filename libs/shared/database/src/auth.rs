use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use shared_config::AppConfig;

/// Identity-provider adapter. Sign-in/sign-up/sign-out plus the admin
/// endpoints used for staff provisioning and credential updates.
pub struct AuthClient {
    client: Client,
    base_url: String,
    service_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: ProviderUser,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The provider rejected sign-in because the address was never
    /// confirmed; surfaced as its own user-facing message.
    #[error("Email not confirmed")]
    EmailNotConfirmed,

    #[error("{0}")]
    InvalidCredentials(String),

    #[error("{0}")]
    Provider(String),
}

#[derive(Debug, Clone, Default)]
pub struct AdminUserPatch {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl AdminUserPatch {
    fn into_body(self) -> Value {
        let mut body = serde_json::Map::new();
        if let Some(email) = self.email {
            body.insert("email".to_string(), json!(email));
        }
        if let Some(password) = self.password {
            body.insert("password".to_string(), json!(password));
        }
        Value::Object(body)
    }
}

impl AuthClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            service_key: config.supabase_service_key.clone(),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(key) = HeaderValue::from_str(&self.service_key) {
            headers.insert("apikey", key);
        }
        if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {}", self.service_key)) {
            headers.insert(AUTHORIZATION, bearer);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    async fn send(&self, method: Method, path: &str, body: Value) -> Result<Value, AuthError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("auth request {} {}", method, url);

        let response = self
            .client
            .request(method, &url)
            .headers(self.headers())
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;
        if !status.is_success() {
            // The provider reports unconfirmed addresses in the error text.
            if text.contains("Email not confirmed") {
                return Err(AuthError::EmailNotConfirmed);
            }
            if status.as_u16() == 400 || status.as_u16() == 401 {
                return Err(AuthError::InvalidCredentials(text));
            }
            return Err(AuthError::Provider(text));
        }
        serde_json::from_str(&text).map_err(|e| AuthError::Provider(e.to_string()))
    }

    /// Password sign-in; on success the returned session token is handed
    /// to the page layer as the caller's session.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let body = json!({ "email": email, "password": password });
        let value = self
            .send(Method::POST, "/auth/v1/token?grant_type=password", body)
            .await?;
        serde_json::from_value(value).map_err(|e| AuthError::Provider(e.to_string()))
    }

    /// Self-service registration. The provider sends its own confirmation
    /// mail; the caller still has to insert the application user row.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<ProviderUser, AuthError> {
        let body = json!({ "email": email, "password": password });
        let value = self.send(Method::POST, "/auth/v1/signup", body).await?;
        // Sign-up responses nest the user when a session is issued.
        let user_value = value.get("user").cloned().unwrap_or(value);
        serde_json::from_value(user_value).map_err(|e| AuthError::Provider(e.to_string()))
    }

    /// Best-effort session invalidation: provider-side failure is logged
    /// and swallowed, the local session ends regardless.
    pub async fn sign_out(&self, token: &str) {
        let url = format!("{}/auth/v1/logout", self.base_url);
        let mut headers = self.headers();
        if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {}", token)) {
            headers.insert(AUTHORIZATION, bearer);
        }
        let result = self.client.post(&url).headers(headers).send().await;
        match result {
            Ok(response) if !response.status().is_success() => {
                warn!("provider sign-out failed with status {}", response.status());
            }
            Err(err) => warn!("provider sign-out failed: {}", err),
            _ => {}
        }
    }

    /// Provision an account on behalf of a staff member (doctor
    /// onboarding); `email_confirm` skips the confirmation mail.
    pub async fn admin_create_user(
        &self,
        email: &str,
        password: &str,
        email_confirm: bool,
    ) -> Result<ProviderUser, AuthError> {
        let body = json!({
            "email": email,
            "password": password,
            "email_confirm": email_confirm,
        });
        let value = self.send(Method::POST, "/auth/v1/admin/users", body).await?;
        serde_json::from_value(value).map_err(|e| AuthError::Provider(e.to_string()))
    }

    /// Update provider-held attributes (email, password) for a user.
    pub async fn admin_update_user(
        &self,
        user_id: &str,
        patch: AdminUserPatch,
    ) -> Result<(), AuthError> {
        let path = format!("/auth/v1/admin/users/{}", user_id);
        self.send(Method::PUT, &path, patch.into_body()).await?;
        Ok(())
    }
}
