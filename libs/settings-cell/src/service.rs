use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::auth::{AdminUserPatch, AuthClient};
use shared_database::supabase::SupabaseClient;
use shared_models::auth::Identity;

use crate::models::{SettingsError, ValidatedPasswordChange, ValidatedProfile};

pub struct SettingsService {
    supabase: SupabaseClient,
    auth: AuthClient,
}

impl SettingsService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            auth: AuthClient::new(config),
        }
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Value, SettingsError> {
        self.supabase
            .find_by_id("users", user_id, None)
            .await?
            .ok_or(SettingsError::NotFound)
    }

    /// The provider-side account reference stored on the users row; admin
    /// credential updates address that account, not the row id.
    async fn provider_ref(&self, user_id: &str) -> Result<String, SettingsError> {
        let row = self.get_profile(user_id).await?;
        row.get("user_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(SettingsError::NotFound)
    }

    /// Update name/phone, and the email both provider-side and in the row
    /// when it changed. The provider call and the row write are ordered,
    /// independent steps: an email already updated at the provider is not
    /// rolled back if the row write fails.
    pub async fn update_profile(
        &self,
        identity: &Identity,
        profile: ValidatedProfile,
    ) -> Result<(), SettingsError> {
        let mut patch = serde_json::Map::new();
        patch.insert("name".to_string(), json!(profile.name));
        patch.insert("phone".to_string(), json!(profile.phone));
        patch.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        if profile.email != identity.email {
            debug!("updating provider email for user {}", identity.id);
            let provider_ref = self.provider_ref(&identity.id).await?;
            self.auth
                .admin_update_user(
                    &provider_ref,
                    AdminUserPatch {
                        email: Some(profile.email.clone()),
                        ..Default::default()
                    },
                )
                .await
                .map_err(|e| SettingsError::Provider(e.to_string()))?;
            patch.insert("email".to_string(), json!(profile.email));
        }

        self.supabase
            .update("users", &identity.id, Value::Object(patch))
            .await?;
        Ok(())
    }

    /// Change the password after re-authenticating with the current one.
    /// A failed re-authentication leaves the stored password untouched.
    pub async fn change_password(
        &self,
        identity: &Identity,
        change: ValidatedPasswordChange,
    ) -> Result<(), SettingsError> {
        if self
            .auth
            .sign_in(&identity.email, &change.current_password)
            .await
            .is_err()
        {
            return Err(SettingsError::InvalidCurrentPassword);
        }

        let provider_ref = self.provider_ref(&identity.id).await?;
        self.auth
            .admin_update_user(
                &provider_ref,
                AdminUserPatch {
                    password: Some(change.new_password),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| SettingsError::Provider(e.to_string()))?;
        Ok(())
    }
}
