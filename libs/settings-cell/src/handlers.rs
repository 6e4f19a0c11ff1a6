use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    response::Response,
    Form,
};
use serde_json::json;

use shared_config::AppConfig;
use shared_models::auth::Identity;
use shared_models::flash::{self, Flash};
use shared_utils::authorize::{permits, Action};

use crate::models::{SettingsError, SettingsForm};
use crate::service::SettingsService;

#[axum::debug_handler]
pub async fn settings_index(
    State(_config): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
) -> Response {
    flash::page(json!({
        "sections": ["profile", "system"],
        "identity": identity,
    }))
}

#[axum::debug_handler]
pub async fn profile_form(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
) -> Response {
    let service = SettingsService::new(&config);
    match service.get_profile(&identity.id).await {
        Ok(user) => flash::page(json!({
            "form": {
                "name": user.get("name"),
                "email": user.get("email"),
                "phone": user.get("phone"),
            },
        })),
        Err(err) => flash::page_with_flash(
            json!({ "form": {} }),
            Flash::danger(format!("Error loading profile data: {}", err)),
        ),
    }
}

/// One route, two forms: `form_type` picks profile update or password
/// change.
#[axum::debug_handler]
pub async fn profile_submit(
    State(config): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
    Form(form): Form<SettingsForm>,
) -> Response {
    match form.form_type.as_str() {
        "profile" => update_profile(&config, &identity, form).await,
        "password" => change_password(&config, &identity, form).await,
        other => flash::redirect(
            "/settings/profile",
            Flash::danger(format!("Unknown settings form: {}", other)),
        ),
    }
}

async fn update_profile(config: &AppConfig, identity: &Identity, form: SettingsForm) -> Response {
    let validated = match form.validate_profile() {
        Ok(validated) => validated,
        Err(errors) => {
            return flash::form_errors(
                json!({ "name": form.name, "email": form.email, "phone": form.phone }),
                &errors,
            );
        }
    };

    let service = SettingsService::new(config);
    match service.update_profile(identity, validated).await {
        Ok(()) => flash::redirect("/settings/profile", Flash::success("Profile updated successfully!")),
        Err(err) => flash::redirect(
            "/settings/profile",
            Flash::danger(format!("Error updating profile: {}", err)),
        ),
    }
}

async fn change_password(config: &AppConfig, identity: &Identity, form: SettingsForm) -> Response {
    let validated = match form.validate_password() {
        Ok(validated) => validated,
        Err(errors) => return flash::form_errors(json!({}), &errors),
    };

    let service = SettingsService::new(config);
    match service.change_password(identity, validated).await {
        Ok(()) => flash::redirect("/settings/profile", Flash::success("Password changed successfully!")),
        Err(SettingsError::InvalidCurrentPassword) => flash::redirect(
            "/settings/profile",
            Flash::danger("Current password is incorrect."),
        ),
        Err(err) => flash::redirect(
            "/settings/profile",
            Flash::danger(format!("Error changing password: {}", err)),
        ),
    }
}

/// Admin-only; everyone else is bounced to the dashboard with a warning.
#[axum::debug_handler]
pub async fn system_settings(
    State(_config): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
) -> Response {
    if !permits(Action::ManageSystemSettings, &identity) {
        return flash::redirect(
            "/dashboard",
            Flash::warning("You do not have permission to access system settings."),
        );
    }
    flash::page(json!({ "system": {} }))
}
