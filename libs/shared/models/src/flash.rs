use axum::{
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Category of a transient status message, mirrored into the page layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Info,
    Warning,
    Danger,
}

/// A one-shot status message attached to a redirect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Warning,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Danger,
            message: message.into(),
        }
    }
}

/// Redirect outcome: 303 plus the flash for the next page. Page rendering
/// itself lives outside this core; the body carries everything the page
/// layer needs.
pub fn redirect(location: &str, flash: Flash) -> Response {
    (
        StatusCode::SEE_OTHER,
        [(LOCATION, location.to_string())],
        Json(json!({ "redirect": location, "flash": flash })),
    )
        .into_response()
}

/// Redirect without a status message.
pub fn redirect_silent(location: &str) -> Response {
    (
        StatusCode::SEE_OTHER,
        [(LOCATION, location.to_string())],
        Json(json!({ "redirect": location })),
    )
        .into_response()
}

/// A rendered page or prefilled form (GET outcomes).
pub fn page(body: Value) -> Response {
    Json(body).into_response()
}

/// Page render that also surfaces an error banner, for list views that
/// must come up even when the backing query failed.
pub fn page_with_flash(body: Value, flash: Flash) -> Response {
    let mut body = body;
    if let Value::Object(ref mut map) = body {
        map.insert("flash".to_string(), json!(flash));
    }
    Json(body).into_response()
}

/// Re-rendered form: submitted values retained, field errors attached.
pub fn form_errors<E: Serialize>(values: Value, errors: &E) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "values": values, "errors": errors })),
    )
        .into_response()
}
