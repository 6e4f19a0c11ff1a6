use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use shared_config::AppConfig;
use shared_database::supabase::{Filter, SelectOptions, SupabaseClient};
use shared_models::auth::Identity;
use shared_models::error::AppError;

use crate::jwt::validate_token;

fn bearer_token(request: &Request<Body>) -> Result<String, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    if !auth_value.starts_with("Bearer ") {
        return Err(AppError::Auth("Invalid authorization header format".to_string()));
    }

    Ok(auth_value[7..].to_string())
}

fn identity_from_row(row: &Value) -> Option<Identity> {
    Some(Identity {
        id: row.get("id")?.as_str()?.to_string(),
        email: row.get("email")?.as_str()?.to_string(),
        name: row
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        role: row
            .get("role")
            .and_then(Value::as_str)
            .unwrap_or("user")
            .to_string(),
        active: row.get("active").and_then(Value::as_bool).unwrap_or(true),
    })
}

/// Authentication middleware: validate the session token, then resolve
/// the matching `users` row into an `Identity`. Role and name live in the
/// application table, not in the token, so resolution always costs one
/// store round-trip.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)?;

    let claims = validate_token(&token, &config.supabase_jwt_secret).map_err(AppError::Auth)?;

    let supabase = SupabaseClient::new(&config);
    let rows = supabase
        .select(
            "users",
            &[Filter::eq("user_id", &claims.sub)],
            SelectOptions::new().limit(1),
        )
        .await
        .map_err(|e| AppError::Auth(format!("Could not resolve user: {}", e)))?;

    let identity = rows
        .first()
        .and_then(identity_from_row)
        .ok_or_else(|| AppError::Auth("User not found in database".to_string()))?;

    if !identity.active {
        return Err(AppError::Auth("Account is deactivated".to_string()));
    }

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
