use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::auth::{AuthClient, AuthError};
use shared_database::supabase::{Filter, SelectOptions, SupabaseClient};
use shared_models::flash::{self, Flash};

use crate::models::{LoginForm, RegisterForm, ROLES};

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[axum::debug_handler]
pub async fn login_form() -> Response {
    flash::page(json!({
        "form": LoginForm::default(),
    }))
}

/// Sign in against the identity provider, then resolve the application
/// user row by email; the provider's own record does not carry role or
/// name. The issued session token rides along in the redirect body.
#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<LoginQuery>,
    Form(form): Form<LoginForm>,
) -> Response {
    if let Err(errors) = form.validate() {
        return flash::form_errors(json!({ "email": form.email, "remember_me": form.remember_me }), &errors);
    }

    let auth = AuthClient::new(&config);
    let session = match auth.sign_in(form.email.trim(), &form.password).await {
        Ok(session) => session,
        Err(AuthError::EmailNotConfirmed) => {
            return flash::page_with_flash(
                json!({ "form": { "email": form.email, "remember_me": form.remember_me } }),
                Flash::warning(
                    "Please confirm your email address before logging in. \
                     Check your inbox for a confirmation link.",
                ),
            );
        }
        Err(err) => {
            return flash::page_with_flash(
                json!({ "form": { "email": form.email, "remember_me": form.remember_me } }),
                Flash::danger(format!("Login error: {}", err)),
            );
        }
    };

    let supabase = SupabaseClient::new(&config);
    let rows = match supabase
        .select(
            "users",
            &[Filter::eq("email", form.email.trim())],
            SelectOptions::new().limit(1),
        )
        .await
    {
        Ok(rows) => rows,
        Err(err) => {
            return flash::page_with_flash(
                json!({ "form": { "email": form.email, "remember_me": form.remember_me } }),
                Flash::danger(format!("Login error: {}", err)),
            );
        }
    };

    let Some(user) = rows.first() else {
        return flash::page_with_flash(
            json!({ "form": { "email": form.email, "remember_me": form.remember_me } }),
            Flash::danger("User not found in database."),
        );
    };

    debug!("login succeeded for {}", form.email.trim());
    let destination = query.next.unwrap_or_else(|| "/dashboard".to_string());
    (
        StatusCode::SEE_OTHER,
        [(LOCATION, destination.clone())],
        Json(json!({
            "redirect": destination,
            "flash": Flash::success("Logged in successfully."),
            "session": {
                "access_token": session.access_token,
                "remember": form.remember_me,
            },
            "user": user,
        })),
    )
        .into_response()
}

#[axum::debug_handler]
pub async fn register_form() -> Response {
    flash::page(json!({
        "form": RegisterForm::default(),
        "roles": ROLES,
    }))
}

/// Register a new staff account: duplicate check against the users
/// collection, provider sign-up, then the application user row. The two
/// writes are independent; a row-insert failure after sign-up is
/// reported, not compensated.
#[axum::debug_handler]
pub async fn register(
    State(config): State<Arc<AppConfig>>,
    Form(form): Form<RegisterForm>,
) -> Response {
    let retained = json!({
        "name": &form.name,
        "email": &form.email,
        "role": &form.role,
    });

    let validated = match form.validate() {
        Ok(validated) => validated,
        Err(errors) => return flash::form_errors(retained, &errors),
    };

    let supabase = SupabaseClient::new(&config);
    match supabase
        .select(
            "users",
            &[Filter::eq("email", &validated.email)],
            SelectOptions::new().limit(1),
        )
        .await
    {
        Ok(rows) if !rows.is_empty() => {
            return flash::page_with_flash(
                json!({ "form": retained }),
                Flash::danger("Email already registered."),
            );
        }
        Ok(_) => {}
        Err(err) => {
            return flash::page_with_flash(
                json!({ "form": retained }),
                Flash::danger(format!("Registration error: {}", err)),
            );
        }
    }

    let auth = AuthClient::new(&config);
    let provider_user = match auth.sign_up(&validated.email, &validated.password).await {
        Ok(user) => user,
        Err(err) => {
            return flash::page_with_flash(
                json!({ "form": retained }),
                Flash::danger(format!("Registration error: {}", err)),
            );
        }
    };

    let user_row = json!({
        "user_id": provider_user.id,
        "email": validated.email,
        "name": validated.name,
        "role": validated.role,
    });
    if let Err(err) = supabase.insert("users", user_row).await {
        return flash::page_with_flash(
            json!({ "form": retained }),
            Flash::danger(format!("Registration error: {}", err)),
        );
    }

    flash::redirect(
        "/auth/login",
        Flash::success(
            "Registration successful! Please check your email to confirm \
             your account before logging in.",
        ),
    )
}

/// End the session. Provider-side sign-out is best-effort; its failure
/// never blocks the logout.
#[axum::debug_handler]
pub async fn logout(
    State(config): State<Arc<AppConfig>>,
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
) -> Response {
    if let Some(TypedHeader(auth_header)) = auth_header {
        let auth = AuthClient::new(&config);
        auth.sign_out(auth_header.token()).await;
    } else {
        warn!("logout without a session token; nothing to invalidate");
    }

    flash::redirect("/auth/login", Flash::info("You have been logged out."))
}
