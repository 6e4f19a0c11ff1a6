use std::sync::Arc;

use axum::{
    routing::get,
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn auth_routes(state: Arc<AppConfig>) -> Router {
    // Sign-in, registration and logout are reachable without a session.
    Router::new()
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route("/register", get(handlers::register_form).post(handlers::register))
        .route("/logout", get(handlers::logout))
        .with_state(state)
}
