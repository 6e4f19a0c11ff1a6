use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_appointments))
        .route(
            "/schedule",
            get(handlers::schedule_form).post(handlers::schedule_appointment),
        )
        .route("/view/{id}", get(handlers::view_appointment))
        .route(
            "/edit/{id}",
            get(handlers::edit_appointment_form).post(handlers::edit_appointment),
        )
        .route("/cancel/{id}", get(handlers::cancel_appointment))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
