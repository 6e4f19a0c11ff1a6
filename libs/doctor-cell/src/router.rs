use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn doctor_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_doctors))
        .route("/add", get(handlers::add_doctor_form).post(handlers::add_doctor))
        .route("/view/{id}", get(handlers::view_doctor))
        .route("/edit/{id}", get(handlers::edit_doctor_form).post(handlers::edit_doctor))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
