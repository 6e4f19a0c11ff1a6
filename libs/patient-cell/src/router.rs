use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn patient_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_patients))
        .route("/add", get(handlers::add_patient_form).post(handlers::add_patient))
        .route("/view/{id}", get(handlers::view_patient))
        .route("/edit/{id}", get(handlers::edit_patient_form).post(handlers::edit_patient))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
