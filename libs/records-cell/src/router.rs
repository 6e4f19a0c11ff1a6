use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn record_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_records))
        .route("/add", get(handlers::add_record_form).post(handlers::add_record))
        .route("/view/{id}", get(handlers::view_record))
        .route("/patient/{patient_id}", get(handlers::patient_records))
        .route("/edit/{id}", get(handlers::edit_record_form).post(handlers::edit_record))
        .route("/delete/{id}", get(handlers::delete_record))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
