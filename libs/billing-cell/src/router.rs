use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn billing_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_invoices))
        .route(
            "/create",
            get(handlers::create_invoice_form).post(handlers::create_invoice),
        )
        .route("/view/{id}", get(handlers::view_invoice))
        .route(
            "/edit/{id}",
            get(handlers::edit_invoice_form).post(handlers::edit_invoice),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
