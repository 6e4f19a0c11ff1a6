use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn settings_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::settings_index))
        .route(
            "/profile",
            get(handlers::profile_form).post(handlers::profile_submit),
        )
        .route("/system", get(handlers::system_settings))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
