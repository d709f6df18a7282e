pub mod config;
pub mod handler;
pub mod ingest;
pub mod service;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use service::RateService;

/// Build the HTTP router over `service`
pub fn router(service: Arc<RateService>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/",
            get(handler::live_rates).post(handler::register_webhook),
        )
        .route("/latest", post(handler::latest_rate))
        .route("/average", post(handler::average_rate))
        .route("/evaluationtrigger", post(handler::evaluate_trigger))
        .route(
            "/:id",
            get(handler::get_webhook).delete(handler::delete_webhook),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(service)
}
