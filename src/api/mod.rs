pub mod dto;
pub mod errors;
pub mod handlers;

use axum::{
    http::{header, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::coordinator::Coordinator;
use handlers::ApiDoc;

pub fn router(coordinator: Coordinator) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        // Sensor board and lamp controller
        .route("/update", post(handlers::ingest_telemetry))
        .route("/api/lamps/commands", get(handlers::get_lamp_commands))
        .route("/api/esp2/state", get(handlers::get_device_state))
        // Access control
        .route("/api/auth/card", post(handlers::authorize_card))
        .route(
            "/api/security/cards",
            get(handlers::list_cards).post(handlers::add_card),
        )
        .route("/api/security/cards/{uid}", delete(handlers::remove_card))
        // Read views
        .route("/api/status", get(handlers::get_status))
        .route("/api/solar-panel", get(handlers::get_solar_panel))
        .route("/api/export", get(handlers::export_report))
        // Lamps
        .route("/api/lamp/{id}/toggle", post(handlers::toggle_lamp))
        .route("/api/lamp/{id}/state", post(handlers::set_lamp_state))
        .route("/api/lamp/{id}/timer", post(handlers::set_lamp_timer))
        .route("/api/lamp/{id}/auto", post(handlers::toggle_lamp_auto))
        .route("/api/lamps/all", post(handlers::set_all_lamps))
        // Relay
        .route("/api/toggle", post(handlers::toggle_relay))
        .route("/api/relay/on", post(handlers::relay_on))
        .route("/api/relay/off", post(handlers::relay_off))
        // Light strip
        .route("/api/ledstrip/config", get(handlers::get_light_strip))
        .route("/api/ledstrip/set", post(handlers::set_light_strip))
        .with_state(coordinator)
        .split_for_parts();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    router
        .route("/v3/time", get(handlers::get_time))
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
