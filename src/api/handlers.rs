use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Local;
use utoipa::OpenApi;

use super::{
    dto::{
        CardAuthRequest, CardAuthResponse, LampCommandsResponse, LampStateRequest,
        LampTimerRequest, StatusResponse, TimeResponse,
    },
    errors::AppError,
};
use crate::{
    coordinator::Coordinator,
    export,
    models::{
        Card, ChartPoint, CityForecast, CommandView, DayForecast, DeviceStateView, LightStrip,
        SensorData, SensorSummary, SolarPanel, StatusView, WeatherForecast,
    },
};

/// Resolve the `{id}` path segment. A non-numeric id is malformed input; a
/// negative one is simply out of range and maps to `None`.
fn lamp_index(path: Result<Path<i64>, PathRejection>) -> Result<Option<usize>, AppError> {
    let Path(id) = path?;
    Ok(usize::try_from(id).ok())
}

// ---------------------------------------------------------------------------
// Sensor board
// ---------------------------------------------------------------------------

/// Ingest one telemetry report; the response carries the board's commands.
#[utoipa::path(
    post,
    path = "/update",
    request_body = SensorData,
    responses(
        (status = 200, description = "Telemetry stored; commands for the board", body = CommandView),
        (status = 400, description = "Malformed telemetry"),
    ),
    tag = "devices"
)]
pub async fn ingest_telemetry(
    State(hub): State<Coordinator>,
    payload: Result<Json<SensorData>, JsonRejection>,
) -> Result<Json<CommandView>, AppError> {
    let Json(data) = payload?;
    Ok(Json(hub.apply_telemetry(data).await))
}

/// Check an RFID card against the allow-list.
#[utoipa::path(
    post,
    path = "/api/auth/card",
    request_body = CardAuthRequest,
    responses(
        (status = 200, description = "Access granted", body = CardAuthResponse),
        (status = 403, description = "Access denied", body = CardAuthResponse),
        (status = 400, description = "Malformed request"),
    ),
    tag = "security"
)]
pub async fn authorize_card(
    State(hub): State<Coordinator>,
    payload: Result<Json<CardAuthRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let resp = if hub.authorize_card(&req.card_uid).await {
        (StatusCode::OK, Json(CardAuthResponse::granted()))
    } else {
        (StatusCode::FORBIDDEN, Json(CardAuthResponse::denied()))
    };
    Ok(resp)
}

// ---------------------------------------------------------------------------
// Card management
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/security/cards",
    responses((status = 200, description = "Enrolled cards", body = Vec<Card>)),
    tag = "security"
)]
pub async fn list_cards(State(hub): State<Coordinator>) -> Json<Vec<Card>> {
    Json(hub.list_cards().await)
}

/// Enroll a card. A uid that is already enrolled is left as is.
#[utoipa::path(
    post,
    path = "/api/security/cards",
    request_body = Card,
    responses(
        (status = 200, description = "Card enrolled (or already present)", body = StatusResponse),
        (status = 400, description = "Malformed card"),
    ),
    tag = "security"
)]
pub async fn add_card(
    State(hub): State<Coordinator>,
    payload: Result<Json<Card>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let Json(card) = payload?;
    if card.uid.trim().is_empty() {
        return Err(AppError::InvalidData("card uid must not be empty"));
    }
    hub.add_card(card).await;
    Ok(Json(StatusResponse::ok()))
}

#[utoipa::path(
    delete,
    path = "/api/security/cards/{uid}",
    params(("uid" = String, Path, description = "Card identifier")),
    responses((status = 200, description = "Card removed (or was absent)", body = StatusResponse)),
    tag = "security"
)]
pub async fn remove_card(
    State(hub): State<Coordinator>,
    Path(uid): Path<String>,
) -> Json<StatusResponse> {
    hub.remove_card(&uid).await;
    Json(StatusResponse::ok())
}

// ---------------------------------------------------------------------------
// Read views
// ---------------------------------------------------------------------------

/// Everything the dashboard shows, read in one consistent snapshot.
#[utoipa::path(
    get,
    path = "/api/status",
    responses((status = 200, description = "Hub status", body = StatusView)),
    tag = "status"
)]
pub async fn get_status(State(hub): State<Coordinator>) -> impl IntoResponse {
    let view = hub.snapshot().await;
    ([(header::CACHE_CONTROL, "public, max-age=5")], Json(view))
}

#[utoipa::path(
    get,
    path = "/api/solar-panel",
    responses((status = 200, description = "Solar panel readings", body = SolarPanel)),
    tag = "status"
)]
pub async fn get_solar_panel(State(hub): State<Coordinator>) -> impl IntoResponse {
    let solar = hub.solar_panel().await;
    ([(header::CACHE_CONTROL, "public, max-age=2")], Json(solar))
}

/// Wall clock for devices without an RTC.
#[utoipa::path(
    get,
    path = "/v3/time",
    responses((status = 200, description = "Local time", body = TimeResponse)),
    tag = "status"
)]
pub async fn get_time() -> Json<TimeResponse> {
    let now = Local::now();
    Json(TimeResponse {
        time: now.format("%H:%M:%S").to_string(),
        hm: now.format("%H:%M").to_string(),
        date: now.format("%Y-%m-%d").to_string(),
        ts: now.timestamp(),
    })
}

#[utoipa::path(
    get,
    path = "/api/lamps/commands",
    responses((status = 200, description = "Lamp commands", body = LampCommandsResponse)),
    tag = "devices"
)]
pub async fn get_lamp_commands(State(hub): State<Coordinator>) -> Json<LampCommandsResponse> {
    Json(LampCommandsResponse {
        lamp_commands: hub.lamp_commands().await,
    })
}

#[utoipa::path(
    get,
    path = "/api/esp2/state",
    responses((status = 200, description = "Lamp commands and sensor summary", body = DeviceStateView)),
    tag = "devices"
)]
pub async fn get_device_state(State(hub): State<Coordinator>) -> Json<DeviceStateView> {
    Json(hub.device_state().await)
}

// ---------------------------------------------------------------------------
// Lamps
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/lamp/{id}/toggle",
    params(("id" = i64, Path, description = "Lamp index, 0-5")),
    responses(
        (status = 200, description = "Toggled (out-of-range index is ignored)", body = StatusResponse),
        (status = 400, description = "Non-numeric index"),
    ),
    tag = "lamps"
)]
pub async fn toggle_lamp(
    State(hub): State<Coordinator>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    if let Some(index) = lamp_index(path)? {
        hub.toggle_lamp(index).await;
    }
    Ok(Json(StatusResponse::ok()))
}

#[utoipa::path(
    post,
    path = "/api/lamp/{id}/state",
    params(("id" = i64, Path, description = "Lamp index, 0-5")),
    request_body = LampStateRequest,
    responses(
        (status = 200, description = "Lamp set (out-of-range index is ignored)", body = StatusResponse),
        (status = 400, description = "Malformed request"),
    ),
    tag = "lamps"
)]
pub async fn set_lamp_state(
    State(hub): State<Coordinator>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<LampStateRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let index = lamp_index(path)?;
    let Json(req) = payload?;
    if let Some(index) = index {
        hub.set_lamp_state(index, req.state).await;
    }
    Ok(Json(StatusResponse::ok()))
}

/// Switch a lamp on with an optional auto-off timer.
#[utoipa::path(
    post,
    path = "/api/lamp/{id}/timer",
    params(("id" = i64, Path, description = "Lamp index, 0-5")),
    request_body = LampTimerRequest,
    responses(
        (status = 200, description = "Timer set (out-of-range index is ignored)", body = StatusResponse),
        (status = 400, description = "Malformed request"),
    ),
    tag = "lamps"
)]
pub async fn set_lamp_timer(
    State(hub): State<Coordinator>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<LampTimerRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let index = lamp_index(path)?;
    let Json(req) = payload?;
    if let Some(index) = index {
        hub.set_lamp_timer(index, req.minutes).await;
    }
    Ok(Json(StatusResponse::ok()))
}

#[utoipa::path(
    post,
    path = "/api/lamp/{id}/auto",
    params(("id" = i64, Path, description = "Lamp index, 0-5")),
    responses(
        (status = 200, description = "Auto mode toggled (out-of-range index is ignored)", body = StatusResponse),
        (status = 400, description = "Non-numeric index"),
    ),
    tag = "lamps"
)]
pub async fn toggle_lamp_auto(
    State(hub): State<Coordinator>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    if let Some(index) = lamp_index(path)? {
        hub.toggle_lamp_auto(index).await;
    }
    Ok(Json(StatusResponse::ok()))
}

#[utoipa::path(
    post,
    path = "/api/lamps/all",
    request_body = LampStateRequest,
    responses(
        (status = 200, description = "All lamps set", body = StatusResponse),
        (status = 400, description = "Malformed request"),
    ),
    tag = "lamps"
)]
pub async fn set_all_lamps(
    State(hub): State<Coordinator>,
    payload: Result<Json<LampStateRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let Json(req) = payload?;
    hub.set_all_lamps(req.state).await;
    Ok(Json(StatusResponse::ok()))
}

// ---------------------------------------------------------------------------
// Relay
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/toggle",
    responses((status = 200, description = "Relay target toggled", body = StatusResponse)),
    tag = "relay"
)]
pub async fn toggle_relay(State(hub): State<Coordinator>) -> Json<StatusResponse> {
    hub.toggle_relay().await;
    Json(StatusResponse::ok())
}

#[utoipa::path(
    post,
    path = "/api/relay/on",
    responses((status = 200, description = "Relay target on", body = StatusResponse)),
    tag = "relay"
)]
pub async fn relay_on(State(hub): State<Coordinator>) -> Json<StatusResponse> {
    hub.set_relay(true).await;
    Json(StatusResponse::relay(true))
}

#[utoipa::path(
    post,
    path = "/api/relay/off",
    responses((status = 200, description = "Relay target off", body = StatusResponse)),
    tag = "relay"
)]
pub async fn relay_off(State(hub): State<Coordinator>) -> Json<StatusResponse> {
    hub.set_relay(false).await;
    Json(StatusResponse::relay(false))
}

// ---------------------------------------------------------------------------
// Light strip
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/ledstrip/config",
    responses((status = 200, description = "Light strip configuration", body = LightStrip)),
    tag = "light_strip"
)]
pub async fn get_light_strip(State(hub): State<Coordinator>) -> Json<LightStrip> {
    Json(hub.light_strip().await)
}

#[utoipa::path(
    post,
    path = "/api/ledstrip/set",
    request_body = LightStrip,
    responses(
        (status = 200, description = "Light strip replaced", body = StatusResponse),
        (status = 400, description = "Malformed or out-of-range configuration"),
    ),
    tag = "light_strip"
)]
pub async fn set_light_strip(
    State(hub): State<Coordinator>,
    payload: Result<Json<LightStrip>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let Json(strip) = payload?;
    if !strip.is_valid() {
        return Err(AppError::InvalidData("brightness must be between 0 and 100"));
    }
    hub.set_light_strip(strip).await;
    Ok(Json(StatusResponse::ok()))
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Download the telemetry archive as a `Time,Temperature` sheet.
#[utoipa::path(
    get,
    path = "/api/export",
    responses(
        (status = 200, description = "CSV report", content_type = "text/csv", body = String),
        (status = 500, description = "Internal server error"),
    ),
    tag = "status"
)]
pub async fn export_report(State(hub): State<Coordinator>) -> Result<impl IntoResponse, AppError> {
    let rows = hub.export_rows().await;
    let body = export::render_csv(&rows)?;
    let disposition = format!("attachment; filename={}", export::FILENAME);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
    ),
    tag = "system"
)]
pub async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        ingest_telemetry, authorize_card, list_cards, add_card, remove_card,
        get_status, get_solar_panel, get_time, get_lamp_commands, get_device_state,
        toggle_lamp, set_lamp_state, set_lamp_timer, toggle_lamp_auto, set_all_lamps,
        toggle_relay, relay_on, relay_off, get_light_strip, set_light_strip,
        export_report, health,
    ),
    components(schemas(
        SensorData, CommandView, StatusView, DeviceStateView, SensorSummary, ChartPoint,
        SolarPanel, WeatherForecast, CityForecast, DayForecast, LightStrip, Card,
        CardAuthRequest, CardAuthResponse, LampStateRequest, LampTimerRequest,
        StatusResponse, LampCommandsResponse, TimeResponse,
    )),
    tags(
        (name = "devices",     description = "Endpoints polled by the microcontrollers"),
        (name = "security",    description = "RFID access control"),
        (name = "status",      description = "Dashboard read views"),
        (name = "lamps",       description = "Lamp commands and timers"),
        (name = "relay",       description = "Relay target"),
        (name = "light_strip", description = "RGB light strip"),
        (name = "system",      description = "System endpoints"),
    ),
    info(
        title = "Home Hub API",
        version = "0.1.0",
        description = "Device-state hub for the home automation controllers and dashboard"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::{
        api::router,
        coordinator::{tests::test_coordinator, Coordinator},
        models::LAMP_COUNT,
    };

    fn test_server() -> (TestServer, Coordinator) {
        let hub = test_coordinator();
        (TestServer::new(router(hub.clone())).unwrap(), hub)
    }

    // -----------------------------------------------------------------------
    // POST /update
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn ingest_returns_command_view() {
        let (server, hub) = test_server();
        hub.set_relay(true).await;
        hub.set_lamp_state(3, true).await;

        let resp = server
            .post("/update")
            .json(&json!({ "temp": 21.5, "hum": 48.0, "soil": 30, "relay": false }))
            .await;
        resp.assert_status_ok();

        let body: Value = resp.json();
        assert_eq!(body["command_relay"], true);
        assert_eq!(body["lamp_commands"][3], true);
        assert_eq!(body["lamp_auto_modes"].as_array().unwrap().len(), LAMP_COUNT);
        assert_eq!(body["message"], "--°C");
        assert_eq!(hub.archive_len().await, 1);
    }

    #[tokio::test]
    async fn ingest_rejects_malformed_body() {
        let (server, hub) = test_server();
        let resp = server
            .post("/update")
            .content_type("application/json")
            .text("{ temp: ")
            .await;
        resp.assert_status(axum::http::StatusCode::BAD_REQUEST);

        let body: Value = resp.json();
        assert!(body["error"].as_str().unwrap().starts_with("Invalid data"));
        assert_eq!(hub.archive_len().await, 0);
    }

    // -----------------------------------------------------------------------
    // POST /api/auth/card
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn card_granted_in_bootstrap_mode() {
        let (server, hub) = test_server();
        let resp = server
            .post("/api/auth/card")
            .json(&json!({ "card_uid": "04A1B2" }))
            .await;
        resp.assert_status_ok();

        let body: Value = resp.json();
        assert_eq!(body["status"], "granted");
        assert!(hub.lamp_commands().await[0]);
    }

    #[tokio::test]
    async fn unknown_card_denied_once_list_is_populated() {
        let (server, hub) = test_server();
        server
            .post("/api/security/cards")
            .json(&json!({ "uid": "04A1B2", "name": "Anna" }))
            .await
            .assert_status_ok();

        let resp = server
            .post("/api/auth/card")
            .json(&json!({ "card_uid": "FFFFFF" }))
            .await;
        resp.assert_status(axum::http::StatusCode::FORBIDDEN);
        let body: Value = resp.json();
        assert_eq!(body["status"], "denied");
        assert!(!hub.lamp_commands().await[0]);
    }

    // -----------------------------------------------------------------------
    // /api/security/cards
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn card_list_add_remove() {
        let (server, _hub) = test_server();

        server
            .post("/api/security/cards")
            .json(&json!({ "uid": "A1", "name": "front" }))
            .await
            .assert_status_ok();
        // Duplicate is a silent no-op.
        server
            .post("/api/security/cards")
            .json(&json!({ "uid": "A1", "name": "again" }))
            .await
            .assert_status_ok();

        let cards: Vec<Value> = server.get("/api/security/cards").await.json();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0]["name"], "front");

        server.delete("/api/security/cards/A1").await.assert_status_ok();
        server.delete("/api/security/cards/A1").await.assert_status_ok();
        let cards: Vec<Value> = server.get("/api/security/cards").await.json();
        assert!(cards.is_empty());
    }

    #[tokio::test]
    async fn card_with_empty_uid_is_rejected() {
        let (server, hub) = test_server();
        server
            .post("/api/security/cards")
            .json(&json!({ "uid": "  ", "name": "blank" }))
            .await
            .assert_status(axum::http::StatusCode::BAD_REQUEST);
        assert!(hub.list_cards().await.is_empty());
    }

    // -----------------------------------------------------------------------
    // Lamps
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn lamp_toggle_and_status() {
        let (server, _hub) = test_server();
        server.post("/api/lamp/2/toggle").await.assert_status_ok();

        let status: Value = server.get("/api/status").await.json();
        assert_eq!(status["lamps"][2], true);
        assert_eq!(status["lamps_auto"][2], false);
    }

    #[tokio::test]
    async fn out_of_range_lamp_is_ignored_but_ok() {
        let (server, hub) = test_server();
        for path in ["/api/lamp/6/toggle", "/api/lamp/-1/toggle", "/api/lamp/99/auto"] {
            server.post(path).await.assert_status_ok();
        }
        server
            .post("/api/lamp/6/state")
            .json(&json!({ "state": true }))
            .await
            .assert_status_ok();
        assert_eq!(hub.lamp_commands().await, vec![false; LAMP_COUNT]);
    }

    #[tokio::test]
    async fn non_numeric_lamp_id_is_bad_request() {
        let (server, hub) = test_server();
        server
            .post("/api/lamp/kitchen/toggle")
            .await
            .assert_status(axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(hub.lamp_commands().await, vec![false; LAMP_COUNT]);
    }

    #[tokio::test]
    async fn lamp_timer_shows_remaining_seconds() {
        let (server, _hub) = test_server();
        server
            .post("/api/lamp/1/timer")
            .json(&json!({ "minutes": 5 }))
            .await
            .assert_status_ok();

        let status: Value = server.get("/api/status").await.json();
        assert_eq!(status["lamps"][1], true);
        let remaining = status["timers"][1].as_i64().unwrap();
        assert!((295..=300).contains(&remaining), "remaining = {remaining}");
    }

    #[tokio::test]
    async fn lamp_timer_without_minutes_is_bad_request() {
        let (server, hub) = test_server();
        server
            .post("/api/lamp/1/timer")
            .json(&json!({ "mins": 5 }))
            .await
            .assert_status(axum::http::StatusCode::BAD_REQUEST);
        assert!(!hub.lamp_commands().await[1]);
    }

    #[tokio::test]
    async fn all_lamps_and_auto_toggle() {
        let (server, hub) = test_server();
        server
            .post("/api/lamps/all")
            .json(&json!({ "state": true }))
            .await
            .assert_status_ok();
        server.post("/api/lamp/4/auto").await.assert_status_ok();

        let status: Value = server.get("/api/status").await.json();
        assert_eq!(status["lamps"], json!(vec![true; LAMP_COUNT]));
        assert_eq!(status["lamps_auto"][4], true);

        let commands: Value = server.get("/api/lamps/commands").await.json();
        assert_eq!(commands["lamp_commands"], json!(hub.lamp_commands().await));
    }

    // -----------------------------------------------------------------------
    // Relay
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn relay_endpoints_change_target_only() {
        let (server, hub) = test_server();
        let body: Value = server.post("/api/relay/on").await.json();
        assert_eq!(body["relay"], "on");
        assert!(hub.relay_target().await);

        server.post("/api/toggle").await.assert_status_ok();
        assert!(!hub.relay_target().await);

        let body: Value = server.post("/api/relay/off").await.json();
        assert_eq!(body["relay"], "off");
        assert!(!hub.snapshot().await.data.relay);
    }

    // -----------------------------------------------------------------------
    // Light strip
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn light_strip_set_and_get() {
        let (server, _hub) = test_server();
        let strip = json!({ "state": true, "r": 0, "g": 128, "b": 255, "brightness": 60 });
        server.post("/api/ledstrip/set").json(&strip).await.assert_status_ok();

        let got: Value = server.get("/api/ledstrip/config").await.json();
        assert_eq!(got, strip);
    }

    #[tokio::test]
    async fn light_strip_out_of_range_is_rejected() {
        let (server, hub) = test_server();
        server
            .post("/api/ledstrip/set")
            .json(&json!({ "state": true, "r": 0, "g": 0, "b": 0, "brightness": 150 }))
            .await
            .assert_status(axum::http::StatusCode::BAD_REQUEST);
        server
            .post("/api/ledstrip/set")
            .json(&json!({ "state": true, "r": 256, "g": 0, "b": 0, "brightness": 10 }))
            .await
            .assert_status(axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(hub.light_strip().await, crate::models::LightStrip::default());
    }

    // -----------------------------------------------------------------------
    // Read views
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn status_has_cache_header_and_defaults() {
        let (server, _hub) = test_server();
        let resp = server.get("/api/status").await;
        resp.assert_status_ok();
        assert_eq!(resp.header("cache-control"), "public, max-age=5");

        let body: Value = resp.json();
        assert_eq!(body["weather"], "--°C");
        assert_eq!(body["timers"], json!(vec![0; LAMP_COUNT]));
        assert_eq!(body["weather_forecast"]["balti"]["today"]["temp"], "--");
        assert_eq!(body["clock"].as_str().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn device_state_includes_sensor_summary() {
        let (server, _hub) = test_server();
        server
            .post("/update")
            .json(&json!({ "temp": 18.5, "hum": 60.0, "soil": 25 }))
            .await
            .assert_status_ok();

        let body: Value = server.get("/api/esp2/state").await.json();
        assert_eq!(body["sensors"]["temp"], 18.5);
        assert_eq!(body["sensors"]["soil"], 25);
        assert_eq!(body["lamp_commands"].as_array().unwrap().len(), LAMP_COUNT);
    }

    #[tokio::test]
    async fn solar_panel_view() {
        let (server, _hub) = test_server();
        let resp = server.get("/api/solar-panel").await;
        resp.assert_status_ok();
        assert_eq!(resp.header("cache-control"), "public, max-age=2");
        let body: Value = resp.json();
        assert_eq!(body["power"], "0.0 W");
    }

    #[tokio::test]
    async fn time_view_fields() {
        let (server, _hub) = test_server();
        let body: Value = server.get("/v3/time").await.json();
        assert_eq!(body["time"].as_str().unwrap().len(), 8);
        assert_eq!(body["hm"].as_str().unwrap().len(), 5);
        assert_eq!(body["date"].as_str().unwrap().len(), 10);
        assert!(body["ts"].as_i64().unwrap() > 0);
    }

    // -----------------------------------------------------------------------
    // GET /api/export
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn export_is_csv_attachment() {
        let (server, _hub) = test_server();
        server
            .post("/update")
            .json(&json!({ "temp": 21.5 }))
            .await
            .assert_status_ok();

        let resp = server.get("/api/export").await;
        resp.assert_status_ok();
        assert_eq!(
            resp.header("content-disposition"),
            "attachment; filename=Report.csv"
        );
        let text = resp.text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Time,Temperature");
        assert!(lines[1].ends_with(",21.5"));
    }

    // -----------------------------------------------------------------------
    // System
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn health_returns_ok() {
        let (server, _hub) = test_server();
        let resp = server.get("/health").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn openapi_spec_is_served() {
        let (server, _hub) = test_server();
        let resp = server.get("/api-docs/openapi.json").await;
        resp.assert_status_ok();
        let body: Value = resp.json();
        assert_eq!(body["info"]["title"], "Home Hub API");
    }
}
