use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /api/auth/card`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CardAuthRequest {
    pub card_uid: String,
}

/// Response for `POST /api/auth/card`: `granted` or `denied`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CardAuthResponse {
    pub status: String,
    pub message: String,
}

impl CardAuthResponse {
    pub fn granted() -> Self {
        Self {
            status: "granted".to_owned(),
            message: "Welcome home".to_owned(),
        }
    }

    pub fn denied() -> Self {
        Self {
            status: "denied".to_owned(),
            message: "Access denied".to_owned(),
        }
    }
}

/// Request body for `POST /api/lamp/{id}/state` and `POST /api/lamps/all`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LampStateRequest {
    pub state: bool,
}

/// Request body for `POST /api/lamp/{id}/timer`. `minutes <= 0` turns the
/// lamp on without a timer.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LampTimerRequest {
    pub minutes: i64,
}

/// Generic acknowledgement. `relay` is only set by the relay on/off
/// endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay: Option<String>,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_owned(),
            relay: None,
        }
    }

    pub fn relay(on: bool) -> Self {
        Self {
            status: "ok".to_owned(),
            relay: Some(if on { "on" } else { "off" }.to_owned()),
        }
    }
}

/// Response for `GET /api/lamps/commands`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LampCommandsResponse {
    pub lamp_commands: Vec<bool>,
}

/// Response for `GET /v3/time`, consumed by the clock display.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TimeResponse {
    /// `HH:MM:SS`
    pub time: String,
    /// `HH:MM`
    pub hm: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// Unix timestamp, seconds
    pub ts: i64,
}
