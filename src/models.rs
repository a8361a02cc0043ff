use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Number of switchable lamps wired to the hub.
pub const LAMP_COUNT: usize = 6;

/// One telemetry report from the sensor board.
///
/// The board only sends the fields it has hardware for, so every field
/// falls back to its zero value when absent. `time` is always assigned by the
/// hub on ingest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SensorData {
    /// Degrees Celsius
    pub temp: f64,
    /// Relative humidity percentage
    pub hum: f64,
    /// Soil moisture percentage
    pub soil: i64,
    pub rain: bool,
    /// Actual relay state as reported by the board (not the target).
    pub relay: bool,
    /// Last card presented at the reader.
    pub card_uid: String,
    pub light: i64,
    pub lamps: Vec<bool>,
    pub lamps_auto: Vec<bool>,
    pub time: DateTime<Utc>,
}

/// An RFID card on the access list. `uid` is the unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Card {
    pub uid: String,
    #[serde(default)]
    pub name: String,
}

/// Desired configuration of the RGB light strip, replaced wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LightStrip {
    pub state: bool,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Percentage, 0..=100
    pub brightness: u8,
}

impl LightStrip {
    pub const MAX_BRIGHTNESS: u8 = 100;

    pub fn is_valid(&self) -> bool {
        self.brightness <= Self::MAX_BRIGHTNESS
    }
}

impl Default for LightStrip {
    fn default() -> Self {
        Self {
            state: true,
            r: 255,
            g: 0,
            b: 0,
            brightness: 100,
        }
    }
}

/// A single point of the dashboard temperature chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChartPoint {
    /// Local wall-clock label, `HH:MM`.
    pub t: String,
    /// Degrees Celsius
    pub v: f64,
}

/// Simulated solar installation readings, pre-formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SolarPanel {
    pub power: String,
    pub voltage: String,
    pub current: String,
    pub efficiency: String,
    pub temperature: String,
    /// Local time of the last refresh, `HH:MM:SS`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Default for SolarPanel {
    fn default() -> Self {
        Self {
            power: "0.0 W".to_owned(),
            voltage: "0.0 V".to_owned(),
            current: "0.0 A".to_owned(),
            efficiency: "0.0%".to_owned(),
            temperature: "0.0°C".to_owned(),
            timestamp: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DayForecast {
    pub temp: String,
    pub condition: String,
    pub icon: String,
}

impl Default for DayForecast {
    fn default() -> Self {
        Self {
            temp: "--".to_owned(),
            condition: "--".to_owned(),
            icon: "🌤️".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CityForecast {
    pub today: DayForecast,
    pub tomorrow: DayForecast,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeatherForecast {
    pub balti: CityForecast,
    pub chisinau: CityForecast,
}

// ---------------------------------------------------------------------------
// Read models handed out by the coordinator
// ---------------------------------------------------------------------------

/// What the sensor board receives back after every telemetry post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CommandView {
    pub command_relay: bool,
    pub lamp_commands: Vec<bool>,
    pub lamp_auto_modes: Vec<bool>,
    /// Current outdoor temperature, e.g. `"21.4°C"`.
    pub message: String,
}

/// Point-in-time view of everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusView {
    pub data: SensorData,
    pub history: Vec<ChartPoint>,
    pub relay_target: bool,
    pub weather: String,
    pub last_access: String,
    pub lamps: Vec<bool>,
    pub lamps_auto: Vec<bool>,
    /// Seconds left on each lamp timer, 0 when no timer is running.
    pub timers: Vec<i64>,
    /// Local wall clock, `HH:MM`.
    pub clock: String,
    pub solar_panel: SolarPanel,
    pub weather_forecast: WeatherForecast,
}

/// Readings forwarded to the lamp controller board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SensorSummary {
    pub temp: f64,
    pub hum: f64,
    pub soil: i64,
}

/// Combined poll for the lamp controller board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeviceStateView {
    pub lamp_commands: Vec<bool>,
    pub sensors: SensorSummary,
}

/// One row of the temperature export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub time: DateTime<Utc>,
    pub temperature: f64,
}
