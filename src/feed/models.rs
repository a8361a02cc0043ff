use serde::Deserialize;

// ---------------------------------------------------------------------------
// Current weather  —  GET {WEATHER_URL}?q={city}&appid={key}&units=metric
//
// Only the fields the hub reads are modelled; everything else in the
// OpenWeatherMap payload is ignored.
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CurrentWeatherResponse {
    pub main: MainBlock,
}

#[derive(Debug, Deserialize)]
pub struct MainBlock {
    /// Degrees Celsius with `units=metric`.
    pub temp: f64,
}

// ---------------------------------------------------------------------------
// Forecast conditions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Sunny,
    Cloudy,
    Rain,
    Clear,
}

impl Condition {
    pub const ALL: [Condition; 4] = [
        Condition::Sunny,
        Condition::Cloudy,
        Condition::Rain,
        Condition::Clear,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Condition::Sunny => "Sunny",
            Condition::Cloudy => "Cloudy",
            Condition::Rain => "Rain",
            Condition::Clear => "Clear",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Condition::Cloudy => "☁️",
            Condition::Rain => "🌧️",
            Condition::Sunny | Condition::Clear => "☀️",
        }
    }
}
