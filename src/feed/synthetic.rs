//! Simulated forecast and solar readings shown on the dashboard.
use rand::Rng;

use super::models::Condition;
use crate::models::{CityForecast, DayForecast, SolarPanel, WeatherForecast};

/// Daytime window (local hours) for the solar simulation.
pub fn is_daytime(hour: u32) -> bool {
    (6..18).contains(&hour)
}

pub fn forecast<R: Rng>(rng: &mut R) -> WeatherForecast {
    WeatherForecast {
        balti: CityForecast {
            today: day(rng, 15.0, 10.0),
            tomorrow: day(rng, 14.0, 12.0),
        },
        chisinau: CityForecast {
            today: day(rng, 18.0, 8.0),
            tomorrow: day(rng, 17.0, 10.0),
        },
    }
}

fn day<R: Rng>(rng: &mut R, base: f64, spread: f64) -> DayForecast {
    let temp = base + rng.random::<f64>() * spread;
    let condition = Condition::ALL[rng.random_range(0..Condition::ALL.len())];
    DayForecast {
        temp: format!("{temp:.1}°C"),
        condition: condition.label().to_owned(),
        icon: condition.icon().to_owned(),
    }
}

/// Solar readings for local `hour`; `timestamp` is the `HH:MM:SS` label.
pub fn solar_panel<R: Rng>(rng: &mut R, hour: u32, timestamp: String) -> SolarPanel {
    let mut sample = |base: f64, spread: f64| base + rng.random::<f64>() * spread;

    let (power, voltage, current, efficiency, temperature) = if is_daytime(hour) {
        (
            sample(1500.0, 1000.0),
            sample(24.0, 6.0),
            sample(50.0, 20.0),
            sample(85.0, 10.0),
            sample(35.0, 15.0),
        )
    } else {
        (
            sample(0.0, 100.0),
            sample(1.0, 5.0),
            sample(0.0, 5.0),
            sample(10.0, 15.0),
            sample(20.0, 10.0),
        )
    };

    SolarPanel {
        power: format!("{power:.1} W"),
        voltage: format!("{voltage:.1} V"),
        current: format!("{current:.1} A"),
        efficiency: format!("{efficiency:.1}%"),
        temperature: format!("{temperature:.1}°C"),
        timestamp: Some(timestamp),
    }
}
