use serde::{Deserialize, Serialize};

/// Metrics requested from the weather service's `current` block.
pub const CURRENT_METRICS: &[&str] = &["temperature_2m", "wind_speed_10m", "weather_code"];

/// Current conditions at a coordinate pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Air temperature two metres above ground, in °C.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_2m: Option<f64>,
    /// Wind speed ten metres above ground, in km/h.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed_10m: Option<f64>,
    /// WMO weather interpretation code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_code: Option<u16>,
}

impl WeatherSnapshot {
    /// Short description of the WMO weather code, if one was reported.
    pub fn condition(&self) -> Option<&'static str> {
        self.weather_code.map(describe_weather_code)
    }
}

/// Map a WMO weather interpretation code to a short description.
pub fn describe_weather_code(code: u16) -> &'static str {
    match code {
        0 => "Clear sky",
        1..=3 => "Partly cloudy",
        45 | 48 => "Fog",
        51..=57 => "Drizzle",
        61..=67 => "Rain",
        71..=77 => "Snow",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95..=99 => "Thunderstorm",
        _ => "Unknown conditions",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_known_and_unknown_codes() {
        assert_eq!(describe_weather_code(0), "Clear sky");
        assert_eq!(describe_weather_code(63), "Rain");
        assert_eq!(describe_weather_code(96), "Thunderstorm");
        assert_eq!(describe_weather_code(42), "Unknown conditions");
    }

    #[test]
    fn snapshot_tolerates_missing_metrics() {
        let snapshot: WeatherSnapshot =
            serde_json::from_str(r#"{"temperature_2m": 12.5, "time": "2024-05-01T12:00"}"#).expect("snapshot");
        assert_eq!(snapshot.temperature_2m, Some(12.5));
        assert_eq!(snapshot.condition(), None);
    }
}
