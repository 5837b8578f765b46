//! Human-friendly output formatting for the weather card.
//!
//! Temperatures and wind speed are rounded for display only; stored
//! snapshot values stay as reported by the provider.

use std::fmt::Write as _;

use weatherdash_core::{RequestState, WeatherSnapshot, source::weatherbit::icon_url};

pub fn state_line(state: &RequestState) -> String {
    match state {
        RequestState::Idle => "No city selected.".to_owned(),
        RequestState::Loading => "Loading weather data...".to_owned(),
        RequestState::Succeeded(snapshot) => card(snapshot),
        RequestState::Failed(err) => format!("Error: {err}"),
    }
}

pub fn card(snap: &WeatherSnapshot) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}, {}", snap.city_name, snap.country_code);
    let _ = writeln!(out, "{}", snap.description);
    let _ = writeln!(out, "{}", icon_url(&snap.icon));
    let _ = writeln!(
        out,
        "Temperature: {}°C (feels like {}°C)",
        snap.temp_c.round() as i64,
        snap.feels_like_c.round() as i64
    );
    let _ = writeln!(out, "Humidity:    {}%", snap.humidity_pct);
    let _ = writeln!(out, "Wind:        {} m/s", snap.wind_speed_mps.round() as i64);
    let _ = writeln!(out, "Pressure:    {} hPa", snap.pressure_mb);
    let _ = write!(out, "Observed:    {}", snap.observed_at.format("%Y-%m-%d %H:%M UTC"));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use weatherdash_core::FetchError;

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            city_name: "London".to_owned(),
            country_code: "GB".to_owned(),
            temp_c: 17.6,
            feels_like_c: 16.4,
            humidity_pct: 72,
            wind_speed_mps: 3.4,
            pressure_mb: 1012.5,
            icon: "c02d".to_owned(),
            description: "Scattered clouds".to_owned(),
            observed_at: Utc.with_ymd_and_hms(2024, 8, 29, 19, 40, 0).unwrap(),
        }
    }

    #[test]
    fn card_rounds_for_display_only() {
        let card = card(&snapshot());

        assert!(card.contains("London, GB"));
        assert!(card.contains("Scattered clouds"));
        assert!(card.contains("Temperature: 18°C (feels like 16°C)"));
        assert!(card.contains("Wind:        3 m/s"));
        assert!(card.contains("Humidity:    72%"));
        assert!(card.contains("Pressure:    1012.5 hPa"));
        assert!(card.contains("https://www.weatherbit.io/static/img/icons/c02d.png"));
        assert!(card.contains("Observed:    2024-08-29 19:40 UTC"));
    }

    #[test]
    fn failed_state_renders_error_line() {
        let line = state_line(&RequestState::Failed(FetchError::CityNotFound));
        assert_eq!(line, "Error: City not found");
    }

    #[test]
    fn idle_and_loading_render_status_lines() {
        assert_eq!(state_line(&RequestState::Idle), "No city selected.");
        assert_eq!(state_line(&RequestState::Loading), "Loading weather data...");
    }
}
