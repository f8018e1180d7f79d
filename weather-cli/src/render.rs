//! Human-friendly output for a settled session.

use std::fmt::Write;

use weather_core::{ForecastPayload, Session, Status, WeatherCategory};

const HOURS_SHOWN: usize = 6;
const DAYS_SHOWN: usize = 7;
const FALLBACK_NOTICE: &str = "Showing sample data.";

pub fn progress(status: Status) -> String {
    match status {
        Status::Resolving => "Looking up location...".to_string(),
        Status::Fetching => "Fetching forecast...".to_string(),
        Status::Validating => "Checking forecast...".to_string(),
        other => format!("{other}"),
    }
}

pub fn session(session: &Session) -> String {
    let mut out = String::new();

    if session.status == Status::Degraded {
        let message = session.error_message.as_deref().unwrap_or(FALLBACK_NOTICE);
        let _ = writeln!(out, "! {message}");
    }

    let name = match &session.coordinates {
        Some(coords) => coords.display_name.as_str(),
        None => "Location",
    };
    let Some(forecast) = &session.forecast else {
        let _ = writeln!(out, "{name}: no forecast available");
        return out;
    };

    current(&mut out, name, forecast);
    hourly(&mut out, forecast);
    daily(&mut out, forecast);

    if let Some(marker) = session.marker() {
        let temp = match marker.temperature {
            Some(t) => format!(" ({t}°C)"),
            None => String::new(),
        };
        let (lat, lon) = (marker.latitude, marker.longitude);
        let _ = writeln!(out, "\nMap: {lat:.4}, {lon:.4} {}{temp}", marker.label);
    }

    out
}

fn current(out: &mut String, name: &str, f: &ForecastPayload) {
    let h = &f.hourly;
    let date = match h.time.first() {
        Some(t) => t.format("%a %e %b %Y").to_string(),
        None => String::new(),
    };
    let code = h.weather_code.first().copied().flatten();

    let _ = writeln!(out, "{name}");
    let _ = writeln!(out, "{date}");
    if let Some(temp) = f.current_temperature() {
        let _ = writeln!(out, "  {temp}°C  {}", category(code).description());
    }
    let _ = writeln!(
        out,
        "  Humidity {}%  Wind {} km/h  Precipitation {}%",
        first(&h.humidity),
        first(&h.wind_speed),
        first(&h.precipitation_probability),
    );
}

fn hourly(out: &mut String, f: &ForecastPayload) {
    let h = &f.hourly;
    let _ = writeln!(out, "\nToday's forecast");
    let rows = h
        .time
        .iter()
        .zip(&h.temperature)
        .zip(&h.weather_code)
        .take(HOURS_SHOWN);
    for ((time, temp), code) in rows {
        let _ = writeln!(
            out,
            "  {}  {:>6}°C  {}",
            time.format("%H:%M"),
            reading(*temp),
            category(*code).description()
        );
    }
}

fn daily(out: &mut String, f: &ForecastPayload) {
    let d = &f.daily;
    let _ = writeln!(out, "\n7-day forecast");
    let rows = d
        .time
        .iter()
        .zip(&d.weather_code)
        .zip(d.temperature_min.iter().zip(&d.temperature_max))
        .take(DAYS_SHOWN);
    for ((date, code), (min, max)) in rows {
        let _ = writeln!(
            out,
            "  {}  {:<14} {}° - {}°",
            date.format("%a"),
            category(*code).description(),
            reading(*min),
            reading(*max)
        );
    }
}

fn category(code: Option<i32>) -> WeatherCategory {
    match code {
        Some(code) => WeatherCategory::from_code(code),
        None => WeatherCategory::Unknown,
    }
}

// Hours the provider left blank print as a dash.
fn reading(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    }
}

fn first(values: &[Option<f64>]) -> String {
    reading(values.first().copied().flatten())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use weather_core::{Coordinates, LookupError, synth::synthesize};

    fn now() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap()
    }

    #[test]
    fn ready_session_lists_hours_and_days() {
        let session = Session {
            status: Status::Ready,
            coordinates: Some(Coordinates::new(48.8566, 2.3522, "Paris")),
            forecast: Some(synthesize("Paris", now())),
            ..Session::default()
        };

        let text = super::session(&session);
        assert!(text.starts_with("Paris\n"));
        assert!(text.contains("Today's forecast"));
        assert!(text.contains("09:00"));
        assert!(text.contains("14:00"));
        assert!(!text.contains("15:00"));
        assert!(text.contains("7-day forecast"));
        assert!(text.contains("Map: 48.8566, 2.3522 Paris"));
        assert!(!text.contains('!'));
    }

    #[test]
    fn degraded_session_shows_message_first() {
        let message = LookupError::NotFound("Zzyzx123".into()).user_message();
        let session = Session {
            status: Status::Degraded,
            forecast: Some(synthesize("Zzyzx123", now())),
            error_message: Some(message),
            ..Session::default()
        };

        let text = super::session(&session);
        assert!(text.starts_with("! Location \"Zzyzx123\" not found"));
        assert!(!text.contains("Map:"));
    }

    #[test]
    fn missing_readings_print_as_dash() {
        let mut forecast = synthesize("Paris", now());
        forecast.hourly.temperature[0] = None;
        forecast.hourly.humidity[0] = None;
        forecast.hourly.weather_code[0] = None;
        let session = Session {
            status: Status::Ready,
            forecast: Some(forecast),
            ..Session::default()
        };

        let text = super::session(&session);
        assert!(text.starts_with("Location\n"));
        assert!(text.contains("Humidity -%"));
        assert!(text.contains("09:00       -°C  Unknown"));
    }

    #[test]
    fn progress_messages() {
        assert_eq!(progress(Status::Fetching), "Fetching forecast...");
        assert_eq!(progress(Status::Ready), "ready");
    }
}
