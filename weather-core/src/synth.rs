//! Placeholder forecast used whenever acquisition fails.
//!
//! The shape is fixed (24 hourly points, 7 daily points, every field populated) so the
//! result always satisfies the validator. Magnitudes are random within plausible
//! bounds and are not reproducible.

use chrono::{Duration, NaiveDateTime, Timelike};
use rand::{Rng, seq::SliceRandom};

use crate::model::{DailySeries, ForecastPayload, HourlySeries};

pub const HOURLY_POINTS: usize = 24;
pub const DAILY_POINTS: usize = 7;

const TEMPERATURE: (f64, f64) = (15.0, 25.0);
const HUMIDITY: (f64, f64) = (40.0, 80.0);
const WIND_SPEED: (f64, f64) = (5.0, 20.0);
const PRECIPITATION: (f64, f64) = (0.0, 70.0);
const WEATHER_CODES: [i32; 5] = [0, 1, 2, 3, 61];

/// Build a synthetic forecast starting at `now`.
pub fn synthesize(seed_name: &str, now: NaiveDateTime) -> ForecastPayload {
    synthesize_with(&mut rand::thread_rng(), seed_name, now)
}

pub fn synthesize_with<R: Rng + ?Sized>(
    rng: &mut R,
    seed_name: &str,
    now: NaiveDateTime,
) -> ForecastPayload {
    tracing::debug!("Synthesizing fallback for '{seed_name}' from {now}");

    let start = now
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now);

    let mut hourly = HourlySeries {
        time: Vec::with_capacity(HOURLY_POINTS),
        temperature: Vec::with_capacity(HOURLY_POINTS),
        humidity: Vec::with_capacity(HOURLY_POINTS),
        wind_speed: Vec::with_capacity(HOURLY_POINTS),
        precipitation_probability: Vec::with_capacity(HOURLY_POINTS),
        weather_code: Vec::with_capacity(HOURLY_POINTS),
    };

    for hour in 0..HOURLY_POINTS as i64 {
        let temperature = tenths(between(rng, TEMPERATURE));
        let humidity = between(rng, HUMIDITY).round();
        let wind_speed = tenths(between(rng, WIND_SPEED));
        let precipitation = between(rng, PRECIPITATION).round();

        hourly.time.push(start + Duration::hours(hour));
        hourly.temperature.push(Some(temperature));
        hourly.humidity.push(Some(humidity));
        hourly.wind_speed.push(Some(wind_speed));
        hourly.precipitation_probability.push(Some(precipitation));
        hourly.weather_code.push(Some(pick_code(rng)));
    }

    let mut daily = DailySeries {
        time: Vec::with_capacity(DAILY_POINTS),
        weather_code: Vec::with_capacity(DAILY_POINTS),
        temperature_min: Vec::with_capacity(DAILY_POINTS),
        temperature_max: Vec::with_capacity(DAILY_POINTS),
    };

    let today = now.date();
    for day in 0..DAILY_POINTS as i64 {
        let a = tenths(between(rng, TEMPERATURE));
        let b = tenths(between(rng, TEMPERATURE));

        daily.time.push(today + Duration::days(day));
        daily.weather_code.push(Some(pick_code(rng)));
        daily.temperature_min.push(Some(a.min(b)));
        daily.temperature_max.push(Some(a.max(b)));
    }

    ForecastPayload { hourly, daily }
}

fn between<R: Rng + ?Sized>(rng: &mut R, (low, high): (f64, f64)) -> f64 {
    rng.gen_range(low..=high)
}

fn pick_code<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    WEATHER_CODES.choose(rng).copied().unwrap_or(0)
}

fn tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
