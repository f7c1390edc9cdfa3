//! Day-boundary weather transitions for the AgroSwarm simulation.
//!
//! Weather is global: one [`WeatherState`] covers the whole field. It is
//! resampled only when the tick counter reaches a positive multiple of the
//! configured day length. Between boundaries the state is left untouched by
//! the engine, though collaborators may overwrite it directly.
//!
//! # Sampling
//!
//! | Field      | Distribution                         |
//! |------------|--------------------------------------|
//! | `temp`     | Gaussian, clamped to a safe range    |
//! | `humidity` | Gaussian, clamped                    |
//! | `rain`     | Bernoulli(`rain_chance`) as 0 or 1   |
//! | `wind_*`   | Uniform in `[-1, 1]`                 |
//!
//! All draws come from the caller's seeded RNG, so the same seed and tick
//! sequence always produce the same weather.

use agroswarm_types::WeatherState;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Deserialize;
use tracing::debug;

/// Parameters for the daily weather draw.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WeatherParams {
    /// Mean daily temperature in degrees Celsius.
    pub temp_mean: f64,
    /// Standard deviation of the daily temperature.
    pub temp_std: f64,
    /// Lowest temperature the draw may produce.
    pub temp_min: f64,
    /// Highest temperature the draw may produce.
    pub temp_max: f64,
    /// Mean relative humidity.
    pub humidity_mean: f64,
    /// Standard deviation of relative humidity.
    pub humidity_std: f64,
    /// Lowest humidity the draw may produce.
    pub humidity_min: f64,
    /// Highest humidity the draw may produce.
    pub humidity_max: f64,
    /// Probability that a day is rainy.
    pub rain_chance: f64,
}

impl Default for WeatherParams {
    fn default() -> Self {
        Self {
            temp_mean: 29.0,
            temp_std: 4.5,
            temp_min: 12.0,
            temp_max: 44.0,
            humidity_mean: 0.55,
            humidity_std: 0.18,
            humidity_min: 0.05,
            humidity_max: 0.95,
            rain_chance: 0.12,
        }
    }
}

impl WeatherParams {
    /// The weather in effect before the first day boundary.
    pub fn initial_state(&self) -> WeatherState {
        WeatherState {
            temp: self.temp_mean,
            humidity: self.humidity_mean,
            ..WeatherState::default()
        }
    }
}

/// Whether `tick` is a positive multiple of `ticks_per_day`.
///
/// A zero day length never fires.
pub fn is_day_boundary(tick: u64, ticks_per_day: u64) -> bool {
    tick > 0 && tick.checked_rem(ticks_per_day) == Some(0)
}

/// Normal sample with the given `mean` and `std`.
///
/// A negative or non-finite `std` yields `mean` without drawing.
pub fn gaussian(rng: &mut impl Rng, mean: f64, std: f64) -> f64 {
    Normal::new(mean, std).map_or(mean, |normal| normal.sample(rng))
}

/// Clamp that tolerates a misconfigured (inverted) range instead of
/// panicking like [`f64::clamp`].
fn clamp_to(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Drives the daily weather transition.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSystem {
    params: WeatherParams,
    ticks_per_day: u64,
}

impl WeatherSystem {
    /// Create a weather system with the given parameters and day length.
    pub const fn new(params: WeatherParams, ticks_per_day: u64) -> Self {
        Self {
            params,
            ticks_per_day,
        }
    }

    /// The sampling parameters.
    pub const fn params(&self) -> &WeatherParams {
        &self.params
    }

    /// Ticks per simulated day.
    pub const fn ticks_per_day(&self) -> u64 {
        self.ticks_per_day
    }

    /// Resample every weather field unconditionally.
    pub fn resample(&self, weather: &mut WeatherState, rng: &mut impl Rng) {
        let p = &self.params;
        weather.temp = clamp_to(gaussian(rng, p.temp_mean, p.temp_std), p.temp_min, p.temp_max);
        weather.humidity = clamp_to(
            gaussian(rng, p.humidity_mean, p.humidity_std),
            p.humidity_min,
            p.humidity_max,
        );
        weather.rain = if rng.random::<f64>() < p.rain_chance { 1.0 } else { 0.0 };
        weather.wind_dx = rng.random_range(-1.0..=1.0);
        weather.wind_dy = rng.random_range(-1.0..=1.0);
    }

    /// Tick phase 1: resample the weather if `tick` is a day boundary.
    ///
    /// Returns `true` if the weather was resampled.
    pub fn step(&self, weather: &mut WeatherState, tick: u64, rng: &mut impl Rng) -> bool {
        if !is_day_boundary(tick, self.ticks_per_day) {
            return false;
        }
        self.resample(weather, rng);
        debug!(
            tick,
            temp = weather.temp,
            humidity = weather.humidity,
            rain = weather.rain,
            wind_dx = weather.wind_dx,
            wind_dy = weather.wind_dy,
            "Weather resampled"
        );
        true
    }
}
