//! Defines the queries the crate can answer and their tagged results.

use crate::types::reading::Reading;
use serde::Serialize;
use std::fmt;

/// Station id reported when no station recorded any fluctuation.
///
/// A real station with id `0` is reported with the same number. Use
/// [`MaxFluctuationResult::found`] to tell the two apart.
pub const NO_STATION: i64 = 0;

/// Station id reported when a bounded query was given invalid time bounds.
pub const INVALID_TIME_BOUND: i64 = -1;

/// The analyses that can be run over a set of readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Query {
    /// The single coldest reading.
    MinimumTemperature,
    /// The station with the largest cumulative fluctuation over all readings.
    MaxFluctuation,
    /// As [`Query::MaxFluctuation`], restricted to readings inside `[start, end]`.
    /// A `None` bound stands for a bound that was missing or not numeric.
    MaxFluctuationBetween {
        start: Option<f64>,
        end: Option<f64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MinimumTemperatureResult {
    pub station_id: i64,
    pub timestamp: f64,
    pub temperature_c: f64,
}

impl From<&Reading> for MinimumTemperatureResult {
    fn from(reading: &Reading) -> Self {
        Self {
            station_id: reading.station_id,
            timestamp: reading.timestamp,
            temperature_c: reading.temperature_c,
        }
    }
}

/// The station with the most fluctuation, optionally within a time window.
///
/// When the input was empty or no station recorded a non-zero fluctuation,
/// `station_id` is [`NO_STATION`] and `fluctuation` is `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaxFluctuationResult {
    pub station_id: i64,
    /// Cumulative fluctuation of the winning station.
    pub fluctuation: f64,
    /// The window the result was restricted to, if any.
    pub window: Option<(f64, f64)>,
}

impl MaxFluctuationResult {
    /// `true` if some station, whatever its id, recorded a fluctuation.
    pub fn found(&self) -> bool {
        self.fluctuation > 0.0
    }
}

/// The outcome of running a [`Query`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryResult {
    Minimum(MinimumTemperatureResult),
    MaxFluctuation(MaxFluctuationResult),
    TimeBoundError {
        start: Option<f64>,
        end: Option<f64>,
    },
}

impl QueryResult {
    /// The station the result points at, with the bound error mapped to
    /// [`INVALID_TIME_BOUND`].
    pub fn station_id(&self) -> i64 {
        match self {
            QueryResult::Minimum(minimum) => minimum.station_id,
            QueryResult::MaxFluctuation(result) => result.station_id,
            QueryResult::TimeBoundError { .. } => INVALID_TIME_BOUND,
        }
    }
}

/// Writes an optional bound, using `?` for one that was missing.
struct BoundDisplay(Option<f64>);

impl fmt::Display for BoundDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(bound) => write!(f, "{}", bound),
            None => write!(f, "?"),
        }
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Minimum(minimum) => write!(
                f,
                "The station with the lowest temperature recording was {} at {:.3}, with a reading of {} Celsius",
                minimum.station_id, minimum.timestamp, minimum.temperature_c
            ),
            QueryResult::MaxFluctuation(result) if !result.found() => match result.window {
                Some((start, end)) => write!(
                    f,
                    "No station recorded any temperature fluctuation between {} and {}",
                    start, end
                ),
                None => write!(f, "No station recorded any temperature fluctuation"),
            },
            QueryResult::MaxFluctuation(result) => match result.window {
                Some((start, end)) => write!(
                    f,
                    "Station {} with the most temperature fluctuation between {} and {}",
                    result.station_id, start, end
                ),
                None => write!(
                    f,
                    "Station {} had the most temperature fluctuation given all the readings",
                    result.station_id
                ),
            },
            QueryResult::TimeBoundError { start, end } => write!(
                f,
                "Invalid time bounds between {} and {}",
                BoundDisplay(*start),
                BoundDisplay(*end)
            ),
        }
    }
}
