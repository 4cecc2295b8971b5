//! Runs the standard set of queries over a dataset and renders the answers.

use crate::analysis::query::run_query;
use crate::error::AnalysisError;
use crate::types::query::{Query, QueryResult};
use crate::types::reading::Reading;
use bon::bon;
use log::info;
use serde::Serialize;
use std::fmt;

/// The answers to the minimum temperature, overall fluctuation and windowed
/// fluctuation queries for one dataset.
///
/// # Examples
///
/// ```
/// use station_fluctuation::{Reading, WeatherReport};
///
/// let readings = [
///     Reading::new(68, 1.0, 10.0),
///     Reading::new(81, 1.0, 20.0),
///     Reading::new(68, 2.0, 12.0),
///     Reading::new(81, 2.0, 25.0),
///     Reading::new(68, 3.0, 9.0),
/// ];
/// let report = WeatherReport::builder()
///     .readings(&readings)
///     .start(1.5)
///     .end(3.5)
///     .build()
///     .unwrap();
///
/// let ids: Vec<i64> = report.results().iter().map(|r| r.station_id()).collect();
/// assert_eq!(ids, vec![68, 68, 68]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    readings: usize,
    results: Vec<QueryResult>,
}

#[bon]
impl WeatherReport {
    /// Builds the report.
    ///
    /// * `.readings(&[Reading])`: **Required.** The readings to analyse.
    /// * `.start(f64)` / `.end(f64)`: The window for the bounded fluctuation
    ///   query. A bound that is not set makes that query report a time bound
    ///   error instead of a station.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::EmptyInput`] if `readings` is empty.
    #[builder]
    pub fn new(
        readings: &[Reading],
        start: Option<f64>,
        end: Option<f64>,
    ) -> Result<Self, AnalysisError> {
        let queries = [
            Query::MinimumTemperature,
            Query::MaxFluctuation,
            Query::MaxFluctuationBetween { start, end },
        ];

        let results = queries
            .iter()
            .map(|query| run_query(readings, query))
            .collect::<Result<Vec<_>, _>>()?;
        info!(
            "Answered {} queries over {} readings",
            results.len(),
            readings.len()
        );

        Ok(Self {
            readings: readings.len(),
            results,
        })
    }

    /// Results in query order: minimum, overall fluctuation, windowed fluctuation.
    pub fn results(&self) -> &[QueryResult] {
        &self.results
    }

    pub fn reading_count(&self) -> usize {
        self.readings
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, result) in self.results.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", result)?;
        }
        Ok(())
    }
}
