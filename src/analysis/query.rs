use crate::analysis::fluctuation::{compute_station_fluctuations, StationFluctuations};
use crate::analysis::minimum::find_minimum_temperature;
use crate::error::AnalysisError;
use crate::types::query::{MaxFluctuationResult, Query, QueryResult, NO_STATION};
use crate::types::reading::Reading;
use crate::types::time_window::TimeWindow;
use log::warn;

/// Runs a single [`Query`] over `readings`.
///
/// Invalid or missing time bounds do not fail the call: they produce
/// [`QueryResult::TimeBoundError`] so the remaining queries of a report can
/// still be answered.
///
/// # Errors
///
/// Returns [`AnalysisError::EmptyInput`] for [`Query::MinimumTemperature`] on an
/// empty slice.
///
/// # Examples
///
/// ```
/// use station_fluctuation::{run_query, Query, Reading};
///
/// let readings = [Reading::new(68, 1.0, 10.0), Reading::new(68, 2.0, 12.0)];
/// let query = Query::MaxFluctuationBetween { start: Some(5.0), end: Some(1.0) };
/// let result = run_query(&readings, &query).unwrap();
/// assert_eq!(result.station_id(), -1);
/// ```
pub fn run_query(readings: &[Reading], query: &Query) -> Result<QueryResult, AnalysisError> {
    match *query {
        Query::MinimumTemperature => {
            find_minimum_temperature(readings).map(QueryResult::Minimum)
        }
        Query::MaxFluctuation => {
            let fluctuations = compute_station_fluctuations(readings, None);
            Ok(max_fluctuation_result(&fluctuations, None))
        }
        Query::MaxFluctuationBetween { start, end } => {
            let window = match TimeWindow::from_bounds(start, end) {
                Ok(window) => window,
                Err(e) => {
                    warn!("{}", e);
                    return Ok(QueryResult::TimeBoundError { start, end });
                }
            };
            let fluctuations = compute_station_fluctuations(readings, Some(&window));
            Ok(max_fluctuation_result(
                &fluctuations,
                Some((window.start(), window.end())),
            ))
        }
    }
}

fn max_fluctuation_result(
    fluctuations: &StationFluctuations,
    window: Option<(f64, f64)>,
) -> QueryResult {
    let (station_id, fluctuation) = fluctuations.leader().unwrap_or((NO_STATION, 0.0));
    QueryResult::MaxFluctuation(MaxFluctuationResult {
        station_id,
        fluctuation,
        window,
    })
}
