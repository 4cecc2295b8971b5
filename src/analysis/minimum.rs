use crate::error::AnalysisError;
use crate::types::query::MinimumTemperatureResult;
use crate::types::reading::Reading;
use log::debug;
use ordered_float::OrderedFloat;

/// Finds the reading with the lowest temperature.
///
/// When several readings share the lowest temperature the first one in input
/// order is returned.
///
/// # Errors
///
/// Returns [`AnalysisError::EmptyInput`] if `readings` is empty.
pub fn find_minimum_temperature(
    readings: &[Reading],
) -> Result<MinimumTemperatureResult, AnalysisError> {
    // `min_by_key` keeps the first of several equal minima.
    let coldest = readings
        .iter()
        .min_by_key(|reading| OrderedFloat(reading.temperature_c))
        .ok_or(AnalysisError::EmptyInput)?;

    debug!(
        "Lowest temperature {} recorded by station {} at {}",
        coldest.temperature_c, coldest.station_id, coldest.timestamp
    );
    Ok(MinimumTemperatureResult::from(coldest))
}
