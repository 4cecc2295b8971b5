//! Defines the temperature reading record that every analysis operates on.

/// A single temperature observation made by a weather station.
///
/// Readings are plain values: two readings with the same fields are equal.
/// The `timestamp` is an ordinal time value (for example a fractional year such
/// as `2000.456`), not a wall-clock datetime.
///
/// The analyses in this crate expect the readings of any one station to appear
/// in non-decreasing `timestamp` order. Readings of different stations may be
/// interleaved freely. The order is never checked or corrected.
///
/// # Examples
///
/// ```
/// use station_fluctuation::Reading;
///
/// let reading = Reading::new(68, 2000.375, -12.5);
/// assert_eq!(reading.station_id, 68);
/// assert_eq!(reading, Reading::new(68, 2000.375, -12.5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Identifier of the station that made the observation.
    pub station_id: i64,
    /// Ordinal time of the observation.
    pub timestamp: f64,
    /// Observed temperature in degrees Celsius.
    pub temperature_c: f64,
}

impl Reading {
    pub fn new(station_id: i64, timestamp: f64, temperature_c: f64) -> Self {
        Self {
            station_id,
            timestamp,
            temperature_c,
        }
    }
}
