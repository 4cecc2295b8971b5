//! Cumulative temperature fluctuation per station.
//!
//! The fluctuation of a station is the sum of the absolute differences between
//! consecutive accepted temperatures of that station. With a [`TimeWindow`] only
//! readings inside the window are accepted. A reading outside the window is
//! skipped in place: it does not replace the station's last accepted
//! temperature, so the next accepted reading is compared against the last
//! reading that was itself inside the window.

use crate::types::query::{INVALID_TIME_BOUND, NO_STATION};
use crate::types::reading::Reading;
use crate::types::time_window::TimeWindow;
use crate::types::traits::any_time_bound::AnyTimeBound;
use log::{debug, warn};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
struct StationAccumulator {
    station_id: i64,
    total: f64,
    /// Temperature of the last accepted reading, `None` until one is accepted.
    last_accepted: Option<f64>,
}

/// Cumulative fluctuation of every station seen in a set of readings.
///
/// Stations are kept in the order they first appear in the input, including
/// stations none of whose readings fell inside the window (their fluctuation
/// is `0.0`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationFluctuations {
    stations: Vec<StationAccumulator>,
    index: HashMap<i64, usize>,
}

impl StationFluctuations {
    /// Slot for `station_id`, created on first sight so that stations keep their
    /// first-appearance order.
    fn slot(&mut self, station_id: i64) -> &mut StationAccumulator {
        let position = *self.index.entry(station_id).or_insert_with(|| {
            self.stations.push(StationAccumulator {
                station_id,
                total: 0.0,
                last_accepted: None,
            });
            self.stations.len() - 1
        });
        &mut self.stations[position]
    }

    /// The fluctuation of `station_id`, or `None` if it never appeared.
    pub fn get(&self, station_id: i64) -> Option<f64> {
        self.index
            .get(&station_id)
            .map(|&position| self.stations[position].total)
    }

    /// `(station_id, fluctuation)` pairs in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, f64)> + '_ {
        self.stations
            .iter()
            .map(|station| (station.station_id, station.total))
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// The station with the largest fluctuation above zero, with that
    /// fluctuation. On a tie the station that appeared first keeps the lead.
    pub fn leader(&self) -> Option<(i64, f64)> {
        self.iter()
            .fold(None, |leader, (station_id, total)| match leader {
                Some((_, max)) if total <= max => leader,
                _ if total > 0.0 => Some((station_id, total)),
                _ => leader,
            })
    }
}

/// Computes the cumulative fluctuation of every station in a single pass.
///
/// `readings` must list the readings of each station in time order; readings
/// are never reordered. With a `window`, readings whose timestamp falls outside
/// it neither add to the total nor become the station's last accepted value.
///
/// # Examples
///
/// ```
/// use station_fluctuation::{compute_station_fluctuations, Reading, TimeWindow};
///
/// let readings = [
///     Reading::new(68, 1.0, 10.0),
///     Reading::new(68, 2.0, 12.0),
///     Reading::new(68, 3.0, 9.0),
/// ];
/// let all = compute_station_fluctuations(&readings, None);
/// assert_eq!(all.get(68), Some(5.0));
///
/// let window = TimeWindow::new(1.5, 3.5).unwrap();
/// let bounded = compute_station_fluctuations(&readings, Some(&window));
/// assert_eq!(bounded.get(68), Some(3.0));
/// ```
pub fn compute_station_fluctuations(
    readings: &[Reading],
    window: Option<&TimeWindow>,
) -> StationFluctuations {
    let mut fluctuations = StationFluctuations::default();
    let mut skipped = 0usize;

    for reading in readings {
        let station = fluctuations.slot(reading.station_id);

        if let Some(window) = window {
            if !window.contains(reading.timestamp) {
                skipped += 1;
                continue;
            }
        }

        if let Some(last) = station.last_accepted {
            station.total += (reading.temperature_c - last).abs();
        }
        station.last_accepted = Some(reading.temperature_c);
    }

    debug!(
        "Computed fluctuation for {} stations from {} readings ({} outside window)",
        fluctuations.len(),
        readings.len(),
        skipped
    );
    fluctuations
}

/// Picks the station with the largest fluctuation.
///
/// Stations are visited in first-appearance order and a station only takes the
/// lead with a strictly greater value, so on a tie the earliest station wins.
/// Returns [`NO_STATION`] (`0`) when `fluctuations` is empty or no station has a
/// fluctuation above zero.
pub fn find_station_with_max_fluctuation(fluctuations: &StationFluctuations) -> i64 {
    fluctuations
        .leader()
        .map_or(NO_STATION, |(station_id, _)| station_id)
}

/// The station with the most fluctuation across all readings.
///
/// # Examples
///
/// ```
/// use station_fluctuation::{get_station_with_most_fluctuation, Reading};
///
/// let readings = [
///     Reading::new(68, 1.0, 10.0),
///     Reading::new(81, 1.0, 20.0),
///     Reading::new(68, 2.0, 12.0),
///     Reading::new(81, 2.0, 25.0),
/// ];
/// assert_eq!(get_station_with_most_fluctuation(&readings), 81);
/// assert_eq!(get_station_with_most_fluctuation(&[]), 0);
/// ```
pub fn get_station_with_most_fluctuation(readings: &[Reading]) -> i64 {
    find_station_with_max_fluctuation(&compute_station_fluctuations(readings, None))
}

/// The station with the most fluctuation among readings inside `[start, end]`.
///
/// Bounds may be any [`AnyTimeBound`] value. Returns [`INVALID_TIME_BOUND`] (`-1`)
/// when a bound is missing, not numeric, not finite, or when `start > end`.
///
/// # Examples
///
/// ```
/// use station_fluctuation::{get_station_with_most_fluctuation_time_bound, Reading};
///
/// let readings = [Reading::new(68, 2.0, 12.0), Reading::new(68, 3.0, 9.0)];
/// assert_eq!(get_station_with_most_fluctuation_time_bound(&readings, 1.5, 3.5), 68);
/// assert_eq!(get_station_with_most_fluctuation_time_bound(&readings, 5.0, 1.0), -1);
/// assert_eq!(get_station_with_most_fluctuation_time_bound(&readings, 1.0, "x"), -1);
/// ```
pub fn get_station_with_most_fluctuation_time_bound(
    readings: &[Reading],
    start: impl AnyTimeBound,
    end: impl AnyTimeBound,
) -> i64 {
    match TimeWindow::from_bounds(start, end) {
        Ok(window) => {
            find_station_with_max_fluctuation(&compute_station_fluctuations(readings, Some(&window)))
        }
        Err(e) => {
            warn!("{}", e);
            INVALID_TIME_BOUND
        }
    }
}
