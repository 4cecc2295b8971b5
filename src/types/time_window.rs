//! Contains the validated inclusive time window used by bounded fluctuation queries.

use crate::error::TimeBoundError;
use crate::types::traits::any_time_bound::AnyTimeBound;
use std::fmt;

/// An inclusive `[start, end]` filter on reading timestamps.
///
/// A `TimeWindow` can only be obtained through [`TimeWindow::new`] or
/// [`TimeWindow::from_bounds`], so holding one guarantees both bounds are finite
/// and `start <= end`.
///
/// # Examples
///
/// ```
/// use station_fluctuation::{TimeBoundError, TimeWindow};
///
/// let window = TimeWindow::new(1.5, 3.5).unwrap();
/// assert!(window.contains(1.5));
/// assert!(!window.contains(3.6));
///
/// assert_eq!(
///     TimeWindow::new(5.0, 1.0),
///     Err(TimeBoundError::Reversed { start: 5.0, end: 1.0 })
/// );
/// assert_eq!(TimeWindow::from_bounds(1.0, "x"), Err(TimeBoundError::Missing));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    start: f64,
    end: f64,
}

impl TimeWindow {
    /// Validates the bounds and builds the window.
    ///
    /// # Errors
    ///
    /// * [`TimeBoundError::NotFinite`] if either bound is NaN or infinite.
    /// * [`TimeBoundError::Reversed`] if `start > end`.
    pub fn new(start: f64, end: f64) -> Result<Self, TimeBoundError> {
        for bound in [start, end] {
            if !bound.is_finite() {
                return Err(TimeBoundError::NotFinite(bound));
            }
        }
        if start > end {
            return Err(TimeBoundError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    /// Resolves both bounds through [`AnyTimeBound`] before validating them.
    ///
    /// Returns [`TimeBoundError::Missing`] when a bound is absent or not numeric.
    pub fn from_bounds(
        start: impl AnyTimeBound,
        end: impl AnyTimeBound,
    ) -> Result<Self, TimeBoundError> {
        let start = start.get_time_bound().ok_or(TimeBoundError::Missing)?;
        let end = end.get_time_bound().ok_or(TimeBoundError::Missing)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// `true` if `timestamp` lies inside the window, bounds included.
    pub fn contains(&self, timestamp: f64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
