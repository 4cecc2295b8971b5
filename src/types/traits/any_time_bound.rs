/// Resolves loosely typed input into a numeric time bound.
///
/// Implemented for floats, integers, text and optional values so callers can hand
/// over bounds exactly as they received them (e.g. straight from a command line).
/// Anything that cannot be read as a number resolves to `None`.
pub trait AnyTimeBound {
    fn get_time_bound(self) -> Option<f64>;
}

impl AnyTimeBound for f64 {
    fn get_time_bound(self) -> Option<f64> {
        Some(self)
    }
}

impl AnyTimeBound for f32 {
    fn get_time_bound(self) -> Option<f64> {
        Some(f64::from(self))
    }
}

impl AnyTimeBound for i32 {
    fn get_time_bound(self) -> Option<f64> {
        Some(f64::from(self))
    }
}

impl AnyTimeBound for i64 {
    fn get_time_bound(self) -> Option<f64> {
        Some(self as f64)
    }
}

impl AnyTimeBound for &str {
    fn get_time_bound(self) -> Option<f64> {
        self.trim().parse::<f64>().ok()
    }
}

impl AnyTimeBound for String {
    fn get_time_bound(self) -> Option<f64> {
        self.as_str().get_time_bound()
    }
}

impl AnyTimeBound for &String {
    fn get_time_bound(self) -> Option<f64> {
        self.as_str().get_time_bound()
    }
}

impl<T: AnyTimeBound> AnyTimeBound for Option<T> {
    fn get_time_bound(self) -> Option<f64> {
        self.and_then(AnyTimeBound::get_time_bound)
    }
}
