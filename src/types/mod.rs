pub mod query;
pub mod reading;
pub mod time_window;
pub mod traits;
