mod analysis;
mod error;
mod ingest;
mod report;
mod types;

pub use error::{AnalysisError, TimeBoundError};
pub use report::WeatherReport;

pub use analysis::fluctuation::*;
pub use analysis::minimum::find_minimum_temperature;
pub use analysis::query::run_query;

pub use types::query::*;
pub use types::reading::Reading;
pub use types::time_window::TimeWindow;
pub use types::traits::any_time_bound::AnyTimeBound;

pub use ingest::error::IngestError;
pub use ingest::loader::ReadingLoader;
