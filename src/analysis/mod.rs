pub mod fluctuation;
pub mod minimum;
pub mod query;
