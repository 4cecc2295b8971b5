pub mod any_time_bound;
