// Utility functions
pub mod error;
pub mod schedule_time;

pub use error::*;
