//! Formatting and timing helpers

pub mod time;
