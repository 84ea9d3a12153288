//! Report output
//!
//! - [`text`]: console reports
//! - [`json`]: machine-readable reports written to a file

pub mod json;
pub mod text;
