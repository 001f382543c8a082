//! Foundation module - low-level utilities used throughout the crate
//!
//! - Logging utilities

pub mod logging;
