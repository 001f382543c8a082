//! # Core Module
//!
//! Library-wide settings shared by the wrappers and the demo.
//!
//! - **Config**: window, renderer, audio and logging sections loaded from
//!   TOML or RON files

pub mod config;

pub use config::{AudioConfig, LibraryConfig, LoggingConfig, RendererConfig, WindowConfig};
pub use crate::config::{Config, ConfigError};
