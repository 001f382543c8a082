//! # Library Configuration
//!
//! Settings for everything the wrappers create from configuration: the
//! first window, its renderer, the mixer channel layout and the log level.
//! Any section may be left out of a file and falls back to its defaults.
//!
//! ```toml
//! [logging]
//! level = "debug"
//!
//! [window]
//! title = "demo"
//! width = 1024
//! height = 768
//! flags = "RESIZABLE | OPENGL"
//! ```

use crate::system::{RendererFlags, WindowFlags, WindowPos};
use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log filter, overridden by `RUST_LOG`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl LoggingConfig {
    /// Validate the level name
    pub fn validate(&self) -> Result<(), String> {
        if LOG_LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            Ok(())
        } else {
            Err(format!("Unknown log level: {}", self.level))
        }
    }
}

/// # Window Configuration
///
/// Arguments for [`Window::from_config`](crate::video::Window::from_config).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Title bar text
    pub title: String,
    /// Client area width
    pub width: i32,
    /// Client area height
    pub height: i32,
    /// Horizontal placement
    pub x: WindowPos,
    /// Vertical placement
    pub y: WindowPos,
    /// Creation flags
    pub flags: WindowFlags,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "media_handles".to_string(),
            width: 800,
            height: 600,
            x: WindowPos::Undefined,
            y: WindowPos::Undefined,
            flags: WindowFlags::empty(),
        }
    }
}

impl WindowConfig {
    /// Create a window configuration with a title and size
    pub fn new(title: impl Into<String>, width: i32, height: i32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Self::default()
        }
    }

    /// Set creation flags
    #[must_use]
    pub const fn with_flags(mut self, flags: WindowFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Center the window on the display
    #[must_use]
    pub const fn centered(mut self) -> Self {
        self.x = WindowPos::Centered;
        self.y = WindowPos::Centered;
        self
    }

    /// Validate the window size
    pub fn validate(&self) -> Result<(), String> {
        if self.width <= 0 || self.height <= 0 {
            return Err(format!("Window size must be positive, got {}x{}", self.width, self.height));
        }
        Ok(())
    }
}

/// Renderer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Creation flags
    pub flags: RendererFlags,
}

/// Mixer channel layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Number of mixing channels to allocate
    pub channels: i32,
    /// Channels kept out of automatic selection
    pub reserved: i32,
    /// Volume for every channel, 0 to 128
    pub volume: i32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            channels: 8,
            reserved: 0,
            volume: 128,
        }
    }
}

impl AudioConfig {
    /// Validate the channel layout
    pub fn validate(&self) -> Result<(), String> {
        if self.channels < 0 {
            return Err("Channel count cannot be negative".to_string());
        }
        if !(0..=self.channels).contains(&self.reserved) {
            return Err(format!(
                "Cannot reserve {} of {} channels",
                self.reserved, self.channels
            ));
        }
        if !(0..=128).contains(&self.volume) {
            return Err(format!("Volume {} is outside 0..=128", self.volume));
        }
        Ok(())
    }
}

/// # Complete Library Configuration
///
/// Top-level configuration, loadable with [`Config::load_from_file`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Logging settings
    pub logging: LoggingConfig,
    /// First window
    pub window: WindowConfig,
    /// Renderer for the first window
    pub renderer: RendererConfig,
    /// Mixer channel layout
    pub audio: AudioConfig,
}

impl LibraryConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<(), String> {
        self.logging.validate()?;
        self.window.validate()?;
        self.audio.validate()
    }
}

impl Config for LibraryConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("media_handles_{}_{name}", std::process::id()))
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = LibraryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.renderer.flags, RendererFlags::default());
        assert_eq!(config.audio.channels, 8);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = LibraryConfig::default();
        config.window.width = 0;
        assert!(config.validate().unwrap_err().contains("0x600"));

        let mut config = LibraryConfig::default();
        config.audio.reserved = 9;
        assert!(config.validate().is_err());

        let mut config = LibraryConfig::default();
        config.audio.volume = 129;
        assert!(config.validate().is_err());

        let mut config = LibraryConfig::default();
        config.logging.level = "loud".to_string();
        assert_eq!(config.validate().unwrap_err(), "Unknown log level: loud");
    }

    #[test]
    fn test_toml_round_trip() {
        let path = temp_path("round_trip.toml");
        let mut config = LibraryConfig::default();
        config.window = WindowConfig::new("toml window", 320, 240)
            .with_flags(WindowFlags::RESIZABLE | WindowFlags::OPENGL);
        config.audio.reserved = 2;

        config.save_to_file(&path).unwrap();
        let loaded = LibraryConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ron_round_trip() {
        let path = temp_path("round_trip.ron");
        let mut config = LibraryConfig::default();
        config.window = WindowConfig::new("ron window", 640, 480).centered();
        config.window.x = WindowPos::At(12);
        config.renderer.flags = RendererFlags::SOFTWARE;
        config.logging.level = "debug".to_string();

        config.save_to_file(&path).unwrap();
        let loaded = LibraryConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let path = temp_path("partial.toml");
        std::fs::write(&path, "[window]\ntitle = \"partial\"\nflags = \"HIDDEN\"\n").unwrap();
        let loaded = LibraryConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.window.title, "partial");
        assert_eq!(loaded.window.flags, WindowFlags::HIDDEN);
        assert_eq!(loaded.window.width, 800);
        assert_eq!(loaded.audio, AudioConfig::default());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = LibraryConfig::load_from_file(temp_path("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_unknown_extension() {
        let result = LibraryConfig::default().save_to_file(temp_path("config.yaml"));
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
