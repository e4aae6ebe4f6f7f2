// Configuration management
//
// Handles engine configuration and settings persistence.

use crate::debug::{LogLevel, Logger, SharedLogger};
use crate::ppu::PpuConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file path
pub const CONFIG_FILE: &str = "nes_video.toml";

/// Errors that can occur while loading or saving the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read or written
    #[error("config I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid TOML for this configuration
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Engine configuration
///
/// Stores all user-configurable settings. Missing sections and keys fall back
/// to their defaults when loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// PPU core settings
    pub ppu: PpuConfig,

    /// Debug and logging settings
    pub debug: DebugConfig,

    /// Image dump settings
    pub dump: DumpConfig,
}

/// Debug configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Publish a snapshot to the shared handle at every frame end
    pub publish_snapshots: bool,

    /// Log level for the trace logger
    pub log_level: LogLevel,

    /// Record a PPU state trace entry at every frame end
    pub trace_ppu: bool,

    /// Maximum entries kept in the trace buffer (0 = unlimited)
    pub trace_buffer_size: usize,
}

/// Image dump configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DumpConfig {
    /// Dump directory
    pub output_directory: PathBuf,

    /// Include timestamp in filename
    pub include_timestamp: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        DebugConfig {
            publish_snapshots: true,
            log_level: LogLevel::Info,
            trace_ppu: false,
            trace_buffer_size: 10000,
        }
    }
}

impl DebugConfig {
    /// Build a trace logger with these settings
    pub fn build_logger(&self) -> SharedLogger {
        let mut logger = Logger::new();
        logger.set_log_level(self.log_level);
        logger.set_max_buffer_size(self.trace_buffer_size);
        if self.trace_ppu {
            logger.enable_ppu_trace();
        }
        SharedLogger::new(logger)
    }
}

impl Default for DumpConfig {
    fn default() -> Self {
        DumpConfig {
            output_directory: PathBuf::from("dumps"),
            include_timestamp: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from the default file or create default
    ///
    /// If the configuration file doesn't exist or can't be parsed, creates a
    /// default configuration and tries to save it to the file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nes_video::EngineConfig;
    ///
    /// let config = EngineConfig::load_or_default();
    /// ```
    pub fn load_or_default() -> Self {
        Self::load_from(CONFIG_FILE).unwrap_or_else(|e| {
            log::debug!("Using default configuration ({})", e);
            let config = Self::default();
            // Try to save the default config, but don't fail if we can't
            let _ = config.save_to(CONFIG_FILE);
            config
        })
    }

    /// Load configuration from a file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save configuration to a file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nes_video::EngineConfig;
    ///
    /// let config = EngineConfig::default();
    /// config.save_to("nes_video.toml").expect("Failed to save configuration");
    /// ```
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
