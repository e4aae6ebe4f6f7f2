// Logger - Trace logging for the video engine
//
// Provides:
// - A bounded in-memory trace buffer with optional file mirror
// - PPU state trace entries
// - A `log` backend so the crate's `log::info!`/`debug!`/`trace!` calls land
//   in the same buffer

use super::ppu::PpuState;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No logging
    None,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warning,
    /// Info, warnings, and errors
    Info,
    /// Debug information
    Debug,
    /// Verbose trace logging (includes PPU state traces)
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::None => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warning => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => LogLevel::Error,
            log::Level::Warn => LogLevel::Warning,
            log::Level::Info => LogLevel::Info,
            log::Level::Debug => LogLevel::Debug,
            log::Level::Trace => LogLevel::Trace,
        }
    }
}

/// Trace entry
///
/// Represents a single trace log entry
#[derive(Debug, Clone)]
pub enum TraceEntry {
    /// PPU state trace
    Ppu(PpuState),
    /// Custom message
    Message(String),
}

impl std::fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceEntry::Ppu(state) => write!(f, "PPU: {}", state),
            TraceEntry::Message(msg) => write!(f, "{}", msg),
        }
    }
}

/// Logger
///
/// Buffers trace entries in memory and optionally mirrors them to a file.
pub struct Logger {
    /// Current log level
    log_level: LogLevel,

    /// Enable PPU trace logging
    ppu_trace: bool,

    /// In-memory trace buffer
    trace_buffer: Vec<TraceEntry>,

    /// Maximum number of entries in trace buffer (0 = unlimited)
    max_buffer_size: usize,

    /// Output file
    output_file: Option<File>,
}

impl Logger {
    /// Create a new logger
    ///
    /// # Returns
    ///
    /// A new logger instance with default settings
    pub fn new() -> Self {
        Logger {
            log_level: LogLevel::None,
            ppu_trace: false,
            trace_buffer: Vec::new(),
            max_buffer_size: 10000,
            output_file: None,
        }
    }

    /// Set the log level
    pub fn set_log_level(&mut self, level: LogLevel) {
        self.log_level = level;
    }

    /// Get the current log level
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Enable PPU trace logging
    pub fn enable_ppu_trace(&mut self) {
        self.ppu_trace = true;
    }

    /// Disable PPU trace logging
    pub fn disable_ppu_trace(&mut self) {
        self.ppu_trace = false;
    }

    /// Check if PPU trace logging is enabled
    ///
    /// # Returns
    ///
    /// `true` if PPU trace is enabled and the level is `Trace`
    pub fn is_ppu_trace_enabled(&self) -> bool {
        self.ppu_trace && self.log_level >= LogLevel::Trace
    }

    /// Set maximum trace buffer size
    ///
    /// When the buffer exceeds this size, old entries are removed.
    /// Set to 0 for unlimited size.
    pub fn set_max_buffer_size(&mut self, size: usize) {
        self.max_buffer_size = size;

        if size > 0 && self.trace_buffer.len() > size {
            self.trace_buffer.drain(0..self.trace_buffer.len() - size);
        }
    }

    /// Open a log file for output
    ///
    /// # Returns
    ///
    /// `Ok(())` if successful, `Err` otherwise
    pub fn open_log_file<P: AsRef<Path>>(&mut self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        self.output_file = Some(file);
        Ok(())
    }

    /// Close the log file
    pub fn close_log_file(&mut self) {
        self.output_file = None;
    }

    /// Log a PPU state
    pub fn log_ppu_state(&mut self, state: &PpuState) {
        if !self.is_ppu_trace_enabled() {
            return;
        }

        self.add_entry(TraceEntry::Ppu(state.clone()));
    }

    /// Log a message
    ///
    /// Dropped when `level` is more verbose than the logger's level.
    pub fn log_message(&mut self, level: LogLevel, message: String) {
        if level == LogLevel::None || level > self.log_level {
            return;
        }

        self.add_entry(TraceEntry::Message(message));
    }

    /// Add an entry to the trace buffer and optionally write to file
    fn add_entry(&mut self, entry: TraceEntry) {
        if let Some(ref mut file) = self.output_file {
            let _ = writeln!(file, "{}", entry);
        }

        self.trace_buffer.push(entry);

        if self.max_buffer_size > 0 && self.trace_buffer.len() > self.max_buffer_size {
            self.trace_buffer.remove(0);
        }
    }

    fn flush_file(&mut self) {
        if let Some(ref mut file) = self.output_file {
            let _ = file.flush();
        }
    }

    /// Get the trace buffer
    pub fn trace_buffer(&self) -> &[TraceEntry] {
        &self.trace_buffer
    }

    /// Clear the trace buffer
    pub fn clear_buffer(&mut self) {
        self.trace_buffer.clear();
    }

    /// Get the last N trace entries
    pub fn last_entries(&self, count: usize) -> &[TraceEntry] {
        let start = self.trace_buffer.len().saturating_sub(count);
        &self.trace_buffer[start..]
    }

    /// Format the entire trace buffer as a string
    pub fn format_trace_buffer(&self) -> String {
        let mut output = String::new();

        for entry in &self.trace_buffer {
            output.push_str(&format!("{}\n", entry));
        }

        output
    }

    /// Format the last N entries as a string
    pub fn format_last_entries(&self, count: usize) -> String {
        let mut output = String::new();

        for entry in self.last_entries(count) {
            output.push_str(&format!("{}\n", entry));
        }

        output
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// A `Logger` shared between the `log` facade and the engine
///
/// Cloning is cheap; all clones write to the same buffer.
#[derive(Clone, Default)]
pub struct SharedLogger {
    inner: Arc<Mutex<Logger>>,
}

impl SharedLogger {
    /// Wrap a configured logger
    pub fn new(logger: Logger) -> Self {
        SharedLogger {
            inner: Arc::new(Mutex::new(logger)),
        }
    }

    /// Register as the global `log` backend
    ///
    /// # Errors
    ///
    /// Fails if another backend has already been installed.
    pub fn install(&self) -> Result<(), log::SetLoggerError> {
        let level = self.with(|logger| logger.log_level());
        log::set_boxed_logger(Box::new(self.clone()))?;
        log::set_max_level(level.to_level_filter());
        Ok(())
    }

    /// Run `f` with the logger locked
    ///
    /// A poisoned lock is recovered; the buffer holds plain data.
    pub fn with<R>(&self, f: impl FnOnce(&mut Logger) -> R) -> R {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    /// Record a PPU state trace entry
    pub fn log_ppu_state(&self, state: &PpuState) {
        self.with(|logger| logger.log_ppu_state(state));
    }
}

impl log::Log for SharedLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        LogLevel::from(metadata.level()) <= self.with(|logger| logger.log_level())
    }

    fn log(&self, record: &log::Record) {
        let level = LogLevel::from(record.level());
        let message = format!("[{}] {}: {}", record.level(), record.target(), record.args());
        self.with(|logger| logger.log_message(level, message));
    }

    fn flush(&self) {
        self.with(|logger| logger.flush_file());
    }
}
