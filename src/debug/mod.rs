// Debug module - Debugging tools for the video subsystem
//
// This module provides:
// - PPU state capture and register formatting
// - Logging (PPU trace, configurable log levels, `log` facade backend)
// - PNG dumps of pattern tables, palettes and nametables
//
// None of this runs unless the engine is configured to trace or publish.

mod dump;
mod logger;
mod ppu;

pub use dump::{dump_directory, dump_file_name, dump_pixel_buffer, save_png, DumpError};
pub use logger::{LogLevel, Logger, SharedLogger, TraceEntry};
pub use ppu::{format_palettes, PpuState};
