// NES Video Library
// Cycle-accurate PPU, CPU bus and cartridge loader for an NES emulator

// Public modules
pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod debug;
pub mod emulator;
pub mod ppu;

// Re-export main types for convenience
pub use bus::{Bus, BusHooks, CpuBus, CpuMemory};
pub use cartridge::{Cartridge, INesError, Mirroring, TvSystem};
pub use cpu::CpuCore;
pub use debug::{LogLevel, Logger, PpuState, SharedLogger, TraceEntry};
pub use emulator::{DebugSnapshot, Engine, EngineConfig, SnapshotHandle};
pub use ppu::{PixelBuffer, Ppu, PpuConfig};
