// Emulator module - Engine that composes the video subsystem
//
// The engine owns the cartridge image, the bus (with the PPU registered as its
// hooks) and an external CPU core. It steps the CPU one instruction at a time;
// the bus advances the PPU in lockstep during every access. After each
// instruction the engine forwards a raised NMI to the CPU and handles the
// end-of-frame work (logging, tracing, snapshot publishing, the frame
// callback).

mod config;
mod snapshot;

pub use config::{ConfigError, DebugConfig, DumpConfig, EngineConfig, CONFIG_FILE};
pub use snapshot::{DebugSnapshot, SnapshotHandle};

use crate::bus::{Bus, CpuBus};
use crate::cartridge::Cartridge;
use crate::cpu::CpuCore;
use crate::debug::{PpuState, SharedLogger};
use crate::ppu::{PixelBuffer, Ppu};

/// Called with the frame number at the end of every frame
pub type FrameCallback = Box<dyn FnMut(u64) + Send>;

/// Main engine structure
///
/// Coordinates the CPU core, the bus and the PPU, and exposes the debug
/// query surface.
pub struct Engine<C: CpuCore> {
    /// External CPU core
    cpu: C,

    /// CPU address space with the PPU registered as hooks
    bus: Bus<Ppu>,

    /// Currently loaded cartridge image
    cartridge: Cartridge,

    /// Configuration
    config: EngineConfig,

    /// Latest end-of-frame snapshot, shared with debug readers
    snapshots: SnapshotHandle,

    /// Receives PPU trace entries when enabled
    logger: Option<SharedLogger>,

    frame_callback: Option<FrameCallback>,
}

impl<C: CpuCore> Engine<C> {
    /// Create an engine with the default configuration
    ///
    /// Builds the bus and PPU from the cartridge and runs the CPU's reset
    /// sequence.
    pub fn new(cpu: C, cartridge: Cartridge) -> Self {
        Self::with_config(cpu, cartridge, EngineConfig::default())
    }

    /// Create an engine with an explicit configuration
    pub fn with_config(cpu: C, cartridge: Cartridge, config: EngineConfig) -> Self {
        let bus = build_bus(&cartridge, &config);
        let mut engine = Engine {
            cpu,
            bus,
            cartridge,
            config,
            snapshots: SnapshotHandle::new(),
            logger: None,
            frame_callback: None,
        };
        engine.cpu.reset(&mut engine.bus);
        log::info!(
            "Engine started: {} ROM bank(s), {} VROM bank(s), {:?} mirroring",
            engine.cartridge.rom_banks.len(),
            engine.cartridge.vrom_banks.len(),
            engine.cartridge.mirroring
        );
        engine
    }

    /// Replace the cartridge image wholesale
    ///
    /// CPU memory, PPU memory and OAM start over from the new image; the CPU
    /// is reset. An attached trace logger drops the previous image's entries.
    pub fn load_cartridge(&mut self, cartridge: Cartridge) {
        self.bus = build_bus(&cartridge, &self.config);
        self.cartridge = cartridge;
        if let Some(logger) = &self.logger {
            logger.with(|logger| logger.clear_buffer());
        }
        self.cpu.reset(&mut self.bus);
        log::info!(
            "Cartridge loaded: mapper {}, {:?} mirroring",
            self.cartridge.mapper,
            self.cartridge.mirroring
        );
    }

    /// Reset the system, as if pressing the reset button
    ///
    /// The PPU returns to scanline 241 with its write-suppression window
    /// re-armed; memory contents are kept.
    pub fn reset(&mut self) {
        let (ppu, memory) = self.bus.parts_mut();
        ppu.reset(memory);
        self.cpu.reset(&mut self.bus);
        log::info!("Reset");
    }

    /// Execute one CPU instruction
    ///
    /// The PPU runs three dots per CPU cycle while the instruction executes.
    /// A raised NMI is delivered after the instruction completes. A core that
    /// performed no bus access is charged one idle cycle.
    ///
    /// # Returns
    ///
    /// CPU cycles consumed, including any NMI entry
    pub fn step(&mut self) -> u64 {
        let start = self.bus.cycles();

        self.cpu.step(&mut self.bus);
        if self.bus.cycles() == start {
            self.bus.tick();
        }

        if self.bus.hooks_mut().take_nmi() {
            log::trace!("NMI at frame {}", self.frame_count());
            self.cpu.nmi(&mut self.bus);
        }

        if self.bus.hooks_mut().take_frame_ready() {
            self.finish_frame();
        }

        self.bus.cycles() - start
    }

    /// Run until the current frame completes
    ///
    /// # Returns
    ///
    /// CPU cycles consumed
    pub fn run_frame(&mut self) -> u64 {
        let target = self.frame_count() + 1;
        let mut cycles = 0;
        while self.frame_count() < target {
            cycles += self.step();
        }
        cycles
    }

    /// Run whole instructions until at least `cycles` CPU cycles have elapsed
    ///
    /// # Returns
    ///
    /// CPU cycles actually consumed (may overshoot by part of an instruction)
    pub fn run_cycles(&mut self, cycles: u64) -> u64 {
        let mut elapsed = 0;
        while elapsed < cycles {
            elapsed += self.step();
        }
        elapsed
    }

    /// End-of-frame bookkeeping
    fn finish_frame(&mut self) {
        let frame = self.frame_count();
        log::debug!("Frame {} complete at CPU cycle {}", frame, self.bus.cycles());

        if self.config.debug.trace_ppu {
            if let Some(logger) = &self.logger {
                logger.log_ppu_state(&self.ppu_state());
            }
        }

        if self.config.debug.publish_snapshots {
            self.snapshots
                .publish(DebugSnapshot::capture(self.bus.hooks(), self.bus.memory()));
        }

        if let Some(callback) = self.frame_callback.as_mut() {
            callback(frame);
        }
    }

    /// Register a function called with the frame number at each frame end
    pub fn set_frame_callback<F>(&mut self, callback: F)
    where
        F: FnMut(u64) + Send + 'static,
    {
        self.frame_callback = Some(Box::new(callback));
    }

    /// Remove the frame callback
    pub fn clear_frame_callback(&mut self) {
        self.frame_callback = None;
    }

    /// Attach a trace logger that receives PPU state entries
    pub fn set_logger(&mut self, logger: SharedLogger) {
        self.logger = Some(logger);
    }

    /// Handle for reading end-of-frame snapshots from another thread
    pub fn snapshot_handle(&self) -> SnapshotHandle {
        self.snapshots.clone()
    }

    // ========================================
    // Debug queries
    // ========================================

    /// Read PPU memory ($0000-$3FFF) without side effects
    pub fn read_ppu_memory(&self, addr: u16) -> u8 {
        self.bus.hooks().read_ppu_memory(addr)
    }

    /// Render pattern table 0 or 1 (128×128)
    pub fn pattern_table(&self, bank: u8) -> PixelBuffer {
        self.bus.hooks().pattern_table(bank)
    }

    /// Background palette swatches
    pub fn background_palette(&self) -> PixelBuffer {
        self.bus.hooks().background_palette()
    }

    /// Sprite palette swatches
    pub fn sprite_palette(&self) -> PixelBuffer {
        self.bus.hooks().sprite_palette()
    }

    /// Render nametable 0-3 (256×240)
    pub fn nametable(&self, index: u8) -> PixelBuffer {
        self.bus.hooks().nametable(index)
    }

    /// Read CPU memory without side effects
    pub fn peek(&self, addr: u16) -> u8 {
        self.bus.peek(addr)
    }

    /// Current PPU registers and counters
    pub fn ppu_state(&self) -> PpuState {
        PpuState::capture(self.bus.hooks(), self.bus.memory())
    }

    /// Completed frames
    pub fn frame_count(&self) -> u64 {
        self.bus.hooks().frame_count()
    }

    /// CPU cycles since the engine was built or the cartridge last loaded
    pub fn cycles(&self) -> u64 {
        self.bus.cycles()
    }

    /// Get reference to the PPU
    pub fn ppu(&self) -> &Ppu {
        self.bus.hooks()
    }

    /// Get reference to the bus
    pub fn bus(&self) -> &Bus<Ppu> {
        &self.bus
    }

    /// Get mutable reference to the bus
    pub fn bus_mut(&mut self) -> &mut Bus<Ppu> {
        &mut self.bus
    }

    /// Get reference to the CPU core
    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    /// Get mutable reference to the CPU core
    pub fn cpu_mut(&mut self) -> &mut C {
        &mut self.cpu
    }

    /// Currently loaded cartridge
    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    /// Get reference to configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

fn build_bus(cartridge: &Cartridge, config: &EngineConfig) -> Bus<Ppu> {
    Bus::from_cartridge(cartridge, Ppu::from_cartridge(cartridge, config.ppu))
}
