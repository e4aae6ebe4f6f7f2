// PPU module - Picture Processing Unit (2C02) timing and memory
//
// The PPU is registered on the CPU bus as its hooks. Every CPU cycle advances
// it three dots; every access to $2000-$2007 runs the register side effects.
//
// Layout:
// - `memory`: internal 16KB address space and its mirroring rules
// - `registers`: $2000-$2007 read/write side effects
// - `pipeline`: the per-dot state machine and background fetch pipeline
// - `snapshot`: pattern table / palette / nametable extraction for viewers

mod constants;
mod memory;
pub mod palette;
mod pipeline;
mod registers;
mod snapshot;

pub use snapshot::PixelBuffer;

use crate::bus::{BusHooks, CpuMemory};
use crate::cartridge::{Cartridge, Mirroring};
use constants::*;
use serde::{Deserialize, Serialize};

/// Tunables for the PPU core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PpuConfig {
    /// Advance coarse X every 8 dots during fetches
    ///
    /// Off by default: the horizontal increment step is a no-op and coarse X
    /// only changes through the dot-257 reload.
    pub coarse_x_increment: bool,

    /// CPU cycles after power-on/reset during which writes to
    /// $2000/$2005/$2006 are ignored (0 disables the window)
    pub reset_suppression_cycles: u32,
}

impl Default for PpuConfig {
    fn default() -> Self {
        PpuConfig {
            coarse_x_increment: false,
            reset_suppression_cycles: RESET_SUPPRESSION_CYCLES,
        }
    }
}

/// PPU structure representing the Picture Processing Unit state
pub struct Ppu {
    // ========================================
    // Memory
    // ========================================
    /// Internal address space: pattern tables, nametables, palette RAM
    vram: Box<[u8; PPU_MEMORY_SIZE]>,

    /// Object Attribute Memory
    oam: [u8; OAM_SIZE],

    /// Nametable folding mode from the cartridge
    mirroring: Mirroring,

    /// Pattern tables accept writes only when the cartridge has no VROM
    chr_writable: bool,

    // ========================================
    // Internal registers
    // ========================================
    /// Current VRAM address (15 bits)
    v: u16,

    /// Temporary VRAM address (15 bits)
    t: u16,

    /// Fine X scroll (3 bits)
    fine_x: u8,

    /// First/second write toggle shared by $2005 and $2006
    write_toggle: bool,

    /// Background pattern shift registers
    bg_shift_lo: u16,
    bg_shift_hi: u16,

    /// $2007 read-ahead buffer
    read_buffer: u8,

    /// Last accepted $2000 value
    control: u8,

    /// Last $2001 value
    mask: u8,

    /// VRAM address step after each $2007 access (1 or 32)
    increment: u16,

    // ========================================
    // Background fetch latches
    // ========================================
    nametable_addr: u16,
    nametable_byte: u8,
    attribute_addr: u16,
    attribute_byte: u8,
    pattern_lo_addr: u16,
    pattern_lo_byte: u8,
    pattern_hi_addr: u16,
    pattern_hi_byte: u8,

    // ========================================
    // Timing
    // ========================================
    /// Dot within the scanline (0-340)
    cycle: u16,

    /// Scanline (0-261)
    scanline: u16,

    /// Completed frames
    frame: u64,

    odd_frame: bool,

    /// VBlank has started and has not been acknowledged
    nmi_occurred: bool,

    /// Mirrors PPUCTRL bit 7
    nmi_output: bool,

    /// PPUMASK bits 1-4 all clear
    rendering_disabled: bool,

    /// Writes to $2000/$2005/$2006 are ignored
    reset_suppressed: bool,

    /// CPU cycles since power-on/reset (saturates at the suppression window)
    cpu_cycles_since_reset: u32,

    /// Raised when an NMI must be delivered; cleared by `take_nmi`
    nmi_line: bool,

    /// Raised on each frame wrap; cleared by `take_frame_ready`
    frame_ready: bool,

    config: PpuConfig,
}

impl Ppu {
    /// Create a PPU in its power-on state with the default configuration
    pub fn new() -> Self {
        Self::with_config(PpuConfig::default())
    }

    /// Create a PPU in its power-on state
    ///
    /// Power-on is the same as the post-reset state: scanline 241, dot 0,
    /// with the write-suppression window armed.
    pub fn with_config(config: PpuConfig) -> Self {
        Ppu {
            vram: Box::new([0; PPU_MEMORY_SIZE]),
            oam: [0; OAM_SIZE],
            mirroring: Mirroring::Horizontal,
            chr_writable: true,
            v: 0,
            t: 0,
            fine_x: 0,
            write_toggle: false,
            bg_shift_lo: 0,
            bg_shift_hi: 0,
            read_buffer: 0,
            control: 0,
            mask: 0,
            increment: 1,
            nametable_addr: 0,
            nametable_byte: 0,
            attribute_addr: 0,
            attribute_byte: 0,
            pattern_lo_addr: 0,
            pattern_lo_byte: 0,
            pattern_hi_addr: 0,
            pattern_hi_byte: 0,
            cycle: 0,
            scanline: FIRST_VBLANK_SCANLINE,
            frame: 0,
            odd_frame: false,
            nmi_occurred: false,
            nmi_output: false,
            rendering_disabled: true,
            reset_suppressed: config.reset_suppression_cycles > 0,
            cpu_cycles_since_reset: 0,
            nmi_line: false,
            frame_ready: false,
            config,
        }
    }

    /// Create a PPU seeded from a cartridge image
    ///
    /// VROM bank 0 is copied into the pattern tables. Without VROM the
    /// pattern tables act as writable CHR RAM.
    pub fn from_cartridge(cartridge: &Cartridge, config: PpuConfig) -> Self {
        let mut ppu = Self::with_config(config);
        ppu.load_cartridge(cartridge);
        ppu
    }

    /// Replace pattern data and mirroring with those of a new image
    ///
    /// Clears the rest of the internal memory.
    pub fn load_cartridge(&mut self, cartridge: &Cartridge) {
        self.vram.fill(0);
        if let Some(bank) = cartridge.vrom_banks.first() {
            let len = bank.len().min(NAMETABLE_BASE as usize);
            self.vram[..len].copy_from_slice(&bank[..len]);
        }
        self.mirroring = cartridge.mirroring;
        self.chr_writable = cartridge.vrom_banks.is_empty();
    }

    /// Reset to the post-reset state
    ///
    /// Scanline 241, dot 0, toggles and latches cleared, control and mask
    /// cleared, and the write-suppression window re-armed. Memory and OAM
    /// keep their contents.
    pub fn reset(&mut self, memory: &mut CpuMemory) {
        self.scanline = FIRST_VBLANK_SCANLINE;
        self.cycle = 0;
        self.write_toggle = false;
        self.read_buffer = 0;
        self.control = 0;
        self.mask = 0;
        self.increment = 1;
        self.nmi_occurred = false;
        self.nmi_output = false;
        self.rendering_disabled = true;
        self.nmi_line = false;
        self.frame_ready = false;
        self.reset_suppressed = self.config.reset_suppression_cycles > 0;
        self.cpu_cycles_since_reset = 0;

        memory.poke(PPUCTRL, 0);
        memory.poke(PPUMASK, 0);
    }

    /// Active configuration
    pub fn config(&self) -> &PpuConfig {
        &self.config
    }

    /// Current scanline (0-261)
    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    /// Current dot within the scanline (0-340)
    pub fn cycle(&self) -> u16 {
        self.cycle
    }

    /// Number of completed frames
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Whether the frame in progress is odd
    pub fn is_odd_frame(&self) -> bool {
        self.odd_frame
    }

    /// Current VRAM address (v)
    pub fn vram_addr(&self) -> u16 {
        self.v
    }

    /// Temporary VRAM address (t)
    pub fn temp_vram_addr(&self) -> u16 {
        self.t
    }

    /// Fine X scroll
    pub fn fine_x(&self) -> u8 {
        self.fine_x
    }

    /// Write toggle (true after a first write)
    pub fn write_toggle(&self) -> bool {
        self.write_toggle
    }

    /// Last accepted PPUCTRL value
    pub fn control(&self) -> u8 {
        self.control
    }

    /// Last PPUMASK value
    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// VBlank started and not yet acknowledged
    pub fn nmi_occurred(&self) -> bool {
        self.nmi_occurred
    }

    /// NMI generation enabled (PPUCTRL bit 7)
    pub fn nmi_output(&self) -> bool {
        self.nmi_output
    }

    /// Rendering is off (PPUMASK bits 1-4 clear)
    pub fn rendering_disabled(&self) -> bool {
        self.rendering_disabled
    }

    /// Register writes are still being ignored after power-on/reset
    pub fn reset_suppressed(&self) -> bool {
        self.reset_suppressed
    }

    /// Background shift registers (low plane, high plane)
    pub fn shift_registers(&self) -> (u16, u16) {
        (self.bg_shift_lo, self.bg_shift_hi)
    }

    /// Whether an NMI is waiting to be delivered
    pub fn nmi_pending(&self) -> bool {
        self.nmi_line
    }

    /// Consume the NMI line; true at most once per raised NMI
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_line)
    }

    /// Consume the frame-ready latch
    pub fn take_frame_ready(&mut self) -> bool {
        std::mem::take(&mut self.frame_ready)
    }

    /// Read a byte of OAM
    pub fn read_oam(&self, index: u8) -> u8 {
        self.oam[index as usize]
    }

    /// Whole OAM
    pub fn oam(&self) -> &[u8; OAM_SIZE] {
        &self.oam
    }

    /// Run one CPU cycle worth of dots (three)
    ///
    /// # Returns
    ///
    /// `true` if a frame completed during these dots
    pub fn cpu_cycle(&mut self, memory: &mut CpuMemory) -> bool {
        if self.reset_suppressed {
            self.cpu_cycles_since_reset += 1;
            if self.cpu_cycles_since_reset >= self.config.reset_suppression_cycles {
                self.reset_suppressed = false;
                log::debug!(
                    "PPU register writes enabled after {} CPU cycles",
                    self.cpu_cycles_since_reset
                );
            }
        }

        let mut frame_complete = false;
        for _ in 0..DOTS_PER_CPU_CYCLE {
            frame_complete |= self.step(memory);
        }
        frame_complete
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl BusHooks for Ppu {
    fn on_cycle(&mut self, memory: &mut CpuMemory) {
        self.cpu_cycle(memory);
    }

    fn on_read(&mut self, memory: &mut CpuMemory, addr: u16, value: u8) -> u8 {
        self.read_register(memory, addr, value)
    }

    fn on_write(&mut self, memory: &mut CpuMemory, addr: u16, data: u8) {
        self.write_register(memory, addr, data);
    }

    fn on_oam_dma(&mut self, memory: &mut CpuMemory, data: u8) {
        self.write_oam_data(memory, data);
    }
}

#[cfg(test)]
mod tests;
