//! PPU unit tests
//!
//! Organized by functionality. Most tests drive the PPU through a real
//! `Bus<Ppu>` so register accesses see the same mirroring and cycle
//! notifications a CPU core would produce.

use super::*;
use crate::bus::{Bus, CpuBus};
use crate::cartridge::{Cartridge, TvSystem};

// ========================================
// Test Constants (PPU Register Addresses)
// ========================================

/// PPU Control Register ($2000) - Write only
pub(crate) const PPUCTRL: u16 = 0x2000;
/// PPU Mask Register ($2001) - Write only
pub(crate) const PPUMASK: u16 = 0x2001;
/// PPU Status Register ($2002) - Read only
pub(crate) const PPUSTATUS: u16 = 0x2002;
/// OAM Address Port ($2003) - Write only
pub(crate) const OAMADDR: u16 = 0x2003;
/// OAM Data Port ($2004) - Read/Write
pub(crate) const OAMDATA: u16 = 0x2004;
/// Scroll Position Register ($2005) - Write×2
pub(crate) const PPUSCROLL: u16 = 0x2005;
/// PPU Address Register ($2006) - Write×2
pub(crate) const PPUADDR: u16 = 0x2006;
/// PPU Data Port ($2007) - Read/Write
pub(crate) const PPUDATA: u16 = 0x2007;

// ========================================
// Test Helper Functions
// ========================================

/// Configuration with the warm-up window disabled
pub(crate) fn no_warmup() -> PpuConfig {
    PpuConfig {
        reset_suppression_cycles: 0,
        ..PpuConfig::default()
    }
}

/// Bus with a PPU that accepts register writes immediately
pub(crate) fn test_bus() -> Bus<Ppu> {
    Bus::new(Ppu::with_config(no_warmup()))
}

/// Cartridge with one ROM bank and optional VROM
pub(crate) fn test_cartridge(vrom: Option<Vec<u8>>, mirroring: Mirroring) -> Cartridge {
    Cartridge {
        rom_banks: vec![vec![0xEA; 16 * 1024]],
        vrom_banks: vrom.into_iter().collect(),
        trainer: None,
        mirroring,
        mapper: 0,
        has_battery: false,
        tv_system: TvSystem::Ntsc,
        vram_banks: 1,
    }
}

/// Point v at `addr` through $2006
pub(crate) fn set_vram_addr(bus: &mut Bus<Ppu>, addr: u16) {
    bus.write(PPUADDR, (addr >> 8) as u8);
    bus.write(PPUADDR, (addr & 0xFF) as u8);
}

/// Run single dots until the PPU sits at (scanline, dot)
pub(crate) fn run_to(ppu: &mut Ppu, memory: &mut CpuMemory, scanline: u16, dot: u16) {
    let mut guard = 0u32;
    while ppu.scanline() != scanline || ppu.cycle() != dot {
        ppu.step(memory);
        guard += 1;
        assert!(guard < 2 * CYCLES_PER_FRAME, "never reached {scanline}/{dot}");
    }
}

/// Step dots until a frame wraps; returns how many dots that took
pub(crate) fn dots_until_frame(ppu: &mut Ppu, memory: &mut CpuMemory) -> u32 {
    let mut dots = 0;
    loop {
        dots += 1;
        if ppu.step(memory) {
            return dots;
        }
        assert!(dots < 2 * CYCLES_PER_FRAME, "frame never completed");
    }
}

// ========================================
// Test Modules
// ========================================

mod timing;
