// PPU memory access methods

use super::constants::{NAMETABLE_BASE, NAMETABLE_SIZE, PALETTE_BASE};
use super::Ppu;
use crate::cartridge::Mirroring;

/// Fold a palette address onto $3F00-$3F1F
///
/// Palette RAM is 32 bytes mirrored through $3FFF. Entry 0 of each sprite
/// palette ($3F10, $3F14, $3F18, $3F1C) is the same cell as the matching
/// background entry ($3F00, $3F04, $3F08, $3F0C).
#[inline]
pub(super) fn mirror_palette_addr(addr: u16) -> u16 {
    let addr = PALETTE_BASE | (addr & 0x001F);
    if addr & 0x0013 == 0x0010 {
        addr & !0x0010
    } else {
        addr
    }
}

impl Ppu {
    /// Fold a nametable address onto its canonical table
    ///
    /// `addr` is in $2000-$3EFF; the $3000 mirror is removed first. The
    /// result is the address of the cell in the flat 16KB array.
    ///
    /// - Horizontal: $2400 → $2000, $2C00 → $2800
    /// - Vertical: $2800 → $2000, $2C00 → $2400
    /// - Four-screen: unchanged
    pub(super) fn mirror_nametable_addr(&self, addr: u16) -> u16 {
        let addr = addr & 0x0FFF;
        let table = addr / NAMETABLE_SIZE;
        let offset = addr % NAMETABLE_SIZE;

        let table = match self.mirroring {
            Mirroring::Horizontal => table & 0b10,
            Mirroring::Vertical => table & 0b01,
            Mirroring::FourScreen => table,
        };

        NAMETABLE_BASE + table * NAMETABLE_SIZE + offset
    }

    /// Resolve any PPU address to its backing cell
    pub(super) fn resolve_addr(&self, addr: u16) -> usize {
        let addr = addr & 0x3FFF;
        let resolved = match addr {
            0x0000..=0x1FFF => addr,
            0x2000..=0x3EFF => self.mirror_nametable_addr(addr),
            _ => mirror_palette_addr(addr),
        };
        resolved as usize
    }

    /// Read from PPU memory
    ///
    /// Handles the 14-bit wrap, the $3000 nametable mirror, cartridge
    /// nametable folding and palette mirroring.
    pub(super) fn read_vram(&self, addr: u16) -> u8 {
        self.vram[self.resolve_addr(addr)]
    }

    /// Write to PPU memory
    ///
    /// Same address rules as [`Ppu::read_vram`]. Pattern table writes are
    /// dropped when the cartridge supplies VROM.
    pub(super) fn write_vram(&mut self, addr: u16, data: u8) {
        let index = self.resolve_addr(addr);
        if index < NAMETABLE_BASE as usize && !self.chr_writable {
            return;
        }
        self.vram[index] = data;
    }

    /// Raw internal memory peek for diagnostics
    ///
    /// Applies the same mirroring as the PPU itself but has no side effects
    /// (the $2007 read buffer and VRAM address are untouched).
    pub fn read_ppu_memory(&self, addr: u16) -> u8 {
        self.read_vram(addr)
    }
}
