// PPU register handling
//
// The bus stores every byte written to $2000-$2007; these methods run the side
// effects. `addr` is always the folded register address.

use super::constants::*;
use super::Ppu;
use crate::bus::CpuMemory;

impl Ppu {
    /// Side effects of a CPU read from a PPU register
    ///
    /// `stored` is the byte the bus holds for `addr`; the returned byte is
    /// what the CPU sees. Registers without read side effects return
    /// `stored` unchanged.
    pub fn read_register(&mut self, memory: &mut CpuMemory, addr: u16, stored: u8) -> u8 {
        match addr {
            PPUSTATUS => self.read_status(memory, stored),
            OAMDATA => self.oam[memory.peek(OAMADDR) as usize],
            PPUDATA => self.read_data(),
            _ => stored,
        }
    }

    /// Side effects of a CPU write to a PPU register
    pub fn write_register(&mut self, memory: &mut CpuMemory, addr: u16, data: u8) {
        match addr {
            PPUCTRL => self.write_control(data),
            PPUMASK => self.write_mask(data),
            OAMDATA => self.write_oam_data(memory, data),
            PPUSCROLL => self.write_scroll(data),
            PPUADDR => self.write_address(data),
            PPUDATA => self.write_data(data),
            // $2002 is read-only; $2003 needs no more than the stored byte
            _ => {}
        }
    }

    /// $2000: PPUCTRL
    ///
    /// Nametable select goes to bits 10-11 of t, bit 7 drives NMI output and
    /// bit 2 picks the $2007 increment.
    pub(super) fn write_control(&mut self, data: u8) {
        if self.reset_suppressed {
            log::trace!("PPUCTRL write ${:02X} ignored during warm-up", data);
            return;
        }

        self.control = data;
        self.t = (self.t & 0x73FF) | (((data as u16) & 0x03) << 10);
        self.nmi_output = data & 0x80 != 0;
        self.increment = if data & 0x04 != 0 { 32 } else { 1 };
    }

    /// $2001: PPUMASK
    pub(super) fn write_mask(&mut self, data: u8) {
        self.mask = data;
        self.rendering_disabled = data & 0x1E == 0;
    }

    /// $2002: PPUSTATUS
    ///
    /// Bit 7 reports the VBlank flag. Reading acknowledges VBlank and resets
    /// the write toggle.
    pub(super) fn read_status(&mut self, memory: &mut CpuMemory, stored: u8) -> u8 {
        let status = (stored & 0x7F) | if self.nmi_occurred { 0x80 } else { 0x00 };

        self.write_toggle = false;
        self.nmi_occurred = false;
        memory.poke(PPUSTATUS, status & 0x7F);

        status
    }

    /// $2004 write (also the OAM DMA path)
    ///
    /// Stores at OAMADDR and advances it. OAMADDR lives in the bus storage.
    pub(super) fn write_oam_data(&mut self, memory: &mut CpuMemory, data: u8) {
        let oam_addr = memory.peek(OAMADDR);
        self.oam[oam_addr as usize] = data;
        memory.poke(OAMADDR, oam_addr.wrapping_add(1));
    }

    /// $2005: PPUSCROLL - Write×2
    pub(super) fn write_scroll(&mut self, data: u8) {
        if self.reset_suppressed {
            log::trace!("PPUSCROLL write ${:02X} ignored during warm-up", data);
            return;
        }

        if !self.write_toggle {
            // t: ....... ...ABCDE <- d: ABCDE...
            // x:              FGH <- d: .....FGH
            self.t = (self.t & 0x7FE0) | ((data as u16) >> 3);
            self.fine_x = data & 0x07;
        } else {
            // t: FGH..AB CDE..... <- d: ABCDEFGH
            self.t = (self.t & 0x0C1F)
                | (((data as u16) & 0x07) << 12)
                | (((data as u16) & 0xF8) << 2);
        }
        self.write_toggle = !self.write_toggle;
    }

    /// $2006: PPUADDR - Write×2
    pub(super) fn write_address(&mut self, data: u8) {
        if self.reset_suppressed {
            log::trace!("PPUADDR write ${:02X} ignored during warm-up", data);
            return;
        }

        if !self.write_toggle {
            // t: .CDEFGH ........ <- d: ..CDEFGH
            // t: X...... ........ <- 0
            self.t = (self.t & 0x00FF) | (((data as u16) & 0x3F) << 8);
        } else {
            // t: ....... ABCDEFGH <- d: ABCDEFGH
            // v <- t
            self.t = (self.t & 0x7F00) | (data as u16);
            self.v = self.t;
        }
        self.write_toggle = !self.write_toggle;
    }

    /// $2007 read
    ///
    /// Below $3F00 the CPU gets the previous buffer contents. Palette reads
    /// are immediate, and the buffer picks up the nametable byte underneath.
    pub(super) fn read_data(&mut self) -> u8 {
        let addr = self.v & 0x3FFF;

        let value = if addr < PALETTE_BASE {
            let buffered = self.read_buffer;
            self.read_buffer = self.read_vram(addr);
            buffered
        } else {
            self.read_buffer = self.read_vram(addr & 0x2FFF);
            self.read_vram(addr)
        };

        self.advance_vram_addr();
        value
    }

    /// $2007 write
    pub(super) fn write_data(&mut self, data: u8) {
        self.write_vram(self.v & 0x3FFF, data);
        self.advance_vram_addr();
    }

    fn advance_vram_addr(&mut self) {
        self.v = self.v.wrapping_add(self.increment) & 0x7FFF;
    }
}
