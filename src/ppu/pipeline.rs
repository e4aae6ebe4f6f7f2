// PPU per-dot state machine
//
// Scanlines 0-239 are visible, 240 is post-render, 241-260 are VBlank and 261
// is the pre-render line. Background fetches run on the visible and pre-render
// lines in 8-dot groups:
//
// ```text
// dot % 8:  1        2        3        4        5        6        7        0
//           NT addr  NT byte  AT addr  AT byte  lo addr  lo byte  hi addr  hi byte + reload
// ```

use super::constants::*;
use super::Ppu;
use crate::bus::CpuMemory;

impl Ppu {
    /// Execute one PPU dot
    ///
    /// # Returns
    ///
    /// `true` if this dot completed a frame
    pub fn step(&mut self, memory: &mut CpuMemory) -> bool {
        if self.nmi_occurred && self.nmi_output {
            self.nmi_line = true;
            self.nmi_occurred = false;
        }

        self.vblank_events(memory);

        if !self.rendering_disabled {
            self.render_dot(memory);
        }

        self.advance_counters()
    }

    /// VBlank start and pre-render flag clear; these run with rendering off too
    fn vblank_events(&mut self, memory: &mut CpuMemory) {
        match (self.scanline, self.cycle) {
            (FIRST_VBLANK_SCANLINE, VBLANK_SET_DOT) => {
                self.nmi_occurred = true;
            }
            (PRERENDER_SCANLINE, VBLANK_CLEAR_DOT) => {
                self.nmi_occurred = false;
                // Sprite 0 hit and sprite overflow
                memory.poke(PPUSTATUS, memory.peek(PPUSTATUS) & !0x60);
            }
            _ => {}
        }
    }

    fn render_dot(&mut self, memory: &mut CpuMemory) {
        match self.scanline {
            0..=LAST_VISIBLE_SCANLINE => {
                if self.scanline == 0 && self.cycle == 0 && self.odd_frame {
                    // Odd frames drop dot 0 of the first scanline
                    self.cycle = 1;
                }
                self.bg_shift_lo >>= 1;
                self.bg_shift_hi >>= 1;
                self.fetch_dot(memory);
            }
            PRERENDER_SCANLINE => {
                self.fetch_dot(memory);
                if (280..=304).contains(&self.cycle) {
                    self.copy_vertical_bits();
                }
            }
            _ => {}
        }
    }

    /// Background fetch pipeline and scroll bookkeeping for the current dot
    fn fetch_dot(&mut self, memory: &mut CpuMemory) {
        match self.cycle {
            1..=256 | 321..=340 => match self.cycle % 8 {
                1 => self.nametable_addr = NAMETABLE_BASE | (self.v & 0x0FFF),
                2 => self.nametable_byte = self.read_vram(self.nametable_addr),
                3 => {
                    self.attribute_addr = 0x23C0
                        | (self.v & 0x0C00)
                        | ((self.v >> 4) & 0x38)
                        | ((self.v >> 2) & 0x07);
                }
                4 => self.attribute_byte = self.read_vram(self.attribute_addr),
                5 => {
                    self.pattern_lo_addr = ((self.nametable_byte as u16) << 4)
                        | (self.v >> 12)
                        | (((self.control & 0x10) as u16) << 8);
                }
                6 => self.pattern_lo_byte = self.read_vram(self.pattern_lo_addr),
                7 => self.pattern_hi_addr = self.pattern_lo_addr | 8,
                _ => {
                    self.pattern_hi_byte = self.read_vram(self.pattern_hi_addr);
                    self.reload_shift_registers();

                    if self.cycle < 256 || self.cycle > 327 {
                        self.increment_coarse_x();
                    }
                    if self.cycle == 256 {
                        self.increment_y();
                    }
                }
            },
            257 => {
                self.nametable_addr = NAMETABLE_BASE | (self.v & 0x0FFF);
                self.copy_horizontal_bits();
                memory.poke(OAMADDR, 0);
            }
            258..=320 => memory.poke(OAMADDR, 0),
            _ => {}
        }
    }

    /// Put the freshly fetched tile row into the high byte of each shifter
    fn reload_shift_registers(&mut self) {
        self.bg_shift_lo = (self.bg_shift_lo & 0x00FF) | ((self.pattern_lo_byte as u16) << 8);
        self.bg_shift_hi = (self.bg_shift_hi & 0x00FF) | ((self.pattern_hi_byte as u16) << 8);
    }

    /// Horizontal position step after each tile
    ///
    /// Only active with `PpuConfig::coarse_x_increment`; otherwise coarse X
    /// stays put until the dot-257 reload.
    fn increment_coarse_x(&mut self) {
        if !self.config.coarse_x_increment {
            return;
        }

        if self.v & 0x001F == 31 {
            self.v &= !0x001F;
            self.v ^= 0x0400;
        } else {
            self.v += 1;
        }
    }

    /// Fine Y step at dot 256, rolling into coarse Y and the nametable bit
    pub(super) fn increment_y(&mut self) {
        if self.v & 0x7000 != 0x7000 {
            self.v += 0x1000;
            return;
        }

        self.v &= !0x7000;
        match self.v & 0x03E0 {
            // Row 29: wrap to row 0 of the other vertical nametable
            0x03A0 => self.v ^= 0x0BA0,
            // Row 31 (attribute rows): wrap without switching
            0x03E0 => self.v ^= 0x03E0,
            _ => self.v += 0x0020,
        }
        self.v &= 0x7FFF;
    }

    /// v: ....A.. ...BCDEF <- t: ....A.. ...BCDEF
    pub(super) fn copy_horizontal_bits(&mut self) {
        self.v = (self.v & 0x7BE0) | (self.t & 0x041F);
    }

    /// v: GHIA.BC DEF..... <- t: GHIA.BC DEF.....
    pub(super) fn copy_vertical_bits(&mut self) {
        self.v = (self.v & 0x041F) | (self.t & 0x7BE0);
    }

    fn advance_counters(&mut self) -> bool {
        self.cycle += 1;
        if self.cycle < CYCLES_PER_SCANLINE {
            return false;
        }

        self.cycle = 0;
        self.scanline += 1;
        if self.scanline < SCANLINES_PER_FRAME {
            return false;
        }

        self.scanline = 0;
        self.frame += 1;
        self.odd_frame = !self.odd_frame;
        self.frame_ready = true;
        true
    }
}
