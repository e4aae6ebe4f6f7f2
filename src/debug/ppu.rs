// PPU state capture for debug output
//
// Provides:
// - PPU state snapshot (serializable for JSON output)
// - Register flag formatting
// - Palette RAM listing

use crate::bus::CpuMemory;
use crate::ppu::Ppu;
use serde::Serialize;

/// PPU state snapshot
///
/// Contains a complete snapshot of the PPU state at a specific point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PpuState {
    /// Current scanline (0-261)
    pub scanline: u16,

    /// Current cycle (0-340)
    pub cycle: u16,

    /// Frame counter
    pub frame: u64,

    /// PPUCTRL register ($2000), last accepted value
    pub ppuctrl: u8,

    /// PPUMASK register ($2001)
    pub ppumask: u8,

    /// PPUSTATUS register ($2002) as the CPU would read it
    pub ppustatus: u8,

    /// OAMADDR register ($2003)
    pub oam_addr: u8,

    /// Current VRAM address (v)
    pub v: u16,

    /// Temporary VRAM address (t)
    pub t: u16,

    /// Fine X scroll
    pub fine_x: u8,

    /// Write latch (w)
    pub write_latch: bool,

    /// VBlank started and not yet acknowledged
    pub nmi_occurred: bool,

    /// NMI generation enabled
    pub nmi_output: bool,

    /// NMI waiting to be delivered to the CPU
    pub nmi_pending: bool,
}

impl PpuState {
    /// Capture the current PPU state
    ///
    /// `memory` supplies the register bytes the bus holds (status and
    /// OAMADDR).
    pub fn capture(ppu: &Ppu, memory: &CpuMemory) -> Self {
        let vblank = if ppu.nmi_occurred() { 0x80 } else { 0x00 };

        PpuState {
            scanline: ppu.scanline(),
            cycle: ppu.cycle(),
            frame: ppu.frame_count(),
            ppuctrl: ppu.control(),
            ppumask: ppu.mask(),
            ppustatus: (memory.peek(0x2002) & 0x7F) | vblank,
            oam_addr: memory.peek(0x2003),
            v: ppu.vram_addr(),
            t: ppu.temp_vram_addr(),
            fine_x: ppu.fine_x(),
            write_latch: ppu.write_toggle(),
            nmi_occurred: ppu.nmi_occurred(),
            nmi_output: ppu.nmi_output(),
            nmi_pending: ppu.nmi_pending(),
        }
    }

    /// Format PPUCTRL flags
    ///
    /// # Returns
    ///
    /// A string describing the PPUCTRL flags
    pub fn format_ppuctrl(&self) -> String {
        let mut flags = Vec::new();

        if self.ppuctrl & 0x80 != 0 {
            flags.push("NMI");
        }
        if self.ppuctrl & 0x20 != 0 {
            flags.push("SPR8x16");
        } else {
            flags.push("SPR8x8");
        }
        if self.ppuctrl & 0x10 != 0 {
            flags.push("BG@$1000");
        } else {
            flags.push("BG@$0000");
        }
        if self.ppuctrl & 0x08 != 0 {
            flags.push("SPR@$1000");
        } else {
            flags.push("SPR@$0000");
        }
        if self.ppuctrl & 0x04 != 0 {
            flags.push("+32");
        } else {
            flags.push("+1");
        }

        flags.push(match self.ppuctrl & 0x03 {
            0 => "NT$2000",
            1 => "NT$2400",
            2 => "NT$2800",
            _ => "NT$2C00",
        });

        flags.join(" ")
    }

    /// Format PPUMASK flags
    pub fn format_ppumask(&self) -> String {
        let mut flags = Vec::new();

        if self.ppumask & 0x80 != 0 {
            flags.push("EmpB");
        }
        if self.ppumask & 0x40 != 0 {
            flags.push("EmpG");
        }
        if self.ppumask & 0x20 != 0 {
            flags.push("EmpR");
        }
        if self.ppumask & 0x10 != 0 {
            flags.push("ShowSPR");
        }
        if self.ppumask & 0x08 != 0 {
            flags.push("ShowBG");
        }
        if self.ppumask & 0x04 != 0 {
            flags.push("SPRLeft");
        }
        if self.ppumask & 0x02 != 0 {
            flags.push("BGLeft");
        }
        if self.ppumask & 0x01 != 0 {
            flags.push("Gray");
        }

        if flags.is_empty() {
            "None".to_string()
        } else {
            flags.join(" ")
        }
    }

    /// Format PPUSTATUS flags
    pub fn format_ppustatus(&self) -> String {
        let mut flags = Vec::new();

        if self.ppustatus & 0x80 != 0 {
            flags.push("VBlank");
        }
        if self.ppustatus & 0x40 != 0 {
            flags.push("Spr0Hit");
        }
        if self.ppustatus & 0x20 != 0 {
            flags.push("SprOvf");
        }

        if flags.is_empty() {
            "None".to_string()
        } else {
            flags.join(" ")
        }
    }

    /// Format the PPU state as a multi-line report
    pub fn format(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Scanline: {} Cycle: {} Frame: {}\n",
            self.scanline, self.cycle, self.frame
        ));
        output.push_str(&format!(
            "PPUCTRL:   ${:02X} [{}]\n",
            self.ppuctrl,
            self.format_ppuctrl()
        ));
        output.push_str(&format!(
            "PPUMASK:   ${:02X} [{}]\n",
            self.ppumask,
            self.format_ppumask()
        ));
        output.push_str(&format!(
            "PPUSTATUS: ${:02X} [{}]\n",
            self.ppustatus,
            self.format_ppustatus()
        ));
        output.push_str(&format!("OAMADDR:   ${:02X}\n", self.oam_addr));
        output.push_str(&format!(
            "v: ${:04X} t: ${:04X} x: {} w: {}\n",
            self.v,
            self.t,
            self.fine_x,
            if self.write_latch { 1 } else { 0 }
        ));
        output.push_str(&format!(
            "NMI: {}\n",
            if self.nmi_pending { "Pending" } else { "None" }
        ));

        output
    }
}

impl std::fmt::Display for PpuState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PPU[{:3},{:3}] CTRL:{:02X} MASK:{:02X} STATUS:{:02X} v:{:04X}",
            self.scanline, self.cycle, self.ppuctrl, self.ppumask, self.ppustatus, self.v
        )
    }
}

/// Format palette RAM ($3F00-$3F1F) as a string
pub fn format_palettes(ppu: &Ppu) -> String {
    let mut output = String::new();

    for (title, base) in [("Background Palettes", 0x3F00u16), ("Sprite Palettes", 0x3F10)] {
        output.push_str(title);
        output.push_str(":\n");
        for i in 0..4u16 {
            output.push_str(&format!("  Palette {}: ", i));
            for j in 0..4u16 {
                let color = ppu.read_ppu_memory(base + i * 4 + j);
                output.push_str(&format!("${:02X} ", color));
            }
            output.push('\n');
        }
    }

    output
}
