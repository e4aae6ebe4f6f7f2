// PPU constants

/// Size of the PPU address space ($0000-$3FFF)
pub(super) const PPU_MEMORY_SIZE: usize = 0x4000;

/// Size of OAM in bytes (64 sprites × 4 bytes)
pub(super) const OAM_SIZE: usize = 256;

/// Size of one pattern table (one bank of the snapshot viewer)
pub(super) const PATTERN_TABLE_SIZE: u16 = 0x1000;

/// Size of nametable in bytes (1KB)
pub(super) const NAMETABLE_SIZE: u16 = 0x0400;

/// First nametable address
pub(super) const NAMETABLE_BASE: u16 = 0x2000;

/// First palette RAM address
pub(super) const PALETTE_BASE: u16 = 0x3F00;

/// Screen width in pixels
pub(super) const SCREEN_WIDTH: usize = 256;

/// Screen height in pixels
pub(super) const SCREEN_HEIGHT: usize = 240;

/// Nametable width in tiles (32 tiles)
pub(super) const NAMETABLE_WIDTH: usize = 32;

/// Nametable height in tiles (30 tiles)
pub(super) const NAMETABLE_HEIGHT: usize = 30;

/// Tile size in pixels (8x8)
pub(super) const TILE_SIZE: usize = 8;

/// Edge length of one swatch in the palette viewer
pub(super) const PALETTE_SWATCH_SIZE: usize = 16;

// ========================================
// CPU-side register addresses
// ========================================

pub(super) const PPUCTRL: u16 = 0x2000;
pub(super) const PPUMASK: u16 = 0x2001;
pub(super) const PPUSTATUS: u16 = 0x2002;
pub(super) const OAMADDR: u16 = 0x2003;
pub(super) const OAMDATA: u16 = 0x2004;
pub(super) const PPUSCROLL: u16 = 0x2005;
pub(super) const PPUADDR: u16 = 0x2006;
pub(super) const PPUDATA: u16 = 0x2007;

// ========================================
// PPU Timing Constants (NTSC)
// ========================================

/// PPU dots per CPU cycle
pub(super) const DOTS_PER_CPU_CYCLE: usize = 3;

/// Number of PPU cycles per scanline
pub(super) const CYCLES_PER_SCANLINE: u16 = 341;

/// Number of scanlines per frame (NTSC)
pub(super) const SCANLINES_PER_FRAME: u16 = 262;

/// Total PPU cycles per frame (NTSC)
/// 341 cycles/scanline × 262 scanlines = 89,342 cycles
#[allow(dead_code)]
pub(super) const CYCLES_PER_FRAME: u32 =
    (CYCLES_PER_SCANLINE as u32) * (SCANLINES_PER_FRAME as u32);

/// Last visible scanline
pub(super) const LAST_VISIBLE_SCANLINE: u16 = 239;

/// First VBlank scanline
pub(super) const FIRST_VBLANK_SCANLINE: u16 = 241;

/// Pre-render scanline number
/// This is scanline 261 (or -1 in some documentation)
pub(super) const PRERENDER_SCANLINE: u16 = 261;

/// Dot on the first VBlank scanline where the VBlank flag is raised
pub(super) const VBLANK_SET_DOT: u16 = 2;

/// Dot on the pre-render scanline where the flags are cleared
pub(super) const VBLANK_CLEAR_DOT: u16 = 1;

/// CPU cycles after power-on/reset during which $2000/$2005/$2006 ignore writes
pub(super) const RESET_SUPPRESSION_CYCLES: u32 = 29_658;
