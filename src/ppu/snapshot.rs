// PPU snapshot extraction for debug viewers
//
// None of this touches the timing path: everything reads internal memory
// through `read_vram` and produces a fresh RGB buffer.

use super::constants::*;
use super::palette::color_to_rgb;
use super::Ppu;

/// An RGB image produced by the snapshot routines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    /// Row-major RGB triples
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a black image
    pub fn new(width: usize, height: usize) -> Self {
        PixelBuffer {
            width,
            height,
            data: vec![0; width * height * 3],
        }
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGB bytes, row-major
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Color at (x, y)
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.width + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Set the color at (x, y)
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let i = (y * self.width + x) * 3;
        self.data[i..i + 3].copy_from_slice(&rgb);
    }

    /// Fill a rectangle with one color
    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, rgb: [u8; 3]) {
        for row in y..y + h {
            for col in x..x + w {
                self.set_pixel(col, row, rgb);
            }
        }
    }
}

impl Ppu {
    /// Render one pattern table with background palette 0
    ///
    /// `bank` 0 is $0000-$0FFF, 1 is $1000-$1FFF. The result is 128×128:
    /// 16×16 tiles of 8×8 pixels.
    pub fn pattern_table(&self, bank: u8) -> PixelBuffer {
        self.pattern_table_with_palette(bank, 0)
    }

    /// Render one pattern table through any of the eight palettes
    ///
    /// Palettes 0-3 are background palettes, 4-7 sprite palettes.
    pub fn pattern_table_with_palette(&self, bank: u8, palette: u8) -> PixelBuffer {
        let base = (bank as u16 & 1) * PATTERN_TABLE_SIZE;
        let palette = palette & 0x07;
        let tiles_per_row = 16;
        let side = tiles_per_row * TILE_SIZE;
        let mut image = PixelBuffer::new(side, side);

        for tile in 0..256usize {
            let tile_x = (tile % tiles_per_row) * TILE_SIZE;
            let tile_y = (tile / tiles_per_row) * TILE_SIZE;

            for row in 0..TILE_SIZE {
                for col in 0..TILE_SIZE {
                    let color_index = self.fetch_tile_pixel(base, tile as u8, col, row);
                    let color = self.palette_color(palette, color_index);
                    image.set_pixel(tile_x + col, tile_y + row, color_to_rgb(color));
                }
            }
        }

        image
    }

    /// The four background palettes as flat swatches
    ///
    /// 16 swatches in a row, palette by palette.
    pub fn background_palette(&self) -> PixelBuffer {
        self.render_palettes(0)
    }

    /// The four sprite palettes as flat swatches
    pub fn sprite_palette(&self) -> PixelBuffer {
        self.render_palettes(4)
    }

    fn render_palettes(&self, first_palette: u8) -> PixelBuffer {
        let mut image = PixelBuffer::new(16 * PALETTE_SWATCH_SIZE, PALETTE_SWATCH_SIZE);

        for palette in 0..4u8 {
            for entry in 0..4u8 {
                let offset = ((first_palette + palette) * 4 + entry) as u16;
                let color = self.read_vram(PALETTE_BASE + offset);
                let x = (palette * 4 + entry) as usize * PALETTE_SWATCH_SIZE;
                let size = PALETTE_SWATCH_SIZE;
                image.fill_rect(x, 0, size, size, color_to_rgb(color));
            }
        }

        image
    }

    /// Render a whole nametable (0-3) as the background would look unscrolled
    ///
    /// Uses the background pattern table selected by PPUCTRL bit 4 and the
    /// attribute table palettes. The result is 256×240.
    pub fn nametable(&self, index: u8) -> PixelBuffer {
        let nametable_addr = NAMETABLE_BASE + (index as u16 & 0x03) * NAMETABLE_SIZE;
        let pattern_base = if self.control & 0x10 != 0 {
            PATTERN_TABLE_SIZE
        } else {
            0x0000
        };
        let mut image = PixelBuffer::new(SCREEN_WIDTH, SCREEN_HEIGHT);

        for tile_y in 0..NAMETABLE_HEIGHT {
            for tile_x in 0..NAMETABLE_WIDTH {
                let tile_addr = nametable_addr + (tile_y * NAMETABLE_WIDTH + tile_x) as u16;
                let tile_index = self.read_vram(tile_addr);
                let palette = self.read_attribute_palette(nametable_addr, tile_x, tile_y);

                for row in 0..TILE_SIZE {
                    for col in 0..TILE_SIZE {
                        let color_index = self.fetch_tile_pixel(pattern_base, tile_index, col, row);
                        let color = self.palette_color(palette, color_index);
                        image.set_pixel(
                            tile_x * TILE_SIZE + col,
                            tile_y * TILE_SIZE + row,
                            color_to_rgb(color),
                        );
                    }
                }
            }
        }

        image
    }

    /// Palette (0-3) for a tile from the attribute table
    ///
    /// Each attribute byte covers a 4x4 tile area, two bits per 2x2 block.
    fn read_attribute_palette(&self, nametable_addr: u16, tile_x: usize, tile_y: usize) -> u8 {
        let attr_addr = nametable_addr + 0x3C0 + ((tile_y / 4) * 8 + tile_x / 4) as u16;
        let attr_byte = self.read_vram(attr_addr);

        let shift = (((tile_y % 4) / 2) * 2 + (tile_x % 4) / 2) * 2;
        (attr_byte >> shift) & 0x03
    }

    /// 2-bit color index of one pixel of a tile
    ///
    /// Each tile is 16 bytes: eight bytes of the low plane followed by eight
    /// bytes of the high plane. The MSB is the leftmost pixel.
    fn fetch_tile_pixel(&self, pattern_base: u16, tile_index: u8, x: usize, y: usize) -> u8 {
        let tile_addr = pattern_base + (tile_index as u16) * 16 + y as u16;
        let lo = self.read_vram(tile_addr);
        let hi = self.read_vram(tile_addr + 8);

        let bit = 7 - x;
        (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1)
    }

    /// Color index stored in palette RAM for a palette/entry pair
    ///
    /// Entry 0 of any palette resolves to the shared backdrop through the
    /// palette mirroring.
    fn palette_color(&self, palette: u8, color_index: u8) -> u8 {
        let entry = if color_index == 0 {
            0
        } else {
            (palette as u16) * 4 + color_index as u16
        };
        self.read_vram(PALETTE_BASE + entry)
    }
}
