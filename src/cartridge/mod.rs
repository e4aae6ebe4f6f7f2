// Cartridge module - iNES image loading
//
// Parses a raw iNES byte buffer into an immutable cartridge image. Only the
// fixed linear-bank layout is supported, so the image is just the bank data
// plus the header flags; there is no mapper state.
//
// # iNES Header
//
// ```text
// 0-3: "NES" followed by $1A
// 4:   ROM bank count (16KB units)
// 5:   VROM bank count (8KB units)
// 6:   Flags 6 - mirroring, battery, trainer, four-screen, mapper low nibble
// 7:   Flags 7 - VS system, mapper high nibble
// 8:   VRAM bank count
// 9:   Flags 9 - TV system
// ```

use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Size of the iNES header in bytes
pub const HEADER_SIZE: usize = 16;

/// Size of the optional trainer block
pub const TRAINER_SIZE: usize = 512;

/// Size of one ROM (PRG) bank
pub const ROM_BANK_SIZE: usize = 16 * 1024;

/// Size of one VROM (CHR) bank
pub const VROM_BANK_SIZE: usize = 8 * 1024;

const SIGNATURE: [u8; 4] = [b'N', b'E', b'S', 0x1A];

/// Errors produced while loading a cartridge image
#[derive(Error, Debug)]
pub enum INesError {
    /// The buffer does not start with "NES\x1A"
    #[error("invalid iNES signature: {found:02X?}")]
    InvalidSignature { found: Vec<u8> },

    /// The ROM file could not be read
    #[error("error reading ROM from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Nametable mirroring mode declared by the cartridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    /// $2000=$2400, $2800=$2C00
    Horizontal,
    /// $2000=$2800, $2400=$2C00
    Vertical,
    /// Four independent nametables (cartridge-provided VRAM)
    FourScreen,
}

/// Television system flag from header byte 9
///
/// Stored only; PPU timing is always NTSC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TvSystem {
    Ntsc,
    Pal,
}

/// A loaded cartridge image
///
/// Immutable once loaded. Loading a new file replaces the whole image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cartridge {
    /// ROM banks, 16KB each, in file order
    pub rom_banks: Vec<Vec<u8>>,

    /// VROM banks, 8KB each, in file order
    pub vrom_banks: Vec<Vec<u8>>,

    /// 512-byte trainer, if the header declares one
    pub trainer: Option<Vec<u8>>,

    /// Nametable mirroring
    pub mirroring: Mirroring,

    /// Mapper number
    pub mapper: u8,

    /// Battery-backed RAM present
    pub has_battery: bool,

    /// TV system
    pub tv_system: TvSystem,

    /// VRAM bank count (at least 1)
    pub vram_banks: u8,
}

impl Cartridge {
    /// Parse an iNES image from memory
    ///
    /// Only the signature is validated. Bank counts are taken from the header
    /// as-is: bytes missing from a truncated buffer read as zero and trailing
    /// bytes are ignored.
    ///
    /// # Errors
    ///
    /// Returns `INesError::InvalidSignature` if the first four bytes are not
    /// "NES\x1A".
    ///
    /// # Example
    ///
    /// ```
    /// use nes_video::Cartridge;
    ///
    /// let mut rom = vec![0u8; 16 + 16 * 1024];
    /// rom[..4].copy_from_slice(b"NES\x1A");
    /// rom[4] = 1;
    /// let cartridge = Cartridge::from_ines_bytes(&rom).unwrap();
    /// assert_eq!(cartridge.rom_banks.len(), 1);
    /// ```
    pub fn from_ines_bytes(data: &[u8]) -> Result<Self, INesError> {
        if data.len() < SIGNATURE.len() || data[..SIGNATURE.len()] != SIGNATURE {
            return Err(INesError::InvalidSignature {
                found: data.iter().take(SIGNATURE.len()).copied().collect(),
            });
        }

        let header = |index: usize| data.get(index).copied().unwrap_or(0);

        let rom_count = header(4) as usize;
        let vrom_count = header(5) as usize;
        let flags6 = header(6);
        let flags7 = header(7);
        let vram_banks = header(8).max(1);
        let flags9 = header(9);

        let mirroring = if flags6 & 0x08 != 0 {
            Mirroring::FourScreen
        } else if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        let has_battery = flags6 & 0x02 != 0;
        let has_trainer = flags6 & 0x04 != 0;
        let mapper = (flags6 >> 4) | (flags7 & 0xF0);
        let tv_system = if flags9 & 0x01 != 0 {
            TvSystem::Pal
        } else {
            TvSystem::Ntsc
        };

        let mut offset = HEADER_SIZE;

        let trainer = if has_trainer {
            let block = copy_block(data, offset, TRAINER_SIZE);
            offset += TRAINER_SIZE;
            Some(block)
        } else {
            None
        };

        let mut rom_banks = Vec::with_capacity(rom_count);
        for _ in 0..rom_count {
            rom_banks.push(copy_block(data, offset, ROM_BANK_SIZE));
            offset += ROM_BANK_SIZE;
        }

        let mut vrom_banks = Vec::with_capacity(vrom_count);
        for _ in 0..vrom_count {
            vrom_banks.push(copy_block(data, offset, VROM_BANK_SIZE));
            offset += VROM_BANK_SIZE;
        }

        let expected = offset;
        if data.len() != expected {
            log::debug!(
                "iNES size mismatch: header declares {} bytes, buffer has {}",
                expected,
                data.len()
            );
        }

        Ok(Cartridge {
            rom_banks,
            vrom_banks,
            trainer,
            mirroring,
            mapper,
            has_battery,
            tv_system,
            vram_banks,
        })
    }

    /// Read and parse an iNES file
    ///
    /// # Errors
    ///
    /// Returns `INesError::Io` if the file cannot be read, or any error from
    /// [`Cartridge::from_ines_bytes`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, INesError> {
        let path = path.as_ref();
        log::info!("Loading cartridge from '{}'", path.display());

        let data = fs::read(path).map_err(|source| INesError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let cartridge = Self::from_ines_bytes(&data)?;
        log::info!(
            "Cartridge: mapper {}, {} ROM bank(s), {} VROM bank(s), {:?} mirroring",
            cartridge.mapper,
            cartridge.rom_banks.len(),
            cartridge.vrom_banks.len(),
            cartridge.mirroring
        );
        Ok(cartridge)
    }

    /// Total ROM size in bytes
    pub fn rom_size(&self) -> usize {
        self.rom_banks.len() * ROM_BANK_SIZE
    }

    /// Total VROM size in bytes
    pub fn vrom_size(&self) -> usize {
        self.vrom_banks.len() * VROM_BANK_SIZE
    }

    /// Whether a trainer block was present
    pub fn has_trainer(&self) -> bool {
        self.trainer.is_some()
    }

    /// Whether the header flags a PAL image
    pub fn is_pal(&self) -> bool {
        self.tv_system == TvSystem::Pal
    }
}

/// Copy `len` bytes starting at `offset`, zero-filling past the end of `data`
fn copy_block(data: &[u8], offset: usize, len: usize) -> Vec<u8> {
    let mut block = vec![0; len];
    if offset < data.len() {
        let end = (offset + len).min(data.len());
        block[..end - offset].copy_from_slice(&data[offset..end]);
    }
    block
}
