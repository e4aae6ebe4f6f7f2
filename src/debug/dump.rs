// Image dumps
//
// Saves snapshot pixel buffers (pattern tables, palettes, nametables) as PNG
// files, optionally timestamped.

use crate::ppu::PixelBuffer;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing a dump
#[derive(Error, Debug)]
pub enum DumpError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),
}

/// Directory that dumps for a ROM go into
///
/// Creates a layout like: `<base>/<rom_name>/`
pub fn dump_directory(base: &Path, rom_path: Option<&Path>) -> PathBuf {
    if let Some(rom_name) = rom_path.and_then(Path::file_stem) {
        return base.join(rom_name);
    }

    base.join("default")
}

/// File name for one dump, e.g. `pattern0_20240101_120000.png`
pub fn dump_file_name(label: &str, include_timestamp: bool) -> String {
    if include_timestamp {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        format!("{}_{}.png", label, timestamp)
    } else {
        format!("{}.png", label)
    }
}

/// Write a pixel buffer into `directory`, creating it if needed
///
/// # Returns
///
/// The path of the written file
pub fn dump_pixel_buffer(
    image: &PixelBuffer,
    directory: &Path,
    label: &str,
    include_timestamp: bool,
) -> Result<PathBuf, DumpError> {
    fs::create_dir_all(directory)?;
    let path = directory.join(dump_file_name(label, include_timestamp));
    save_png(&path, image)?;

    log::info!("Wrote {}x{} dump to {}", image.width(), image.height(), path.display());
    Ok(path)
}

/// Save a pixel buffer as an RGB PNG file
pub fn save_png(path: &Path, image: &PixelBuffer) -> Result<(), DumpError> {
    let file = fs::File::create(path)?;
    let w = io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, image.width() as u32, image.height() as u32);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.data())?;
    writer.finish()?;

    Ok(())
}
