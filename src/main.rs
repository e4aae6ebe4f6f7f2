// NES Video - command line entry point
//
// Inspects cartridge images and dumps what the PPU sees at power-on:
//
//   nes-video info <rom>          print the iNES header fields
//   nes-video dump <rom>          write pattern tables and palettes as PNGs
//   nes-video --json [<rom>]      print the power-on PPU state as JSON

use nes_video::debug::{dump_directory, dump_pixel_buffer, format_palettes};
use nes_video::{Cartridge, CpuMemory, EngineConfig, Ppu, PpuState};
use std::env;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("nes-video");

    let config = EngineConfig::load_or_default();
    if let Err(e) = config.debug.build_logger().install() {
        eprintln!("Logger already installed: {}", e);
    }

    match args.get(1).map(String::as_str) {
        Some("info") => match args.get(2) {
            Some(rom_path) => print_info(rom_path),
            None => usage(program),
        },
        Some("dump") => match args.get(2) {
            Some(rom_path) => dump(rom_path, &config),
            None => usage(program),
        },
        Some("--json") => print_json(args.get(2).map(String::as_str), &config),
        _ => usage(program),
    }
}

fn usage(program: &str) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Usage:");
    eprintln!("  {} info <rom_path>", program);
    eprintln!("  {} dump <rom_path>", program);
    eprintln!("  {} --json [<rom_path>]", program);
    std::process::exit(1);
}

fn print_info(rom_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading ROM: {}", rom_path);
    println!();

    let cartridge = Cartridge::from_file(rom_path)?;

    println!("ROM Information:");
    println!("================");
    println!("Mapper:         {}", cartridge.mapper);
    println!("Mirroring:      {:?}", cartridge.mirroring);
    println!("TV System:      {:?}", cartridge.tv_system);
    println!(
        "ROM Size:       {} bytes ({} x 16 KB)",
        cartridge.rom_size(),
        cartridge.rom_banks.len()
    );
    println!(
        "VROM Size:      {} bytes ({} x 8 KB)",
        cartridge.vrom_size(),
        cartridge.vrom_banks.len()
    );
    println!("VRAM Banks:     {}", cartridge.vram_banks);
    println!("Has Trainer:    {}", cartridge.has_trainer());
    println!("Has Battery:    {}", cartridge.has_battery);

    Ok(())
}

fn dump(rom_path: &str, config: &EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let cartridge = Cartridge::from_file(rom_path)?;
    let ppu = Ppu::from_cartridge(&cartridge, config.ppu);

    let directory = dump_directory(&config.dump.output_directory, Some(Path::new(rom_path)));
    let timestamp = config.dump.include_timestamp;

    let images = [
        ("pattern0", ppu.pattern_table(0)),
        ("pattern1", ppu.pattern_table(1)),
        ("palette_bg", ppu.background_palette()),
        ("palette_spr", ppu.sprite_palette()),
    ];
    for (label, image) in &images {
        let path = dump_pixel_buffer(image, &directory, label, timestamp)?;
        println!("Wrote {}", path.display());
    }

    print!("{}", format_palettes(&ppu));
    Ok(())
}

fn print_json(
    rom_path: Option<&str>,
    config: &EngineConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let ppu = match rom_path {
        Some(path) => Ppu::from_cartridge(&Cartridge::from_file(path)?, config.ppu),
        None => Ppu::with_config(config.ppu),
    };

    let state = PpuState::capture(&ppu, &CpuMemory::new());
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
