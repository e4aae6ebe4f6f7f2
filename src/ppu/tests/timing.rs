//! PPU Timing Tests
//!
//! Tests for cycle-accurate PPU timing including:
//! - Dot and scanline tracking
//! - Frame length and the odd-frame skip
//! - VBlank flag timing
//! - NMI generation

use super::*;

// Dot/scanline tracking
// ========================================

#[test]
fn test_ppu_cycle_tracking() {
    let mut ppu = Ppu::new();
    let mut memory = CpuMemory::new();

    ppu.step(&mut memory);
    assert_eq!(ppu.cycle(), 1, "Cycle should advance to 1");
    assert_eq!(ppu.scanline(), 241, "Scanline should remain 241");
}

#[test]
fn test_ppu_scanline_advancement() {
    let mut ppu = Ppu::new();
    let mut memory = CpuMemory::new();

    for _ in 0..CYCLES_PER_SCANLINE {
        ppu.step(&mut memory);
    }

    assert_eq!(ppu.scanline(), 242);
    assert_eq!(ppu.cycle(), 0);
}

#[test]
fn test_cpu_cycle_runs_three_dots() {
    let mut ppu = Ppu::new();
    let mut memory = CpuMemory::new();

    ppu.cpu_cycle(&mut memory);
    assert_eq!(ppu.cycle(), 3);

    let mut bus = test_bus();
    bus.write(0x0000, 0);
    let _ = bus.read(0x0000);
    bus.tick();
    assert_eq!(bus.hooks().cycle(), 9);
}

#[test]
fn test_first_frame_wraps_after_vblank_lines() {
    let mut ppu = Ppu::new();
    let mut memory = CpuMemory::new();

    let dots = dots_until_frame(&mut ppu, &mut memory);
    assert_eq!(dots, 21 * CYCLES_PER_SCANLINE as u32);
    assert_eq!(ppu.scanline(), 0);
    assert_eq!(ppu.cycle(), 0);
    assert_eq!(ppu.frame_count(), 1);
    assert!(ppu.is_odd_frame());
    assert!(ppu.take_frame_ready());
    assert!(!ppu.take_frame_ready());
}

// ========================================
// Frame length
// ========================================

#[test]
fn test_frame_length_rendering_disabled() {
    let mut ppu = Ppu::new();
    let mut memory = CpuMemory::new();
    dots_until_frame(&mut ppu, &mut memory);

    // Odd and even frames are both full length with rendering off
    assert_eq!(dots_until_frame(&mut ppu, &mut memory), CYCLES_PER_FRAME);
    assert_eq!(dots_until_frame(&mut ppu, &mut memory), CYCLES_PER_FRAME);
}

#[test]
fn test_odd_frame_skips_one_dot_when_rendering() {
    let mut ppu = Ppu::with_config(no_warmup());
    let mut memory = CpuMemory::new();
    ppu.write_register(&mut memory, PPUMASK, 0x08);

    dots_until_frame(&mut ppu, &mut memory);
    assert!(ppu.is_odd_frame());
    assert_eq!(dots_until_frame(&mut ppu, &mut memory), CYCLES_PER_FRAME - 1);

    assert!(!ppu.is_odd_frame());
    assert_eq!(dots_until_frame(&mut ppu, &mut memory), CYCLES_PER_FRAME);
}

#[test]
fn test_odd_frame_skip_lands_on_dot_two() {
    let mut ppu = Ppu::with_config(no_warmup());
    let mut memory = CpuMemory::new();
    ppu.write_register(&mut memory, PPUMASK, 0x08);

    dots_until_frame(&mut ppu, &mut memory);
    ppu.step(&mut memory);
    assert_eq!((ppu.scanline(), ppu.cycle()), (0, 2));
}

// ========================================
// VBlank
// ========================================

#[test]
fn test_vblank_set_at_dot_two() {
    let mut ppu = Ppu::new();
    let mut memory = CpuMemory::new();

    ppu.step(&mut memory);
    ppu.step(&mut memory);
    assert!(!ppu.nmi_occurred(), "not yet at dot 2");

    ppu.step(&mut memory);
    assert!(ppu.nmi_occurred(), "VBlank flag set at scanline 241 dot 2");
}

#[test]
fn test_vblank_set_with_rendering_disabled() {
    let mut ppu = Ppu::new();
    let mut memory = CpuMemory::new();
    dots_until_frame(&mut ppu, &mut memory);

    run_to(&mut ppu, &mut memory, 241, 2);
    assert!(!ppu.nmi_occurred());
    ppu.step(&mut memory);
    assert!(ppu.nmi_occurred());
}

#[test]
fn test_vblank_cleared_on_prerender_line() {
    let mut ppu = Ppu::new();
    let mut memory = CpuMemory::new();
    memory.poke(PPUSTATUS, 0x60);

    run_to(&mut ppu, &mut memory, 261, 1);
    assert!(ppu.nmi_occurred());
    ppu.step(&mut memory);

    assert!(!ppu.nmi_occurred());
    assert_eq!(memory.peek(PPUSTATUS) & 0x60, 0x00, "sprite flags cleared");
}

// ========================================
// NMI
// ========================================

#[test]
fn test_no_nmi_without_nmi_output() {
    let mut ppu = Ppu::new();
    let mut memory = CpuMemory::new();

    for _ in 0..CYCLES_PER_FRAME {
        ppu.step(&mut memory);
        assert!(!ppu.take_nmi());
    }
}

#[test]
fn test_nmi_raised_after_vblank_flag() {
    let mut ppu = Ppu::with_config(no_warmup());
    let mut memory = CpuMemory::new();
    ppu.write_register(&mut memory, PPUCTRL, 0x80);

    run_to(&mut ppu, &mut memory, 241, 3);
    assert!(ppu.nmi_occurred());
    assert!(!ppu.nmi_pending());

    ppu.step(&mut memory);
    assert!(ppu.nmi_pending());
    assert!(!ppu.nmi_occurred(), "raising the NMI consumes the flag");
    assert!(ppu.take_nmi());
    assert!(!ppu.take_nmi());
}

#[test]
fn test_exactly_one_nmi_per_frame() {
    let mut ppu = Ppu::with_config(no_warmup());
    let mut memory = CpuMemory::new();
    ppu.write_register(&mut memory, PPUCTRL, 0x80);

    let mut nmis = Vec::new();
    for dot in 0..3 * CYCLES_PER_FRAME {
        ppu.step(&mut memory);
        if ppu.take_nmi() {
            nmis.push(dot);
        }
    }

    assert_eq!(nmis, vec![3, 3 + CYCLES_PER_FRAME, 3 + 2 * CYCLES_PER_FRAME]);
}

#[test]
fn test_enabling_nmi_during_vblank_fires() {
    let mut ppu = Ppu::with_config(no_warmup());
    let mut memory = CpuMemory::new();

    run_to(&mut ppu, &mut memory, 250, 0);
    assert!(ppu.nmi_occurred());
    ppu.write_register(&mut memory, PPUCTRL, 0x80);
    ppu.step(&mut memory);
    assert!(ppu.take_nmi());
}

#[test]
fn test_status_read_before_nmi_suppresses_it() {
    let mut bus = test_bus();
    bus.write(PPUCTRL, 0x80);
    // The write ran dots 0-2, so VBlank is set; acknowledge before NMI fires
    let (ppu, memory) = bus.parts_mut();
    assert!(ppu.nmi_occurred());
    let _ = ppu.read_register(memory, PPUSTATUS, 0);
    ppu.step(memory);
    assert!(!ppu.take_nmi());
}

// ========================================
// Warm-up window
// ========================================

#[test]
fn test_suppression_window_counts_cpu_cycles() {
    let mut ppu = Ppu::new();
    let mut memory = CpuMemory::new();

    for _ in 0..RESET_SUPPRESSION_CYCLES - 1 {
        ppu.cpu_cycle(&mut memory);
    }
    assert!(ppu.reset_suppressed());

    ppu.cpu_cycle(&mut memory);
    assert!(!ppu.reset_suppressed());
}
