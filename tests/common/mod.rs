// Common test utilities for engine integration tests
//
// This module provides a scripted CPU core that replays a fixed list of bus
// operations, iNES image builders, and the blargg-style result reader used by
// test cartridges ($6000 status, $6001-$6003 signature, $6004 text).

#![allow(dead_code)]

use nes_video::{Cartridge, CpuBus, CpuCore, Engine, EngineConfig};
use std::sync::{Arc, Mutex};

/// Blargg status byte: test still running
pub const STATUS_RUNNING: u8 = 0x80;

/// Signature written to $6001-$6003 once the result area is valid
pub const RESULT_SIGNATURE: [u8; 3] = [0xDE, 0xB0, 0x61];

/// Result of running a scripted program
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    /// Test passed
    Passed,
    /// Test failed with an error code
    Failed(u8),
    /// Status still reports running
    Running,
    /// Result area not written (signature missing)
    Unknown,
}

/// One scripted CPU instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Write a byte (one cycle)
    Write(u16, u8),
    /// Read a byte (one cycle); the value is recorded
    Read(u16),
    /// Internal cycles with no bus access
    Idle(u32),
}

/// CPU core replaying a fixed list of operations, one per instruction
///
/// Once the script runs out every instruction is a two-cycle no-op. NMI entry
/// costs seven cycles and records the CPU cycle it was delivered at.
pub struct ScriptedCpu {
    script: Vec<Op>,
    position: usize,
    /// Values returned by `Op::Read`, in order
    pub reads: Vec<u8>,
    /// CPU cycle counts at which NMIs were delivered
    pub nmis: Arc<Mutex<Vec<u64>>>,
}

impl ScriptedCpu {
    pub fn new(script: Vec<Op>) -> Self {
        ScriptedCpu {
            script,
            position: 0,
            reads: Vec::new(),
            nmis: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Whether every scripted operation has executed
    pub fn finished(&self) -> bool {
        self.position >= self.script.len()
    }
}

impl CpuCore for ScriptedCpu {
    fn reset(&mut self, bus: &mut dyn CpuBus) {
        self.position = 0;
        // Reset vector fetch
        let _ = bus.read_u16(0xFFFC);
    }

    fn step(&mut self, bus: &mut dyn CpuBus) {
        match self.script.get(self.position).copied() {
            Some(Op::Write(addr, data)) => bus.write(addr, data),
            Some(Op::Read(addr)) => {
                let value = bus.read(addr);
                self.reads.push(value);
            }
            Some(Op::Idle(cycles)) => {
                for _ in 0..cycles {
                    bus.tick();
                }
            }
            None => {
                bus.tick();
                bus.tick();
            }
        }
        self.position += 1;
    }

    fn nmi(&mut self, bus: &mut dyn CpuBus) {
        for _ in 0..7 {
            bus.tick();
        }
        if let Ok(mut nmis) = self.nmis.lock() {
            nmis.push(bus.cycles());
        }
    }

    fn program_counter(&self) -> u16 {
        self.position as u16
    }
}

/// Configuration with the register write-suppression window disabled
pub fn no_warmup_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.ppu.reset_suppression_cycles = 0;
    config
}

/// Build an iNES image
///
/// ROM bank `i` is filled with `0x10 + i`, VROM bank `i` with `0xA0 + i`.
pub fn ines_image(rom_banks: u8, vrom_banks: u8, flags6: u8, trainer: Option<&[u8]>) -> Vec<u8> {
    let mut data = vec![b'N', b'E', b'S', 0x1A, rom_banks, vrom_banks, flags6, 0, 0, 0];
    data.resize(16, 0);

    if let Some(trainer) = trainer {
        data.extend_from_slice(trainer);
    }
    for i in 0..rom_banks {
        data.resize(data.len() + 16 * 1024, 0x10 + i);
    }
    for i in 0..vrom_banks {
        data.resize(data.len() + 8 * 1024, 0xA0 + i);
    }
    data
}

/// Single-bank cartridge with CHR RAM and horizontal mirroring
pub fn blank_cartridge() -> Cartridge {
    Cartridge::from_ines_bytes(&ines_image(1, 0, 0x00, None)).expect("valid image")
}

/// Script writing `bytes` to consecutive CPU addresses
pub fn write_block(addr: u16, bytes: &[u8]) -> Vec<Op> {
    bytes
        .iter()
        .enumerate()
        .map(|(i, &byte)| Op::Write(addr + i as u16, byte))
        .collect()
}

/// Script writing `bytes` to PPU memory through $2006/$2007
pub fn write_ppu_block(addr: u16, bytes: &[u8]) -> Vec<Op> {
    let mut ops = vec![
        Op::Read(0x2002), // reset the write toggle
        Op::Write(0x2006, (addr >> 8) as u8),
        Op::Write(0x2006, addr as u8),
    ];
    ops.extend(bytes.iter().map(|&byte| Op::Write(0x2007, byte)));
    ops
}

/// Run instructions until the script is exhausted
pub fn run_script(engine: &mut Engine<ScriptedCpu>, max_steps: usize) {
    for _ in 0..max_steps {
        if engine.cpu().finished() {
            return;
        }
        engine.step();
    }
    panic!("script did not finish within {} steps", max_steps);
}

/// Check the blargg-style result area
pub fn check_test_result(engine: &Engine<ScriptedCpu>) -> TestResult {
    let signature = [engine.peek(0x6001), engine.peek(0x6002), engine.peek(0x6003)];
    if signature != RESULT_SIGNATURE {
        return TestResult::Unknown;
    }

    match engine.peek(0x6000) {
        STATUS_RUNNING => TestResult::Running,
        0 => TestResult::Passed,
        code => TestResult::Failed(code),
    }
}

/// Read null-terminated string from CPU memory
pub fn read_string(engine: &Engine<ScriptedCpu>, addr: u16, max_len: usize) -> String {
    let mut result = String::new();
    let mut current_addr = addr;

    for _ in 0..max_len {
        let byte = engine.peek(current_addr);
        if byte == 0 {
            break;
        }
        if (0x20..=0x7E).contains(&byte) || byte == b'\n' {
            result.push(byte as char);
        }
        current_addr = current_addr.wrapping_add(1);
    }

    result
}
