// CPU core interface
//
// Instruction execution lives outside this crate. A CPU core only needs to be
// able to talk to a `CpuBus` and to accept reset and NMI requests from the
// engine. Every memory access it performs through the bus counts as one CPU
// cycle and advances the PPU by three dots before the value is returned.

use crate::bus::CpuBus;

/// A 6502-family CPU core driven by the engine
///
/// Implementations decode and execute instructions; this crate never looks
/// inside them. The engine calls `step` once per instruction and `nmi` when
/// the PPU has raised its NMI line during that instruction.
pub trait CpuCore {
    /// Power-on / reset sequence (typically reads the reset vector)
    fn reset(&mut self, bus: &mut dyn CpuBus);

    /// Execute exactly one instruction
    fn step(&mut self, bus: &mut dyn CpuBus);

    /// Service a non-maskable interrupt
    fn nmi(&mut self, bus: &mut dyn CpuBus);

    /// Current program counter, for diagnostics
    fn program_counter(&self) -> u16 {
        0
    }
}

impl<C: CpuCore + ?Sized> CpuCore for Box<C> {
    fn reset(&mut self, bus: &mut dyn CpuBus) {
        (**self).reset(bus)
    }

    fn step(&mut self, bus: &mut dyn CpuBus) {
        (**self).step(bus)
    }

    fn nmi(&mut self, bus: &mut dyn CpuBus) {
        (**self).nmi(bus)
    }

    fn program_counter(&self) -> u16 {
        (**self).program_counter()
    }
}
