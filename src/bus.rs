// Bus module - CPU address space and hook dispatch
//
// This module implements the memory bus the CPU core talks to. The bus owns the
// whole 64KB CPU address space, applies the mirroring rules before touching the
// backing store, counts CPU cycles, and notifies the registered hooks (the PPU)
// on every cycle, read and write.
//
// # NES Memory Map (CPU Address Space)
//
// ```text
// $0000-$07FF: 2KB Internal RAM
// $0800-$17FF: Mirrors of RAM (2 times)
// $1800-$1FFF: Unmirrored
// $2000-$2007: PPU Registers
// $2008-$3FFF: Mirrors of PPU Registers (repeating every 8 bytes)
// $4014:       OAM DMA
// $6000-$7FFF: Cartridge RAM (trainer at $7000)
// $8000-$BFFF: First ROM bank
// $C000-$FFFF: Last ROM bank (mirror of the first for single-bank images)
// ```

use crate::cartridge::{Cartridge, ROM_BANK_SIZE};

/// Mask applied to internal RAM addresses
pub const RAM_MIRROR_MASK: u16 = 0x07FF;

/// Writing a page number here copies that page into OAM
pub const OAM_DMA_ADDR: u16 = 0x4014;

/// Where the trainer block is mapped
pub const TRAINER_ADDR: u16 = 0x7000;

/// Start of cartridge ROM
pub const ROM_START: u16 = 0x8000;

/// Fold a CPU address onto its backing cell
///
/// Addresses below $1800 collapse onto $0000-$07FF and the PPU register
/// mirrors onto $2000-$2007. Everything else, $1800-$1FFF included, maps to
/// itself.
#[inline]
pub fn mirror_address(addr: u16) -> u16 {
    match addr {
        0x0000..=0x17FF => addr & RAM_MIRROR_MASK,
        0x2000..=0x3FFF => (addr & 0x0007) + 0x2000,
        _ => addr,
    }
}

/// Flat backing store for the CPU address space
///
/// Indexed with already-mirrored addresses. The PPU register bytes at
/// $2000-$2007 live here too; the PPU treats them as views.
pub struct CpuMemory {
    data: Box<[u8; 0x10000]>,
}

impl CpuMemory {
    /// Create a zero-filled address space
    pub fn new() -> Self {
        CpuMemory {
            data: Box::new([0; 0x10000]),
        }
    }

    /// Read a cell without any side effects
    #[inline]
    pub fn peek(&self, addr: u16) -> u8 {
        self.data[addr as usize]
    }

    /// Write a cell without any side effects
    #[inline]
    pub fn poke(&mut self, addr: u16, data: u8) {
        self.data[addr as usize] = data;
    }

    /// Copy a block into memory starting at `addr`, clipped at $FFFF
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        let start = addr as usize;
        let end = (start + bytes.len()).min(self.data.len());
        self.data[start..end].copy_from_slice(&bytes[..end - start]);
    }
}

impl Default for CpuMemory {
    fn default() -> Self {
        Self::new()
    }
}

/// Notifications a component receives from the bus
///
/// The bus calls `on_cycle` first for every counted access and then the
/// matching `on_read`/`on_write`, all before the CPU core sees the value.
/// Addresses passed to the hooks are already mirrored.
pub trait BusHooks {
    /// One CPU cycle has elapsed
    fn on_cycle(&mut self, memory: &mut CpuMemory);

    /// The CPU read `value` from `addr`; the returned byte is what it sees
    fn on_read(&mut self, _memory: &mut CpuMemory, _addr: u16, value: u8) -> u8 {
        value
    }

    /// The CPU wrote `data` to `addr` (already stored)
    fn on_write(&mut self, _memory: &mut CpuMemory, _addr: u16, _data: u8) {}

    /// One byte of an OAM DMA transfer
    fn on_oam_dma(&mut self, _memory: &mut CpuMemory, _data: u8) {}
}

impl BusHooks for () {
    fn on_cycle(&mut self, _memory: &mut CpuMemory) {}
}

/// The bus as seen by a CPU core
pub trait CpuBus {
    /// Counted read: one cycle, hooks notified
    fn read(&mut self, addr: u16) -> u8;

    /// Counted write: one cycle, hooks notified
    fn write(&mut self, addr: u16, data: u8);

    /// Uncounted read with no side effects
    fn peek(&self, addr: u16) -> u8;

    /// An internal CPU cycle with no memory access
    fn tick(&mut self);

    /// CPU cycles elapsed since the bus was created
    fn cycles(&self) -> u64;

    /// Read a 16-bit little-endian word (two counted reads)
    fn read_u16(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }
}

/// Main memory bus structure
///
/// Generic over the component that listens to bus traffic. The engine uses
/// the PPU; tests of plain memory behavior use `()`.
pub struct Bus<H: BusHooks = ()> {
    /// CPU address space
    memory: CpuMemory,

    /// Registered listener
    hooks: H,

    /// Monotonic CPU cycle counter
    cycles: u64,
}

impl<H: BusHooks> Bus<H> {
    /// Create a bus with empty memory
    ///
    /// # Example
    /// ```
    /// use nes_video::bus::{Bus, CpuBus};
    ///
    /// let mut bus = Bus::new(());
    /// bus.write(0x0000, 0x42);
    /// assert_eq!(bus.read(0x0800), 0x42);
    /// ```
    pub fn new(hooks: H) -> Self {
        Bus {
            memory: CpuMemory::new(),
            hooks,
            cycles: 0,
        }
    }

    /// Create a bus with the cartridge's banks mapped in
    ///
    /// ROM bank 0 goes to $8000 and the last ROM bank to $C000, so a single
    /// bank appears twice. The trainer, if any, goes to $7000.
    pub fn from_cartridge(cartridge: &Cartridge, hooks: H) -> Self {
        let mut bus = Self::new(hooks);
        bus.map_cartridge(cartridge);
        bus
    }

    /// Replace the cartridge-mapped regions with a new image
    pub fn map_cartridge(&mut self, cartridge: &Cartridge) {
        if let Some(trainer) = &cartridge.trainer {
            self.memory.load(TRAINER_ADDR, trainer);
        }

        let empty = vec![0; ROM_BANK_SIZE];
        let first = cartridge.rom_banks.first().unwrap_or(&empty);
        let last = cartridge.rom_banks.last().unwrap_or(&empty);
        self.memory.load(ROM_START, first);
        self.memory.load(ROM_START + ROM_BANK_SIZE as u16, last);
    }

    /// Copy raw bytes into the address space without side effects
    ///
    /// Useful for placing test programs, including into ROM.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        self.memory.load(addr, bytes);
    }

    /// Uncounted write with no side effects (mirroring still applies)
    pub fn poke(&mut self, addr: u16, data: u8) {
        self.memory.poke(mirror_address(addr), data);
    }

    /// The registered listener
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// The registered listener, mutably
    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// The backing store
    pub fn memory(&self) -> &CpuMemory {
        &self.memory
    }

    /// Split borrow of the listener and the backing store
    pub fn parts_mut(&mut self) -> (&mut H, &mut CpuMemory) {
        (&mut self.hooks, &mut self.memory)
    }

    fn advance_cycle(&mut self) {
        self.cycles += 1;
        self.hooks.on_cycle(&mut self.memory);
    }

    /// Copy page `$XX00-$XXFF` into OAM
    ///
    /// The copy is synchronous and costs no CPU cycles.
    fn oam_dma(&mut self, page: u8) {
        let base = (page as u16) << 8;
        for offset in 0..256u16 {
            let data = self.peek(base.wrapping_add(offset));
            self.hooks.on_oam_dma(&mut self.memory, data);
        }
    }
}

impl<H: BusHooks> CpuBus for Bus<H> {
    fn read(&mut self, addr: u16) -> u8 {
        let addr = mirror_address(addr);
        self.advance_cycle();
        let value = self.memory.peek(addr);
        self.hooks.on_read(&mut self.memory, addr, value)
    }

    fn write(&mut self, addr: u16, data: u8) {
        let addr = mirror_address(addr);
        self.advance_cycle();

        // ROM ignores writes
        if addr < ROM_START {
            self.memory.poke(addr, data);
        }
        self.hooks.on_write(&mut self.memory, addr, data);

        if addr == OAM_DMA_ADDR {
            self.oam_dma(data);
        }
    }

    fn peek(&self, addr: u16) -> u8 {
        self.memory.peek(mirror_address(addr))
    }

    fn tick(&mut self) {
        self.advance_cycle();
    }

    fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl Default for Bus<()> {
    fn default() -> Self {
        Self::new(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::Mirroring;
    use crate::cartridge::TvSystem;

    /// Records every notification in order
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        dma: Vec<u8>,
    }

    impl BusHooks for Recorder {
        fn on_cycle(&mut self, _memory: &mut CpuMemory) {
            self.events.push("cycle".to_string());
        }

        fn on_read(&mut self, _memory: &mut CpuMemory, addr: u16, value: u8) -> u8 {
            self.events.push(format!("read {:04X}", addr));
            if addr == 0x2002 {
                value | 0x80
            } else {
                value
            }
        }

        fn on_write(&mut self, _memory: &mut CpuMemory, addr: u16, data: u8) {
            self.events.push(format!("write {:04X}={:02X}", addr, data));
        }

        fn on_oam_dma(&mut self, _memory: &mut CpuMemory, data: u8) {
            self.dma.push(data);
        }
    }

    fn cartridge(rom_banks: Vec<Vec<u8>>) -> Cartridge {
        Cartridge {
            rom_banks,
            vrom_banks: vec![],
            trainer: None,
            mirroring: Mirroring::Horizontal,
            mapper: 0,
            has_battery: false,
            tv_system: TvSystem::Ntsc,
            vram_banks: 1,
        }
    }

    // ========================================
    // Mirroring Tests
    // ========================================

    #[test]
    fn test_ram_mirroring() {
        let mut bus = Bus::default();
        for addr in (0x0000..0x1800u16).step_by(0x3D) {
            bus.write(addr, (addr & 0xFF) as u8);
            assert_eq!(bus.read(addr & 0x07FF), (addr & 0xFF) as u8);
        }
    }

    #[test]
    fn test_ram_above_17ff_is_not_mirrored() {
        let mut bus = Bus::default();
        bus.write(0x1800, 0x77);
        assert_eq!(bus.read(0x0000), 0x00);
        assert_eq!(bus.read(0x1800), 0x77);

        bus.write(0x17FF, 0x5A);
        assert_eq!(bus.read(0x07FF), 0x5A);
        assert_eq!(mirror_address(0x1FFF), 0x1FFF);
    }

    #[test]
    fn test_ppu_register_folding() {
        assert_eq!(mirror_address(0x2008), 0x2000);
        assert_eq!(mirror_address(0x3456), 0x2006);
        assert_eq!(mirror_address(0x3FFF), 0x2007);
        assert_eq!(mirror_address(0x4014), 0x4014);
    }

    #[test]
    fn test_ppu_mirror_reaches_hooks_folded() {
        let mut bus = Bus::new(Recorder::default());
        bus.write(0x3FFE, 0x12);
        let _ = bus.read(0x200A);
        assert_eq!(
            bus.hooks().events,
            vec!["cycle", "write 2006=12", "cycle", "read 2002"]
        );
    }

    // ========================================
    // Cycle Counting Tests
    // ========================================

    #[test]
    fn test_every_access_counts_one_cycle() {
        let mut bus = Bus::default();
        bus.write(0x0000, 1);
        let _ = bus.read(0x0000);
        bus.tick();
        assert_eq!(bus.cycles(), 3);

        let _ = bus.peek(0x0000);
        bus.poke(0x0001, 2);
        assert_eq!(bus.cycles(), 3);
    }

    #[test]
    fn test_read_hook_can_change_value() {
        let mut bus = Bus::new(Recorder::default());
        bus.poke(0x2002, 0x01);
        assert_eq!(bus.read(0x2002), 0x81);
        assert_eq!(bus.peek(0x2002), 0x01);
    }

    #[test]
    fn test_read_u16() {
        let mut bus = Bus::default();
        bus.write(0x0010, 0x34);
        bus.write(0x0011, 0x12);
        assert_eq!(bus.read_u16(0x0010), 0x1234);
    }

    // ========================================
    // Cartridge Mapping Tests
    // ========================================

    #[test]
    fn test_single_rom_bank_is_mirrored() {
        let bus = Bus::from_cartridge(&cartridge(vec![vec![0xA5; ROM_BANK_SIZE]]), ());
        assert_eq!(bus.peek(0x8000), 0xA5);
        assert_eq!(bus.peek(0xC000), 0xA5);
        assert_eq!(bus.peek(0xFFFF), 0xA5);
    }

    #[test]
    fn test_two_rom_banks_are_linear() {
        let bus = Bus::from_cartridge(
            &cartridge(vec![vec![0x01; ROM_BANK_SIZE], vec![0x02; ROM_BANK_SIZE]]),
            (),
        );
        assert_eq!(bus.peek(0xBFFF), 0x01);
        assert_eq!(bus.peek(0xC000), 0x02);
    }

    #[test]
    fn test_trainer_is_mapped() {
        let mut cart = cartridge(vec![]);
        cart.trainer = Some(vec![0x7E; 512]);
        let bus = Bus::from_cartridge(&cart, ());
        assert_eq!(bus.peek(0x7000), 0x7E);
        assert_eq!(bus.peek(0x71FF), 0x7E);
        assert_eq!(bus.peek(0x7200), 0x00);
    }

    #[test]
    fn test_rom_ignores_writes() {
        let mut bus = Bus::from_cartridge(&cartridge(vec![vec![0x33; ROM_BANK_SIZE]]), ());
        bus.write(0x8000, 0x00);
        assert_eq!(bus.peek(0x8000), 0x33);
    }

    #[test]
    fn test_cartridge_ram_is_writable() {
        let mut bus = Bus::default();
        bus.write(0x6004, 0x50);
        assert_eq!(bus.read(0x6004), 0x50);
    }

    // ========================================
    // OAM DMA Tests
    // ========================================

    #[test]
    fn test_oam_dma_copies_page() {
        let mut bus = Bus::new(Recorder::default());
        for i in 0..256u16 {
            bus.poke(0x0200 + i, i as u8);
        }
        bus.write(OAM_DMA_ADDR, 0x02);

        let expected: Vec<u8> = (0..=255).collect();
        assert_eq!(bus.hooks().dma, expected);
    }

    #[test]
    fn test_oam_dma_does_not_count_cycles() {
        let mut bus = Bus::new(Recorder::default());
        bus.write(OAM_DMA_ADDR, 0x03);
        assert_eq!(bus.cycles(), 1);
        assert_eq!(bus.hooks().dma.len(), 256);
    }

    #[test]
    fn test_oam_dma_from_ram_mirror_page() {
        let mut bus = Bus::new(Recorder::default());
        bus.poke(0x0300, 0xAB);
        // Page $0B mirrors page $03
        bus.write(OAM_DMA_ADDR, 0x0B);
        assert_eq!(bus.hooks().dma[0], 0xAB);
    }
}
