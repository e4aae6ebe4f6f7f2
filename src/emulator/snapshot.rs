// Debug snapshots shared with other threads
//
// The engine publishes a complete copy of the viewer data at each frame end.
// Readers clone the latest snapshot out under the lock, so they never see a
// frame that is only partially updated.

use crate::bus::CpuMemory;
use crate::debug::PpuState;
use crate::ppu::{PixelBuffer, Ppu};
use std::sync::{Arc, Mutex};

/// Viewer data captured at the end of one frame
#[derive(Debug, Clone)]
pub struct DebugSnapshot {
    /// Frame number the snapshot was taken after
    pub frame: u64,

    /// PPU registers and counters
    pub ppu_state: PpuState,

    /// Pattern tables 0 and 1
    pub pattern_tables: [PixelBuffer; 2],

    /// Background palette swatches
    pub background_palette: PixelBuffer,

    /// Sprite palette swatches
    pub sprite_palette: PixelBuffer,

    /// Raw palette RAM ($3F00-$3F1F)
    pub palette_ram: [u8; 32],
}

impl DebugSnapshot {
    /// Capture everything the viewers need from the current PPU state
    pub fn capture(ppu: &Ppu, memory: &CpuMemory) -> Self {
        let mut palette_ram = [0; 32];
        for (i, entry) in palette_ram.iter_mut().enumerate() {
            *entry = ppu.read_ppu_memory(0x3F00 + i as u16);
        }

        DebugSnapshot {
            frame: ppu.frame_count(),
            ppu_state: PpuState::capture(ppu, memory),
            pattern_tables: [ppu.pattern_table(0), ppu.pattern_table(1)],
            background_palette: ppu.background_palette(),
            sprite_palette: ppu.sprite_palette(),
            palette_ram,
        }
    }
}

/// Cloneable handle to the latest published snapshot
#[derive(Debug, Clone, Default)]
pub struct SnapshotHandle {
    latest: Arc<Mutex<Option<DebugSnapshot>>>,
}

impl SnapshotHandle {
    /// Create an empty handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the most recent snapshot, if a frame has completed
    pub fn latest(&self) -> Option<DebugSnapshot> {
        match self.latest.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Frame number of the most recent snapshot
    pub fn frame(&self) -> Option<u64> {
        self.latest().map(|snapshot| snapshot.frame)
    }

    /// Replace the published snapshot
    pub(crate) fn publish(&self, snapshot: DebugSnapshot) {
        let mut guard = match self.latest.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(snapshot);
    }
}
