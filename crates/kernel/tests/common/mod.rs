#![allow(dead_code)]

use kernel::{BufferConsole, Kernel, VictimSelector};
use types::{Config, DiskGeometry, PartitionId};

/// Always evicts the lowest-numbered candidate partition.
pub struct FirstVictim;

impl VictimSelector for FirstVictim {
    fn select(&mut self, candidates: &[PartitionId]) -> Option<PartitionId> {
        candidates.iter().min().copied()
    }
}

pub fn boot(config: Config) -> Kernel {
    Kernel::new(config, BufferConsole::new())
        .unwrap()
        .with_victim_selector(Box::new(FirstVictim))
}

pub fn boot_default() -> Kernel {
    boot(Config::default())
}

pub fn single_partition() -> Config {
    Config {
        partition_count: 1,
        ..Config::default()
    }
}

/// One 16 byte partition and a disk with a single directory entry and two
/// 12 byte data blocks: exactly one swapped image fits.
pub fn cramped() -> Config {
    Config {
        partition_size: 16,
        partition_count: 1,
        quantum: 1,
        disk: DiskGeometry {
            tracks: 2,
            sectors: 1,
            blocks: 2,
            block_size: 16,
        },
        ..Config::default()
    }
}

pub fn ticks(kernel: &mut Kernel, n: usize) {
    for _ in 0..n {
        kernel.on_clock_tick();
    }
}

pub fn running_pid(kernel: &Kernel) -> Option<u32> {
    kernel.processes().running().map(|pcb| pcb.pid)
}

/// Branches onto itself forever.
pub const SPIN: [u8; 2] = [0xD0, 0xFE];
