use crate::observer::CycleObserver;
use crate::sys_call::SyscallHandler;

/// Flat physical memory: an ordered run of bytes with no policy of its own.
///
/// EDUCATIONAL: Protection lives one layer up. The memory manager splits
/// this store into partitions and the accessor it hands to the CPU does
/// the base/limit arithmetic, the same way an MMU sits between a real CPU
/// and its RAM chips.
#[derive(Clone, Debug)]
pub struct Memory {
    mem: Vec<u8>,
}

impl Memory {
    pub fn new(memory_size: usize) -> Self {
        Self {
            mem: vec![0u8; memory_size],
        }
    }

    pub fn mem(&self) -> &[u8] {
        &self.mem
    }

    pub fn size(&self) -> usize {
        self.mem.len()
    }

    pub fn load_byte(&self, addr: usize) -> u8 {
        self.mem[addr]
    }

    pub fn store_byte(&mut self, addr: usize, value: u8) {
        self.mem[addr] = value;
    }

    pub fn mem_slice(&self, start: usize, end: usize) -> Option<&[u8]> {
        if end > self.mem.len() || start > end {
            return None;
        }
        Some(&self.mem[start..end])
    }

    /// Copies `data` to `start`. Returns false without writing anything if
    /// the range would run past the end of memory.
    pub fn write_slice(&mut self, start: usize, data: &[u8]) -> bool {
        let end = match start.checked_add(data.len()) {
            Some(end) if end <= self.mem.len() => end,
            _ => return false,
        };
        self.mem[start..end].copy_from_slice(data);
        true
    }

    pub fn fill(&mut self, start: usize, end: usize, value: u8) {
        let end = end.min(self.mem.len());
        if start < end {
            self.mem[start..end].fill(value);
        }
    }
}

/// CPU-facing view of memory for the process that currently owns the CPU.
///
/// All addresses are relative to that process's partition. An access
/// outside `[0, limit)` is not performed: the implementation reports the
/// violation to the kernel and returns None / false so the CPU abandons
/// the instruction.
pub trait MemoryAccessor {
    fn read(&mut self, addr: usize) -> Option<u8>;
    fn write(&mut self, addr: usize, value: u8) -> bool;
    /// Size of the running partition, used for branch wraparound.
    fn limit(&self) -> usize;
}

/// Everything the CPU talks to during one cycle.
pub trait Bus: MemoryAccessor + SyscallHandler + CycleObserver {}

impl<T: MemoryAccessor + SyscallHandler + CycleObserver> Bus for T {}
