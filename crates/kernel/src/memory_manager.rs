use log::debug;
use types::{Config, MemoryError, PartitionId, Pid};
use vm::{Instruction, Memory, decoder};

/// A fixed window `[base, base + limit)` of physical memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partition {
    pub id: PartitionId,
    pub base: usize,
    pub limit: usize,
    /// Process whose image currently fills this window.
    pub occupant: Option<Pid>,
}

impl Partition {
    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }

    /// Physical address of partition-relative `addr`, or None when the
    /// address lies outside the window.
    pub fn translate(&self, addr: usize) -> Option<usize> {
        (addr < self.limit).then_some(self.base + addr)
    }
}

/// Splits physical memory into equal fixed partitions and tracks which
/// process occupies each one.
///
/// EDUCATIONAL PURPOSE: Fixed partitioning is the oldest multiprogramming
/// memory scheme. Every process gets the same window size, so allocation
/// is a first-fit scan and protection is a single base/limit comparison.
/// The price is internal fragmentation: a 12 byte program still owns a
/// whole partition.
///
/// INVARIANT: a partition is either free and all zeros, or holds exactly
/// one process image. Partitions never overlap.
#[derive(Debug)]
pub struct MemoryManager {
    memory: Memory,
    partitions: Vec<Partition>,
}

impl MemoryManager {
    pub fn new(config: &Config) -> Self {
        let partitions = (0..config.partition_count)
            .map(|i| Partition {
                id: PartitionId(i),
                base: i * config.partition_size,
                limit: config.partition_size,
                occupant: None,
            })
            .collect();
        Self {
            memory: Memory::new(config.memory_size()),
            partitions,
        }
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub(crate) fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    pub fn partition(&self, id: PartitionId) -> Option<&Partition> {
        self.partitions.get(id.0)
    }

    pub fn partition_size(&self) -> usize {
        self.partitions.first().map(|p| p.limit).unwrap_or(0)
    }

    /// First free partition able to hold `size` bytes.
    pub fn find_free_partition(&self, size: usize) -> Option<PartitionId> {
        self.partitions
            .iter()
            .find(|p| p.is_free() && p.limit >= size)
            .map(|p| p.id)
    }

    /// Occupied partitions together with their occupant.
    pub fn occupied(&self) -> Vec<(PartitionId, Pid)> {
        self.partitions
            .iter()
            .filter_map(|p| p.occupant.map(|pid| (p.id, pid)))
            .collect()
    }

    /// Copies `image` to the start of the partition, zero-fills the rest
    /// and records `pid` as the occupant.
    pub fn load(&mut self, id: PartitionId, image: &[u8], pid: Pid) -> Result<(), MemoryError> {
        let part = *self.partition(id).ok_or(MemoryError::NoSuchPartition(id))?;
        if image.len() > part.limit {
            return Err(MemoryError::ImageTooLarge {
                len: image.len(),
                limit: part.limit,
            });
        }
        self.memory.fill(part.base, part.base + part.limit, 0);
        if !self.memory.write_slice(part.base, image) {
            self.partitions[id.0].occupant = None;
            return Err(MemoryError::OutOfRange {
                start: part.base,
                len: image.len(),
            });
        }
        self.partitions[id.0].occupant = Some(pid);
        debug!("loaded {} bytes for pid {} into partition {}", image.len(), pid, id);
        Ok(())
    }

    /// Zero-fills the partition and marks it free.
    pub fn clear(&mut self, id: PartitionId) -> Result<(), MemoryError> {
        let part = *self.partition(id).ok_or(MemoryError::NoSuchPartition(id))?;
        self.memory.fill(part.base, part.base + part.limit, 0);
        self.partitions[id.0].occupant = None;
        debug!("cleared partition {}", id);
        Ok(())
    }

    pub fn clear_all(&mut self) {
        let size = self.memory.size();
        self.memory.fill(0, size, 0);
        for part in self.partitions.iter_mut() {
            part.occupant = None;
        }
    }

    /// Full contents of the partition, used when swapping it out.
    pub fn read_image(&self, id: PartitionId) -> Result<Vec<u8>, MemoryError> {
        let part = self.partition(id).ok_or(MemoryError::NoSuchPartition(id))?;
        self.memory
            .mem_slice(part.base, part.base + part.limit)
            .map(|bytes| bytes.to_vec())
            .ok_or(MemoryError::NoSuchPartition(id))
    }

    /// Decodes the instruction at partition-relative `pc`, if any.
    pub fn instruction_at(&self, id: PartitionId, pc: usize) -> Option<Instruction> {
        let part = self.partition(id)?;
        let image = self.memory.mem_slice(part.base, part.base + part.limit)?;
        if pc >= image.len() {
            return None;
        }
        decoder::decode(image[pc], &image[pc + 1..])
    }
}
