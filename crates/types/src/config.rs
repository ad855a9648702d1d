use crate::process::SchedulingAlgorithm;

/// Physical layout of the simulated disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiskGeometry {
    pub tracks: u8,
    pub sectors: u8,
    pub blocks: u8,
    /// Bytes per block in the persisted encoding, header included.
    pub block_size: usize,
}

impl DiskGeometry {
    /// In-use flag plus a three byte successor pointer.
    pub const HEADER_SIZE: usize = 4;

    pub const fn payload_size(&self) -> usize {
        self.block_size.saturating_sub(Self::HEADER_SIZE)
    }

    pub const fn total_blocks(&self) -> usize {
        self.tracks as usize * self.sectors as usize * self.blocks as usize
    }

    pub const fn blocks_per_track(&self) -> usize {
        self.sectors as usize * self.blocks as usize
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tracks < 2 || self.sectors == 0 || self.blocks == 0 {
            return Err("disk needs a directory track plus at least one data track".to_string());
        }
        if self.tracks == u8::MAX || self.sectors == u8::MAX || self.blocks == u8::MAX {
            return Err("disk coordinate 255 is reserved for the end-of-chain marker".to_string());
        }
        // name terminator + 4 length bytes + at least one name byte
        if self.block_size < Self::HEADER_SIZE + 6 {
            return Err(format!("block size {} is too small", self.block_size));
        }
        Ok(())
    }
}

impl Default for DiskGeometry {
    fn default() -> Self {
        Self {
            tracks: Config::DEFAULT_TRACKS,
            sectors: Config::DEFAULT_SECTORS,
            blocks: Config::DEFAULT_BLOCKS,
            block_size: Config::DEFAULT_BLOCK_SIZE,
        }
    }
}

/// Runtime configuration of the whole machine.
///
/// EDUCATIONAL: Memory is `partition_size * partition_count` bytes carved
/// into equal windows. A program may never be larger than one window,
/// which is what makes base/limit protection possible without a page
/// table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub partition_size: usize,
    pub partition_count: usize,
    pub quantum: u32,
    pub algorithm: SchedulingAlgorithm,
    pub default_priority: u32,
    pub disk: DiskGeometry,
}

impl Config {
    pub const DEFAULT_PARTITION_SIZE: usize = 256;
    pub const DEFAULT_PARTITION_COUNT: usize = 3;
    pub const DEFAULT_QUANTUM: u32 = 6;
    pub const DEFAULT_PRIORITY: u32 = 1;
    pub const DEFAULT_TRACKS: u8 = 4;
    pub const DEFAULT_SECTORS: u8 = 8;
    pub const DEFAULT_BLOCKS: u8 = 8;
    pub const DEFAULT_BLOCK_SIZE: usize = 64;

    /// Largest partition a two byte operand can still address.
    pub const MAX_PARTITION_SIZE: usize = 0x1_0000;
    /// Upper bound on total simulated memory.
    pub const MAX_MEMORY_SIZE: usize = 16 * 1024 * 1024;

    pub fn memory_size(&self) -> usize {
        self.partition_size.saturating_mul(self.partition_count)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.partition_count == 0 {
            return Err("at least one memory partition is required".to_string());
        }
        if self.partition_size == 0 || self.partition_size > Self::MAX_PARTITION_SIZE {
            return Err(format!(
                "partition size must be within 1..={} bytes, got {}",
                Self::MAX_PARTITION_SIZE,
                self.partition_size
            ));
        }
        if self.quantum == 0 {
            return Err("quantum must be at least one cycle".to_string());
        }
        match self.partition_size.checked_mul(self.partition_count) {
            Some(total) if total <= Self::MAX_MEMORY_SIZE => {}
            _ => {
                return Err(format!(
                    "{} partitions of {} bytes exceed the {} byte memory limit",
                    self.partition_count,
                    self.partition_size,
                    Self::MAX_MEMORY_SIZE
                ));
            }
        }
        self.disk.validate()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            partition_size: Self::DEFAULT_PARTITION_SIZE,
            partition_count: Self::DEFAULT_PARTITION_COUNT,
            quantum: Self::DEFAULT_QUANTUM,
            algorithm: SchedulingAlgorithm::RoundRobin,
            default_priority: Self::DEFAULT_PRIORITY,
            disk: DiskGeometry::default(),
        }
    }
}
