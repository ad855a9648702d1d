use core::fmt;

use crate::process::{PartitionId, Pid};

/// Failures of the memory manager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemoryError {
    ImageTooLarge { len: usize, limit: usize },
    NoSuchPartition(PartitionId),
    OutOfRange { start: usize, len: usize },
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::ImageTooLarge { len, limit } => {
                write!(f, "image of {} bytes does not fit a {} byte partition", len, limit)
            }
            MemoryError::NoSuchPartition(id) => write!(f, "no memory partition {}", id),
            MemoryError::OutOfRange { start, len } => {
                write!(f, "{} bytes at 0x{:04X} run past the end of memory", len, start)
            }
        }
    }
}

impl std::error::Error for MemoryError {}

/// Failures of the disk storage manager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiskError {
    NameAlreadyExists(String),
    NameNotFound(String),
    InvalidName(String),
    DiskFull,
    InvalidGeometry(String),
    Corrupt(String),
    Io(String),
}

impl fmt::Display for DiskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiskError::NameAlreadyExists(name) => write!(f, "file '{}' already exists", name),
            DiskError::NameNotFound(name) => write!(f, "file '{}' not found", name),
            DiskError::InvalidName(name) => write!(f, "invalid file name '{}'", name),
            DiskError::DiskFull => f.write_str("disk is full"),
            DiskError::InvalidGeometry(why) => write!(f, "invalid disk geometry: {}", why),
            DiskError::Corrupt(why) => write!(f, "disk image is corrupt: {}", why),
            DiskError::Io(why) => write!(f, "disk i/o failed: {}", why),
        }
    }
}

impl std::error::Error for DiskError {}

/// Why a program could not be turned into a process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CreationError {
    ProgramTooLarge { len: usize, limit: usize },
    OutOfDiskSpace,
}

impl fmt::Display for CreationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreationError::ProgramTooLarge { len, limit } => {
                write!(f, "program of {} bytes exceeds the partition size of {} bytes", len, limit)
            }
            CreationError::OutOfDiskSpace => {
                f.write_str("memory is full and the disk has no room for the program")
            }
        }
    }
}

impl std::error::Error for CreationError {}

/// Failures while migrating process images between memory and disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SwapError {
    /// No resident process could be evicted to make room.
    NoVictim,
    /// The disk could not hold a mandatory roll-out; the machine cannot continue.
    Fatal(String),
    Disk(DiskError),
    Memory(MemoryError),
}

impl fmt::Display for SwapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapError::NoVictim => f.write_str("no resident process can be swapped out"),
            SwapError::Fatal(why) => write!(f, "fatal swap failure: {}", why),
            SwapError::Disk(e) => write!(f, "swap disk error: {}", e),
            SwapError::Memory(e) => write!(f, "swap memory error: {}", e),
        }
    }
}

impl std::error::Error for SwapError {}

impl From<DiskError> for SwapError {
    fn from(e: DiskError) -> Self {
        SwapError::Disk(e)
    }
}

impl From<MemoryError> for SwapError {
    fn from(e: MemoryError) -> Self {
        SwapError::Memory(e)
    }
}

/// Errors surfaced by kernel commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KernelError {
    Creation(CreationError),
    Disk(DiskError),
    Swap(SwapError),
    NoSuchProcess(Pid),
    Busy(String),
    InvalidArgument(String),
    Halted,
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::Creation(e) => write!(f, "{}", e),
            KernelError::Disk(e) => write!(f, "{}", e),
            KernelError::Swap(e) => write!(f, "{}", e),
            KernelError::NoSuchProcess(pid) => write!(f, "no process with pid {}", pid),
            KernelError::Busy(why) => write!(f, "busy: {}", why),
            KernelError::InvalidArgument(why) => write!(f, "invalid argument: {}", why),
            KernelError::Halted => f.write_str("the kernel has been shut down"),
        }
    }
}

impl std::error::Error for KernelError {}

impl From<CreationError> for KernelError {
    fn from(e: CreationError) -> Self {
        KernelError::Creation(e)
    }
}

impl From<DiskError> for KernelError {
    fn from(e: DiskError) -> Self {
        KernelError::Disk(e)
    }
}

impl From<SwapError> for KernelError {
    fn from(e: SwapError) -> Self {
        KernelError::Swap(e)
    }
}
