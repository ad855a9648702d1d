use core::fmt;
use core::str::FromStr;

/// Process identifier, assigned monotonically by the process manager.
pub type Pid = u32;

/// Index of a fixed-size memory partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionId(pub usize);

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state recorded in a process control block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessState {
    Resident,
    Ready,
    Running,
    Waiting,
    Swapped,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessState::Resident => "Resident",
            ProcessState::Ready => "Ready",
            ProcessState::Running => "Running",
            ProcessState::Waiting => "Waiting",
            ProcessState::Swapped => "Swapped",
        };
        f.write_str(name)
    }
}

/// Where a process image currently lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    Partition(PartitionId),
    InDisk,
}

impl Location {
    pub fn partition(self) -> Option<PartitionId> {
        match self {
            Location::Partition(id) => Some(id),
            Location::InDisk => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Partition(id) => write!(f, "partition {}", id),
            Location::InDisk => f.write_str("disk"),
        }
    }
}

/// Scheduling policy used to pick the next ready process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchedulingAlgorithm {
    #[default]
    RoundRobin,
    Fcfs,
    Priority,
}

impl fmt::Display for SchedulingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchedulingAlgorithm::RoundRobin => "rr",
            SchedulingAlgorithm::Fcfs => "fcfs",
            SchedulingAlgorithm::Priority => "priority",
        };
        f.write_str(name)
    }
}

impl FromStr for SchedulingAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rr" | "round-robin" | "roundrobin" => Ok(SchedulingAlgorithm::RoundRobin),
            "fcfs" => Ok(SchedulingAlgorithm::Fcfs),
            "priority" => Ok(SchedulingAlgorithm::Priority),
            other => Err(format!("unknown scheduling algorithm '{}'", other)),
        }
    }
}
