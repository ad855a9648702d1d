use types::{Location, Pid, ProcessState, Tsb};
use vm::{Instruction, Registers};

/// Process Control Block: identity and saved execution state of one
/// process.
///
/// EDUCATIONAL PURPOSE: While a process is off the CPU, everything needed
/// to resume it lives here. A context switch copies the CPU registers into
/// the outgoing PCB and the incoming PCB's registers into the CPU, so each
/// program believes it owns the machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pcb {
    pub pid: Pid,
    pub state: ProcessState,
    pub registers: Registers,
    /// Instruction register: the instruction at the saved PC, or the last
    /// one executed while running.
    pub instruction: Option<Instruction>,
    pub location: Location,
    pub priority: u32,
    pub swapped: bool,
    /// Directory entry of the swap image while `swapped` is set.
    pub tsb: Option<Tsb>,
    pub turnaround_time: u64,
    pub wait_time: u64,
}

impl Pcb {
    pub fn new(pid: Pid, priority: u32, location: Location) -> Self {
        Self {
            pid,
            state: ProcessState::Resident,
            registers: Registers::default(),
            instruction: None,
            location,
            priority,
            swapped: false,
            tsb: None,
            turnaround_time: 0,
            wait_time: 0,
        }
    }
}

/// Row of the process table shown to the command interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: Pid,
    pub state: ProcessState,
    pub location: Location,
    pub priority: u32,
    pub swapped: bool,
    pub registers: Registers,
    pub instruction: Option<String>,
    pub turnaround_time: u64,
    pub wait_time: u64,
}

impl From<&Pcb> for ProcessInfo {
    fn from(pcb: &Pcb) -> Self {
        Self {
            pid: pcb.pid,
            state: pcb.state,
            location: pcb.location,
            priority: pcb.priority,
            swapped: pcb.swapped,
            registers: pcb.registers,
            instruction: pcb.instruction.map(|i| i.pretty_print()),
            turnaround_time: pcb.turnaround_time,
            wait_time: pcb.wait_time,
        }
    }
}

/// Accounting emitted when a process exits normally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExitReport {
    pub pid: Pid,
    pub turnaround_time: u64,
    pub wait_time: u64,
}
