use crate::process::Pid;

/// Interrupt request numbers understood by the kernel control loop.
pub const IRQ_KEYBOARD: u32 = 1;
pub const IRQ_CONTEXT_SWITCH: u32 = 2;
pub const IRQ_PROCESS_EXIT: u32 = 3;
pub const IRQ_BOUNDS_VIOLATION: u32 = 4;
pub const IRQ_INVALID_OPCODE: u32 = 5;

/// A queued event: an IRQ number plus its parameters.
///
/// EDUCATIONAL: Hardware raises an interrupt line and leaves the details
/// in device registers; here the "registers" are the parameter list.
/// The kernel drains these strictly in arrival order before letting the
/// CPU execute again, so every subsystem sees a consistent machine.
///
/// Parameter layout per IRQ:
/// - `IRQ_KEYBOARD`: `[char as u32]`
/// - `IRQ_CONTEXT_SWITCH`: `[]`
/// - `IRQ_PROCESS_EXIT`: `[pid, report_stats]`
/// - `IRQ_BOUNDS_VIOLATION`: `[pid, address]`
/// - `IRQ_INVALID_OPCODE`: `[pid, pc, opcode]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interrupt {
    pub irq: u32,
    pub params: Vec<u32>,
}

impl Interrupt {
    pub fn new(irq: u32, params: Vec<u32>) -> Self {
        Self { irq, params }
    }

    pub fn keyboard(ch: char) -> Self {
        Self::new(IRQ_KEYBOARD, vec![ch as u32])
    }

    pub fn context_switch() -> Self {
        Self::new(IRQ_CONTEXT_SWITCH, Vec::new())
    }

    pub fn process_exit(pid: Pid, report_stats: bool) -> Self {
        Self::new(IRQ_PROCESS_EXIT, vec![pid, report_stats as u32])
    }

    pub fn bounds_violation(pid: Pid, address: usize) -> Self {
        Self::new(IRQ_BOUNDS_VIOLATION, vec![pid, address as u32])
    }

    pub fn invalid_opcode(pid: Pid, pc: usize, opcode: u8) -> Self {
        Self::new(IRQ_INVALID_OPCODE, vec![pid, pc as u32, opcode as u32])
    }

    /// Parameter at `index`, or zero when the raiser left it out.
    pub fn param(&self, index: usize) -> u32 {
        self.params.get(index).copied().unwrap_or(0)
    }
}
