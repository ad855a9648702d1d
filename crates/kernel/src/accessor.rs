use log::warn;
use types::{Interrupt, Pid};
use vm::{CycleObserver, Instruction, Memory, MemoryAccessor, Registers, Syscall, SyscallHandler};

use crate::console::Console;
use crate::interrupt::InterruptQueue;
use crate::memory_manager::Partition;

/// The CPU's window onto the running process for one cycle.
///
/// EDUCATIONAL PURPOSE: This plays the role of an MMU with a single
/// base/limit register pair. Every address the CPU produces is relative
/// to the running partition; the accessor adds the base, and anything at
/// or past the limit never reaches physical memory. Instead it queues a
/// bounds-violation interrupt followed by a process-exit interrupt, so the
/// kernel terminates the offender before the next instruction.
///
/// System calls and completed instructions flow back through the same
/// object: output goes to the console, exits become interrupts.
pub struct ProcessBus<'a> {
    pid: Pid,
    partition: Partition,
    memory: &'a mut Memory,
    interrupts: &'a mut InterruptQueue,
    console: &'a mut dyn Console,
    /// Instruction register of the running PCB.
    last_instruction: &'a mut Option<Instruction>,
}

impl<'a> ProcessBus<'a> {
    pub fn new(
        pid: Pid,
        partition: Partition,
        memory: &'a mut Memory,
        interrupts: &'a mut InterruptQueue,
        console: &'a mut dyn Console,
        last_instruction: &'a mut Option<Instruction>,
    ) -> Self {
        Self {
            pid,
            partition,
            memory,
            interrupts,
            console,
            last_instruction,
        }
    }

    fn violation(&mut self, addr: usize) {
        warn!(
            "pid {} accessed 0x{:04X} outside its {} byte partition",
            self.pid, addr, self.partition.limit
        );
        self.interrupts.push(Interrupt::bounds_violation(self.pid, addr));
        self.interrupts.push(Interrupt::process_exit(self.pid, false));
    }
}

impl MemoryAccessor for ProcessBus<'_> {
    fn read(&mut self, addr: usize) -> Option<u8> {
        match self.partition.translate(addr) {
            Some(phys) => Some(self.memory.load_byte(phys)),
            None => {
                self.violation(addr);
                None
            }
        }
    }

    fn write(&mut self, addr: usize, value: u8) -> bool {
        match self.partition.translate(addr) {
            Some(phys) => {
                self.memory.store_byte(phys, value);
                true
            }
            None => {
                self.violation(addr);
                false
            }
        }
    }

    fn limit(&self) -> usize {
        self.partition.limit
    }
}

impl SyscallHandler for ProcessBus<'_> {
    fn handle_syscall(&mut self, call: Syscall) {
        match call {
            Syscall::Exit => self.interrupts.push(Interrupt::process_exit(self.pid, true)),
            Syscall::PrintInteger(value) => self.console.put_text(&value.to_string()),
            Syscall::PrintString(text) => self.console.put_text(&text),
            Syscall::InvalidOpcode { pc, opcode } => {
                self.interrupts.push(Interrupt::invalid_opcode(self.pid, pc, opcode));
                self.interrupts.push(Interrupt::process_exit(self.pid, false));
            }
        }
    }
}

impl CycleObserver for ProcessBus<'_> {
    fn on_instruction(&mut self, _pc: usize, instr: &Instruction, _regs: &Registers) {
        *self.last_instruction = Some(*instr);
    }
}
