use vm::{CycleObserver, Instruction, MemoryAccessor, Registers, Syscall, SyscallHandler};

/// Single-partition bus over a plain byte vector that records every fault,
/// syscall and completed instruction.
#[derive(Debug, Default)]
pub struct TestBus {
    pub mem: Vec<u8>,
    pub faults: Vec<usize>,
    pub syscalls: Vec<Syscall>,
    pub trace: Vec<(usize, Instruction)>,
}

impl TestBus {
    pub fn with_program(program: &[u8], limit: usize) -> Self {
        let mut mem = vec![0u8; limit];
        mem[..program.len()].copy_from_slice(program);
        Self {
            mem,
            ..Default::default()
        }
    }
}

impl MemoryAccessor for TestBus {
    fn read(&mut self, addr: usize) -> Option<u8> {
        if addr >= self.mem.len() {
            self.faults.push(addr);
            return None;
        }
        Some(self.mem[addr])
    }

    fn write(&mut self, addr: usize, value: u8) -> bool {
        if addr >= self.mem.len() {
            self.faults.push(addr);
            return false;
        }
        self.mem[addr] = value;
        true
    }

    fn limit(&self) -> usize {
        self.mem.len()
    }
}

impl SyscallHandler for TestBus {
    fn handle_syscall(&mut self, call: Syscall) {
        self.syscalls.push(call);
    }
}

impl CycleObserver for TestBus {
    fn on_instruction(&mut self, pc: usize, instr: &Instruction, _regs: &Registers) {
        self.trace.push((pc, *instr));
    }
}
