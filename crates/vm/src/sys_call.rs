/// Requests the CPU hands to the kernel while executing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Syscall {
    /// BRK reached: the running program is done.
    Exit,
    /// SYS with X = 1: print Y as a decimal integer.
    PrintInteger(u8),
    /// SYS with X = 2: print the zero-terminated string at address Y.
    PrintString(String),
    /// The byte at `pc` is not an opcode of this machine.
    InvalidOpcode { pc: usize, opcode: u8 },
}

/// Kernel side of the system-call boundary.
pub trait SyscallHandler {
    fn handle_syscall(&mut self, call: Syscall);
}
