pub mod cpu;
pub mod decoder;
pub mod instruction;
pub mod isa;
pub mod memory;
pub mod observer;
pub mod registers;
pub mod sys_call;

pub use cpu::Cpu;
pub use instruction::Instruction;
pub use memory::{Bus, Memory, MemoryAccessor};
pub use observer::CycleObserver;
pub use registers::{CpuSnapshot, Registers};
pub use sys_call::{Syscall, SyscallHandler};
