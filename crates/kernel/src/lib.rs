//! Operating-system layer of the simulator: partitions memory between
//! processes, schedules them onto the CPU, swaps images to the disk and
//! routes interrupts, all from a single clock-driven control loop.

pub mod accessor;
pub mod console;
pub mod interrupt;
pub mod kernel;
pub mod memory_manager;
pub mod pcb;
pub mod process_manager;
pub mod scheduler;
pub mod swapper;

pub use console::{BufferConsole, Console};
pub use interrupt::InterruptQueue;
pub use kernel::Kernel;
pub use memory_manager::{MemoryManager, Partition};
pub use pcb::{ExitReport, Pcb, ProcessInfo};
pub use process_manager::ProcessManager;
pub use scheduler::Scheduler;
pub use swapper::{RandomVictim, Swapper, VictimSelector, swap_file_name};
