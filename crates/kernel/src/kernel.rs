use log::{debug, error, info, warn};
use storage::{Disk, FormatMode};
use types::{
    Config, IRQ_BOUNDS_VIOLATION, IRQ_CONTEXT_SWITCH, IRQ_INVALID_OPCODE, IRQ_KEYBOARD,
    IRQ_PROCESS_EXIT, Interrupt, KernelError, Pid, ProcessState, SchedulingAlgorithm, SwapError,
};
use vm::{Cpu, CpuSnapshot};

use crate::accessor::ProcessBus;
use crate::console::{BufferConsole, Console};
use crate::interrupt::InterruptQueue;
use crate::memory_manager::MemoryManager;
use crate::pcb::{ExitReport, ProcessInfo};
use crate::process_manager::ProcessManager;
use crate::scheduler::Scheduler;
use crate::swapper::{RandomVictim, Swapper, VictimSelector};

/// Top-level simulation context: the whole machine plus the operating
/// system running on it.
///
/// EDUCATIONAL PURPOSE: Real kernels react to a timer interrupt. Here the
/// host calls `on_clock_tick()` at whatever rate it likes, and each tick
/// runs in a fixed order:
/// 1. Drain the interrupt queue completely, oldest first.
/// 2. If there were no interrupts and a process is executing, run exactly
///    one CPU cycle.
/// 3. If nothing is executing, dispatch the next ready process.
///
/// Every subsystem call inside a tick is synchronous, so a context switch
/// has fully saved the outgoing process before the incoming one is
/// restored, and a roll-out has fully persisted its victim before the
/// partition is reused.
pub struct Kernel<C: Console = BufferConsole> {
    cpu: Cpu,
    memory: MemoryManager,
    disk: Disk,
    processes: ProcessManager,
    scheduler: Scheduler,
    swapper: Swapper,
    interrupts: InterruptQueue,
    console: C,
    default_priority: u32,
    reports: Vec<ExitReport>,
    ticks: u64,
    halted: bool,
}

impl<C: Console> Kernel<C> {
    /// Boots a machine with blank memory and a freshly formatted disk.
    pub fn new(config: Config, console: C) -> Result<Self, KernelError> {
        config.validate().map_err(KernelError::InvalidArgument)?;
        info!(
            "booting: {} partitions of {} bytes, {} scheduling, quantum {}",
            config.partition_count, config.partition_size, config.algorithm, config.quantum
        );
        let disk = Disk::new(config.disk)?;
        Ok(Self {
            cpu: Cpu::new(),
            memory: MemoryManager::new(&config),
            disk,
            processes: ProcessManager::new(),
            scheduler: Scheduler::new(config.quantum, config.algorithm),
            swapper: Swapper::new(Box::new(RandomVictim::new())),
            interrupts: InterruptQueue::new(),
            console,
            default_priority: config.default_priority,
            reports: Vec::new(),
            ticks: 0,
            halted: false,
        })
    }

    /// Uses an existing disk. Swap files left by an earlier run belong to
    /// processes that no longer exist and are deleted.
    pub fn with_disk(mut self, mut disk: Disk) -> Result<Self, KernelError> {
        if disk.geometry() != self.disk.geometry() {
            return Err(KernelError::InvalidArgument(format!(
                "disk geometry {:?} does not match the configured {:?}",
                disk.geometry(),
                self.disk.geometry()
            )));
        }
        for name in disk.list_all() {
            if name.starts_with(".swap") {
                disk.delete(&name)?;
                info!("deleted stale swap file '{}'", name);
            }
        }
        self.disk = disk;
        Ok(self)
    }

    pub fn with_victim_selector(mut self, selector: Box<dyn VictimSelector>) -> Self {
        self.swapper = Swapper::new(selector);
        self
    }

    /// Prints every executed instruction to stdout.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.cpu.verbose = verbose;
    }

    /// Advances the machine by one clock tick. Ignored once halted.
    pub fn on_clock_tick(&mut self) {
        if self.halted {
            return;
        }
        self.ticks += 1;

        if !self.interrupts.is_empty() {
            while let Some(interrupt) = self.interrupts.pop() {
                self.handle_interrupt(interrupt);
                if self.halted {
                    return;
                }
            }
        } else if self.cpu.executing {
            self.step();
        }

        if !self.cpu.executing {
            self.dispatch();
        }
    }

    /// Ticks until no process is executing, ready or interrupted, or
    /// until `max_ticks` ticks have passed. Returns the ticks used.
    pub fn run_until_idle(&mut self, max_ticks: u64) -> u64 {
        let mut used = 0;
        while used < max_ticks && !self.is_idle() {
            self.on_clock_tick();
            used += 1;
        }
        used
    }

    /// True when the clock has nothing left to do.
    pub fn is_idle(&self) -> bool {
        self.halted
            || (!self.cpu.executing
                && self.processes.ready().is_empty()
                && self.interrupts.is_empty())
    }

    fn step(&mut self) {
        let Some(pcb) = self.processes.running_mut() else {
            self.cpu.executing = false;
            return;
        };
        let pid = pcb.pid;
        let partition = pcb
            .location
            .partition()
            .and_then(|id| self.memory.partition(id))
            .copied();
        let Some(partition) = partition else {
            error!("pid {} is running without a partition", pid);
            self.interrupts.push(Interrupt::process_exit(pid, false));
            return;
        };

        let mut bus = ProcessBus::new(
            pid,
            partition,
            self.memory.memory_mut(),
            &mut self.interrupts,
            &mut self.console,
            &mut pcb.instruction,
        );
        self.cpu.cycle(&mut bus);

        self.processes.tick_stats();
        if !self.processes.ready().is_empty() {
            self.scheduler.watch(&mut self.interrupts);
        }
    }

    fn dispatch(&mut self) {
        let result = self.processes.run_process(
            &self.scheduler,
            &mut self.cpu,
            &mut self.memory,
            &mut self.disk,
            &mut self.swapper,
        );
        match result {
            Ok(Some(pid)) => {
                self.scheduler.unwatch();
                debug!("pid {} now owns the cpu", pid);
            }
            Ok(None) => {}
            Err(e) => self.fatal(e),
        }
    }

    fn handle_interrupt(&mut self, interrupt: Interrupt) {
        debug!("interrupt {} {:?}", interrupt.irq, interrupt.params);
        match interrupt.irq {
            IRQ_KEYBOARD => match char::from_u32(interrupt.param(0)) {
                Some(ch) => self.console.key_pressed(ch),
                None => warn!("keyboard interrupt with invalid character {}", interrupt.param(0)),
            },
            IRQ_CONTEXT_SWITCH => {
                let result = self.scheduler.context_switch(
                    &mut self.processes,
                    &mut self.cpu,
                    &mut self.memory,
                    &mut self.disk,
                    &mut self.swapper,
                );
                if let Err(e) = result {
                    self.fatal(e);
                }
            }
            IRQ_PROCESS_EXIT => self.process_exit(interrupt.param(0), interrupt.param(1) != 0),
            IRQ_BOUNDS_VIOLATION => {
                let line = format!(
                    "Memory access violation: pid {} tried to access address 0x{:04X}",
                    interrupt.param(0),
                    interrupt.param(1)
                );
                self.console.put_line(&line);
            }
            IRQ_INVALID_OPCODE => {
                let line = format!(
                    "Invalid opcode 0x{:02X} at pc 0x{:04X} in pid {}",
                    interrupt.param(2),
                    interrupt.param(1),
                    interrupt.param(0)
                );
                self.console.put_line(&line);
            }
            other => {
                error!("unknown interrupt request {}, shutting down", other);
                self.console
                    .put_line(&format!("KERNEL PANIC: unknown interrupt request {}", other));
                self.shutdown();
            }
        }
    }

    fn process_exit(&mut self, pid: Pid, report_stats: bool) {
        if self.processes.running().map(|pcb| pcb.pid) != Some(pid) {
            debug!("ignoring exit of pid {}, it is not running", pid);
            return;
        }
        let report =
            self.processes
                .exit_process(report_stats, &mut self.cpu, &mut self.memory, &mut self.disk);
        self.scheduler.unwatch();
        if let Some(report) = report {
            self.console.put_line(&format!(
                "Process {} finished. Turnaround time: {} cycles, wait time: {} cycles",
                report.pid, report.turnaround_time, report.wait_time
            ));
            self.reports.push(report);
        }
    }

    /// A mandatory roll-out could not be satisfied: nothing can make
    /// progress any more.
    fn fatal(&mut self, e: SwapError) {
        error!("fatal swap failure: {}", e);
        self.memory.clear_all();
        self.cpu.reset();
        self.processes.drop_running();
        self.processes.discard_in_memory();
        self.interrupts.clear();
        self.console
            .put_line(&format!("FATAL: {}. Memory cleared and execution halted.", e));
        self.halted = true;
    }

    fn ensure_alive(&self) -> Result<(), KernelError> {
        if self.halted {
            return Err(KernelError::Halted);
        }
        Ok(())
    }

    /// Submits a program. Without an explicit priority the configured
    /// default is used.
    pub fn create(&mut self, program: &[u8], priority: Option<u32>) -> Result<Pid, KernelError> {
        self.ensure_alive()?;
        let priority = priority.unwrap_or(self.default_priority);
        self.processes
            .create_process(
                program,
                priority,
                &mut self.memory,
                &mut self.disk,
                &mut self.swapper,
            )
            .map_err(|e| {
                warn!("create rejected: {}", e);
                KernelError::from(e)
            })
    }

    /// Makes one resident process ready.
    pub fn run(&mut self, pid: Pid) -> Result<(), KernelError> {
        self.ensure_alive()?;
        if self.processes.run(pid) {
            Ok(())
        } else {
            Err(KernelError::NoSuchProcess(pid))
        }
    }

    pub fn run_all(&mut self) -> Result<(), KernelError> {
        self.ensure_alive()?;
        self.processes.run_all();
        Ok(())
    }

    /// Terminates `pid` without statistics. Returns whether it existed.
    pub fn kill(&mut self, pid: Pid) -> bool {
        if self.halted {
            return false;
        }
        let was_running = self.processes.running().is_some_and(|pcb| pcb.pid == pid);
        let killed = self
            .processes
            .kill(pid, &mut self.cpu, &mut self.memory, &mut self.disk);
        if was_running {
            self.scheduler.unwatch();
        }
        killed
    }

    pub fn kill_all(&mut self) -> usize {
        self.scheduler.unwatch();
        self.processes
            .kill_all(&mut self.cpu, &mut self.memory, &mut self.disk)
    }

    /// Process table: running first, then ready, then resident. The
    /// running row shows the live CPU registers.
    pub fn list_processes(&self) -> Vec<ProcessInfo> {
        self.processes
            .all()
            .map(|pcb| {
                let mut info = ProcessInfo::from(pcb);
                if pcb.state == ProcessState::Running {
                    info.registers = self.cpu.registers();
                }
                info
            })
            .collect()
    }

    pub fn quantum(&self) -> u32 {
        self.scheduler.quantum()
    }

    pub fn set_quantum(&mut self, quantum: u32) -> Result<(), KernelError> {
        if quantum == 0 {
            return Err(KernelError::InvalidArgument(
                "quantum must be at least one cycle".to_string(),
            ));
        }
        self.scheduler.set_quantum(quantum);
        info!("quantum set to {}", quantum);
        Ok(())
    }

    pub fn scheduling_algorithm(&self) -> SchedulingAlgorithm {
        self.scheduler.algorithm()
    }

    pub fn set_scheduling_algorithm(&mut self, algorithm: SchedulingAlgorithm) {
        self.scheduler.set_algorithm(algorithm);
        info!("scheduling algorithm set to {}", algorithm);
    }

    /// Wipes every partition and forgets the processes whose images lived
    /// there. Refused while a process is executing.
    pub fn clear_all_memory(&mut self) -> Result<usize, KernelError> {
        self.ensure_alive()?;
        if self.cpu.executing {
            return Err(KernelError::Busy(
                "cannot clear memory while a process is executing".to_string(),
            ));
        }
        self.memory.clear_all();
        let discarded = self.processes.discard_in_memory();
        info!("memory cleared, {} processes discarded", discarded);
        Ok(discarded)
    }

    /// Formats the disk. Refused while any process image is swapped out.
    pub fn format_disk(&mut self, mode: FormatMode) -> Result<(), KernelError> {
        self.ensure_alive()?;
        if self.processes.any_swapped() {
            return Err(KernelError::Busy(
                "cannot format while processes are swapped to disk".to_string(),
            ));
        }
        self.disk.format(mode);
        Ok(())
    }

    /// Stops the CPU, terminates every process and halts the clock.
    pub fn shutdown(&mut self) {
        if self.halted {
            return;
        }
        self.cpu.reset();
        self.kill_all();
        self.interrupts.clear();
        self.halted = true;
        info!("kernel halted after {} ticks", self.ticks);
    }

    /// Queues a keyboard interrupt carrying `ch`.
    pub fn key_press(&mut self, ch: char) {
        self.interrupts.push(Interrupt::keyboard(ch));
    }

    /// Queues an arbitrary interrupt, as a device would.
    pub fn raise(&mut self, interrupt: Interrupt) {
        self.interrupts.push(interrupt);
    }

    pub fn cpu(&self) -> CpuSnapshot {
        self.cpu.snapshot()
    }

    pub fn memory(&self) -> &MemoryManager {
        &self.memory
    }

    pub fn disk(&self) -> &Disk {
        &self.disk
    }

    pub fn processes(&self) -> &ProcessManager {
        &self.processes
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    /// Statistics of every process that exited through BRK.
    pub fn reports(&self) -> &[ExitReport] {
        &self.reports
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }
}
