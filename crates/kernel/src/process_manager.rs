use std::collections::VecDeque;

use log::{debug, info, warn};
use storage::Disk;
use types::{CreationError, Location, Pid, ProcessState, SwapError};
use vm::Cpu;

use crate::memory_manager::MemoryManager;
use crate::pcb::{ExitReport, Pcb};
use crate::scheduler::Scheduler;
use crate::swapper::{Swapper, swap_file_name};

/// Owns every PCB and moves them through their lifecycle.
///
/// EDUCATIONAL PURPOSE: A process is always in exactly one place:
/// - the resident queue: created, not yet asked to run (image in a
///   partition, or on disk when memory was full)
/// - the ready queue: waiting for the CPU, in FIFO order
/// - the running slot: the one process the CPU is executing
///
/// Destroying a process releases its partition and deletes its swap
/// file together, so no orphaned image outlives its PCB.
#[derive(Debug)]
pub struct ProcessManager {
    resident: VecDeque<Pcb>,
    ready: VecDeque<Pcb>,
    running: Option<Pcb>,
    next_pid: Pid,
}

impl Default for ProcessManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessManager {
    pub fn new() -> Self {
        Self {
            resident: VecDeque::new(),
            ready: VecDeque::new(),
            running: None,
            next_pid: 0,
        }
    }

    pub fn resident(&self) -> &VecDeque<Pcb> {
        &self.resident
    }

    pub fn ready(&self) -> &VecDeque<Pcb> {
        &self.ready
    }

    pub fn running(&self) -> Option<&Pcb> {
        self.running.as_ref()
    }

    pub(crate) fn running_mut(&mut self) -> Option<&mut Pcb> {
        self.running.as_mut()
    }

    /// Every live PCB: running first, then ready, then resident.
    pub fn all(&self) -> impl Iterator<Item = &Pcb> {
        self.running
            .iter()
            .chain(self.ready.iter())
            .chain(self.resident.iter())
    }

    /// A PCB waiting in the ready or resident queue.
    pub fn queued(&self, pid: Pid) -> Option<&Pcb> {
        self.ready
            .iter()
            .chain(self.resident.iter())
            .find(|pcb| pcb.pid == pid)
    }

    pub(crate) fn queued_mut(&mut self, pid: Pid) -> Option<&mut Pcb> {
        self.ready
            .iter_mut()
            .chain(self.resident.iter_mut())
            .find(|pcb| pcb.pid == pid)
    }

    pub fn any_swapped(&self) -> bool {
        self.all().any(|pcb| pcb.swapped)
    }

    /// Turns a program image into a resident process.
    ///
    /// The image goes into the first free partition. When memory is full
    /// it is written straight to a swap file instead and the process
    /// starts out swapped.
    pub fn create_process(
        &mut self,
        program: &[u8],
        priority: u32,
        mem: &mut MemoryManager,
        disk: &mut Disk,
        swapper: &mut Swapper,
    ) -> Result<Pid, CreationError> {
        let limit = mem.partition_size();
        if program.len() > limit {
            return Err(CreationError::ProgramTooLarge {
                len: program.len(),
                limit,
            });
        }
        let pid = self.next_pid;

        let pcb = match mem.find_free_partition(program.len()) {
            Some(part) => {
                mem.load(part, program, pid)
                    .map_err(|_| CreationError::ProgramTooLarge {
                        len: program.len(),
                        limit,
                    })?;
                Pcb::new(pid, priority, Location::Partition(part))
            }
            None => {
                let tsb = swapper
                    .store_image(pid, program, limit, disk)
                    .map_err(|e| {
                        warn!("no room to store pid {} on disk: {}", pid, e);
                        CreationError::OutOfDiskSpace
                    })?;
                let mut pcb = Pcb::new(pid, priority, Location::InDisk);
                pcb.state = ProcessState::Swapped;
                pcb.swapped = true;
                pcb.tsb = Some(tsb);
                pcb
            }
        };

        info!("created pid {} ({} bytes) in {}", pid, program.len(), pcb.location);
        self.next_pid += 1;
        self.resident.push_back(pcb);
        Ok(pid)
    }

    /// Moves every resident process to the ready queue.
    pub fn run_all(&mut self) {
        while let Some(mut pcb) = self.resident.pop_front() {
            pcb.state = ProcessState::Ready;
            self.ready.push_back(pcb);
        }
    }

    /// Moves one resident process to the ready queue.
    pub fn run(&mut self, pid: Pid) -> bool {
        match self.resident.iter().position(|pcb| pcb.pid == pid) {
            Some(i) => {
                if let Some(mut pcb) = self.resident.remove(i) {
                    pcb.state = ProcessState::Ready;
                    self.ready.push_back(pcb);
                }
                true
            }
            None => false,
        }
    }

    /// Starts the next ready process on the CPU, rolling it in first if
    /// its image is on disk. Returns the pid that got the CPU.
    pub fn run_process(
        &mut self,
        scheduler: &Scheduler,
        cpu: &mut Cpu,
        mem: &mut MemoryManager,
        disk: &mut Disk,
        swapper: &mut Swapper,
    ) -> Result<Option<Pid>, SwapError> {
        if self.running.is_some() {
            return Ok(None);
        }
        let Some(index) = scheduler.select(&self.ready) else {
            return Ok(None);
        };
        let Some(mut pcb) = self.ready.remove(index) else {
            return Ok(None);
        };

        if pcb.swapped {
            swapper.roll_in(&mut pcb, self, mem, disk)?;
        }

        cpu.restore(&pcb.registers);
        cpu.executing = true;
        pcb.state = ProcessState::Running;
        let pid = pcb.pid;
        debug!("dispatching pid {} at pc 0x{:04X}", pid, pcb.registers.pc);
        self.running = Some(pcb);
        Ok(Some(pid))
    }

    /// Saves the CPU into the running PCB and appends it to the ready
    /// queue.
    pub fn update_pcb(&mut self, cpu: &Cpu, mem: &MemoryManager) {
        let Some(mut pcb) = self.running.take() else {
            return;
        };
        pcb.registers = cpu.registers();
        pcb.instruction = pcb
            .location
            .partition()
            .and_then(|part| mem.instruction_at(part, pcb.registers.pc));
        pcb.state = ProcessState::Waiting;
        debug!("saved pid {} at pc 0x{:04X}", pcb.pid, pcb.registers.pc);
        self.ready.push_back(pcb);
    }

    /// Ends the running process. The report is returned only when
    /// `report_stats` is set.
    pub fn exit_process(
        &mut self,
        report_stats: bool,
        cpu: &mut Cpu,
        mem: &mut MemoryManager,
        disk: &mut Disk,
    ) -> Option<ExitReport> {
        let pcb = self.running.take()?;
        cpu.reset();
        let report = ExitReport {
            pid: pcb.pid,
            turnaround_time: pcb.turnaround_time,
            wait_time: pcb.wait_time,
        };
        release(&pcb, mem, disk);
        info!("pid {} exited", pcb.pid);
        report_stats.then_some(report)
    }

    /// Terminates `pid` wherever it is. Queue order of the survivors is
    /// preserved.
    pub fn kill(
        &mut self,
        pid: Pid,
        cpu: &mut Cpu,
        mem: &mut MemoryManager,
        disk: &mut Disk,
    ) -> bool {
        let pcb = if self.running.as_ref().is_some_and(|pcb| pcb.pid == pid) {
            cpu.reset();
            self.running.take()
        } else if let Some(i) = self.ready.iter().position(|pcb| pcb.pid == pid) {
            self.ready.remove(i)
        } else if let Some(i) = self.resident.iter().position(|pcb| pcb.pid == pid) {
            self.resident.remove(i)
        } else {
            None
        };

        match pcb {
            Some(pcb) => {
                release(&pcb, mem, disk);
                info!("killed pid {}", pid);
                true
            }
            None => false,
        }
    }

    /// Terminates every process. Returns how many there were.
    pub fn kill_all(
        &mut self,
        cpu: &mut Cpu,
        mem: &mut MemoryManager,
        disk: &mut Disk,
    ) -> usize {
        if self.running.is_some() {
            cpu.reset();
        }
        let victims: Vec<Pcb> = self
            .running
            .take()
            .into_iter()
            .chain(self.ready.drain(..))
            .chain(self.resident.drain(..))
            .collect();
        for pcb in &victims {
            release(pcb, mem, disk);
        }
        info!("killed {} processes", victims.len());
        victims.len()
    }

    /// Drops queued PCBs whose images lived in memory, after memory was
    /// wiped. Swapped processes survive.
    pub fn discard_in_memory(&mut self) -> usize {
        let before = self.ready.len() + self.resident.len();
        self.ready.retain(|pcb| pcb.swapped);
        self.resident.retain(|pcb| pcb.swapped);
        before - self.ready.len() - self.resident.len()
    }

    /// Forgets the running PCB without touching its resources.
    pub(crate) fn drop_running(&mut self) -> Option<Pcb> {
        self.running.take()
    }

    /// Charges one cycle to the running process and one cycle of waiting
    /// to everyone in the ready queue.
    pub fn tick_stats(&mut self) {
        if let Some(pcb) = self.running.as_mut() {
            pcb.turnaround_time += 1;
        }
        for pcb in self.ready.iter_mut() {
            pcb.turnaround_time += 1;
            pcb.wait_time += 1;
        }
    }
}

/// Frees the partition and swap file of a destroyed process.
fn release(pcb: &Pcb, mem: &mut MemoryManager, disk: &mut Disk) {
    let owned = pcb
        .location
        .partition()
        .filter(|part| mem.partition(*part).is_some_and(|p| p.occupant == Some(pcb.pid)));
    if let Some(part) = owned {
        if let Err(e) = mem.clear(part) {
            warn!("freeing memory of pid {}: {}", pcb.pid, e);
        }
    }
    let name = swap_file_name(pcb.pid);
    if disk.exists(&name) {
        if let Err(e) = disk.delete(&name) {
            warn!("deleting swap file of pid {}: {}", pcb.pid, e);
        }
    }
}
