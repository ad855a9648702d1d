use std::collections::VecDeque;

use log::debug;
use storage::Disk;
use types::{Interrupt, Pid, SchedulingAlgorithm, SwapError};
use vm::Cpu;

use crate::interrupt::InterruptQueue;
use crate::memory_manager::MemoryManager;
use crate::pcb::Pcb;
use crate::process_manager::ProcessManager;
use crate::swapper::Swapper;

/// Decides when the running process gives up the CPU and which ready
/// process gets it next.
///
/// EDUCATIONAL PURPOSE: Three classic policies share one mechanism:
/// - Round robin: after `quantum` cycles a context-switch interrupt is
///   queued and the process goes to the back of the ready queue.
/// - FCFS: round robin with a quantum that never expires. A process keeps
///   the CPU until it exits.
/// - Priority: no periodic preemption. Whenever the CPU is free the ready
///   process with the smallest priority value runs, ties going to the
///   lowest pid.
#[derive(Clone, Debug)]
pub struct Scheduler {
    counter: u32,
    quantum: u32,
    algorithm: SchedulingAlgorithm,
}

impl Scheduler {
    pub fn new(quantum: u32, algorithm: SchedulingAlgorithm) -> Self {
        Self {
            counter: 0,
            quantum,
            algorithm,
        }
    }

    pub fn quantum(&self) -> u32 {
        self.quantum
    }

    pub fn set_quantum(&mut self, quantum: u32) {
        self.quantum = quantum;
        self.counter = 0;
    }

    pub fn algorithm(&self) -> SchedulingAlgorithm {
        self.algorithm
    }

    pub fn set_algorithm(&mut self, algorithm: SchedulingAlgorithm) {
        self.algorithm = algorithm;
        self.counter = 0;
    }

    /// Cycles the running process has used of its current quantum.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Called once per executed cycle while others are waiting. Queues a
    /// context switch when the quantum runs out.
    pub fn watch(&mut self, interrupts: &mut InterruptQueue) {
        if self.algorithm != SchedulingAlgorithm::RoundRobin {
            return;
        }
        self.counter += 1;
        if self.counter >= self.quantum {
            debug!("quantum of {} cycles expired", self.quantum);
            interrupts.push(Interrupt::context_switch());
            self.counter = 0;
        }
    }

    /// Forgets the current quantum so the next process starts a full one.
    pub fn unwatch(&mut self) {
        self.counter = 0;
    }

    /// Index in `ready` of the process to run next.
    pub fn select(&self, ready: &VecDeque<Pcb>) -> Option<usize> {
        match self.algorithm {
            SchedulingAlgorithm::RoundRobin | SchedulingAlgorithm::Fcfs => {
                (!ready.is_empty()).then_some(0)
            }
            SchedulingAlgorithm::Priority => ready
                .iter()
                .enumerate()
                .min_by_key(|(_, pcb)| (pcb.priority, pcb.pid))
                .map(|(i, _)| i),
        }
    }

    /// Handles a context-switch interrupt: saves the running process to
    /// the tail of the ready queue and dispatches the next one.
    ///
    /// With nobody else ready the running process simply keeps the CPU.
    pub fn context_switch(
        &mut self,
        procs: &mut ProcessManager,
        cpu: &mut Cpu,
        mem: &mut MemoryManager,
        disk: &mut Disk,
        swapper: &mut Swapper,
    ) -> Result<Option<Pid>, SwapError> {
        let Some(outgoing) = procs.running().map(|pcb| pcb.pid) else {
            return Ok(None);
        };
        if procs.ready().is_empty() {
            debug!("nothing else is ready, pid {} keeps the cpu", outgoing);
            return Ok(Some(outgoing));
        }

        procs.update_pcb(cpu, mem);
        cpu.executing = false;
        self.unwatch();
        let incoming = procs.run_process(self, cpu, mem, disk, swapper)?;
        debug!("context switch: pid {} -> {:?}", outgoing, incoming);
        Ok(incoming)
    }
}
