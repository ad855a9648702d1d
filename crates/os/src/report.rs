use colored::*;
use kernel::{Console, Kernel, ProcessInfo};
use serde::{Deserialize, Serialize};
use storage::Disk;

/// Everything a `run` prints once the clock stops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub halted: bool,
    pub output: String,
    pub exits: Vec<ExitRow>,
    pub processes: Vec<ProcessRow>,
    pub cpu: CpuRow,
    pub disk: DiskRow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitRow {
    pub pid: u32,
    pub turnaround_time: u64,
    pub wait_time: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRow {
    pub pid: u32,
    pub state: String,
    pub location: String,
    pub priority: u32,
    pub swapped: bool,
    pub pc: usize,
    pub acc: u8,
    pub x_reg: u8,
    pub y_reg: u8,
    pub z_flag: bool,
    pub instruction: Option<String>,
    pub turnaround_time: u64,
    pub wait_time: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuRow {
    pub pc: usize,
    pub acc: u8,
    pub x_reg: u8,
    pub y_reg: u8,
    pub z_flag: bool,
    pub executing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskRow {
    pub files: Vec<String>,
    pub used_blocks: usize,
    pub free_data_blocks: usize,
}

impl From<&ProcessInfo> for ProcessRow {
    fn from(info: &ProcessInfo) -> Self {
        Self {
            pid: info.pid,
            state: info.state.to_string(),
            location: info.location.to_string(),
            priority: info.priority,
            swapped: info.swapped,
            pc: info.registers.pc,
            acc: info.registers.acc,
            x_reg: info.registers.x_reg,
            y_reg: info.registers.y_reg,
            z_flag: info.registers.z_flag,
            instruction: info.instruction.clone(),
            turnaround_time: info.turnaround_time,
            wait_time: info.wait_time,
        }
    }
}

impl DiskRow {
    pub fn from_disk(disk: &Disk) -> Self {
        Self {
            files: disk.list(),
            used_blocks: disk.used_blocks(),
            free_data_blocks: disk.free_data_block_count(),
        }
    }
}

impl RunSummary {
    pub fn collect<C: Console>(kernel: &Kernel<C>, ticks: u64, output: String) -> Self {
        let cpu = kernel.cpu();
        Self {
            ticks,
            halted: kernel.is_halted(),
            output,
            exits: kernel
                .reports()
                .iter()
                .map(|r| ExitRow {
                    pid: r.pid,
                    turnaround_time: r.turnaround_time,
                    wait_time: r.wait_time,
                })
                .collect(),
            processes: kernel.list_processes().iter().map(ProcessRow::from).collect(),
            cpu: CpuRow {
                pc: cpu.registers.pc,
                acc: cpu.registers.acc,
                x_reg: cpu.registers.x_reg,
                y_reg: cpu.registers.y_reg,
                z_flag: cpu.registers.z_flag,
                executing: cpu.executing,
            },
            disk: DiskRow::from_disk(kernel.disk()),
        }
    }

    pub fn print_text(&self) {
        println!("{}", "Output".bold().blue());
        println!("{}", "=====================================".blue());
        print!("{}", self.output);
        if !self.output.ends_with('\n') {
            println!();
        }

        println!();
        println!("{} after {} ticks", "Summary".bold().green(), self.ticks);
        if self.halted {
            println!("  {}", "kernel halted".red().bold());
        }
        for exit in &self.exits {
            println!(
                "  pid {} exited: turnaround {} cycles, wait {} cycles",
                exit.pid.to_string().green(),
                exit.turnaround_time,
                exit.wait_time
            );
        }

        if !self.processes.is_empty() {
            println!();
            println!("  {}", "Processes still alive:".yellow());
            println!(
                "    {:>4} {:<9} {:<12} {:>4} {:>6} {:>4} {:>4} {:>4} {:>2}  {}",
                "PID", "STATE", "LOCATION", "PRI", "PC", "ACC", "X", "Y", "Z", "IR"
            );
            for p in &self.processes {
                println!(
                    "    {:>4} {:<9} {:<12} {:>4} {:>#6x} {:>4} {:>4} {:>4} {:>2}  {}",
                    p.pid,
                    p.state,
                    p.location,
                    p.priority,
                    p.pc,
                    p.acc,
                    p.x_reg,
                    p.y_reg,
                    p.z_flag as u8,
                    p.instruction.as_deref().unwrap_or("-")
                );
            }
        }

        println!();
        println!(
            "  CPU: pc={:#06x} acc={:#04x} x={:#04x} y={:#04x} z={} executing={}",
            self.cpu.pc,
            self.cpu.acc,
            self.cpu.x_reg,
            self.cpu.y_reg,
            self.cpu.z_flag as u8,
            self.cpu.executing
        );
        println!(
            "  Disk: {} files, {} blocks used, {} data blocks free",
            self.disk.files.len(),
            self.disk.used_blocks,
            self.disk.free_data_blocks
        );
    }
}
