use log::{trace, warn};

use crate::decoder::decode;
use crate::instruction::Instruction;
use crate::isa::Opcode;
use crate::memory::Bus;
use crate::registers::{CpuSnapshot, Registers};
use crate::sys_call::Syscall;

/// Represents the Central Processing Unit (CPU) of the simulated machine.
///
/// EDUCATIONAL PURPOSE: This struct models the programmer-visible state of
/// an 8-bit accumulator machine:
/// - Program Counter (PC): partition-relative address of the next instruction
/// - Accumulator: target of loads, stores and additions
/// - X and Y index registers: syscall selector and argument
/// - Z flag: result of the last compare, consumed by BNE
///
/// EXECUTION MODEL: The CPU never loops on its own. The kernel's clock
/// calls `cycle()` once per tick, and each call executes exactly one
/// instruction (or faults trying). That keeps interrupts, scheduling and
/// swapping in the kernel's hands between any two instructions.
///
/// MEMORY ACCESS: The CPU only sees memory through the `Bus` it is given.
/// The bus translates partition-relative addresses and enforces bounds,
/// so a faulting program can never touch another partition.
#[derive(Debug, Default)]
pub struct Cpu {
    pub pc: usize,
    pub acc: u8,
    pub x_reg: u8,
    pub y_reg: u8,
    pub z_flag: bool,
    /// True while a process owns the CPU.
    pub executing: bool,
    /// Print every executed instruction to stdout.
    pub verbose: bool,
}

impl Cpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes the register file and stops execution.
    pub fn reset(&mut self) {
        self.restore(&Registers::default());
        self.executing = false;
    }

    pub fn registers(&self) -> Registers {
        Registers {
            pc: self.pc,
            acc: self.acc,
            x_reg: self.x_reg,
            y_reg: self.y_reg,
            z_flag: self.z_flag,
        }
    }

    pub fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            registers: self.registers(),
            executing: self.executing,
        }
    }

    pub fn restore(&mut self, regs: &Registers) {
        self.pc = regs.pc;
        self.acc = regs.acc;
        self.x_reg = regs.x_reg;
        self.y_reg = regs.y_reg;
        self.z_flag = regs.z_flag;
    }

    /// Executes a single instruction cycle (fetch, decode, execute).
    ///
    /// EDUCATIONAL PURPOSE: This is the heart of the CPU:
    /// 1. Fetch: read the opcode byte at PC, then its operand bytes
    /// 2. Decode: turn the bytes into an `Instruction`
    /// 3. Execute: perform the operation and advance PC by its width
    ///
    /// FAULTS: Every byte, including the opcode and operands, is read
    /// through the bus. If any access is out of bounds the bus has already
    /// queued the violation for the kernel; the cycle stops right there,
    /// PC is left untouched and nothing else is written.
    ///
    /// RETURN VALUE: the instruction that completed, or None if the CPU is
    /// idle or the cycle faulted.
    pub fn cycle(&mut self, bus: &mut dyn Bus) -> Option<Instruction> {
        if !self.executing {
            return None;
        }
        let pc = self.pc;

        let opcode = bus.read(pc)?;
        let width = match Opcode::from_byte(opcode) {
            Some(op) => op.operand_width(),
            None => {
                warn!("invalid opcode 0x{:02X} at pc 0x{:04X}", opcode, pc);
                bus.handle_syscall(Syscall::InvalidOpcode { pc, opcode });
                return None;
            }
        };

        let mut operands = [0u8; 2];
        for (i, slot) in operands.iter_mut().take(width).enumerate() {
            *slot = bus.read(pc + 1 + i)?;
        }
        let instr = decode(opcode, &operands[..width])?;

        if self.verbose {
            let bytes: Vec<String> = std::iter::once(opcode)
                .chain(operands[..width].iter().copied())
                .map(|b| format!("{:02X}", b))
                .collect();
            println!(
                "PC = 0x{:04X}, Bytes = [{}], Instr = {}",
                pc,
                bytes.join(" "),
                instr.pretty_print()
            );
        }

        if !self.execute(instr, bus) {
            return None;
        }

        trace!("pc 0x{:04X}: {}", pc, instr.pretty_print());
        let regs = self.registers();
        bus.on_instruction(pc, &instr, &regs);
        Some(instr)
    }

    /// Executes a decoded instruction and moves PC past it.
    ///
    /// RETURN VALUE: false if a memory access faulted part way through, in
    /// which case no register or PC change is committed.
    fn execute(&mut self, instr: Instruction, bus: &mut dyn Bus) -> bool {
        let next_pc = self.pc + instr.size();

        match instr {
            Instruction::LoadAccConst { value } => self.acc = value,
            Instruction::LoadAccMem { addr } => match bus.read(addr as usize) {
                Some(value) => self.acc = value,
                None => return false,
            },
            Instruction::StoreAcc { addr } => {
                if !bus.write(addr as usize, self.acc) {
                    return false;
                }
            }
            Instruction::AddWithCarry { addr } => match bus.read(addr as usize) {
                // EDUCATIONAL: there is no carry flag, the sum wraps at 256
                Some(value) => self.acc = self.acc.wrapping_add(value),
                None => return false,
            },
            Instruction::LoadXConst { value } => self.x_reg = value,
            Instruction::LoadXMem { addr } => match bus.read(addr as usize) {
                Some(value) => self.x_reg = value,
                None => return false,
            },
            Instruction::LoadYConst { value } => self.y_reg = value,
            Instruction::LoadYMem { addr } => match bus.read(addr as usize) {
                Some(value) => self.y_reg = value,
                None => return false,
            },
            Instruction::CompareX { addr } => match bus.read(addr as usize) {
                Some(value) => self.z_flag = value == self.x_reg,
                None => return false,
            },
            Instruction::BranchNotEqual { offset } => {
                if !self.z_flag {
                    // EDUCATIONAL: the distance is counted from the byte after
                    // the branch; the modulo keeps forward "negative" jumps
                    // inside the partition.
                    let limit = bus.limit().max(1);
                    self.pc = (next_pc + offset as usize) % limit;
                    return true;
                }
            }
            Instruction::Increment { addr } => {
                let value = match bus.read(addr as usize) {
                    Some(value) => value,
                    None => return false,
                };
                if !bus.write(addr as usize, value.wrapping_add(1)) {
                    return false;
                }
            }
            Instruction::NoOp => {}
            Instruction::Break => bus.handle_syscall(Syscall::Exit),
            Instruction::SystemCall => {
                if !self.system_call(bus) {
                    return false;
                }
            }
        }

        self.pc = next_pc;
        true
    }

    fn system_call(&mut self, bus: &mut dyn Bus) -> bool {
        match self.x_reg {
            1 => bus.handle_syscall(Syscall::PrintInteger(self.y_reg)),
            2 => {
                // an unterminated string runs into the partition limit and faults
                let mut text = String::new();
                let mut addr = self.y_reg as usize;
                loop {
                    let byte = match bus.read(addr) {
                        Some(byte) => byte,
                        None => return false,
                    };
                    if byte == 0 {
                        break;
                    }
                    text.push(byte as char);
                    addr += 1;
                }
                bus.handle_syscall(Syscall::PrintString(text));
            }
            other => warn!("ignoring system call with X = {}", other),
        }
        true
    }
}
