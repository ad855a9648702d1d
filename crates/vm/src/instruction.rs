/// A fully decoded instruction.
///
/// EDUCATIONAL PURPOSE: The decoder turns raw opcode and operand bytes
/// into this closed enum, and the CPU executes it with one exhaustive
/// `match`. Adding an opcode means adding a variant, and the compiler
/// then points at every place that has to learn about it.
///
/// Addresses are partition-relative; the memory accessor adds the base.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// acc = value
    LoadAccConst { value: u8 },
    /// acc = mem[addr]
    LoadAccMem { addr: u16 },
    /// mem[addr] = acc
    StoreAcc { addr: u16 },
    /// acc = acc + mem[addr] (wrapping, there is no carry flag)
    AddWithCarry { addr: u16 },
    /// x = value
    LoadXConst { value: u8 },
    /// x = mem[addr]
    LoadXMem { addr: u16 },
    /// y = value
    LoadYConst { value: u8 },
    /// y = mem[addr]
    LoadYMem { addr: u16 },
    /// z = (mem[addr] == x)
    CompareX { addr: u16 },
    /// if !z: pc = (pc + offset) mod limit
    BranchNotEqual { offset: u8 },
    /// mem[addr] = mem[addr] + 1 (wrapping)
    Increment { addr: u16 },
    NoOp,
    Break,
    SystemCall,
}

impl Instruction {
    /// Encoded width in bytes, opcode included.
    pub fn size(&self) -> usize {
        match self {
            Instruction::NoOp | Instruction::Break | Instruction::SystemCall => 1,
            Instruction::LoadAccConst { .. }
            | Instruction::LoadXConst { .. }
            | Instruction::LoadYConst { .. }
            | Instruction::BranchNotEqual { .. } => 2,
            Instruction::LoadAccMem { .. }
            | Instruction::StoreAcc { .. }
            | Instruction::AddWithCarry { .. }
            | Instruction::LoadXMem { .. }
            | Instruction::LoadYMem { .. }
            | Instruction::CompareX { .. }
            | Instruction::Increment { .. } => 3,
        }
    }

    pub fn pretty_print(&self) -> String {
        match self {
            Instruction::LoadAccConst { value } => format!("LDA #${:02X}", value),
            Instruction::LoadAccMem { addr } => format!("LDA ${:04X}", addr),
            Instruction::StoreAcc { addr } => format!("STA ${:04X}", addr),
            Instruction::AddWithCarry { addr } => format!("ADC ${:04X}", addr),
            Instruction::LoadXConst { value } => format!("LDX #${:02X}", value),
            Instruction::LoadXMem { addr } => format!("LDX ${:04X}", addr),
            Instruction::LoadYConst { value } => format!("LDY #${:02X}", value),
            Instruction::LoadYMem { addr } => format!("LDY ${:04X}", addr),
            Instruction::CompareX { addr } => format!("CPX ${:04X}", addr),
            Instruction::BranchNotEqual { offset } => format!("BNE ${:02X}", offset),
            Instruction::Increment { addr } => format!("INC ${:04X}", addr),
            Instruction::NoOp => "NOP".to_string(),
            Instruction::Break => "BRK".to_string(),
            Instruction::SystemCall => "SYS".to_string(),
        }
    }
}
