use crate::instruction::Instruction;
use crate::isa::Opcode;

/// Decodes one instruction from its opcode byte and operand bytes.
///
/// EDUCATIONAL PURPOSE: Decoding is split from fetching because the CPU
/// must fetch the operand bytes through the bounds-checked accessor one
/// at a time. Once they are in hand, decoding is a pure function.
///
/// Returns None for an unknown opcode or when `operands` holds fewer
/// bytes than the opcode needs. Extra operand bytes are ignored.
pub fn decode(opcode: u8, operands: &[u8]) -> Option<Instruction> {
    let op = Opcode::from_byte(opcode)?;
    let width = op.operand_width();
    if operands.len() < width {
        return None;
    }

    let byte = || operands[0];
    // EDUCATIONAL: absolute addresses are little-endian, low byte first
    let addr = || u16::from_le_bytes([operands[0], operands[1]]);

    let instr = match op {
        Opcode::LdaImmediate => Instruction::LoadAccConst { value: byte() },
        Opcode::LdaAbsolute => Instruction::LoadAccMem { addr: addr() },
        Opcode::StaAbsolute => Instruction::StoreAcc { addr: addr() },
        Opcode::AdcAbsolute => Instruction::AddWithCarry { addr: addr() },
        Opcode::LdxImmediate => Instruction::LoadXConst { value: byte() },
        Opcode::LdxAbsolute => Instruction::LoadXMem { addr: addr() },
        Opcode::LdyImmediate => Instruction::LoadYConst { value: byte() },
        Opcode::LdyAbsolute => Instruction::LoadYMem { addr: addr() },
        Opcode::CpxAbsolute => Instruction::CompareX { addr: addr() },
        Opcode::Bne => Instruction::BranchNotEqual { offset: byte() },
        Opcode::IncAbsolute => Instruction::Increment { addr: addr() },
        Opcode::Nop => Instruction::NoOp,
        Opcode::Brk => Instruction::Break,
        Opcode::Sys => Instruction::SystemCall,
    };
    Some(instr)
}

/// Decodes a whole program listing, stopping at the first unknown opcode
/// or truncated instruction. Used by inspectors to disassemble images.
pub fn disassemble(bytes: &[u8]) -> Vec<(usize, Instruction)> {
    let mut out = Vec::new();
    let mut pc = 0;
    while pc < bytes.len() {
        match decode(bytes[pc], &bytes[pc + 1..]) {
            Some(instr) => {
                out.push((pc, instr));
                pc += instr.size();
            }
            None => break,
        }
    }
    out
}
