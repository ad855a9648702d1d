/// EDUCATIONAL: Opcode table of the simulated 8-bit accumulator machine.
///
/// The instruction set is a small subset of the classic 6502: every
/// instruction is one opcode byte followed by zero, one or two operand
/// bytes. Two byte operands are absolute addresses stored little-endian
/// (low byte first), exactly like the original hardware.
///
/// ADDRESSING MODES:
/// - Implied: no operand (`EA`, `00`, `FF`)
/// - Immediate: one constant byte (`A9`, `A2`, `A0`)
/// - Relative: one signed-by-wraparound branch distance (`D0`)
/// - Absolute: two address bytes (`AD`, `8D`, `6D`, `AE`, `AC`, `EC`, `EE`)
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    /// LDA #: load the accumulator with a constant
    LdaImmediate = 0xA9,
    /// LDA abs: load the accumulator from memory
    LdaAbsolute = 0xAD,
    /// STA abs: store the accumulator into memory
    StaAbsolute = 0x8D,
    /// ADC abs: add memory to the accumulator
    AdcAbsolute = 0x6D,
    /// LDX #
    LdxImmediate = 0xA2,
    /// LDX abs
    LdxAbsolute = 0xAE,
    /// LDY #
    LdyImmediate = 0xA0,
    /// LDY abs
    LdyAbsolute = 0xAC,
    /// CPX abs: compare memory with X, setting the Z flag on equality
    CpxAbsolute = 0xEC,
    /// BNE: branch when the Z flag is clear
    Bne = 0xD0,
    /// INC abs: increment a memory byte
    IncAbsolute = 0xEE,
    /// NOP
    Nop = 0xEA,
    /// BRK: end of program
    Brk = 0x00,
    /// SYS: system call selected by the X register
    Sys = 0xFF,
}

impl Opcode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        let op = match byte {
            0xA9 => Opcode::LdaImmediate,
            0xAD => Opcode::LdaAbsolute,
            0x8D => Opcode::StaAbsolute,
            0x6D => Opcode::AdcAbsolute,
            0xA2 => Opcode::LdxImmediate,
            0xAE => Opcode::LdxAbsolute,
            0xA0 => Opcode::LdyImmediate,
            0xAC => Opcode::LdyAbsolute,
            0xEC => Opcode::CpxAbsolute,
            0xD0 => Opcode::Bne,
            0xEE => Opcode::IncAbsolute,
            0xEA => Opcode::Nop,
            0x00 => Opcode::Brk,
            0xFF => Opcode::Sys,
            _ => return None,
        };
        Some(op)
    }

    /// Number of operand bytes following the opcode byte.
    pub fn operand_width(self) -> usize {
        match self {
            Opcode::Nop | Opcode::Brk | Opcode::Sys => 0,
            Opcode::LdaImmediate | Opcode::LdxImmediate | Opcode::LdyImmediate | Opcode::Bne => 1,
            Opcode::LdaAbsolute
            | Opcode::StaAbsolute
            | Opcode::AdcAbsolute
            | Opcode::LdxAbsolute
            | Opcode::LdyAbsolute
            | Opcode::CpxAbsolute
            | Opcode::IncAbsolute => 2,
        }
    }
}
