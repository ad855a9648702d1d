use crate::instruction::Instruction;
use crate::registers::Registers;

/// Hooks fired at the end of every completed CPU cycle, used by display
/// and logging collaborators. All methods default to no-ops.
pub trait CycleObserver {
    /// Called after `instr`, fetched at `pc`, finished executing.
    fn on_instruction(&mut self, _pc: usize, _instr: &Instruction, _regs: &Registers) {}
}
