/// Register file of the CPU, saved into and restored from process control
/// blocks on every context switch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    pub pc: usize,
    pub acc: u8,
    pub x_reg: u8,
    pub y_reg: u8,
    pub z_flag: bool,
}

/// Register file plus the run flag, as shown by a CPU inspector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuSnapshot {
    pub registers: Registers,
    pub executing: bool,
}
