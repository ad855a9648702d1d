//! Host side of the simulator: loads program files, drives the kernel
//! clock and renders what happened.

pub mod logger;
pub mod program;
pub mod report;
