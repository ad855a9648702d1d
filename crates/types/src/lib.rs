//! Vocabulary shared by every layer of the simulator: identifiers, disk
//! coordinates, interrupts, configuration and the error taxonomy.

pub mod config;
pub use config::{Config, DiskGeometry};

pub mod tsb;
pub use tsb::Tsb;

pub mod process;
pub use process::*;

pub mod interrupt;
pub use interrupt::*;

pub mod result;
pub use result::*;
