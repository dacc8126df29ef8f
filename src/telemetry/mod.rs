//! Telemetry module - CPU state reported by the debugger firmware
//!
//! Turns each validated frame into a `CpuState` snapshot with a readable
//! description of the event that produced it.

pub mod decoder;
pub mod types;


pub use decoder::decode;
pub use types::*;
