//! Core module - serial link and frame transport
//!
//! This module owns the connection to the debugger firmware: the byte-level
//! link, the telemetry frame shape and the resynchronizing transport.

pub mod frame;
pub mod link;
pub mod transport;

#[cfg(test)]
mod tests;

// Re-export common types
pub use frame::{Frame, FRAME_LEN, TERMINATOR};
pub use link::{Link, MemoryLink};
pub use transport::{FrameTransport, OperatingMode, TransportConfig, TransportError};
