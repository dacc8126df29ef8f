//! App module - session state and commands
//!
//! Provides the debugging session and the host command set used by the CLI.

mod commands;
mod session;
mod state;

pub use commands::*;
pub use session::*;
pub use state::*;
