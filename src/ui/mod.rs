//! UI module - Command Line Interface
//!
//! Provides the reedline-based REPL used to drive a debugging session.

pub mod cli;
