//! Nibbler debugger - host side of the Nibbler 4-bit CPU serial harness
//!
//! Instruction table, assembler and disassembler, the framed serial
//! transport and the telemetry decoder, plus the session and REPL built on
//! top of them.

pub mod app;
pub mod core;
pub mod disasm;
pub mod isa;
pub mod telemetry;
pub mod ui;
