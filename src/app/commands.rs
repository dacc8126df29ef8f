//! Command processing
//!
//! Host commands understood by the debugger firmware, and the REPL syntax
//! that produces them.

use thiserror::Error;

use crate::disasm::{encode, parse_exact, CodecError, EncodedInstruction};

/// Errors from parsing REPL input into a command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: '{0}'")]
    Unknown(String),

    #[error("Missing argument for '{0}'")]
    MissingArgument(String),

    #[error("Invalid button value '{0}' (expected 0-15)")]
    InvalidButton(String),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Commands sent to the debugger firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// Reset the CPU (`R`/`r`)
    Reset { loud: bool },
    /// Report the current state (`O`)
    ReadState,
    /// Pulse the clock once (`C`/`c`)
    Clock { loud: bool },
    /// Let signals settle without a clock edge (`P`/`p`)
    Propagate { loud: bool },
    /// Drive the four buttons (`B <n>`)
    Button(u8),
    /// Load an assembled instruction (`I <value> <two_byte>`)
    Instruction(EncodedInstruction),
}

impl HostCommand {
    /// ASCII bytes written to the link
    pub fn to_wire(&self) -> Vec<u8> {
        let text = match *self {
            HostCommand::Reset { loud } => letter('R', loud).to_string(),
            HostCommand::ReadState => "O".to_string(),
            HostCommand::Clock { loud } => letter('C', loud).to_string(),
            HostCommand::Propagate { loud } => letter('P', loud).to_string(),
            HostCommand::Button(value) => format!("B {}", value),
            HostCommand::Instruction(instr) => {
                format!("I {} {}", instr.value, instr.two_byte as u8)
            }
        };
        text.into_bytes()
    }

    pub fn is_instruction(&self) -> bool {
        matches!(self, HostCommand::Instruction(_))
    }

    /// Parse REPL input.
    ///
    /// Single letters select loud (upper case) or quiet (lower case)
    /// variants; `b <n>` sets the buttons and `i <MNEMONIC> <OPERAND>`
    /// assembles an instruction.
    pub fn parse(input: &str) -> Result<HostCommand, CommandError> {
        let input = input.trim();
        let (cmd, arg) = match input.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, Some(arg.trim())),
            None => (input, None),
        };

        match (cmd, arg) {
            ("R" | "r", None) => Ok(HostCommand::Reset { loud: cmd == "R" }),
            ("O" | "o", None) => Ok(HostCommand::ReadState),
            ("C" | "c", None) => Ok(HostCommand::Clock { loud: cmd == "C" }),
            ("P" | "p", None) => Ok(HostCommand::Propagate { loud: cmd == "P" }),
            ("B" | "b", Some(value)) => parse_button(value).map(HostCommand::Button),
            ("B" | "b", None) => Err(CommandError::MissingArgument(cmd.to_string())),
            ("I" | "i", Some(text)) => Ok(HostCommand::Instruction(encode(text)?)),
            ("I" | "i", None) => Err(CommandError::MissingArgument(cmd.to_string())),
            _ => Err(CommandError::Unknown(input.to_string())),
        }
    }
}

fn letter(upper: char, loud: bool) -> char {
    if loud {
        upper
    } else {
        upper.to_ascii_lowercase()
    }
}

fn parse_button(value: &str) -> Result<u8, CommandError> {
    parse_exact(value)
        .filter(|n| (0..=15).contains(n))
        .map(|n| n as u8)
        .ok_or_else(|| CommandError::InvalidButton(value.to_string()))
}
