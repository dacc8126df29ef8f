//! Disasm module - Nibbler instruction codec
//!
//! Two directions over the same instruction table:
//! - `assembler`: `MNEMONIC OPERAND` text into the bytes the debugger firmware loads
//! - `engine`: fetch register + program byte back into a listing line

pub mod assembler;
pub mod engine;


use thiserror::Error;

pub use assembler::{encode, parse_exact, parse_number};
pub use engine::{disassemble, DisassembledInstruction};

/// Codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Malformed instruction '{0}': expected MNEMONIC OPERAND")]
    Syntax(String),

    #[error("Unknown mnemonic: {0}")]
    UnknownMnemonic(String),

    #[error("Invalid operand '{0}'")]
    InvalidOperand(String),

    #[error("Invalid opcode {0:#x}")]
    InvalidOpcode(u8),
}

/// An assembled instruction ready to hand to the transport.
///
/// Two-byte instructions are stored low byte first: `LD 0xABC` is `0x6ABC`
/// on the CPU but `0xBC6A` here, which is the order the firmware's loader
/// shifts them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedInstruction {
    /// Encoded value, byte-swapped for two-byte instructions
    pub value: u16,
    /// Whether the firmware must load two bytes
    pub two_byte: bool,
}

impl EncodedInstruction {
    pub fn single(byte: u8) -> Self {
        Self {
            value: byte as u16,
            two_byte: false,
        }
    }

    /// Build a two-byte instruction from its CPU-order bytes
    pub fn double(first: u8, second: u8) -> Self {
        Self {
            value: u16::from_le_bytes([first, second]),
            two_byte: true,
        }
    }

    /// The instruction in the CPU's native most-significant-byte-first order
    pub fn native(&self) -> u16 {
        if self.two_byte {
            self.value.swap_bytes()
        } else {
            self.value
        }
    }

    /// The opcode byte (first byte fetched by the CPU)
    pub fn opcode_byte(&self) -> u8 {
        (self.value & 0xFF) as u8
    }

    /// The program byte of a direct instruction
    pub fn program_byte(&self) -> Option<u8> {
        self.two_byte.then(|| (self.value >> 8) as u8)
    }

    /// Bytes in the order the CPU fetches them
    pub fn cpu_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![self.opcode_byte()];
        bytes.extend(self.program_byte());
        bytes
    }

    pub fn len(&self) -> usize {
        if self.two_byte {
            2
        } else {
            1
        }
    }
}
