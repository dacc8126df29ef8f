//! ISA module - Nibbler instruction set
//!
//! Static description of the sixteen Nibbler instructions shared by the
//! assembler and the disassembler.

mod table;

pub use table::*;

/// CPU phase, toggled on every clock edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Reading the next instruction
    #[default]
    Fetch,
    /// Acting on the fetched instruction
    Execute,
}

impl Phase {
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Phase::Execute
        } else {
            Phase::Fetch
        }
    }

    pub fn is_execute(self) -> bool {
        self == Phase::Execute
    }
}
