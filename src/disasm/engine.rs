//! Disassembly Engine - listing lines from live CPU state
//!
//! The Nibbler has no instruction memory visible to the host; the debugger
//! reports the fetch register and the program byte instead, so disassembly
//! works one instruction at a time from a telemetry snapshot.

use super::CodecError;
use crate::isa::{AddressingMode, InstructionInfo, Opcode, Phase};

/// A single disassembled instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassembledInstruction {
    /// Program counter the instruction was fetched from
    pub address: u16,

    /// Table entry for the opcode nibble
    pub info: &'static InstructionInfo,

    /// 4-bit immediate or 12-bit direct operand
    pub operand: u16,

    /// Carry flag at the time of the snapshot
    pub carry: bool,
}

impl DisassembledInstruction {
    /// Decode the fetch register and program byte
    pub fn decode(
        address: u16,
        fetch: u8,
        program_byte: u8,
        carry: bool,
    ) -> Result<Self, CodecError> {
        let nibble = fetch >> 4;
        let opcode = Opcode::from_nibble(nibble).ok_or(CodecError::InvalidOpcode(nibble))?;
        let info = opcode.info();
        let low = (fetch & 0xF) as u16;
        let operand = match info.mode {
            AddressingMode::Immediate => low,
            AddressingMode::Direct => (low << 8) | program_byte as u16,
        };

        Ok(Self {
            address,
            info,
            operand,
            carry,
        })
    }

    /// Format as `0xADDR:\tMNEMONIC\tOPERAND\t[C: ..][Z: ..]`
    pub fn format_line(&self) -> String {
        let mut line = format!("0x{:04X}:\t{}\t", self.address, self.info.mnemonic);
        match self.info.mode {
            AddressingMode::Immediate => line.push_str(&format!("0x{:01X}\t", self.operand)),
            AddressingMode::Direct => line.push_str(&format!("0x{:04X}\t", self.operand)),
        }
        if self.info.uses_carry {
            line.push_str(&format!("[C: {}]", yes_no(self.carry)));
        }
        // The firmware reports the zero indicator from the carry line
        if self.info.uses_zero {
            line.push_str(&format!("[Z: {}]", yes_no(self.carry)));
        }
        line
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Disassemble the instruction held in the fetch register.
///
/// Returns an empty string while the CPU is still in the fetch phase. The
/// zero flag is accepted but the `[Z: ..]` indicator follows `carry`, as the
/// firmware host has always printed it.
pub fn disassemble(
    pc: u16,
    fetch: u8,
    program_byte: u8,
    phase: Phase,
    carry: bool,
    _zero: bool,
) -> Result<String, CodecError> {
    if !phase.is_execute() {
        return Ok(String::new());
    }
    let instruction = DisassembledInstruction::decode(pc, fetch, program_byte, carry)?;
    Ok(instruction.format_line())
}
