//! Instruction Table - opcode metadata for the Nibbler CPU
//!
//! Every instruction is a 4-bit opcode in the high nibble of the first byte.
//! Immediate instructions keep their operand in the low nibble; direct
//! instructions carry a 12-bit address split across two bytes.

use std::fmt;

/// How an instruction interprets its operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// 4-bit operand packed in the opcode byte
    Immediate,
    /// 12-bit address spanning the opcode byte and the following program byte
    Direct,
}

impl AddressingMode {
    /// Number of bytes an instruction in this mode occupies
    pub fn size_bytes(self) -> usize {
        match self {
            AddressingMode::Immediate => 1,
            AddressingMode::Direct => 2,
        }
    }
}

/// The sixteen Nibbler opcodes, discriminant = opcode nibble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Jc = 0,
    Jnc = 1,
    Compi = 2,
    Compm = 3,
    Lit = 4,
    In = 5,
    Ld = 6,
    St = 7,
    Jz = 8,
    Jnz = 9,
    Addi = 10,
    Addm = 11,
    Jmp = 12,
    Out = 13,
    Nori = 14,
    Norm = 15,
}

/// Static metadata for one table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionInfo {
    pub opcode: Opcode,
    pub mnemonic: &'static str,
    pub mode: AddressingMode,
    /// The instruction branches on the carry flag
    pub uses_carry: bool,
    /// The instruction branches on the zero flag
    pub uses_zero: bool,
}

const fn entry(
    opcode: Opcode,
    mnemonic: &'static str,
    mode: AddressingMode,
    uses_carry: bool,
    uses_zero: bool,
) -> InstructionInfo {
    InstructionInfo {
        opcode,
        mnemonic,
        mode,
        uses_carry,
        uses_zero,
    }
}

use AddressingMode::{Direct, Immediate};

/// Instruction table indexed by opcode nibble
pub const INSTRUCTION_TABLE: [InstructionInfo; 16] = [
    entry(Opcode::Jc, "JC", Direct, true, false),
    entry(Opcode::Jnc, "JNC", Direct, true, false),
    entry(Opcode::Compi, "COMPI", Immediate, false, false),
    entry(Opcode::Compm, "COMPM", Direct, false, false),
    entry(Opcode::Lit, "LIT", Immediate, false, false),
    entry(Opcode::In, "IN", Immediate, false, false),
    entry(Opcode::Ld, "LD", Direct, false, false),
    entry(Opcode::St, "ST", Direct, false, false),
    entry(Opcode::Jz, "JZ", Direct, false, true),
    entry(Opcode::Jnz, "JNZ", Direct, false, true),
    entry(Opcode::Addi, "ADDI", Immediate, false, false),
    entry(Opcode::Addm, "ADDM", Direct, false, false),
    entry(Opcode::Jmp, "JMP", Direct, false, false),
    entry(Opcode::Out, "OUT", Immediate, false, false),
    entry(Opcode::Nori, "NORI", Immediate, false, false),
    entry(Opcode::Norm, "NORM", Direct, false, false),
];

impl Opcode {
    /// All opcodes in table order
    pub const ALL: [Opcode; 16] = [
        Opcode::Jc,
        Opcode::Jnc,
        Opcode::Compi,
        Opcode::Compm,
        Opcode::Lit,
        Opcode::In,
        Opcode::Ld,
        Opcode::St,
        Opcode::Jz,
        Opcode::Jnz,
        Opcode::Addi,
        Opcode::Addm,
        Opcode::Jmp,
        Opcode::Out,
        Opcode::Nori,
        Opcode::Norm,
    ];

    /// Look up an opcode by its 4-bit value. Returns `None` above 15.
    pub fn from_nibble(value: u8) -> Option<Opcode> {
        Opcode::ALL.get(value as usize).copied()
    }

    /// Look up an opcode by mnemonic, ignoring case
    pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
        INSTRUCTION_TABLE
            .iter()
            .find(|info| info.mnemonic.eq_ignore_ascii_case(mnemonic))
            .map(|info| info.opcode)
    }

    pub fn nibble(self) -> u8 {
        self as u8
    }

    pub fn info(self) -> &'static InstructionInfo {
        &INSTRUCTION_TABLE[self as usize]
    }

    pub fn mnemonic(self) -> &'static str {
        self.info().mnemonic
    }

    pub fn mode(self) -> AddressingMode {
        self.info().mode
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
