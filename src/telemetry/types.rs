//! Common types for telemetry decoding.

use std::fmt;

use crate::isa::Phase;

/// Event reported in the first byte of every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    /// State requested by the host (`o`)
    ReadState,
    /// Clock pulse (`C` loud, `c` quiet)
    Clock { loud: bool },
    /// Signals propagated without a clock edge (`P`/`p`)
    Propagate { loud: bool },
    /// Firmware corrected the phase (`a`)
    PhaseAdjust,
    /// Firmware corrected the executed instruction (`n`)
    ExecuteAdjust,
    /// Buttons changed (`B`/`b`)
    Button { loud: bool },
    /// CPU reset (`R`/`r`)
    Reset { loud: bool },
    /// Instruction loaded by the host (`I`/`i`)
    Instruction { loud: bool },
    /// Event code this host does not know
    Unknown(u8),
}

impl DeviceEvent {
    pub fn from_code(code: u8) -> Self {
        match code {
            b'o' | b'O' => DeviceEvent::ReadState,
            b'C' => DeviceEvent::Clock { loud: true },
            b'c' => DeviceEvent::Clock { loud: false },
            b'P' => DeviceEvent::Propagate { loud: true },
            b'p' => DeviceEvent::Propagate { loud: false },
            b'a' => DeviceEvent::PhaseAdjust,
            b'n' => DeviceEvent::ExecuteAdjust,
            b'B' => DeviceEvent::Button { loud: true },
            b'b' => DeviceEvent::Button { loud: false },
            b'R' => DeviceEvent::Reset { loud: true },
            b'r' => DeviceEvent::Reset { loud: false },
            b'I' => DeviceEvent::Instruction { loud: true },
            b'i' => DeviceEvent::Instruction { loud: false },
            other => DeviceEvent::Unknown(other),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, DeviceEvent::Unknown(_))
    }
}

/// The sixteen microcode ROM outputs, in wire bit order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlLine {
    // MICRO0
    LoadOut,
    OeOperand,
    OeIn,
    OeAlu,
    WeRam,
    CsPram,
    S0,
    S1,
    // MICRO1
    S2,
    S3,
    M,
    CarryIn,
    LoadFlags,
    LoadA,
    LoadPc,
    IncPc,
}

impl ControlLine {
    pub const ALL: [ControlLine; 16] = [
        ControlLine::LoadOut,
        ControlLine::OeOperand,
        ControlLine::OeIn,
        ControlLine::OeAlu,
        ControlLine::WeRam,
        ControlLine::CsPram,
        ControlLine::S0,
        ControlLine::S1,
        ControlLine::S2,
        ControlLine::S3,
        ControlLine::M,
        ControlLine::CarryIn,
        ControlLine::LoadFlags,
        ControlLine::LoadA,
        ControlLine::LoadPc,
        ControlLine::IncPc,
    ];

    /// Signal name as printed on the schematic
    pub fn name(self) -> &'static str {
        match self {
            ControlLine::LoadOut => "nLOADOUT",
            ControlLine::OeOperand => "nOEOPERAND",
            ControlLine::OeIn => "nOEIN",
            ControlLine::OeAlu => "nOEALU",
            ControlLine::WeRam => "nWERAM",
            ControlLine::CsPram => "nCSPRAM",
            ControlLine::S0 => "S0",
            ControlLine::S1 => "S1",
            ControlLine::S2 => "S2",
            ControlLine::S3 => "S3",
            ControlLine::M => "M",
            ControlLine::CarryIn => "nCARRYIN",
            ControlLine::LoadFlags => "nLOADFLAGS",
            ControlLine::LoadA => "nLOADA",
            ControlLine::LoadPc => "nLOADPC",
            ControlLine::IncPc => "INCPC",
        }
    }

    pub fn active_low(self) -> bool {
        self.name().starts_with('n')
    }

    /// Bit index across both microcode words (word 0 = bits 0..8)
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Raw levels of the sixteen control lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MicrocodeFlags {
    levels: [bool; 16],
}

impl MicrocodeFlags {
    pub fn from_words(word0: u8, word1: u8) -> Self {
        let mut levels = [false; 16];
        for (bit, level) in levels.iter_mut().enumerate() {
            let word = if bit < 8 { word0 } else { word1 };
            *level = (word >> (bit % 8)) & 1 == 1;
        }
        Self { levels }
    }

    /// Electrical level of the line
    pub fn level(&self, line: ControlLine) -> bool {
        self.levels[line.index()]
    }

    /// Whether the line is doing its job, accounting for active-low lines
    pub fn asserted(&self, line: ControlLine) -> bool {
        self.level(line) != line.active_low()
    }

    pub fn words(&self) -> (u8, u8) {
        let pack = |bits: &[bool]| {
            bits.iter()
                .enumerate()
                .fold(0u8, |acc, (i, &b)| acc | ((b as u8) << i))
        };
        (pack(&self.levels[..8]), pack(&self.levels[8..]))
    }
}

/// Front-panel buttons, bit order on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
    Right,
    Down,
    Up,
}

impl Button {
    pub const ALL: [Button; 4] = [Button::Left, Button::Right, Button::Down, Button::Up];

    pub fn mask(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Button::Left => "LEFT",
            Button::Right => "RIGHT",
            Button::Down => "DOWN",
            Button::Up => "UP",
        };
        f.write_str(name)
    }
}

/// CPU state decoded from one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuState {
    /// Event that produced this frame
    pub event: DeviceEvent,
    /// Human-readable description of the event
    pub label: String,
    /// Value on the data bus
    pub data_bus: u8,
    /// Program counter (12 bits used)
    pub pc: u16,
    /// Fetch register: opcode nibble and operand nibble
    pub fetch: u8,
    /// Second byte of a two-byte fetch
    pub program_byte: u8,
    pub phase: Phase,
    pub carry: bool,
    pub zero: bool,
    /// Reset line asserted
    pub reset: bool,
    /// Raw button bits
    pub buttons: u8,
    pub accumulator: u8,
    pub output: u8,
    pub microcode: MicrocodeFlags,
    /// Disassembly of the fetched instruction; empty in the fetch phase
    pub listing: String,
}

impl CpuState {
    pub fn opcode_nibble(&self) -> u8 {
        self.fetch >> 4
    }

    pub fn operand_nibble(&self) -> u8 {
        self.fetch & 0xF
    }

    pub fn button_bit(&self, button: Button) -> bool {
        self.buttons & button.mask() != 0
    }
}
