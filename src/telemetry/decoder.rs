//! Telemetry Decoder - frame bytes into a `CpuState`

use crate::core::frame::{offset, Frame};
use crate::disasm::{disassemble, CodecError};
use crate::isa::Phase;

use super::types::{CpuState, DeviceEvent, MicrocodeFlags};

/// Status byte bits
const STATUS_ZERO: u8 = 1 << 0;
const STATUS_CARRY: u8 = 1 << 1;
const STATUS_PHASE: u8 = 1 << 2;
const STATUS_RESET: u8 = 1 << 3;

/// Decode a validated frame.
///
/// Unknown event codes decode normally with a generic label. The fetched
/// instruction is disassembled once and shared by the label and `listing`.
/// The only error is an opcode outside the instruction table, which the 4-bit
/// fetch nibble cannot produce.
pub fn decode(frame: &Frame) -> Result<CpuState, CodecError> {
    let status = frame.byte(offset::STATUS);
    let event = DeviceEvent::from_code(frame.event_code());

    let mut state = CpuState {
        event,
        label: String::new(),
        data_bus: frame.byte(offset::DATA_BUS),
        pc: frame.pc(),
        fetch: frame.byte(offset::FETCH),
        program_byte: frame.byte(offset::PROGRAM_BYTE),
        phase: Phase::from_bit(status & STATUS_PHASE != 0),
        carry: status & STATUS_CARRY != 0,
        zero: status & STATUS_ZERO != 0,
        reset: status & STATUS_RESET != 0,
        buttons: frame.byte(offset::BUTTONS),
        accumulator: frame.byte(offset::ACCUMULATOR),
        output: frame.byte(offset::OUTPUT),
        microcode: MicrocodeFlags::from_words(
            frame.byte(offset::MICRO0),
            frame.byte(offset::MICRO1),
        ),
        listing: String::new(),
    };
    state.listing = disassemble(
        state.pc,
        state.fetch,
        state.program_byte,
        state.phase,
        state.carry,
        state.zero,
    )?;
    state.label = label(&state);

    if !event.is_known() {
        log::debug!("Unknown event code {:#04x} in {:?}", frame.event_code(), frame);
    }
    Ok(state)
}

/// Describe the event; quiet variants are lower case
fn label(state: &CpuState) -> String {
    match state.event {
        DeviceEvent::ReadState => "STATE".to_string(),
        DeviceEvent::Clock { loud: true } => "CLOCK".to_string(),
        DeviceEvent::Clock { loud: false } => "clock".to_string(),
        DeviceEvent::Propagate { loud: true } => "PROPAGATE".to_string(),
        DeviceEvent::Propagate { loud: false } => "propagate".to_string(),
        DeviceEvent::PhaseAdjust => "PHASE_ADJUST".to_string(),
        DeviceEvent::ExecuteAdjust => "EXEC_ADJUST".to_string(),
        DeviceEvent::Button { loud: true } => format!("BUTTON {}", state.buttons),
        DeviceEvent::Button { loud: false } => "button".to_string(),
        DeviceEvent::Reset { loud: true } => "RESET".to_string(),
        DeviceEvent::Reset { loud: false } => "reset".to_string(),
        DeviceEvent::Instruction { loud: true } => "INSTRUCTION".to_string(),
        DeviceEvent::Instruction { loud: false } if state.listing.is_empty() => {
            "instruction".to_string()
        }
        DeviceEvent::Instruction { loud: false } => format!("instruction {}", state.listing),
        DeviceEvent::Unknown(_) => "Unknown command!".to_string(),
    }
}
