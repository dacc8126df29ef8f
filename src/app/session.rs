//! Debugging session
//!
//! Ties the transport, the telemetry decoder and the assembler together:
//! commands go out, every frame that comes back is decoded and folded into
//! the session state in arrival order.

use serialport::SerialPort;
use thiserror::Error;

use super::commands::{CommandError, HostCommand};
use super::state::SessionState;
use crate::core::{Frame, FrameTransport, Link, OperatingMode, TransportConfig, TransportError};
use crate::disasm::CodecError;
use crate::telemetry::{decode, CpuState};

/// Session errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("Instructions can only be loaded in {}", OperatingMode::Instruction)]
    WrongMode,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Corrupt telemetry: {0}")]
    Decode(CodecError),
}

impl SessionError {
    /// Whether the session can carry on after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SessionError::Command(_) | SessionError::WrongMode)
    }
}

/// An open connection to the debugger firmware
pub struct Session<L: Link> {
    transport: FrameTransport<L>,
    state: SessionState,
}

impl Session<Box<dyn SerialPort>> {
    /// Open the serial port and run the handshake
    pub fn open(config: TransportConfig) -> Result<Self, SessionError> {
        log::info!("Connecting to {} at {} baud", config.port, config.baud);
        let transport = FrameTransport::open(config)?;
        Ok(Self::new(transport))
    }
}

impl<L: Link> Session<L> {
    /// Wrap a transport that already completed its handshake
    pub fn new(transport: FrameTransport<L>) -> Self {
        let state = SessionState::new(transport.mode());
        Self { transport, state }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn mode(&self) -> OperatingMode {
        self.transport.mode()
    }

    pub fn transport_mut(&mut self) -> &mut FrameTransport<L> {
        &mut self.transport
    }

    /// Send a command and decode the frames it produced
    pub fn submit(&mut self, command: HostCommand) -> Result<Vec<CpuState>, SessionError> {
        if command.is_instruction() && self.mode() != OperatingMode::Instruction {
            return Err(SessionError::WrongMode);
        }
        let frames = self.transport.send_command(&command.to_wire())?;
        self.ingest(frames)
    }

    /// Parse REPL text and submit it
    pub fn submit_line(&mut self, line: &str) -> Result<Vec<CpuState>, SessionError> {
        let command = HostCommand::parse(line)?;
        self.submit(command)
    }

    /// Decode frames that arrived without a command
    pub fn poll(&mut self) -> Result<Vec<CpuState>, SessionError> {
        let frames = self.transport.poll_frames()?;
        self.ingest(frames)
    }

    fn ingest(&mut self, frames: Vec<Frame>) -> Result<Vec<CpuState>, SessionError> {
        let mut states = Vec::with_capacity(frames.len());
        for frame in frames {
            let state = decode(&frame).map_err(SessionError::Decode)?;
            log::debug!("{} @ {:#06x}", state.label, state.pc);
            self.state.apply(state.clone());
            states.push(state);
        }
        Ok(states)
    }
}
