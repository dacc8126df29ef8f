//! Frame Transport - framing and command plumbing over the serial link
//!
//! The firmware streams 14-byte frames with no length prefix, so the host
//! may start reading in the middle of one. Every read resynchronizes on the
//! `\n\r` terminator and throws away whatever does not form a whole frame.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

use serialport::SerialPort;
use thiserror::Error;

use super::frame::{Frame, FRAME_LEN, TERMINATOR};
use super::link::{open_serial, Link};

/// Byte sent by the firmware once its serial port is up (`@`)
pub const READY_BYTE: u8 = 64;

/// Written after every command so the firmware flushes its response buffer
pub const SENTINEL: u8 = 0;

/// Rate the debugger firmware is built for
pub const DEFAULT_BAUD: u32 = 115_200;

/// Per-read timeout while waiting for the mode acknowledgement
const ACK_POLL: Duration = Duration::from_millis(100);

/// Sleep between input queue checks while waiting for a response
const RESPONSE_POLL: Duration = Duration::from_millis(2);

/// Transport errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Debugger did not initialize correctly: expected ready byte {expected:#04x}, received {received:#04x}")]
    Handshake { expected: u8, received: u8 },

    #[error("Cannot connect to the debugger: expected {expected:?}, received {received:?}")]
    Connect { expected: String, received: String },

    #[error("No answer from the debugger within {0:?}")]
    Timeout(Duration),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Firmware operating mode selected during the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatingMode {
    /// The CPU runs the program stored in its ROM
    #[default]
    Program = 0,
    /// The host feeds instructions one at a time
    Instruction = 1,
}

impl OperatingMode {
    /// ASCII digit written to select the mode
    pub fn wire_byte(self) -> u8 {
        b'0' + self as u8
    }

    /// Line the firmware echoes once the mode is accepted
    pub fn acknowledgement(self) -> String {
        format!("0p{}\r\n", self as u8)
    }
}

impl FromStr for OperatingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "program" | "prog" => Ok(OperatingMode::Program),
            "1" | "instruction" | "instr" => Ok(OperatingMode::Instruction),
            other => Err(format!(
                "Invalid operating mode '{}' (expected 0/program or 1/instruction)",
                other
            )),
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatingMode::Program => f.write_str("PROGRAM MODE"),
            OperatingMode::Instruction => f.write_str("INSTRUCTION MODE"),
        }
    }
}

/// Serial link parameters, fixed for the lifetime of a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Serial device path (e.g. `/dev/ttyACM0`)
    pub port: String,
    pub baud: u32,
    pub mode: OperatingMode,
    /// Timeout for each byte read while polling; zero polls without blocking
    pub read_timeout: Duration,
    /// Upper bound on the whole handshake
    pub handshake_timeout: Duration,
    /// How long a command waits for the first frame of its response
    pub response_window: Duration,
}

impl TransportConfig {
    pub fn new(port: impl Into<String>, baud: u32, mode: OperatingMode) -> Self {
        Self {
            port: port.into(),
            baud,
            mode,
            read_timeout: Duration::ZERO,
            handshake_timeout: Duration::from_secs(10),
            response_window: Duration::from_millis(50),
        }
    }
}

/// Owns the link to the debugger firmware
pub struct FrameTransport<L: Link> {
    link: L,
    config: TransportConfig,
}

impl FrameTransport<Box<dyn SerialPort>> {
    /// Open the configured serial port and run the handshake
    pub fn open(config: TransportConfig) -> Result<Self, TransportError> {
        let port = open_serial(&config.port, config.baud, config.read_timeout)?;
        let mut transport = Self::new(port, config);
        transport.handshake()?;
        Ok(transport)
    }
}

impl<L: Link> FrameTransport<L> {
    /// Wrap an already-open link. No handshake is performed.
    pub fn new(link: L, config: TransportConfig) -> Self {
        Self { link, config }
    }

    pub fn mode(&self) -> OperatingMode {
        self.config.mode
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn into_inner(self) -> L {
        self.link
    }

    /// Wait for the ready byte, negotiate the operating mode and discard
    /// anything the firmware buffered before we were listening.
    pub fn handshake(&mut self) -> Result<(), TransportError> {
        let limit = self.config.handshake_timeout;
        let deadline = Instant::now() + limit;

        log::info!("Waiting for the debugger to initialize the port...");
        self.link.set_timeout(limit)?;
        let ready = self.link.read_byte()?.ok_or(TransportError::Timeout(limit))?;
        if ready != READY_BYTE {
            return Err(TransportError::Handshake {
                expected: READY_BYTE,
                received: ready,
            });
        }

        self.link.set_timeout(self.config.read_timeout.max(ACK_POLL))?;
        let expected = self.config.mode.acknowledgement();
        let line = loop {
            self.link.write_all(&[self.config.mode.wire_byte()])?;
            let line = self.read_line(deadline, limit)?;
            if !line.is_empty() {
                break line;
            }
            if Instant::now() >= deadline {
                return Err(TransportError::Timeout(limit));
            }
        };
        if line != expected {
            return Err(TransportError::Connect {
                expected,
                received: line,
            });
        }
        self.link.set_timeout(self.config.read_timeout)?;
        log::info!("Debugger acknowledged {}", self.config.mode);

        let mut stale = 0;
        while let Some(frame) = self.read_frame()? {
            log::trace!("Stale {:?}", frame);
            stale += 1;
        }
        log::debug!("Discarded {} stale frame(s)", stale);
        self.flush_responses()?;
        Ok(())
    }

    /// Read one frame, resynchronizing on the terminator.
    ///
    /// Returns `Ok(None)` when the input queue runs dry first. Bytes that do
    /// not end up in the returned frame are lost.
    pub fn read_frame(&mut self) -> Result<Option<Frame>, TransportError> {
        let mut window: VecDeque<u8> = VecDeque::with_capacity(FRAME_LEN);
        let mut discarded = 0usize;

        loop {
            if self.link.bytes_to_read()? == 0 {
                break;
            }
            let Some(byte) = self.link.read_byte()? else {
                break;
            };
            if window.len() == FRAME_LEN {
                window.pop_front();
                discarded += 1;
            }
            window.push_back(byte);

            // A terminator with a short body produces nothing; keep sliding
            let full = window.len() == FRAME_LEN;
            if full
                && window[FRAME_LEN - 2] == TERMINATOR[0]
                && window[FRAME_LEN - 1] == TERMINATOR[1]
            {
                let frame = Frame::new(window.make_contiguous());
                if discarded > 0 {
                    log::debug!("Resynchronized after discarding {} byte(s)", discarded);
                }
                if let Some(frame) = &frame {
                    log::trace!("Received {:?}", frame);
                }
                return Ok(frame);
            }
        }

        discarded += window.len();
        if discarded > 0 {
            log::debug!("No frame in {} byte(s) of input", discarded);
        }
        Ok(None)
    }

    /// Collect every complete frame currently queued
    pub fn poll_frames(&mut self) -> Result<Vec<Frame>, TransportError> {
        let mut frames = Vec::new();
        while self.link.bytes_to_read()? >= FRAME_LEN {
            if let Some(frame) = self.read_frame()? {
                frames.push(frame);
            }
        }
        Ok(frames)
    }

    /// Send a raw command and return the frames the firmware answered with
    pub fn send_command(&mut self, command: &[u8]) -> Result<Vec<Frame>, TransportError> {
        log::debug!("Sending {:?}", String::from_utf8_lossy(command));
        self.link.write_all(command)?;
        self.await_response()?;
        let frames = self.poll_frames()?;
        self.flush_responses()?;
        log::debug!("Command answered with {} frame(s)", frames.len());
        Ok(frames)
    }

    /// Write the sentinel and throw away whatever is still queued
    fn flush_responses(&mut self) -> Result<(), TransportError> {
        self.link.write_all(&[SENTINEL])?;
        let mut dropped = 0usize;
        while self.link.bytes_to_read()? > 0 {
            if self.link.read_byte()?.is_none() {
                // Queue reports bytes the port will not hand over
                self.link.clear_input()?;
                break;
            }
            dropped += 1;
        }
        if dropped > 0 {
            log::debug!("Drained {} byte(s) after sentinel", dropped);
        }
        Ok(())
    }

    fn await_response(&mut self) -> Result<(), TransportError> {
        let deadline = Instant::now() + self.config.response_window;
        while self.link.bytes_to_read()? < FRAME_LEN {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(RESPONSE_POLL.min(deadline - now));
        }
        Ok(())
    }

    /// Read up to and including `\n`; an empty string means nothing arrived.
    ///
    /// A line still incomplete at `deadline` fails with `Timeout(limit)`.
    fn read_line(
        &mut self,
        deadline: Instant,
        limit: Duration,
    ) -> Result<String, TransportError> {
        let mut line = Vec::new();
        while let Some(byte) = self.link.read_byte()? {
            line.push(byte);
            if byte == b'\n' {
                break;
            }
            if Instant::now() >= deadline {
                log::debug!("No newline in {} byte(s) before the deadline", line.len());
                return Err(TransportError::Timeout(limit));
            }
        }
        Ok(String::from_utf8_lossy(&line).into_owned())
    }
}
