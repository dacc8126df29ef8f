//! Link - byte-stream seam between the transport and the serial port
//!
//! The transport only needs a handful of primitives, which keeps it testable
//! against an in-memory stream.

use serialport::{ClearBuffer, SerialPort};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::time::Duration;

use super::transport::SENTINEL;

/// Byte-level access to the debugger link
pub trait Link {
    /// Number of bytes waiting in the input queue
    fn bytes_to_read(&mut self) -> io::Result<usize>;

    /// Read one byte, waiting at most the configured timeout.
    /// Returns `None` when nothing arrived in time.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Write all bytes and flush
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Drop everything in the input queue
    fn clear_input(&mut self) -> io::Result<()>;

    /// Change the read timeout (zero means poll)
    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()>;
}

impl Link for Box<dyn SerialPort> {
    fn bytes_to_read(&mut self) -> io::Result<usize> {
        Ok((**self).bytes_to_read()? as usize)
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.read(&mut buf) {
            Ok(1) => Ok(Some(buf[0])),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        Write::write_all(self, bytes)?;
        self.flush()
    }

    fn clear_input(&mut self) -> io::Result<()> {
        (**self).clear(ClearBuffer::Input)?;
        Ok(())
    }

    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        (**self).set_timeout(timeout)?;
        Ok(())
    }
}

/// Open the serial device 8N1 at the given baud rate
pub fn open_serial(
    path: &str,
    baud: u32,
    timeout: Duration,
) -> serialport::Result<Box<dyn SerialPort>> {
    log::debug!("Opening {} at {} baud", path, baud);
    serialport::new(path, baud)
        .timeout(timeout)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .open()
}

/// In-memory link for replaying captured traffic.
///
/// Each write other than the lone sentinel byte releases the next scripted
/// reply into the input queue, which is enough to stand in for the firmware's
/// request/response behavior.
#[derive(Debug, Default)]
pub struct MemoryLink {
    input: VecDeque<u8>,
    replies: VecDeque<Vec<u8>>,
    written: Vec<Vec<u8>>,
}

impl MemoryLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link whose input queue already holds `bytes`
    pub fn with_input(bytes: &[u8]) -> Self {
        let mut link = Self::new();
        link.push_input(bytes);
        link
    }

    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
    }

    /// Queue a reply released by the next non-sentinel write
    pub fn push_reply(&mut self, bytes: &[u8]) {
        self.replies.push_back(bytes.to_vec());
    }

    /// Every write so far, one entry per call
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    pub fn pending(&self) -> usize {
        self.input.len()
    }
}

impl Link for MemoryLink {
    fn bytes_to_read(&mut self) -> io::Result<usize> {
        Ok(self.input.len())
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.input.pop_front())
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.written.push(bytes.to_vec());
        if bytes != [SENTINEL].as_slice() {
            if let Some(reply) = self.replies.pop_front() {
                self.input.extend(reply);
            }
        }
        Ok(())
    }

    fn clear_input(&mut self) -> io::Result<()> {
        self.input.clear();
        Ok(())
    }

    fn set_timeout(&mut self, _timeout: Duration) -> io::Result<()> {
        Ok(())
    }
}
