//! Telemetry frame - one fixed-size state report from the debugger firmware

use std::fmt;

/// Length of a telemetry frame on the wire
pub const FRAME_LEN: usize = 14;

/// Bytes closing every frame (`\n\r`)
pub const TERMINATOR: [u8; 2] = [0x0A, 0x0D];

/// Byte offsets inside a frame
pub mod offset {
    pub const EVENT: usize = 0;
    pub const DATA_BUS: usize = 1;
    pub const PC_LOW: usize = 2;
    pub const PC_HIGH: usize = 3;
    pub const FETCH: usize = 4;
    pub const MICRO0: usize = 5;
    pub const MICRO1: usize = 6;
    pub const STATUS: usize = 7;
    pub const BUTTONS: usize = 8;
    pub const PROGRAM_BYTE: usize = 9;
    pub const ACCUMULATOR: usize = 10;
    pub const OUTPUT: usize = 11;
}

/// A validated 14-byte frame ending in the terminator
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// Validate raw bytes. Anything that is not exactly one terminated frame
    /// is rejected.
    pub fn new(bytes: &[u8]) -> Option<Frame> {
        let bytes: [u8; FRAME_LEN] = bytes.try_into().ok()?;
        if bytes[FRAME_LEN - 2..] != TERMINATOR {
            return None;
        }
        Some(Frame(bytes))
    }

    /// Assemble a frame from its 12 body bytes
    pub fn from_body(body: [u8; FRAME_LEN - 2]) -> Frame {
        let mut bytes = [0; FRAME_LEN];
        bytes[..FRAME_LEN - 2].copy_from_slice(&body);
        bytes[FRAME_LEN - 2..].copy_from_slice(&TERMINATOR);
        Frame(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    pub fn byte(&self, offset: usize) -> u8 {
        self.0[offset]
    }

    pub fn event_code(&self) -> u8 {
        self.0[offset::EVENT]
    }

    /// Program counter, transmitted low byte first
    pub fn pc(&self) -> u16 {
        u16::from_le_bytes([self.0[offset::PC_LOW], self.0[offset::PC_HIGH]])
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_validation() {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[12] = 0x0A;
        bytes[13] = 0x0D;
        assert!(Frame::new(&bytes).is_some());

        bytes[13] = 0x0A;
        assert!(Frame::new(&bytes).is_none());
        assert!(Frame::new(&bytes[..13]).is_none());
        assert!(Frame::new(&[0u8; 15]).is_none());
    }

    #[test]
    fn test_pc_is_little_endian() {
        let mut body = [0u8; 12];
        body[offset::PC_LOW] = 0x34;
        body[offset::PC_HIGH] = 0x12;
        let frame = Frame::from_body(body);
        assert_eq!(frame.pc(), 0x1234);
        assert_eq!(&frame.as_bytes()[12..], &TERMINATOR);
    }

    #[test]
    fn test_debug_is_hex() {
        let frame = Frame::from_body([0xAB; 12]);
        assert_eq!(
            format!("{:?}", frame),
            "Frame(abababababababababababab0a0d)"
        );
    }
}
