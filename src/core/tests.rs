//! Frame transport tests against an in-memory link

use super::transport::{READY_BYTE, SENTINEL};
use super::*;
use std::io;
use std::time::{Duration, Instant};

fn config(mode: OperatingMode) -> TransportConfig {
    let mut config = TransportConfig::new("mem", 115_200, mode);
    config.response_window = Duration::ZERO;
    config.handshake_timeout = Duration::from_millis(50);
    config
}

fn frame_bytes(event: u8, pc: u16) -> Vec<u8> {
    let mut bytes = vec![event, 0x11];
    bytes.extend(pc.to_le_bytes());
    bytes.extend([0x45, 0xFF, 0x00, 0b0101, 0x0F, 0xBC, 0x03, 0x07]);
    bytes.extend(TERMINATOR);
    bytes
}

fn transport(input: &[u8]) -> FrameTransport<MemoryLink> {
    FrameTransport::new(MemoryLink::with_input(input), config(OperatingMode::Program))
}

#[test]
fn test_read_aligned_frame() {
    let bytes = frame_bytes(b'o', 0x0010);
    let mut transport = transport(&bytes);

    let frame = transport.read_frame().unwrap().expect("frame");
    assert_eq!(frame.as_bytes().as_slice(), bytes.as_slice());
    assert_eq!(transport.read_frame().unwrap(), None);
}

#[test]
fn test_read_discards_leading_garbage() {
    let frame = frame_bytes(b'C', 0x0123);
    let mut input = vec![0x99, 0x0A, 0x42, 0x0D, 0x00];
    input.extend(&frame);
    let mut transport = transport(&input);

    let received = transport.read_frame().unwrap().expect("frame");
    assert_eq!(received.as_bytes().as_slice(), frame.as_slice());
    assert_eq!(received.pc(), 0x0123);
    assert_eq!(transport.link_mut().pending(), 0);
}

#[test]
fn test_read_recovers_after_partial_frame() {
    // Tail of a frame we joined halfway through, then a whole one
    let mut input = frame_bytes(b'c', 0x0001)[9..].to_vec();
    let frame = frame_bytes(b'P', 0x0002);
    input.extend(&frame);
    let mut transport = transport(&input);

    let received = transport.read_frame().unwrap().expect("frame");
    assert_eq!(received.as_bytes().as_slice(), frame.as_slice());
}

#[test]
fn test_read_without_terminator_is_not_an_error() {
    let mut transport = transport(&[0x01, 0x02, 0x03, 0x0A, 0x0A, 0x04]);
    assert_eq!(transport.read_frame().unwrap(), None);
    assert_eq!(transport.link_mut().pending(), 0);
}

#[test]
fn test_read_empty_input() {
    let mut transport = transport(&[]);
    assert_eq!(transport.read_frame().unwrap(), None);
}

#[test]
fn test_short_frame_is_dropped() {
    let mut transport = transport(&[0x01, 0x02, 0x0A, 0x0D]);
    assert_eq!(transport.read_frame().unwrap(), None);
}

#[test]
fn test_poll_frames_in_arrival_order() {
    let mut input = frame_bytes(b'C', 1);
    input.extend(frame_bytes(b'C', 2));
    input.extend(frame_bytes(b'C', 3));
    input.extend([0x01, 0x02]);
    let mut transport = transport(&input);

    let pcs: Vec<u16> = transport
        .poll_frames()
        .unwrap()
        .iter()
        .map(Frame::pc)
        .collect();
    assert_eq!(pcs, vec![1, 2, 3]);
}

#[test]
fn test_send_command_collects_then_flushes() {
    let mut link = MemoryLink::new();
    let mut reply = frame_bytes(b'C', 7);
    reply.extend([0xEE, 0xEE, 0xEE]);
    link.push_reply(&reply);
    let mut transport = FrameTransport::new(link, config(OperatingMode::Program));

    let frames = transport.send_command(b"C").unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].event_code(), b'C');

    let link = transport.into_inner();
    assert_eq!(link.written(), &[b"C".to_vec(), vec![SENTINEL]]);
    assert_eq!(link.pending(), 0);
}

#[test]
fn test_handshake_success_discards_stale_frames() {
    let mut link = MemoryLink::with_input(&[READY_BYTE]);
    let mut reply = b"0p1\r\n".to_vec();
    reply.extend(frame_bytes(b'o', 0x0AAA));
    link.push_reply(&reply);
    let mut transport = FrameTransport::new(link, config(OperatingMode::Instruction));

    transport.handshake().unwrap();

    let link = transport.into_inner();
    assert_eq!(link.written(), &[vec![b'1'], vec![SENTINEL]]);
    assert_eq!(link.pending(), 0);
}

#[test]
fn test_handshake_wrong_ready_byte() {
    let mut transport = transport(&[b'X']);
    match transport.handshake() {
        Err(TransportError::Handshake { expected, received }) => {
            assert_eq!(expected, READY_BYTE);
            assert_eq!(received, b'X');
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_handshake_wrong_acknowledgement() {
    let mut link = MemoryLink::with_input(&[READY_BYTE]);
    link.push_reply(b"0p1\r\n");
    let mut transport = FrameTransport::new(link, config(OperatingMode::Program));

    match transport.handshake() {
        Err(TransportError::Connect { expected, received }) => {
            assert_eq!(expected, "0p0\r\n");
            assert_eq!(received, "0p1\r\n");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_handshake_times_out_without_device() {
    let mut transport = transport(&[]);
    assert!(matches!(
        transport.handshake(),
        Err(TransportError::Timeout(_))
    ));
}

#[test]
fn test_handshake_times_out_without_acknowledgement() {
    let mut config = config(OperatingMode::Program);
    config.handshake_timeout = Duration::ZERO;
    let mut transport = FrameTransport::new(MemoryLink::with_input(&[READY_BYTE]), config);
    assert!(matches!(
        transport.handshake(),
        Err(TransportError::Timeout(_))
    ));
    assert_eq!(transport.into_inner().written(), &[vec![b'0']]);
}

/// Sends the ready byte, then noise that never contains a newline
struct NoisyLink {
    ready_sent: bool,
}

impl Link for NoisyLink {
    fn bytes_to_read(&mut self) -> io::Result<usize> {
        Ok(1)
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if self.ready_sent {
            Ok(Some(b'x'))
        } else {
            self.ready_sent = true;
            Ok(Some(READY_BYTE))
        }
    }

    fn write_all(&mut self, _bytes: &[u8]) -> io::Result<()> {
        Ok(())
    }

    fn clear_input(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn set_timeout(&mut self, _timeout: Duration) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_handshake_times_out_on_endless_line() {
    let link = NoisyLink { ready_sent: false };
    let mut transport = FrameTransport::new(link, config(OperatingMode::Program));

    let started = Instant::now();
    assert!(matches!(
        transport.handshake(),
        Err(TransportError::Timeout(_))
    ));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_operating_mode_parsing() {
    assert_eq!("0".parse::<OperatingMode>(), Ok(OperatingMode::Program));
    assert_eq!(
        "Instruction".parse::<OperatingMode>(),
        Ok(OperatingMode::Instruction)
    );
    assert!("2".parse::<OperatingMode>().is_err());
    assert_eq!(OperatingMode::Instruction.wire_byte(), b'1');
}
