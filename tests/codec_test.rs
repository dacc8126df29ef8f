//! Integration tests for the instruction codec
//!
//! Exercise the public assembler and disassembler the way the session uses
//! them: assemble text, feed the bytes the CPU would fetch back through the
//! disassembler.

use nibbler_dbg::disasm::{disassemble, encode, CodecError};
use nibbler_dbg::isa::{Opcode, Phase, INSTRUCTION_TABLE};

/// Disassemble what the CPU would see after fetching `text`
fn round_trip(text: &str) -> String {
    let encoded = encode(text).unwrap();
    let bytes = encoded.cpu_bytes();
    let program_byte = bytes.get(1).copied().unwrap_or(0);
    disassemble(0x0042, bytes[0], program_byte, Phase::Execute, false, false).unwrap()
}

#[test]
fn test_known_encodings() {
    let ld = encode("LD 0xABC").unwrap();
    assert_eq!(ld.value, 0xBC6A);
    assert!(ld.two_byte);
    assert_eq!(ld.cpu_bytes(), vec![0x6A, 0xBC]);

    let lit = encode("LIT 5").unwrap();
    assert_eq!(lit.value, 0x45);
    assert!(!lit.two_byte);

    let jmp = encode("jmp 0x123").unwrap();
    assert_eq!(jmp.native(), 0xC123);
}

#[test]
fn test_table_matches_opcodes() {
    assert_eq!(INSTRUCTION_TABLE.len(), 16);
    for (nibble, info) in INSTRUCTION_TABLE.iter().enumerate() {
        assert_eq!(info.opcode.nibble() as usize, nibble);
        assert_eq!(Opcode::from_mnemonic(info.mnemonic), Some(info.opcode));
    }
}

#[test]
fn test_listing_round_trip() {
    assert_eq!(round_trip("LD 0xABC"), "0x0042:\tLD\t0x0ABC\t");
    assert_eq!(round_trip("addi 7"), "0x0042:\tADDI\t0x7\t");
    assert_eq!(round_trip("JC 0x10"), "0x0042:\tJC\t0x0010\t[C: No]");
    assert_eq!(round_trip("JNZ 3"), "0x0042:\tJNZ\t0x0003\t[Z: No]");
}

#[test]
fn test_fetch_phase_yields_nothing() {
    let listing = disassemble(0x0042, 0x6A, 0xBC, Phase::Fetch, true, true).unwrap();
    assert!(listing.is_empty());
}

#[test]
fn test_zero_indicator_follows_carry() {
    let carry_only = disassemble(0, 0x80, 0x00, Phase::Execute, true, false).unwrap();
    assert!(carry_only.ends_with("[Z: Yes]"));
    let zero_only = disassemble(0, 0x80, 0x00, Phase::Execute, false, true).unwrap();
    assert!(zero_only.ends_with("[Z: No]"));
}

#[test]
fn test_rejected_input() {
    assert_eq!(
        encode("FOO 1"),
        Err(CodecError::UnknownMnemonic("FOO".to_string()))
    );
    assert!(matches!(encode("LD"), Err(CodecError::Syntax(_))));
    assert!(matches!(encode("LD 1 2"), Err(CodecError::Syntax(_))));
    assert!(matches!(encode(""), Err(CodecError::Syntax(_))));
    assert_eq!(
        encode("LIT zz"),
        Err(CodecError::InvalidOperand("zz".to_string()))
    );
}
