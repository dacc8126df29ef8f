//! Property tests: anything the assembler accepts disassembles back to the
//! same mnemonic and operand

use nibbler_dbg::disasm::{disassemble, encode};
use nibbler_dbg::isa::{AddressingMode, Opcode, Phase};
use proptest::prelude::*;

fn any_opcode() -> impl Strategy<Value = Opcode> {
    (0u8..16).prop_map(|n| Opcode::ALL[n as usize])
}

proptest! {
    #[test]
    fn assembled_instructions_disassemble_back(
        opcode in any_opcode(),
        operand in 0u16..0x1000,
        pc in 0u16..0x1000,
    ) {
        let operand = match opcode.mode() {
            AddressingMode::Immediate => operand & 0xF,
            AddressingMode::Direct => operand,
        };
        let encoded = encode(&format!("{} {:#x}", opcode.mnemonic(), operand)).unwrap();
        prop_assert_eq!(encoded.len(), opcode.mode().size_bytes());

        let bytes = encoded.cpu_bytes();
        let program_byte = bytes.get(1).copied().unwrap_or(0);
        let listing = disassemble(pc, bytes[0], program_byte, Phase::Execute, false, false).unwrap();

        let fields: Vec<&str> = listing.split('\t').collect();
        prop_assert_eq!(fields[0], format!("0x{:04X}:", pc));
        prop_assert_eq!(fields[1], opcode.mnemonic());
        let printed = u16::from_str_radix(fields[2].trim_start_matches("0x"), 16).unwrap();
        prop_assert_eq!(printed, operand);
    }

    #[test]
    fn oversized_operands_are_truncated(opcode in any_opcode(), operand in 0i64..1_000_000) {
        let encoded = encode(&format!("{} {}", opcode.mnemonic(), operand)).unwrap();
        let mask = match opcode.mode() {
            AddressingMode::Immediate => 0xF,
            AddressingMode::Direct => 0xFFF,
        };
        let native = encoded.native();
        let field = match opcode.mode() {
            AddressingMode::Immediate => native & 0xF,
            AddressingMode::Direct => native & 0xFFF,
        };
        prop_assert_eq!(field as i64, operand & mask);
        prop_assert_eq!(encoded.opcode_byte() >> 4, opcode.nibble());
    }
}

proptest! {
    #[test]
    fn wide_decimal_operands_keep_their_low_bits(
        opcode in any_opcode(),
        digits in "[1-9][0-9]{19,37}",
    ) {
        let encoded = encode(&format!("{} {}", opcode.mnemonic(), digits)).unwrap();
        let value: u128 = digits.parse().unwrap();
        let (mask, field) = match opcode.mode() {
            AddressingMode::Immediate => (0xF, encoded.native() & 0xF),
            AddressingMode::Direct => (0xFFF, encoded.native() & 0xFFF),
        };
        prop_assert_eq!(field as u128, value & mask);
    }
}
