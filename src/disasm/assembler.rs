//! Assembler - single-line Nibbler assembler
//!
//! Accepts `MNEMONIC OPERAND` with the operand in decimal or with a
//! `0x`/`0o`/`0b` prefix. Operands wider than the instruction's field are
//! truncated rather than rejected.

use super::{CodecError, EncodedInstruction};
use crate::isa::{AddressingMode, Opcode};

/// Assemble one instruction
pub fn encode(text: &str) -> Result<EncodedInstruction, CodecError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let [mnemonic, operand] = tokens[..] else {
        return Err(CodecError::Syntax(text.trim().to_string()));
    };

    let opcode = Opcode::from_mnemonic(mnemonic)
        .ok_or_else(|| CodecError::UnknownMnemonic(mnemonic.to_uppercase()))?;
    let operand =
        parse_number(operand).ok_or_else(|| CodecError::InvalidOperand(operand.to_string()))?;

    let encoded = encode_operand(opcode, operand);
    log::trace!(
        "Assembled '{}' -> {:#06x} (two_byte={})",
        text.trim(),
        encoded.value,
        encoded.two_byte
    );
    Ok(encoded)
}

/// Pack an opcode with an already-parsed operand
pub fn encode_operand(opcode: Opcode, operand: i64) -> EncodedInstruction {
    let high = opcode.nibble() << 4;
    match opcode.mode() {
        AddressingMode::Immediate => EncodedInstruction::single(high | (operand & 0xF) as u8),
        AddressingMode::Direct => {
            let address_high = ((operand >> 8) & 0xF) as u8;
            let address_low = (operand & 0xFF) as u8;
            EncodedInstruction::double(high | address_high, address_low)
        }
    }
}

/// Parse an integer literal: decimal, or `0x`/`0o`/`0b` prefixed, with an
/// optional sign. Underscores between digits are allowed. Literals wider
/// than 64 bits wrap, keeping their low bits.
pub fn parse_number(s: &str) -> Option<i64> {
    parse_literal(s).map(|(value, _)| value)
}

/// Like [`parse_number`], but literals that do not fit an `i64` are rejected
pub fn parse_exact(s: &str) -> Option<i64> {
    parse_literal(s).and_then(|(value, wrapped)| (!wrapped).then_some(value))
}

/// Value modulo 2^64 and whether it wrapped
fn parse_literal(s: &str) -> Option<(i64, bool)> {
    let s = s.trim();
    let (negative, body) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let lower = body.to_ascii_lowercase();
    let (radix, digits) = if let Some(hex) = lower.strip_prefix("0x") {
        (16, hex)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        (8, oct)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (2, bin)
    } else {
        // Leading zeros are ambiguous without a prefix
        if lower.len() > 1 && lower.starts_with('0') && !lower.trim_start_matches('0').is_empty() {
            return None;
        }
        (10, lower.as_str())
    };

    let digits = match radix {
        10 => digits,
        _ => digits.strip_prefix('_').unwrap_or(digits),
    };
    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return None;
    }

    // Wraps modulo 2^64, which keeps every bit an operand field can hold
    let mut magnitude: i64 = 0;
    let mut wrapped = false;
    for c in digits.chars().filter(|&c| c != '_') {
        let digit = c.to_digit(radix)? as i64;
        let (scaled, over_mul) = magnitude.overflowing_mul(radix as i64);
        let (sum, over_add) = scaled.overflowing_add(digit);
        wrapped |= over_mul || over_add;
        magnitude = sum;
    }
    Some(if negative {
        (magnitude.wrapping_neg(), wrapped)
    } else {
        (magnitude, wrapped)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_bases() {
        assert_eq!(parse_number("42"), Some(42));
        assert_eq!(parse_number("0x2A"), Some(42));
        assert_eq!(parse_number("0X2a"), Some(42));
        assert_eq!(parse_number("0o52"), Some(42));
        assert_eq!(parse_number("0b101010"), Some(42));
        assert_eq!(parse_number("-1"), Some(-1));
        assert_eq!(parse_number("0"), Some(0));
        assert_eq!(parse_number("000"), Some(0));
        assert_eq!(parse_number("1_000"), Some(1000));
    }

    #[test]
    fn test_parse_number_rejects_garbage() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("0x"), None);
        assert_eq!(parse_number("012"), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("0x+1"), None);
        assert_eq!(parse_number("1__0"), None);
    }

    #[test]
    fn test_negative_operand_wraps() {
        // -1 keeps every bit set, as an unbounded two's complement integer would
        assert_eq!(encode("LIT -1").unwrap().value, 0x4F);
        assert_eq!(encode("JMP -1").unwrap().native(), 0xCFFF);
    }

    #[test]
    fn test_huge_operand_truncates() {
        assert_eq!(encode("LIT 99999999999999999999").unwrap().value, 0x4F);
        assert_eq!(
            encode("LD 0x1FFFFFFFFFFFFFFFFABC").unwrap().native(),
            0x6ABC
        );
        assert_eq!(encode("LIT 0xFFFFFFFF").unwrap().value, 0x4F);
        assert_eq!(encode("ADDI -99999999999999999999").unwrap().value, 0xA1);
    }

    #[test]
    fn test_parse_exact_rejects_wide_literals() {
        assert_eq!(parse_exact("0x7FFF_FFFF_FFFF_FFFF"), Some(i64::MAX));
        assert_eq!(parse_exact("-12"), Some(-12));
        assert_eq!(parse_exact("18446744073709551619"), None);
        assert_eq!(parse_number("18446744073709551619"), Some(3));
    }
}
