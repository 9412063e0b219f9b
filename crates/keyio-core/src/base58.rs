//! Base58 and Base58Check encoding.
//!
//! The alphabet omits `0`, `O`, `I` and `l` so that hand-copied strings are
//! harder to get wrong. Each leading zero byte of the payload becomes one
//! leading `1` in the text, which makes the encoding length preserving for
//! zero prefixes rather than a pure base conversion.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{Diagnose, ErrorCategory};
use crate::hash::{checksum, CHECKSUM_LEN};

/// The Bitcoin Base58 alphabet.
pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Longest accepted input. Covers an extended key (82 bytes, 111 characters)
/// and keeps the quadratic digit loop bounded.
pub const MAX_INPUT_LENGTH: usize = 128;

const INVALID: u8 = 0xff;

/// ASCII byte -> digit value, `INVALID` for bytes outside the alphabet.
const DIGITS: [u8; 128] = {
    let mut table = [INVALID; 128];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Base58 decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Base58Error {
    /// Nothing to decode
    #[error("Empty Base58 string")]
    Empty,
    /// Character outside the Base58 alphabet
    #[error("Invalid Base58 character '{character}' at position {position}")]
    InvalidCharacter { character: char, position: usize },
    /// More characters than any Base58Check payload needs
    #[error("Base58 string too long")]
    TooLong,
    /// Decoded data cannot even hold the checksum
    #[error("Base58 data too short for a checksum ({0} bytes)")]
    TooShort(usize),
    /// Checksum does not match the payload
    #[error("Invalid Base58 checksum")]
    InvalidChecksum,
}

impl Diagnose for Base58Error {
    fn category(&self) -> ErrorCategory {
        match self {
            Base58Error::InvalidChecksum => ErrorCategory::Checksum,
            _ => ErrorCategory::Format,
        }
    }

    fn locations(&self) -> Vec<usize> {
        match self {
            Base58Error::InvalidCharacter { position, .. } => alloc::vec![*position],
            Base58Error::TooLong => alloc::vec![MAX_INPUT_LENGTH],
            _ => Vec::new(),
        }
    }
}

/// Encode bytes as Base58 (no checksum).
pub fn encode(input: &[u8]) -> String {
    let zeros = input.iter().take_while(|&&b| b == 0).count();

    // Base58 digits of the big-endian value, least significant first.
    // log(256) / log(58) ~= 1.37
    let mut digits: Vec<u8> = Vec::with_capacity((input.len() - zeros) * 138 / 100 + 1);
    for &byte in &input[zeros..] {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            carry += (*digit as u32) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let mut result = String::with_capacity(zeros + digits.len());
    result.extend(core::iter::repeat('1').take(zeros));
    result.extend(digits.iter().rev().map(|&d| ALPHABET[d as usize] as char));
    result
}

/// Encode bytes as Base58Check: the payload followed by its 4-byte checksum.
pub fn encode_check(payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    data.extend_from_slice(payload);
    data.extend_from_slice(&checksum(payload));
    encode(&data)
}

/// Decode a Base58 string (no checksum).
pub fn decode(input: &str) -> Result<Vec<u8>, Base58Error> {
    if input.is_empty() {
        return Err(Base58Error::Empty);
    }

    let zeros = input.bytes().take_while(|&b| b == b'1').count();
    if zeros > MAX_INPUT_LENGTH {
        return Err(Base58Error::TooLong);
    }

    // Big-endian value bytes, least significant first while accumulating.
    // log(58) / log(256) ~= 0.733
    let mut bytes: Vec<u8> = Vec::with_capacity(input.len() * 733 / 1000 + 1);
    for (position, character) in input.char_indices().skip(zeros) {
        if position >= MAX_INPUT_LENGTH {
            return Err(Base58Error::TooLong);
        }
        let value = digit_value(character)
            .ok_or(Base58Error::InvalidCharacter { character, position })?;

        let mut carry = value as u32;
        for byte in bytes.iter_mut() {
            carry += (*byte as u32) * 58;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    let mut result = alloc::vec![0u8; zeros];
    result.extend(bytes.iter().rev());
    Ok(result)
}

/// Decode a Base58Check string, verify and strip the checksum.
pub fn decode_check(input: &str) -> Result<Vec<u8>, Base58Error> {
    let mut data = decode(input)?;
    if data.len() < CHECKSUM_LEN {
        return Err(Base58Error::TooShort(data.len()));
    }

    let split = data.len() - CHECKSUM_LEN;
    if checksum(&data[..split]) != data[split..] {
        return Err(Base58Error::InvalidChecksum);
    }

    data.truncate(split);
    Ok(data)
}

fn digit_value(c: char) -> Option<u8> {
    if !c.is_ascii() {
        return None;
    }
    match DIGITS[c as usize] {
        INVALID => None,
        value => Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_values() {
        assert_eq!(encode(b""), "");
        assert_eq!(encode(b"hello"), "Cn8eVZg");
        assert_eq!(encode(&[0x00]), "1");
        assert_eq!(encode(&[0x00, 0x00, 0x01]), "112");
    }

    #[test]
    fn test_encode_check_all_zero_payload() {
        assert_eq!(encode_check(&[0u8; 21]), "1111111111111111111114oLvT2");
    }

    #[test]
    fn test_decode_preserves_leading_zeros() {
        assert_eq!(decode("112").unwrap(), vec![0x00, 0x00, 0x01]);
        assert_eq!(decode("111").unwrap(), vec![0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_decode_check_known_address() {
        let payload = decode_check("1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2").unwrap();
        assert_eq!(hex::encode(payload), "0077bff20c60e522dfaa3350c39b030a5d004e839a");
    }

    #[test]
    fn test_invalid_character_location() {
        // '0' is not part of the alphabet
        let err = decode("1BvBM0EY").unwrap_err();
        assert_eq!(err, Base58Error::InvalidCharacter { character: '0', position: 5 });
        assert_eq!(err.locations(), vec![5]);
        assert_eq!(err.category(), ErrorCategory::Format);

        let err = decode("abcl").unwrap_err();
        assert_eq!(err.locations(), vec![3]);
    }

    #[test]
    fn test_non_ascii_reports_byte_offset() {
        let err = decode("ab€c").unwrap_err();
        assert_eq!(err, Base58Error::InvalidCharacter { character: '€', position: 2 });
    }

    #[test]
    fn test_overlong_input_is_rejected() {
        let long = "z".repeat(MAX_INPUT_LENGTH + 1);
        let err = decode(&long).unwrap_err();
        assert_eq!(err, Base58Error::TooLong);
        assert_eq!(err.locations(), vec![MAX_INPUT_LENGTH]);
        assert_eq!(err.category(), ErrorCategory::Format);

        let zeros = "1".repeat(10_000);
        assert_eq!(decode(&zeros), Err(Base58Error::TooLong));

        // Bad characters inside the limit are still reported first
        let mut bad = "z".repeat(200);
        bad.replace_range(3..4, "0");
        assert_eq!(decode(&bad).unwrap_err().locations(), vec![3]);

        assert_eq!(decode(&"z".repeat(MAX_INPUT_LENGTH)).unwrap().len(), 94);
    }

    #[test]
    fn test_checksum_failure_is_not_localized() {
        let err = decode_check("1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN3").unwrap_err();
        assert_eq!(err, Base58Error::InvalidChecksum);
        assert_eq!(err.category(), ErrorCategory::Checksum);
        assert!(!err.is_localized());
    }

    #[test]
    fn test_single_substitution_breaks_checksum() {
        let valid = "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2";
        for (i, c) in valid.char_indices() {
            let next = ALPHABET[(digit_value(c).unwrap() as usize + 1) % 58] as char;
            let mut tampered = String::from(&valid[..i]);
            tampered.push(next);
            tampered.push_str(&valid[i + 1..]);
            assert!(decode_check(&tampered).is_err(), "substitution at {} went unnoticed", i);
        }
    }

    #[test]
    fn test_empty_and_short_inputs() {
        assert_eq!(decode(""), Err(Base58Error::Empty));
        assert_eq!(decode_check(""), Err(Base58Error::Empty));
        assert_eq!(decode_check("1"), Err(Base58Error::TooShort(1)));
    }

    #[test]
    fn test_check_round_trip() {
        let payload = hex::decode("6f0102030405060708090a0b0c0d0e0f1011121314").unwrap();
        let encoded = encode_check(&payload);
        assert_eq!(encoded, "mfcHP2WMCVLsVZA8yrovmhMgxNFW9r98xw");
        assert_eq!(decode_check(&encoded).unwrap(), payload);
    }
}
