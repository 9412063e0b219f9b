//! Bech32 (BIP173) and Bech32m (BIP350) encoding, plus the segwit
//! witness-program layer on top of them.
//!
//! A Bech32 string is `<hrp>1<data><checksum>` where the data part uses a
//! 32-character alphabet. Witness version 0 programs are checksummed with the
//! original Bech32 constant; versions 1 through 16 use the Bech32m constant.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{Diagnose, ErrorCategory};

/// The 32-character data alphabet, indexed by 5-bit value.
pub const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Separator between the human-readable part and the data part.
pub const SEPARATOR: char = '1';

/// Shortest possible string: 1-char hrp, separator, 6-char checksum.
pub const MIN_LENGTH: usize = 8;

/// Longest string accepted.
pub const MAX_LENGTH: usize = 90;

/// Number of checksum characters at the end of the data part.
pub const CHECKSUM_LENGTH: usize = 6;

/// Bounds on witness program length in bytes.
pub const MIN_PROGRAM_LENGTH: usize = 2;
pub const MAX_PROGRAM_LENGTH: usize = 40;

/// Highest defined witness version.
pub const MAX_WITNESS_VERSION: u8 = 16;

const BECH32_CONST: u32 = 1;
const BECH32M_CONST: u32 = 0x2bc830a3;

const INVALID: u8 = 0xff;

/// ASCII byte -> 5-bit value, `INVALID` for bytes outside the charset.
/// Only lowercase is mapped; inputs are folded before lookup.
const VALUES: [u8; 128] = {
    let mut table = [INVALID; 128];
    let mut i = 0;
    while i < CHARSET.len() {
        table[CHARSET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Checksum variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// BIP173, used by witness version 0.
    Bech32,
    /// BIP350, used by witness versions 1 and above.
    Bech32m,
}

impl Variant {
    /// The variant a witness program of the given version must be encoded with.
    pub fn for_witness_version(version: u8) -> Self {
        if version == 0 {
            Variant::Bech32
        } else {
            Variant::Bech32m
        }
    }

    fn constant(&self) -> u32 {
        match self {
            Variant::Bech32 => BECH32_CONST,
            Variant::Bech32m => BECH32M_CONST,
        }
    }

    /// Display name for this variant.
    pub fn name(&self) -> &'static str {
        match self {
            Variant::Bech32 => "Bech32",
            Variant::Bech32m => "Bech32m",
        }
    }
}

/// Bech32 decoding and witness-program errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Bech32Error {
    /// Fewer characters than the smallest valid string
    #[error("Bech32 string too short")]
    TooShort(usize),
    /// More characters than `MAX_LENGTH`
    #[error("Bech32 string too long")]
    TooLong(usize),
    /// Character outside the printable range or the data charset
    #[error("Invalid character at position {position}")]
    InvalidCharacter { position: usize },
    /// Upper and lower case letters in one string
    #[error("Invalid character or mixed case")]
    MixedCase { position: usize },
    /// No separator anywhere in the string
    #[error("Missing separator")]
    MissingSeparator,
    /// Empty hrp, or not enough room after the separator for a checksum
    #[error("Invalid separator position")]
    InvalidSeparatorPosition(usize),
    /// Checksum matches neither variant
    #[error("Invalid Bech32 checksum")]
    InvalidChecksum,
    /// Valid checksum but nothing to carry a witness version
    #[error("Empty Bech32 data section")]
    EmptyData,
    /// First data group above 16
    #[error("Invalid Bech32 address witness version")]
    InvalidWitnessVersion(u8),
    /// Witness version and checksum variant disagree
    #[error("Version {} witness address must use {} checksum", version_label(.version), variant_name(.expected))]
    VariantMismatch { version: u8, expected: Variant },
    /// Leftover bits when regrouping 5-bit data into bytes
    #[error("Invalid padding in Bech32 data section")]
    InvalidPadding,
    /// Program shorter than 2 or longer than 40 bytes
    #[error("Invalid Bech32 address program size ({0} {unit})", unit = byte_unit(.0))]
    InvalidProgramLength(usize),
    /// Version 0 program that is neither 20 nor 32 bytes
    #[error("Invalid Bech32 v0 address program size ({0} {unit}), per BIP141", unit = byte_unit(.0))]
    InvalidV0ProgramLength(usize),
    /// Taproot program that is not 32 bytes
    #[error("Invalid Bech32 v1 address program size ({0} {unit})", unit = byte_unit(.0))]
    InvalidV1ProgramLength(usize),
}

fn byte_unit(len: &usize) -> &'static str {
    if *len == 1 {
        "byte"
    } else {
        "bytes"
    }
}

fn variant_name(variant: &Variant) -> &'static str {
    variant.name()
}

fn version_label(version: &u8) -> &'static str {
    if *version == 0 {
        "0"
    } else {
        "1+"
    }
}

impl Diagnose for Bech32Error {
    fn category(&self) -> ErrorCategory {
        match self {
            Bech32Error::InvalidChecksum | Bech32Error::VariantMismatch { .. } => {
                ErrorCategory::Checksum
            }
            _ => ErrorCategory::Format,
        }
    }

    fn locations(&self) -> Vec<usize> {
        match self {
            Bech32Error::TooLong(_) => alloc::vec![MAX_LENGTH],
            Bech32Error::InvalidCharacter { position }
            | Bech32Error::MixedCase { position }
            | Bech32Error::InvalidSeparatorPosition(position) => alloc::vec![*position],
            _ => Vec::new(),
        }
    }
}

/// A successfully decoded Bech32 string, checksum removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Lowercase human-readable part.
    pub hrp: String,
    /// 5-bit data groups.
    pub data: Vec<u8>,
    /// Which checksum constant validated.
    pub variant: Variant,
}

/// A segwit output program: version plus its byte payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitnessProgram {
    version: u8,
    program: Vec<u8>,
}

impl WitnessProgram {
    /// Validate and build a witness program.
    pub fn new(version: u8, program: Vec<u8>) -> Result<Self, Bech32Error> {
        if version > MAX_WITNESS_VERSION {
            return Err(Bech32Error::InvalidWitnessVersion(version));
        }
        if version == 0 && program.len() != 20 && program.len() != 32 {
            return Err(Bech32Error::InvalidV0ProgramLength(program.len()));
        }
        if !(MIN_PROGRAM_LENGTH..=MAX_PROGRAM_LENGTH).contains(&program.len()) {
            return Err(Bech32Error::InvalidProgramLength(program.len()));
        }
        Ok(WitnessProgram { version, program })
    }

    /// Rebuild a witness program from the 5-bit data of a decoded string.
    ///
    /// The first group is the witness version; the rest regroup into bytes.
    pub fn from_data(data: &[u8], variant: Variant) -> Result<Self, Bech32Error> {
        let (&version, rest) = data.split_first().ok_or(Bech32Error::EmptyData)?;
        if version > MAX_WITNESS_VERSION {
            return Err(Bech32Error::InvalidWitnessVersion(version));
        }

        let expected = Variant::for_witness_version(version);
        if variant != expected {
            return Err(Bech32Error::VariantMismatch { version, expected });
        }

        let program = convert_bits(rest, 5, 8, false)?;
        WitnessProgram::new(version, program)
    }

    /// Witness version (0-16).
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Program bytes.
    pub fn program(&self) -> &[u8] {
        &self.program
    }

    /// Take the program bytes.
    pub fn into_program(self) -> Vec<u8> {
        self.program
    }

    /// Encode under the given human-readable part, picking the checksum
    /// variant from the witness version.
    pub fn encode(&self, hrp: &str) -> Result<String, Bech32Error> {
        let mut data = Vec::with_capacity(1 + (self.program.len() * 8 + 4) / 5);
        data.push(self.version);
        data.extend(convert_bits(&self.program, 8, 5, true)?);
        encode(hrp, &data, Variant::for_witness_version(self.version))
    }
}

/// Encode 5-bit data groups under `hrp` with the given checksum variant.
///
/// The hrp is lowercased; data values must be below 32.
pub fn encode(hrp: &str, data: &[u8], variant: Variant) -> Result<String, Bech32Error> {
    let hrp = hrp.to_ascii_lowercase();
    if hrp.is_empty() {
        return Err(Bech32Error::InvalidSeparatorPosition(0));
    }
    if let Some(position) = hrp.bytes().position(|b| !(33..=126).contains(&b)) {
        return Err(Bech32Error::InvalidCharacter { position });
    }
    if let Some(offset) = data.iter().position(|&v| v >= 32) {
        return Err(Bech32Error::InvalidCharacter { position: hrp.len() + 1 + offset });
    }

    let length = hrp.len() + 1 + data.len() + CHECKSUM_LENGTH;
    if length > MAX_LENGTH {
        return Err(Bech32Error::TooLong(length));
    }

    let checksum = create_checksum(&hrp, data, variant);

    let mut result = String::with_capacity(length);
    result.push_str(&hrp);
    result.push(SEPARATOR);
    result.extend(data.iter().chain(checksum.iter()).map(|&v| CHARSET[v as usize] as char));
    Ok(result)
}

/// Decode a Bech32 or Bech32m string, detecting the variant from the checksum.
pub fn decode(input: &str) -> Result<Decoded, Bech32Error> {
    let bytes = input.as_bytes();

    if bytes.len() < MIN_LENGTH {
        return Err(Bech32Error::TooShort(bytes.len()));
    }
    if bytes.len() > MAX_LENGTH {
        return Err(Bech32Error::TooLong(bytes.len()));
    }

    if let Some(position) = bytes.iter().position(|b| !(33..=126).contains(b)) {
        return Err(Bech32Error::InvalidCharacter { position });
    }
    if let Some(position) = find_mixed_case(bytes) {
        return Err(Bech32Error::MixedCase { position });
    }

    let lower = input.to_ascii_lowercase();
    let separator = lower.rfind(SEPARATOR).ok_or(Bech32Error::MissingSeparator)?;
    if separator == 0 || separator + 1 + CHECKSUM_LENGTH > lower.len() {
        return Err(Bech32Error::InvalidSeparatorPosition(separator));
    }

    let hrp = &lower[..separator];
    let mut data = Vec::with_capacity(lower.len() - separator - 1);
    for (offset, byte) in lower.bytes().enumerate().skip(separator + 1) {
        match VALUES[byte as usize] {
            INVALID => return Err(Bech32Error::InvalidCharacter { position: offset }),
            value => data.push(value),
        }
    }

    let variant = match polymod(&hrp_expand(hrp), &data) {
        BECH32_CONST => Variant::Bech32,
        BECH32M_CONST => Variant::Bech32m,
        _ => return Err(Bech32Error::InvalidChecksum),
    };

    data.truncate(data.len() - CHECKSUM_LENGTH);
    Ok(Decoded {
        hrp: hrp.into(),
        data,
        variant,
    })
}

/// Encode a witness program as a segwit address string.
pub fn encode_witness_program(hrp: &str, version: u8, program: &[u8]) -> Result<String, Bech32Error> {
    WitnessProgram::new(version, program.to_vec())?.encode(hrp)
}

/// Decode a segwit address string into its hrp and witness program.
pub fn decode_witness_program(input: &str) -> Result<(String, WitnessProgram), Bech32Error> {
    let decoded = decode(input)?;
    let program = WitnessProgram::from_data(&decoded.data, decoded.variant)?;
    Ok((decoded.hrp, program))
}

/// Position of the first letter whose case differs from the majority case.
///
/// Ties go to the case of the first letter in the string.
fn find_mixed_case(bytes: &[u8]) -> Option<usize> {
    let upper = bytes.iter().filter(|b| b.is_ascii_uppercase()).count();
    let lower = bytes.iter().filter(|b| b.is_ascii_lowercase()).count();
    if upper == 0 || lower == 0 {
        return None;
    }

    let first_is_upper = bytes
        .iter()
        .find(|b| b.is_ascii_alphabetic())
        .map_or(false, |b| b.is_ascii_uppercase());
    let majority_upper = upper > lower || (upper == lower && first_is_upper);

    bytes.iter().position(|b| {
        if majority_upper {
            b.is_ascii_lowercase()
        } else {
            b.is_ascii_uppercase()
        }
    })
}

fn create_checksum(hrp: &str, data: &[u8], variant: Variant) -> [u8; CHECKSUM_LENGTH] {
    let mut values = Vec::with_capacity(data.len() + CHECKSUM_LENGTH);
    values.extend_from_slice(data);
    values.extend_from_slice(&[0u8; CHECKSUM_LENGTH]);

    let modulus = polymod(&hrp_expand(hrp), &values) ^ variant.constant();
    let mut checksum = [0u8; CHECKSUM_LENGTH];
    for (i, value) in checksum.iter_mut().enumerate() {
        *value = ((modulus >> (5 * (5 - i))) & 31) as u8;
    }
    checksum
}

fn hrp_expand(hrp: &str) -> Vec<u8> {
    let mut result = Vec::with_capacity(hrp.len() * 2 + 1);

    for c in hrp.bytes() {
        result.push(c >> 5);
    }
    result.push(0);
    for c in hrp.bytes() {
        result.push(c & 31);
    }

    result
}

fn polymod(hrp: &[u8], data: &[u8]) -> u32 {
    const GEN: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];

    let mut chk: u32 = 1;

    for &value in hrp.iter().chain(data.iter()) {
        let top = chk >> 25;
        chk = ((chk & 0x1ffffff) << 5) ^ (value as u32);
        for (i, &g) in GEN.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= g;
            }
        }
    }

    chk
}

/// Regroup a bit stream from `from_bits`-wide values to `to_bits`-wide ones.
fn convert_bits(data: &[u8], from_bits: u32, to_bits: u32, pad: bool) -> Result<Vec<u8>, Bech32Error> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut result = Vec::with_capacity(data.len() * from_bits as usize / to_bits as usize + 1);
    let max_value = (1u32 << to_bits) - 1;
    let max_acc = (1u32 << (from_bits + to_bits - 1)) - 1;

    for &value in data {
        if (value as u32) >> from_bits != 0 {
            return Err(Bech32Error::InvalidPadding);
        }
        acc = ((acc << from_bits) | value as u32) & max_acc;
        bits += from_bits;

        while bits >= to_bits {
            bits -= to_bits;
            result.push(((acc >> bits) & max_value) as u8);
        }
    }

    if pad {
        if bits > 0 {
            result.push(((acc << (to_bits - bits)) & max_value) as u8);
        }
    } else if bits >= from_bits || ((acc << (to_bits - bits)) & max_value) != 0 {
        return Err(Bech32Error::InvalidPadding);
    }

    Ok(result)
}
