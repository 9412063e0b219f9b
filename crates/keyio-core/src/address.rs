//! Destination <-> address string conversion.
//!
//! Key-hash and script-hash destinations are written as Base58Check with the
//! network's version byte in front; every segwit destination is written as
//! Bech32 (v0) or Bech32m (v1+) under the network's human-readable part.
//!
//! Decoding tries Bech32 first. Its failures can usually be pinned to a
//! single character, which makes for better feedback while someone is typing
//! than a Base58 checksum failure that implicates the whole string.

use alloc::string::String;
use alloc::vec::Vec;

use crate::base58::{self, Base58Error};
use crate::bech32::{self, Bech32Error, WitnessProgram, SEPARATOR};
use crate::destination::Destination;
use crate::error::{Diagnose, ErrorCategory};
use crate::network::{ChainParams, Network};

/// Length of a legacy address payload after the version byte.
const HASH_LEN: usize = 20;

/// Address decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// Nothing to decode
    #[error("Empty address")]
    Empty,
    /// Segwit path failure
    #[error(transparent)]
    Bech32(#[from] Bech32Error),
    /// Character that fits neither encoding
    #[error("Invalid or unsupported Segwit (Bech32) or Base58 encoding.")]
    InvalidEncoding { position: usize },
    /// Longer than any Base58 address
    #[error("Base58 address too long")]
    Base58TooLong,
    /// Base58 text whose checksum does not verify
    #[error("Invalid checksum or length of Base58 address (P2PKH or P2SH)")]
    Base58Checksum,
    /// Right version byte, wrong payload size
    #[error("Invalid length for Base58 address (P2PKH or P2SH)")]
    InvalidBase58Length(usize),
    /// Version byte not used by any known network
    #[error("Invalid or unsupported Base58-encoded address.")]
    UnknownBase58Version(u8),
    /// Segwit prefix not used by any known network
    #[error("Invalid or unsupported prefix for Segwit (Bech32) address (expected {expected}, got {found}).")]
    UnknownHrp { expected: String, found: String },
    /// Well-formed address of another known network
    #[error("Address network mismatch: expected {expected}, got {found}")]
    NetworkMismatch { expected: Network, found: Network },
}

impl AddressError {
    fn from_base58(err: Base58Error) -> Self {
        match err {
            Base58Error::Empty => AddressError::Empty,
            Base58Error::InvalidCharacter { position, .. } => AddressError::InvalidEncoding { position },
            Base58Error::TooLong => AddressError::Base58TooLong,
            Base58Error::TooShort(_) | Base58Error::InvalidChecksum => AddressError::Base58Checksum,
        }
    }

    /// True when the failing path got past checksum verification, i.e. the
    /// string is well formed and only its content is unacceptable.
    fn passed_checksum(&self) -> bool {
        match self {
            AddressError::Bech32(err) => matches!(
                err,
                Bech32Error::EmptyData
                    | Bech32Error::InvalidWitnessVersion(_)
                    | Bech32Error::VariantMismatch { .. }
                    | Bech32Error::InvalidPadding
                    | Bech32Error::InvalidProgramLength(_)
                    | Bech32Error::InvalidV0ProgramLength(_)
                    | Bech32Error::InvalidV1ProgramLength(_)
            ),
            AddressError::InvalidBase58Length(_)
            | AddressError::UnknownBase58Version(_)
            | AddressError::UnknownHrp { .. }
            | AddressError::NetworkMismatch { .. } => true,
            AddressError::Empty
            | AddressError::InvalidEncoding { .. }
            | AddressError::Base58TooLong
            | AddressError::Base58Checksum => false,
        }
    }
}

impl Diagnose for AddressError {
    fn category(&self) -> ErrorCategory {
        match self {
            AddressError::Bech32(err) => err.category(),
            AddressError::Base58Checksum => ErrorCategory::Checksum,
            AddressError::NetworkMismatch { .. } => ErrorCategory::NetworkMismatch,
            AddressError::Empty
            | AddressError::InvalidEncoding { .. }
            | AddressError::Base58TooLong
            | AddressError::InvalidBase58Length(_)
            | AddressError::UnknownBase58Version(_)
            | AddressError::UnknownHrp { .. } => ErrorCategory::Format,
        }
    }

    fn locations(&self) -> Vec<usize> {
        match self {
            AddressError::Bech32(err) => err.locations(),
            AddressError::InvalidEncoding { position } => alloc::vec![*position],
            AddressError::Base58TooLong => alloc::vec![base58::MAX_INPUT_LENGTH],
            _ => Vec::new(),
        }
    }
}

/// Encode a destination as an address string for the given network.
///
/// [`Destination::None`] encodes to the empty string, as does a segwit
/// destination under parameters whose hrp cannot be encoded.
pub fn encode_destination(destination: &Destination, params: &ChainParams) -> String {
    match destination {
        Destination::None => String::new(),
        Destination::PubKeyHash(hash) => encode_base58_address(params.pubkey_address_prefix, hash),
        Destination::ScriptHash(hash) => encode_base58_address(params.script_address_prefix, hash),
        Destination::WitnessV0KeyHash(_)
        | Destination::WitnessV0ScriptHash(_)
        | Destination::WitnessV1Taproot(_)
        | Destination::WitnessUnknown(_) => destination
            .witness_program()
            .and_then(|(version, program)| {
                bech32::encode_witness_program(params.bech32_hrp, version, program).ok()
            })
            .unwrap_or_default(),
    }
}

/// Decode an address string, returning [`Destination::None`] on any failure.
pub fn decode_destination(input: &str, params: &ChainParams) -> Destination {
    try_decode_destination(input, params).unwrap_or_default()
}

/// Decode an address string, reporting the most specific failure.
///
/// Both encodings are attempted. When both fail, a failure that got past
/// checksum verification wins (it describes a well-formed string). Next, a
/// failure pinned to a character wins over one that implicates the whole
/// string. Between two failures of the same kind, the encoding the string is
/// shaped like decides.
pub fn try_decode_destination(input: &str, params: &ChainParams) -> Result<Destination, AddressError> {
    if input.is_empty() {
        return Err(AddressError::Empty);
    }

    let segwit_err = match decode_segwit(input, params) {
        Ok(destination) => return Ok(destination),
        Err(err) => err,
    };
    let legacy_err = match decode_legacy(input, params) {
        Ok(destination) => return Ok(destination),
        Err(err) => err,
    };

    if segwit_err.passed_checksum() {
        return Err(segwit_err);
    }
    if legacy_err.passed_checksum() {
        return Err(legacy_err);
    }
    match (segwit_err.is_localized(), legacy_err.is_localized()) {
        (true, false) => Err(segwit_err),
        (false, true) => Err(legacy_err),
        _ if looks_like_segwit(input, params) => Err(segwit_err),
        _ => Err(legacy_err),
    }
}

fn encode_base58_address(version: u8, hash: &[u8; HASH_LEN]) -> String {
    let mut payload = Vec::with_capacity(1 + HASH_LEN);
    payload.push(version);
    payload.extend_from_slice(hash);
    base58::encode_check(&payload)
}

fn decode_segwit(input: &str, params: &ChainParams) -> Result<Destination, AddressError> {
    let decoded = bech32::decode(input)?;

    if !params.is_own_hrp(&decoded.hrp) {
        return Err(match ChainParams::identify_hrp(&decoded.hrp) {
            Some(found) if found != params.network => AddressError::NetworkMismatch {
                expected: params.network,
                found,
            },
            _ => AddressError::UnknownHrp {
                expected: params.bech32_hrp.into(),
                found: decoded.hrp,
            },
        });
    }

    let witness = WitnessProgram::from_data(&decoded.data, decoded.variant)?;
    Ok(Destination::from_witness_program(witness)?)
}

fn decode_legacy(input: &str, params: &ChainParams) -> Result<Destination, AddressError> {
    let payload = base58::decode_check(input).map_err(AddressError::from_base58)?;
    let (&version, hash) = payload
        .split_first()
        .ok_or(AddressError::InvalidBase58Length(0))?;

    if hash.len() == HASH_LEN {
        let mut bytes = [0u8; HASH_LEN];
        bytes.copy_from_slice(hash);
        if version == params.pubkey_address_prefix {
            return Ok(Destination::PubKeyHash(bytes));
        }
        if version == params.script_address_prefix {
            return Ok(Destination::ScriptHash(bytes));
        }
    }

    if version == params.pubkey_address_prefix || version == params.script_address_prefix {
        return Err(AddressError::InvalidBase58Length(payload.len()));
    }

    match ChainParams::identify_address_prefix(version) {
        Some(found) if hash.len() == HASH_LEN && found != params.network => {
            Err(AddressError::NetworkMismatch {
                expected: params.network,
                found,
            })
        }
        _ => Err(AddressError::UnknownBase58Version(version)),
    }
}

/// True when the input starts with a known segwit prefix and separator.
fn looks_like_segwit(input: &str, params: &ChainParams) -> bool {
    let has_prefix = |hrp: &str| {
        input.len() > hrp.len()
            && input.is_char_boundary(hrp.len())
            && input[..hrp.len()].eq_ignore_ascii_case(hrp)
            && input[hrp.len()..].starts_with(SEPARATOR)
    };

    has_prefix(params.bech32_hrp)
        || Network::ALL
            .iter()
            .any(|network| has_prefix(network.params().bech32_hrp))
}
