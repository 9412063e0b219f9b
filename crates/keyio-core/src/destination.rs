//! Spend destinations: who can spend an output, independent of how that is
//! written down.
//!
//! Supports:
//! - P2PKH (Pay to Public Key Hash) - 20-byte key hash, Base58Check
//! - P2SH (Pay to Script Hash) - 20-byte script hash, Base58Check
//! - P2WPKH (Pay to Witness Public Key Hash) - segwit v0, 20-byte program
//! - P2WSH (Pay to Witness Script Hash) - segwit v0, 32-byte program
//! - P2TR (Pay to Taproot) - segwit v1, 32-byte x-only output key
//! - Future segwit versions 2 through 16

use alloc::vec::Vec;

use crate::bech32::{Bech32Error, WitnessProgram, MAX_PROGRAM_LENGTH, MIN_PROGRAM_LENGTH};

/// A segwit output of a version with no dedicated variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WitnessUnknown {
    version: u8,
    program: Vec<u8>,
}

impl WitnessUnknown {
    /// Lowest version that is not v0 or Taproot.
    pub const MIN_VERSION: u8 = 2;
    /// Highest defined witness version.
    pub const MAX_VERSION: u8 = 16;

    /// Build an unknown-version witness output.
    ///
    /// Versions 0 and 1 have dedicated variants and are refused here.
    pub fn new(version: u8, program: Vec<u8>) -> Result<Self, Bech32Error> {
        if !(Self::MIN_VERSION..=Self::MAX_VERSION).contains(&version) {
            return Err(Bech32Error::InvalidWitnessVersion(version));
        }
        if !(MIN_PROGRAM_LENGTH..=MAX_PROGRAM_LENGTH).contains(&program.len()) {
            return Err(Bech32Error::InvalidProgramLength(program.len()));
        }
        Ok(WitnessUnknown { version, program })
    }

    /// Witness version (2-16).
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Program bytes (2-40 of them).
    pub fn program(&self) -> &[u8] {
        &self.program
    }
}

/// Where an output can be spent from.
///
/// Every encode and decode site matches on this exhaustively, so adding a
/// variant forces each of them to be revisited.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Destination {
    /// No valid destination.
    #[default]
    None,
    /// Legacy P2PKH: OP_DUP OP_HASH160 <20-byte-hash> OP_EQUALVERIFY OP_CHECKSIG
    PubKeyHash([u8; 20]),
    /// P2SH: OP_HASH160 <20-byte-hash> OP_EQUAL
    ScriptHash([u8; 20]),
    /// Native SegWit v0 P2WPKH: OP_0 <20-byte-hash>
    WitnessV0KeyHash([u8; 20]),
    /// Native SegWit v0 P2WSH: OP_0 <32-byte-hash>
    WitnessV0ScriptHash([u8; 32]),
    /// Taproot P2TR: OP_1 <32-byte-x-only-pubkey>
    WitnessV1Taproot([u8; 32]),
    /// OP_n <program> for a version without its own variant.
    WitnessUnknown(WitnessUnknown),
}

impl Destination {
    /// False only for [`Destination::None`].
    pub fn is_valid(&self) -> bool {
        !matches!(self, Destination::None)
    }

    /// Get the display name for this destination kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Destination::None => "none",
            Destination::PubKeyHash(_) => "P2PKH",
            Destination::ScriptHash(_) => "P2SH",
            Destination::WitnessV0KeyHash(_) => "P2WPKH",
            Destination::WitnessV0ScriptHash(_) => "P2WSH",
            Destination::WitnessV1Taproot(_) => "P2TR",
            Destination::WitnessUnknown(_) => "witness_unknown",
        }
    }

    /// Witness version and program for segwit destinations.
    pub fn witness_program(&self) -> Option<(u8, &[u8])> {
        match self {
            Destination::WitnessV0KeyHash(hash) => Some((0, &hash[..])),
            Destination::WitnessV0ScriptHash(hash) => Some((0, &hash[..])),
            Destination::WitnessV1Taproot(key) => Some((1, &key[..])),
            Destination::WitnessUnknown(w) => Some((w.version(), w.program())),
            Destination::None | Destination::PubKeyHash(_) | Destination::ScriptHash(_) => None,
        }
    }

    /// Map a decoded witness program to its concrete variant.
    pub fn from_witness_program(witness: WitnessProgram) -> Result<Self, Bech32Error> {
        let version = witness.version();
        let len = witness.program().len();

        match (version, len) {
            (0, 20) => {
                let mut hash = [0u8; 20];
                hash.copy_from_slice(witness.program());
                Ok(Destination::WitnessV0KeyHash(hash))
            }
            (0, 32) => {
                let mut hash = [0u8; 32];
                hash.copy_from_slice(witness.program());
                Ok(Destination::WitnessV0ScriptHash(hash))
            }
            (0, len) => Err(Bech32Error::InvalidV0ProgramLength(len)),
            (1, 32) => {
                let mut key = [0u8; 32];
                key.copy_from_slice(witness.program());
                Ok(Destination::WitnessV1Taproot(key))
            }
            (1, len) => Err(Bech32Error::InvalidV1ProgramLength(len)),
            (version, _) => {
                WitnessUnknown::new(version, witness.into_program()).map(Destination::WitnessUnknown)
            }
        }
    }

    /// The scriptPubKey locking an output to this destination.
    ///
    /// Empty for [`Destination::None`].
    pub fn script_pubkey(&self) -> Vec<u8> {
        match self {
            Destination::None => Vec::new(),
            Destination::PubKeyHash(hash) => {
                let mut script = Vec::with_capacity(25);
                script.push(0x76); // OP_DUP
                script.push(0xa9); // OP_HASH160
                script.push(0x14); // Push 20 bytes
                script.extend_from_slice(hash);
                script.push(0x88); // OP_EQUALVERIFY
                script.push(0xac); // OP_CHECKSIG
                script
            }
            Destination::ScriptHash(hash) => {
                let mut script = Vec::with_capacity(23);
                script.push(0xa9); // OP_HASH160
                script.push(0x14); // Push 20 bytes
                script.extend_from_slice(hash);
                script.push(0x87); // OP_EQUAL
                script
            }
            Destination::WitnessV0KeyHash(_)
            | Destination::WitnessV0ScriptHash(_)
            | Destination::WitnessV1Taproot(_)
            | Destination::WitnessUnknown(_) => {
                let (version, program) = match self.witness_program() {
                    Some(witness) => witness,
                    None => return Vec::new(),
                };
                // OP_0 = 0x00, OP_1..OP_16 = 0x51..0x60
                let version_opcode = if version == 0 { 0x00 } else { 0x50 + version };
                let mut script = Vec::with_capacity(2 + program.len());
                script.push(version_opcode);
                script.push(program.len() as u8);
                script.extend_from_slice(program);
                script
            }
        }
    }
}
