//! Text codecs for keys and addresses of a Bitcoin-family node.
//!
//! This crate provides pure Rust implementations of:
//! - Base58Check and Bech32/Bech32m encodings
//! - Address encoding and decoding (P2PKH, P2SH, P2WPKH, P2WSH, P2TR, future segwit)
//! - Wallet Import Format private keys
//! - BIP32 extended keys
//! - Diagnostic validation that reports offending character positions
//!
//! Every function is a pure function of its inputs and a [`ChainParams`]
//! reference; nothing here holds state between calls.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod address;
pub mod base58;
pub mod bech32;
pub mod destination;
pub mod error;
pub mod extkey;
pub mod hash;
pub mod network;
pub mod validate;
pub mod wif;

pub use address::{decode_destination, encode_destination, try_decode_destination, AddressError};
pub use destination::{Destination, WitnessUnknown};
pub use error::{Diagnose, ErrorCategory};
pub use extkey::{
    decode_ext_key, decode_ext_pub_key, decode_extended_key, encode_ext_key, encode_ext_pub_key,
    ChildNumber, ExtKeyError, ExtendedKey, ExtendedKeyNode, ExtendedPrivKey, ExtendedPubKey,
    Fingerprint, KeyRole,
};
pub use network::{ChainParams, Network};
pub use validate::{
    check_destination, is_valid_destination_string, is_valid_destination_string_for, Diagnostic,
};
pub use wif::{decode_secret, encode_secret, PrivateKey, WifError};
