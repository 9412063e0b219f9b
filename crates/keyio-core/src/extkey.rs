//! BIP32 extended key serialization.
//!
//! Every extended key serializes to 78 bytes before the checksum:
//!
//! | bytes  | field                                        |
//! |--------|----------------------------------------------|
//! | 0..4   | version (network and private/public role)    |
//! | 4      | depth, 0 for the master node                 |
//! | 5..9   | parent key fingerprint                       |
//! | 9..13  | child index, big-endian, top bit = hardened  |
//! | 13..45 | chain code                                   |
//! | 45..78 | `0x00 ‖ secret` or a compressed public key   |

use alloc::string::String;
use alloc::vec::Vec;

use crate::base58::{self, Base58Error};
use crate::error::{Diagnose, ErrorCategory};
use crate::network::{ChainParams, Network};
use crate::wif::{is_valid_secret, SECRET_KEY_SIZE};

/// Serialized size of an extended key, checksum excluded.
pub const EXTENDED_KEY_SIZE: usize = 78;

/// Size of a compressed public key.
pub const PUBLIC_KEY_SIZE: usize = 33;

const KEY_OFFSET: usize = 45;

/// Whether an extended key carries private or public material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRole {
    Private,
    Public,
}

impl KeyRole {
    /// Lowercase role name.
    pub fn name(&self) -> &'static str {
        match self {
            KeyRole::Private => "private",
            KeyRole::Public => "public",
        }
    }
}

impl core::fmt::Display for KeyRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Extended key decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtKeyError {
    /// Base58Check layer failure
    #[error(transparent)]
    Base58(#[from] Base58Error),
    /// Payload is not 78 bytes
    #[error("Invalid extended key length ({0} bytes)")]
    InvalidLength(usize),
    /// Version bytes not used for extended keys by any known network
    #[error("Unknown extended key version {}", hex::encode(.0))]
    UnknownVersion([u8; 4]),
    /// Version bytes of the other role on this network
    #[error("Expected an extended {expected} key, got an extended {found} key")]
    WrongRole { expected: KeyRole, found: KeyRole },
    /// Extended key of another known network
    #[error("Extended key network mismatch: expected {expected}, got {found}")]
    NetworkMismatch { expected: Network, found: Network },
    /// Private key material not introduced by a zero byte
    #[error("Invalid private key prefix 0x{0:02x}")]
    InvalidPrivateKeyPrefix(u8),
    /// Public key material that is not a compressed point
    #[error("Invalid public key prefix 0x{0:02x}")]
    InvalidPublicKeyPrefix(u8),
    /// Zero, or not below the curve order
    #[error("Private key out of range")]
    InvalidSecretKey,
    /// Depth 0 with a parent fingerprint or child index set
    #[error("Master key with non-zero parent fingerprint or child index")]
    InvalidMasterNode,
}

impl Diagnose for ExtKeyError {
    fn category(&self) -> ErrorCategory {
        match self {
            ExtKeyError::Base58(err) => err.category(),
            ExtKeyError::UnknownVersion(_) | ExtKeyError::WrongRole { .. } => {
                ErrorCategory::KindMismatch
            }
            ExtKeyError::NetworkMismatch { .. } => ErrorCategory::NetworkMismatch,
            ExtKeyError::InvalidLength(_)
            | ExtKeyError::InvalidPrivateKeyPrefix(_)
            | ExtKeyError::InvalidPublicKeyPrefix(_)
            | ExtKeyError::InvalidSecretKey
            | ExtKeyError::InvalidMasterNode => ErrorCategory::Format,
        }
    }

    fn locations(&self) -> Vec<usize> {
        match self {
            ExtKeyError::Base58(err) => err.locations(),
            _ => Vec::new(),
        }
    }
}

/// Child index with the hardened-derivation flag in its top bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ChildNumber(u32);

impl ChildNumber {
    /// Bit that marks hardened derivation.
    pub const HARDENED_BIT: u32 = 0x8000_0000;

    /// Non-hardened child `index`; `None` if the index uses the top bit.
    pub fn normal(index: u32) -> Option<Self> {
        (index & Self::HARDENED_BIT == 0).then_some(ChildNumber(index))
    }

    /// Hardened child `index`; `None` if the index uses the top bit.
    pub fn hardened(index: u32) -> Option<Self> {
        (index & Self::HARDENED_BIT == 0).then_some(ChildNumber(index | Self::HARDENED_BIT))
    }

    pub fn is_hardened(&self) -> bool {
        self.0 & Self::HARDENED_BIT != 0
    }

    /// Index without the hardened flag.
    pub fn index(&self) -> u32 {
        self.0 & !Self::HARDENED_BIT
    }

    /// Raw 32-bit value as serialized.
    pub fn to_u32(&self) -> u32 {
        self.0
    }
}

impl From<u32> for ChildNumber {
    fn from(raw: u32) -> Self {
        ChildNumber(raw)
    }
}

impl core::fmt::Display for ChildNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_hardened() {
            write!(f, "{}h", self.index())
        } else {
            write!(f, "{}", self.index())
        }
    }
}

/// First four bytes of the HASH160 of a parent public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Fingerprint(pub [u8; 4]);

impl Fingerprint {
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 4]
    }
}

impl core::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Position of a key in the derivation tree, shared by both roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ExtendedKeyNode {
    /// 0 for the master key.
    pub depth: u8,
    pub parent_fingerprint: Fingerprint,
    pub child_number: ChildNumber,
    pub chain_code: [u8; 32],
}

impl ExtendedKeyNode {
    /// A master node: depth 0, no parent, child 0.
    pub fn master(chain_code: [u8; 32]) -> Self {
        ExtendedKeyNode {
            chain_code,
            ..Default::default()
        }
    }

    /// Depth-0 nodes must not claim a parent or a child index.
    fn check(&self) -> Result<(), ExtKeyError> {
        if self.depth == 0 && (!self.parent_fingerprint.is_zero() || self.child_number.to_u32() != 0) {
            return Err(ExtKeyError::InvalidMasterNode);
        }
        Ok(())
    }

    fn write(&self, version: [u8; 4], key: &[u8; PUBLIC_KEY_SIZE]) -> [u8; EXTENDED_KEY_SIZE] {
        let mut data = [0u8; EXTENDED_KEY_SIZE];
        data[0..4].copy_from_slice(&version);
        data[4] = self.depth;
        data[5..9].copy_from_slice(&self.parent_fingerprint.0);
        data[9..13].copy_from_slice(&self.child_number.to_u32().to_be_bytes());
        data[13..45].copy_from_slice(&self.chain_code);
        data[KEY_OFFSET..].copy_from_slice(key);
        data
    }

    fn read(data: &[u8; EXTENDED_KEY_SIZE]) -> Result<Self, ExtKeyError> {
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&data[5..9]);

        let mut child_number = [0u8; 4];
        child_number.copy_from_slice(&data[9..13]);

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&data[13..45]);

        let node = ExtendedKeyNode {
            depth: data[4],
            parent_fingerprint: Fingerprint(parent_fingerprint),
            child_number: ChildNumber(u32::from_be_bytes(child_number)),
            chain_code,
        };
        node.check()?;
        Ok(node)
    }
}

/// Extended private key.
#[derive(Clone, PartialEq, Eq)]
pub struct ExtendedPrivKey {
    pub node: ExtendedKeyNode,
    secret_key: [u8; SECRET_KEY_SIZE],
}

impl ExtendedPrivKey {
    /// Build from a node and a secret scalar, validating both.
    pub fn new(node: ExtendedKeyNode, secret_key: [u8; SECRET_KEY_SIZE]) -> Result<Self, ExtKeyError> {
        node.check()?;
        if !is_valid_secret(&secret_key) {
            return Err(ExtKeyError::InvalidSecretKey);
        }
        Ok(ExtendedPrivKey { node, secret_key })
    }

    pub fn secret_bytes(&self) -> &[u8; SECRET_KEY_SIZE] {
        &self.secret_key
    }

    /// Serialize to the 78-byte layout with this network's private version.
    pub fn serialize(&self, params: &ChainParams) -> [u8; EXTENDED_KEY_SIZE] {
        let mut key = [0u8; PUBLIC_KEY_SIZE];
        key[1..].copy_from_slice(&self.secret_key);
        self.node.write(params.ext_secret_key_prefix, &key)
    }

    fn from_payload(data: &[u8; EXTENDED_KEY_SIZE]) -> Result<Self, ExtKeyError> {
        let node = ExtendedKeyNode::read(data)?;
        if data[KEY_OFFSET] != 0x00 {
            return Err(ExtKeyError::InvalidPrivateKeyPrefix(data[KEY_OFFSET]));
        }
        let mut secret_key = [0u8; SECRET_KEY_SIZE];
        secret_key.copy_from_slice(&data[KEY_OFFSET + 1..]);
        ExtendedPrivKey::new(node, secret_key)
    }
}

impl core::fmt::Debug for ExtendedPrivKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ExtendedPrivKey")
            .field("node", &self.node)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Extended public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedPubKey {
    pub node: ExtendedKeyNode,
    public_key: [u8; PUBLIC_KEY_SIZE],
}

impl ExtendedPubKey {
    /// Build from a node and a compressed public key (`0x02`/`0x03` prefix).
    pub fn new(node: ExtendedKeyNode, public_key: [u8; PUBLIC_KEY_SIZE]) -> Result<Self, ExtKeyError> {
        node.check()?;
        if public_key[0] != 0x02 && public_key[0] != 0x03 {
            return Err(ExtKeyError::InvalidPublicKeyPrefix(public_key[0]));
        }
        Ok(ExtendedPubKey { node, public_key })
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.public_key
    }

    /// Serialize to the 78-byte layout with this network's public version.
    pub fn serialize(&self, params: &ChainParams) -> [u8; EXTENDED_KEY_SIZE] {
        self.node.write(params.ext_public_key_prefix, &self.public_key)
    }

    fn from_payload(data: &[u8; EXTENDED_KEY_SIZE]) -> Result<Self, ExtKeyError> {
        let node = ExtendedKeyNode::read(data)?;
        let mut public_key = [0u8; PUBLIC_KEY_SIZE];
        public_key.copy_from_slice(&data[KEY_OFFSET..]);
        ExtendedPubKey::new(node, public_key)
    }
}

/// Either role, as found by [`decode_extended_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtendedKey {
    Private(ExtendedPrivKey),
    Public(ExtendedPubKey),
}

impl ExtendedKey {
    pub fn role(&self) -> KeyRole {
        match self {
            ExtendedKey::Private(_) => KeyRole::Private,
            ExtendedKey::Public(_) => KeyRole::Public,
        }
    }

    pub fn node(&self) -> &ExtendedKeyNode {
        match self {
            ExtendedKey::Private(key) => &key.node,
            ExtendedKey::Public(key) => &key.node,
        }
    }

    pub fn encode(&self, params: &ChainParams) -> String {
        match self {
            ExtendedKey::Private(key) => encode_ext_key(key, params),
            ExtendedKey::Public(key) => encode_ext_pub_key(key, params),
        }
    }
}

/// Encode an extended private key.
pub fn encode_ext_key(key: &ExtendedPrivKey, params: &ChainParams) -> String {
    base58::encode_check(&key.serialize(params))
}

/// Encode an extended public key.
pub fn encode_ext_pub_key(key: &ExtendedPubKey, params: &ChainParams) -> String {
    base58::encode_check(&key.serialize(params))
}

/// Decode an extended private key for this network.
pub fn decode_ext_key(input: &str, params: &ChainParams) -> Result<ExtendedPrivKey, ExtKeyError> {
    match decode_extended_key(input, params)? {
        ExtendedKey::Private(key) => Ok(key),
        ExtendedKey::Public(_) => Err(ExtKeyError::WrongRole {
            expected: KeyRole::Private,
            found: KeyRole::Public,
        }),
    }
}

/// Decode an extended public key for this network.
pub fn decode_ext_pub_key(input: &str, params: &ChainParams) -> Result<ExtendedPubKey, ExtKeyError> {
    match decode_extended_key(input, params)? {
        ExtendedKey::Public(key) => Ok(key),
        ExtendedKey::Private(_) => Err(ExtKeyError::WrongRole {
            expected: KeyRole::Public,
            found: KeyRole::Private,
        }),
    }
}

/// Decode an extended key of either role, picking the role from its version.
pub fn decode_extended_key(input: &str, params: &ChainParams) -> Result<ExtendedKey, ExtKeyError> {
    let payload = base58::decode_check(input)?;
    let data: [u8; EXTENDED_KEY_SIZE] = payload
        .as_slice()
        .try_into()
        .map_err(|_| ExtKeyError::InvalidLength(payload.len()))?;

    let mut version = [0u8; 4];
    version.copy_from_slice(&data[..4]);

    if version == params.ext_secret_key_prefix {
        return ExtendedPrivKey::from_payload(&data).map(ExtendedKey::Private);
    }
    if version == params.ext_public_key_prefix {
        return ExtendedPubKey::from_payload(&data).map(ExtendedKey::Public);
    }

    Err(match ChainParams::identify_ext_key_prefix(&version) {
        Some(found) if found != params.network => ExtKeyError::NetworkMismatch {
            expected: params.network,
            found,
        },
        _ => ExtKeyError::UnknownVersion(version),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{MAINNET, TESTNET};

    // BIP32 test vector 1
    const MASTER_XPRV: &str = "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi";
    const MASTER_XPUB: &str = "xpub661MyMwAqRbcFtXgS5sYJABqqG9YLmC4Q1Rdap9gSE8NqtwybGhePY2gZ29ESFjqJoCu1Rupje8YtGqsefD265TMg7usUDFdp6W1EGMcet8";
    const CHILD_0H_XPRV: &str = "xprv9uHRZZhk6KAJC1avXpDAp4MDc3sQKNxDiPvvkX8Br5ngLNv1TxvUxt4cV1rGL5hj6KCesnDYUhd7oWgT11eZG7XnxHrnYeSvkzY7d2bhkJ7";

    fn bytes<const N: usize>(hex_str: &str) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&hex::decode(hex_str).unwrap());
        out
    }

    #[test]
    fn test_decode_master_private() {
        let key = decode_ext_key(MASTER_XPRV, &MAINNET).unwrap();
        assert_eq!(key.node.depth, 0);
        assert!(key.node.parent_fingerprint.is_zero());
        assert_eq!(key.node.child_number.to_u32(), 0);
        assert_eq!(
            hex::encode(key.node.chain_code),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );
        assert_eq!(
            hex::encode(key.secret_bytes()),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(encode_ext_key(&key, &MAINNET), MASTER_XPRV);
    }

    #[test]
    fn test_decode_master_public() {
        let key = decode_ext_pub_key(MASTER_XPUB, &MAINNET).unwrap();
        assert_eq!(
            hex::encode(key.public_key()),
            "0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2"
        );
        assert_eq!(encode_ext_pub_key(&key, &MAINNET), MASTER_XPUB);
    }

    #[test]
    fn test_hardened_child_fields() {
        let key = decode_ext_key(CHILD_0H_XPRV, &MAINNET).unwrap();
        assert_eq!(key.node.depth, 1);
        assert_eq!(key.node.parent_fingerprint.to_string(), "3442193e");
        assert!(key.node.child_number.is_hardened());
        assert_eq!(key.node.child_number.index(), 0);
        assert_eq!(key.node.child_number.to_string(), "0h");
        assert_eq!(encode_ext_key(&key, &MAINNET), CHILD_0H_XPRV);
    }

    #[test]
    fn test_field_fidelity_round_trip() {
        let node = ExtendedKeyNode {
            depth: 255,
            parent_fingerprint: Fingerprint([0xde, 0xad, 0xbe, 0xef]),
            child_number: ChildNumber::hardened(0x7fff_ffff).unwrap(),
            chain_code: [0x5a; 32],
        };
        let private = ExtendedPrivKey::new(node, [0x11; 32]).unwrap();
        let public = ExtendedPubKey::new(node, bytes::<33>(
            "0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2",
        ))
        .unwrap();

        for params in [&MAINNET, &TESTNET] {
            let decoded = decode_ext_key(&encode_ext_key(&private, params), params).unwrap();
            assert_eq!(decoded, private);
            assert_eq!(decoded.node.child_number.to_u32(), 0xffff_ffff);

            let decoded = decode_ext_pub_key(&encode_ext_pub_key(&public, params), params).unwrap();
            assert_eq!(decoded, public);
        }
    }

    #[test]
    fn test_role_detection() {
        let any = decode_extended_key(MASTER_XPUB, &MAINNET).unwrap();
        assert_eq!(any.role(), KeyRole::Public);
        assert_eq!(any.encode(&MAINNET), MASTER_XPUB);

        let err = decode_ext_key(MASTER_XPUB, &MAINNET).unwrap_err();
        assert_eq!(err, ExtKeyError::WrongRole { expected: KeyRole::Private, found: KeyRole::Public });
        assert_eq!(err.category(), ErrorCategory::KindMismatch);
    }

    #[test]
    fn test_network_mismatch() {
        let key = decode_ext_key(MASTER_XPRV, &MAINNET).unwrap();
        let testnet = encode_ext_key(&key, &TESTNET);
        assert!(testnet.starts_with("tprv"));

        let err = decode_ext_key(&testnet, &MAINNET).unwrap_err();
        assert_eq!(
            err,
            ExtKeyError::NetworkMismatch { expected: Network::Mainnet, found: Network::Testnet }
        );
    }

    #[test]
    fn test_unknown_version_and_length() {
        let mut data = decode_ext_key(MASTER_XPRV, &MAINNET).unwrap().serialize(&MAINNET);
        data[..4].copy_from_slice(&[0x04, 0xb2, 0x47, 0x46]);
        let err = decode_extended_key(&base58::encode_check(&data), &MAINNET).unwrap_err();
        assert_eq!(err, ExtKeyError::UnknownVersion([0x04, 0xb2, 0x47, 0x46]));
        assert_eq!(err.to_string(), "Unknown extended key version 04b24746");

        let err = decode_extended_key("1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2", &MAINNET).unwrap_err();
        assert_eq!(err, ExtKeyError::InvalidLength(21));
    }

    #[test]
    fn test_key_material_prefixes() {
        let mut data = decode_ext_key(MASTER_XPRV, &MAINNET).unwrap().serialize(&MAINNET);
        data[KEY_OFFSET] = 0x01;
        let err = decode_ext_key(&base58::encode_check(&data), &MAINNET).unwrap_err();
        assert_eq!(err, ExtKeyError::InvalidPrivateKeyPrefix(0x01));

        let mut data = decode_ext_pub_key(MASTER_XPUB, &MAINNET).unwrap().serialize(&MAINNET);
        data[KEY_OFFSET] = 0x04;
        let err = decode_ext_pub_key(&base58::encode_check(&data), &MAINNET).unwrap_err();
        assert_eq!(err, ExtKeyError::InvalidPublicKeyPrefix(0x04));
    }

    #[test]
    fn test_master_node_consistency() {
        let mut data = decode_ext_key(MASTER_XPRV, &MAINNET).unwrap().serialize(&MAINNET);
        data[5] = 0x01;
        let err = decode_ext_key(&base58::encode_check(&data), &MAINNET).unwrap_err();
        assert_eq!(err, ExtKeyError::InvalidMasterNode);

        let node = ExtendedKeyNode {
            child_number: ChildNumber::normal(1).unwrap(),
            ..ExtendedKeyNode::master([0u8; 32])
        };
        assert_eq!(ExtendedPrivKey::new(node, [1u8; 32]), Err(ExtKeyError::InvalidMasterNode));
    }

    #[test]
    fn test_child_number_constructors() {
        assert_eq!(ChildNumber::normal(0x8000_0000), None);
        assert_eq!(ChildNumber::hardened(0x8000_0000), None);
        assert_eq!(ChildNumber::hardened(44).unwrap().to_u32(), 0x8000_002c);
        assert_eq!(ChildNumber::from(7).to_string(), "7");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(decode_extended_key("", &MAINNET), Err(ExtKeyError::Base58(Base58Error::Empty)));
    }
}
