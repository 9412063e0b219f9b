//! Wallet Import Format: Base58Check export of a private key.
//!
//! Layout: `version | 32-byte scalar | [0x01 if compressed]`, checksummed.

use alloc::string::String;
use alloc::vec::Vec;

use crate::base58::{self, Base58Error};
use crate::error::{Diagnose, ErrorCategory};
use crate::network::{ChainParams, Network};

/// Size of a secp256k1 secret scalar.
pub const SECRET_KEY_SIZE: usize = 32;

/// Marker appended to keys whose public key is serialized compressed.
const COMPRESSED_FLAG: u8 = 0x01;

/// secp256k1 group order, big-endian.
const CURVE_ORDER: [u8; SECRET_KEY_SIZE] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b,
    0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// True when `secret` is a usable scalar: non-zero and below the group order.
pub(crate) fn is_valid_secret(secret: &[u8; SECRET_KEY_SIZE]) -> bool {
    secret.iter().any(|&b| b != 0) && *secret < CURVE_ORDER
}

/// Private key decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WifError {
    /// Base58Check layer failure
    #[error(transparent)]
    Base58(#[from] Base58Error),
    /// Payload is neither 33 nor 34 bytes
    #[error("Invalid private key length ({0} bytes)")]
    InvalidLength(usize),
    /// 34-byte payload whose last byte is not the compression marker
    #[error("Invalid compression flag 0x{0:02x}")]
    InvalidCompressionFlag(u8),
    /// Private key of another known network
    #[error("Private key network mismatch: expected {expected}, got {found}")]
    NetworkMismatch { expected: Network, found: Network },
    /// Version byte not used for private keys by any known network
    #[error("Unknown private key version 0x{0:02x}")]
    UnknownVersion(u8),
    /// Zero, or not below the curve order
    #[error("Private key out of range")]
    InvalidSecretKey,
}

impl Diagnose for WifError {
    fn category(&self) -> ErrorCategory {
        match self {
            WifError::Base58(err) => err.category(),
            WifError::NetworkMismatch { .. } => ErrorCategory::NetworkMismatch,
            WifError::UnknownVersion(_) => ErrorCategory::KindMismatch,
            WifError::InvalidLength(_)
            | WifError::InvalidCompressionFlag(_)
            | WifError::InvalidSecretKey => ErrorCategory::Format,
        }
    }

    fn locations(&self) -> Vec<usize> {
        match self {
            WifError::Base58(err) => err.locations(),
            _ => Vec::new(),
        }
    }
}

/// A secret scalar plus the serialization choice for its public key.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    secret: [u8; SECRET_KEY_SIZE],
    compressed: bool,
}

impl PrivateKey {
    /// Wrap a secret scalar, rejecting zero and out-of-range values.
    pub fn new(secret: [u8; SECRET_KEY_SIZE], compressed: bool) -> Result<Self, WifError> {
        if !is_valid_secret(&secret) {
            return Err(WifError::InvalidSecretKey);
        }
        Ok(PrivateKey { secret, compressed })
    }

    /// The 32-byte secret scalar.
    pub fn secret_bytes(&self) -> &[u8; SECRET_KEY_SIZE] {
        &self.secret
    }

    /// Whether the matching public key is serialized in 33-byte form.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Size of the matching serialized public key.
    pub fn public_key_size(&self) -> usize {
        if self.compressed {
            33
        } else {
            65
        }
    }
}

impl core::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("secret", &"<redacted>")
            .field("compressed", &self.compressed)
            .finish()
    }
}

/// Encode a private key in Wallet Import Format.
pub fn encode_secret(key: &PrivateKey, params: &ChainParams) -> String {
    let mut payload = Vec::with_capacity(2 + SECRET_KEY_SIZE);
    payload.push(params.secret_key_prefix);
    payload.extend_from_slice(&key.secret);
    if key.compressed {
        payload.push(COMPRESSED_FLAG);
    }
    base58::encode_check(&payload)
}

/// Decode a Wallet Import Format string.
pub fn decode_secret(input: &str, params: &ChainParams) -> Result<PrivateKey, WifError> {
    let payload = base58::decode_check(input)?;

    let compressed = match payload.len() {
        n if n == 1 + SECRET_KEY_SIZE => false,
        n if n == 2 + SECRET_KEY_SIZE => true,
        n => return Err(WifError::InvalidLength(n)),
    };

    let version = payload[0];
    if version != params.secret_key_prefix {
        return Err(match ChainParams::identify_secret_key_prefix(version) {
            Some(found) if found != params.network => WifError::NetworkMismatch {
                expected: params.network,
                found,
            },
            _ => WifError::UnknownVersion(version),
        });
    }

    if compressed && payload[1 + SECRET_KEY_SIZE] != COMPRESSED_FLAG {
        return Err(WifError::InvalidCompressionFlag(payload[1 + SECRET_KEY_SIZE]));
    }

    let mut secret = [0u8; SECRET_KEY_SIZE];
    secret.copy_from_slice(&payload[1..1 + SECRET_KEY_SIZE]);
    PrivateKey::new(secret, compressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{MAINNET, TESTNET};

    const SECRET_HEX: &str = "0c28fca386c7a227600b2fe50b7cae11ec86d3bf1fbe471be89827e19d72aa1d";

    fn test_key(compressed: bool) -> PrivateKey {
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&hex::decode(SECRET_HEX).unwrap());
        PrivateKey::new(secret, compressed).unwrap()
    }

    #[test]
    fn test_encode_known_vectors() {
        assert_eq!(
            encode_secret(&test_key(false), &MAINNET),
            "5HueCGU8rMjxEXxiPuD5BDku4MkFqeZyd4dZ1jvhTVqvbTLvyTJ"
        );
        assert_eq!(
            encode_secret(&test_key(true), &MAINNET),
            "KwdMAjGmerYanjeui5SHS7JkmpZvVipYvB2LJGU1ZxJwYvP98617"
        );
        assert_eq!(
            encode_secret(&test_key(true), &TESTNET),
            "cMzLdeGd5vEqxB8B6VFQoRopQ3sLAAvEzDAoQgvX54xwofSWj1fx"
        );
    }

    #[test]
    fn test_compression_round_trip() {
        for compressed in [false, true] {
            let key = test_key(compressed);
            let encoded = encode_secret(&key, &MAINNET);
            let decoded = decode_secret(&encoded, &MAINNET).unwrap();
            assert_eq!(decoded.is_compressed(), compressed);
            assert_eq!(decoded, key);
        }

        let short = base58::decode_check(&encode_secret(&test_key(false), &MAINNET)).unwrap();
        let long = base58::decode_check(&encode_secret(&test_key(true), &MAINNET)).unwrap();
        assert_eq!(long.len(), short.len() + 1);
        assert_eq!(test_key(true).public_key_size(), 33);
        assert_eq!(test_key(false).public_key_size(), 65);
    }

    #[test]
    fn test_wrong_network() {
        let err = decode_secret("cMzLdeGd5vEqxB8B6VFQoRopQ3sLAAvEzDAoQgvX54xwofSWj1fx", &MAINNET)
            .unwrap_err();
        assert_eq!(
            err,
            WifError::NetworkMismatch { expected: Network::Mainnet, found: Network::Testnet }
        );
        assert_eq!(err.category(), ErrorCategory::NetworkMismatch);
    }

    #[test]
    fn test_unknown_version() {
        let mut payload = vec![0x42];
        payload.extend_from_slice(&hex::decode(SECRET_HEX).unwrap());
        let err = decode_secret(&base58::encode_check(&payload), &MAINNET).unwrap_err();
        assert_eq!(err, WifError::UnknownVersion(0x42));
        assert_eq!(err.category(), ErrorCategory::KindMismatch);
    }

    #[test]
    fn test_bad_compression_flag() {
        let err = decode_secret("KwdMAjGmerYanjeui5SHS7JkmpZvVipYvB2LJGU1ZxJwYvWxyf5d", &MAINNET)
            .unwrap_err();
        assert_eq!(err, WifError::InvalidCompressionFlag(0x02));
    }

    #[test]
    fn test_bad_lengths() {
        // A P2PKH address is a 21-byte payload
        let err = decode_secret("1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2", &MAINNET).unwrap_err();
        assert_eq!(err, WifError::InvalidLength(21));

        let err = decode_secret("", &MAINNET).unwrap_err();
        assert_eq!(err, WifError::Base58(Base58Error::Empty));
        assert_eq!(err.category(), ErrorCategory::Format);
    }

    #[test]
    fn test_secret_range() {
        assert_eq!(PrivateKey::new([0u8; 32], true), Err(WifError::InvalidSecretKey));
        assert_eq!(PrivateKey::new(CURVE_ORDER, true), Err(WifError::InvalidSecretKey));

        let mut below = CURVE_ORDER;
        below[31] -= 1;
        assert!(PrivateKey::new(below, true).is_ok());
    }

    #[test]
    fn test_debug_hides_secret() {
        let rendered = format!("{:?}", test_key(true));
        assert!(!rendered.contains("0c28"));
        assert!(!rendered.contains("12, 40"));
        assert!(rendered.contains("redacted"));
    }
}
