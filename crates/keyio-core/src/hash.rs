//! SHA256 double-hashing and the Base58Check checksum.

use sha2::{Digest, Sha256};

/// Length of the checksum suffix appended by Base58Check.
pub const CHECKSUM_LEN: usize = 4;

/// Bitcoin's double SHA256: SHA256(SHA256(data)).
#[inline]
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut result = [0u8; 32];
    result.copy_from_slice(&second);
    result
}

/// First four bytes of the double SHA256 of `data`.
#[inline]
pub fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let hash = double_sha256(data);
    let mut result = [0u8; CHECKSUM_LEN];
    result.copy_from_slice(&hash[..CHECKSUM_LEN]);
    result
}
