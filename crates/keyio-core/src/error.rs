//! Error taxonomy shared by every codec in this crate.
//!
//! Each codec has its own error enum, but all of them can be classified
//! into one of four categories and can report which characters of the input
//! were responsible for the failure.

use alloc::vec::Vec;

/// Broad classification of a decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Wrong length, illegal character, mixed case, bad separator.
    Format,
    /// Base58Check digest or Bech32(m) checksum mismatch.
    Checksum,
    /// A well-formed string that belongs to a different network.
    NetworkMismatch,
    /// A version prefix that does not correspond to the requested role.
    KindMismatch,
}

impl ErrorCategory {
    /// Short machine-friendly name.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorCategory::Format => "format",
            ErrorCategory::Checksum => "checksum",
            ErrorCategory::NetworkMismatch => "network-mismatch",
            ErrorCategory::KindMismatch => "kind-mismatch",
        }
    }
}

impl core::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Common accessors implemented by every codec error.
pub trait Diagnose {
    /// Which part of the taxonomy this failure belongs to.
    fn category(&self) -> ErrorCategory;

    /// Byte offsets into the input of the offending characters.
    ///
    /// Empty when the defect spans the whole string.
    fn locations(&self) -> Vec<usize>;

    /// True when at least one offending character could be pinpointed.
    fn is_localized(&self) -> bool {
        !self.locations().is_empty()
    }
}
