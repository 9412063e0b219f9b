//! Front door for address validation.
//!
//! [`is_valid_destination_string`] answers yes/no for cheap feasibility
//! checks. [`check_destination`] keeps the message and character offsets so
//! an input widget can highlight exactly what is wrong while the user types.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::address::try_decode_destination;
use crate::destination::Destination;
use crate::error::{Diagnose, ErrorCategory};
use crate::network::{ChainParams, Network};

/// Result of a diagnostic address check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The decoded destination, [`Destination::None`] when invalid.
    pub destination: Destination,
    /// Human-readable reason, empty when valid.
    pub message: String,
    /// Failure classification, `None` when valid.
    pub category: Option<ErrorCategory>,
    /// Byte offsets of offending characters; empty when not localizable.
    pub error_locations: Vec<usize>,
}

impl Diagnostic {
    /// A passing check.
    pub fn valid(destination: Destination) -> Self {
        Diagnostic {
            destination,
            message: String::new(),
            category: None,
            error_locations: Vec::new(),
        }
    }

    /// A failing check built from any codec error.
    pub fn from_error<E: Diagnose + core::fmt::Display>(err: &E) -> Self {
        Diagnostic {
            destination: Destination::None,
            message: err.to_string(),
            category: Some(err.category()),
            error_locations: err.locations(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.destination.is_valid()
    }
}

/// Decode with full diagnostics.
pub fn check_destination(input: &str, params: &ChainParams) -> Diagnostic {
    match try_decode_destination(input, params) {
        Ok(destination) => Diagnostic::valid(destination),
        Err(err) => Diagnostic::from_error(&err),
    }
}

/// Whether `input` is a valid address on the default network.
pub fn is_valid_destination_string(input: &str) -> bool {
    is_valid_destination_string_for(input, Network::default().params())
}

/// Whether `input` is a valid address for the given parameters.
pub fn is_valid_destination_string_for(input: &str, params: &ChainParams) -> bool {
    try_decode_destination(input, params).is_ok()
}
