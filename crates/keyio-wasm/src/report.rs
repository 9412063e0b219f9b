//! Serializable validation results handed to JavaScript.

use keyio_core::Diagnostic;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// What an input widget needs to repaint after a keystroke.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether the input decodes to a destination.
    pub valid: bool,
    /// Reason for failure, empty when valid.
    pub message: String,
    /// Failure class ("format", "checksum", "network-mismatch", "kind-mismatch").
    pub category: Option<String>,
    /// Character offsets to highlight.
    pub error_locations: Vec<usize>,
    /// Destination kind when valid ("P2PKH", "P2TR", ...).
    pub kind: Option<String>,
}

impl ValidationReport {
    /// Convert to JS value.
    pub fn to_js(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {:?}", e)))
    }
}

impl From<Diagnostic> for ValidationReport {
    fn from(diagnostic: Diagnostic) -> Self {
        let valid = diagnostic.is_valid();
        ValidationReport {
            valid,
            kind: valid.then(|| diagnostic.destination.kind_name().to_string()),
            category: diagnostic.category.map(|c| c.name().to_string()),
            message: diagnostic.message,
            error_locations: diagnostic.error_locations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyio_core::{check_destination, Network};

    #[test]
    fn test_report_for_valid_address() {
        let diagnostic = check_destination(
            "bc1p0xlxvlhemja6c4dqv22uapctqupfhlxm9h8z3k2e72q4k9hcz7vqzk5jj0",
            Network::Mainnet.params(),
        );
        let report = ValidationReport::from(diagnostic);

        assert!(report.valid);
        assert_eq!(report.kind.as_deref(), Some("P2TR"));
        assert_eq!(report.category, None);
        assert!(report.error_locations.is_empty());
    }

    #[test]
    fn test_report_for_mixed_case() {
        let diagnostic = check_destination(
            "bc1qar0sRrr7xfkvy5l643lydnw9re59gtzzwf5mdq",
            Network::Mainnet.params(),
        );
        let report = ValidationReport::from(diagnostic);

        assert!(!report.valid);
        assert_eq!(report.kind, None);
        assert_eq!(report.category.as_deref(), Some("format"));
        assert_eq!(report.error_locations, vec![8]);
        assert_eq!(report.message, "Invalid character or mixed case");
    }

    #[test]
    fn test_report_for_checksum_failure() {
        let diagnostic = check_destination("ABCDEFGHJKLMNPQRSTUVWXYZ", Network::Mainnet.params());
        let report = ValidationReport::from(diagnostic);

        assert_eq!(report.category.as_deref(), Some("checksum"));
        assert!(report.error_locations.is_empty());
    }
}
