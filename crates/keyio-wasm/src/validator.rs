//! Address validator exposed to the browser.

use keyio_core::{check_destination, is_valid_destination_string_for, ChainParams, Network};
use wasm_bindgen::prelude::*;

use crate::report::ValidationReport;

/// Validates addresses for one network.
#[wasm_bindgen]
pub struct AddressValidator {
    /// Prefix table for the selected network.
    params: ChainParams,
}

#[wasm_bindgen]
impl AddressValidator {
    /// Create a validator for a network ("mainnet", "testnet" or "regtest").
    #[wasm_bindgen(constructor)]
    pub fn new(network: &str) -> Result<AddressValidator, JsValue> {
        let net = Network::from_str(network)
            .ok_or_else(|| JsValue::from_str("Invalid network"))?;

        Ok(AddressValidator {
            params: net.params().clone(),
        })
    }

    /// Check an address and return a `ValidationReport` object.
    #[wasm_bindgen]
    pub fn check(&self, input: &str) -> Result<JsValue, JsValue> {
        ValidationReport::from(check_destination(input, &self.params)).to_js()
    }

    /// Whether the address is valid, without diagnostics.
    #[wasm_bindgen]
    pub fn is_valid(&self, input: &str) -> bool {
        is_valid_destination_string_for(input, &self.params)
    }

    /// Get the current network.
    #[wasm_bindgen(getter)]
    pub fn network(&self) -> String {
        self.params.network.name().to_string()
    }
}

/// One-shot check without keeping a validator around.
#[wasm_bindgen]
pub fn check_address(input: &str, network: &str) -> Result<JsValue, JsValue> {
    let validator = AddressValidator::new(network)?;
    let report = ValidationReport::from(check_destination(input, &validator.params));
    if !report.valid {
        console_log(&format!("address rejected: {}", report.message));
    }
    report.to_js()
}

/// Log to the browser console.
#[wasm_bindgen]
pub fn console_log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}
