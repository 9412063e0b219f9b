//! WebAssembly bindings for interactive address validation.
//!
//! This crate provides JavaScript-accessible APIs for:
//! - Checking an address as the user types, with error positions to highlight
//! - Cheap yes/no validity checks
//!
//! All decoding happens in `keyio-core`; this crate only converts results.

use wasm_bindgen::prelude::*;

pub mod report;
pub mod validator;

// Re-export main types for JS access
pub use report::ValidationReport;
pub use validator::AddressValidator;

/// Initialize the WASM module with better panic messages.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
