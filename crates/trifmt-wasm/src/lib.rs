//! WASM bindings for trifmt-core.
//!
//! Exposes `convert` and `convertWithOptions` as `#[wasm_bindgen]` functions
//! callable from JavaScript/TypeScript. Options cross the boundary as a JSON
//! string, e.g. `{"encode": {"indent": 2, "yaml_flow_style": true}}`; missing
//! fields take their defaults.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p trifmt-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/trifmt-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/trifmt_wasm.wasm
//! ```

use trifmt_core::ConvertOptions;
use wasm_bindgen::prelude::*;

/// Convert `input` from one format tag (`xml`, `json`, `yaml`, `yml`) to
/// another with default options.
///
/// Throws a JS error carrying the conversion error's message on failure.
#[wasm_bindgen]
pub fn convert(input: &str, from: &str, to: &str) -> Result<String, JsValue> {
    convert_text(input, from, to, &ConvertOptions::default()).map_err(|e| JsValue::from_str(&e))
}

/// Like [`convert`], with options given as a JSON object string.
#[wasm_bindgen(js_name = "convertWithOptions")]
pub fn convert_with_options(
    input: &str,
    from: &str,
    to: &str,
    options_json: &str,
) -> Result<String, JsValue> {
    parse_options(options_json)
        .and_then(|options| convert_text(input, from, to, &options))
        .map_err(|e| JsValue::from_str(&e))
}

fn parse_options(options_json: &str) -> Result<ConvertOptions, String> {
    if options_json.trim().is_empty() {
        return Ok(ConvertOptions::default());
    }
    serde_json::from_str(options_json).map_err(|e| format!("Invalid options JSON: {}", e))
}

fn convert_text(input: &str, from: &str, to: &str, options: &ConvertOptions) -> Result<String, String> {
    trifmt_core::convert_str(input, from, to, options).map_err(|e| e.to_string())
}
