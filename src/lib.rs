pub mod api;
pub mod config;
pub mod controls;
pub mod cps;
pub mod error;
pub mod preset;
pub mod session;
pub mod template;
pub mod token;

pub use controls::{ControlOverrides, ControlSet, default_controls, merge_controls};
pub use cps::validate_cps;
pub use error::{PresetError, PresetResult, ValidationError};
pub use template::{preprocess_song, substitute};

use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// Read a JS control object. Mistyped fields are dropped one by one, and
/// anything that isn't an object (null and undefined included) means no
/// overrides.
fn overrides_from_js(controls: JsValue) -> ControlOverrides {
    if controls.is_null() || controls.is_undefined() {
        return ControlOverrides::default();
    }
    match serde_wasm_bindgen::from_value::<serde_json::Value>(controls) {
        Ok(value) => ControlOverrides::from_value_lenient(&value),
        Err(e) => {
            log::warn!("ignoring controls: {e}");
            ControlOverrides::default()
        }
    }
}

/// WASM-exposed: merge `controls` (a partial object, or null/undefined) with
/// the defaults and substitute into `raw`. Never throws.
#[wasm_bindgen(js_name = preprocessSong)]
pub fn preprocess_song_js(raw: &str, controls: JsValue) -> String {
    preprocess_song(raw, &overrides_from_js(controls))
}

/// WASM-exposed: check a tempo expression is `int/int/int`.
#[wasm_bindgen(js_name = validateCps)]
pub fn validate_cps_js(value: &str) -> bool {
    validate_cps(value)
}

/// WASM-exposed: the default control set as a plain object.
#[wasm_bindgen(js_name = defaultControls)]
pub fn default_controls_js() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(default_controls()).map_err(|e| JsValue::from_str(&format!("{e}")))
}

/// WASM-exposed: resolve a partial control object to the full snapshot JSON
/// stored with a preset.
#[wasm_bindgen(js_name = controlsSnapshotJson)]
pub fn controls_snapshot_json_js(controls: JsValue) -> String {
    overrides_from_js(controls).merge().to_json()
}
