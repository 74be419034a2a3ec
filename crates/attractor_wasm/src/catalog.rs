//! Catalog lookups for the UI: field menu and per-field slider setup.

use crate::js_error;
use attractor_core::catalog;
use serde_wasm_bindgen::to_value;
use wasm_bindgen::prelude::*;

/// Field identifiers in menu order.
#[wasm_bindgen(js_name = listFields)]
pub fn list_fields() -> Vec<String> {
    catalog::list().map(str::to_string).collect()
}

/// `{ id, params, ranges, time_step, display_scale, camera }` for one field.
#[wasm_bindgen(js_name = fieldDescriptor)]
pub fn field_descriptor(id: &str) -> Result<JsValue, JsValue> {
    let field = catalog::get(id).map_err(js_error)?;
    to_value(&field).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}
