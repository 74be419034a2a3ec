use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn console_write(message: &str) {
    log(message);
}

// Native builds (unit tests) have no console to write to.
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn console_write(_message: &str) {}

macro_rules! console_log {
    ($($t:tt)*) => {
        $crate::console_write(&format!($($t)*))
    };
}

pub mod catalog;
pub mod engine;

pub use engine::WasmTrailEngine;

pub(crate) fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
