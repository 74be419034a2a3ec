//! JS-facing wrapper around the trail engine.
//!
//! The renderer calls `advance` once per frame and then copies `positions`,
//! `colors` and `sizes` into its point-cloud attributes.

use crate::js_error;
use attractor_core::catalog;
use attractor_core::{EngineConfig, EngineError, FieldParams, Rgb, TrailEngine};
use js_sys::Float32Array;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmTrailEngine {
    engine: TrailEngine,
    speed: f64,
}

#[wasm_bindgen]
impl WasmTrailEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(
        field_id: &str,
        particle_count: usize,
        trail_length: usize,
        color_start: &str,
        color_end: &str,
    ) -> Result<WasmTrailEngine, JsValue> {
        console_error_panic_hook::set_once();

        let config = EngineConfig {
            field: field_id.to_string(),
            particle_count,
            trail_length,
            color_start: color_start.to_string(),
            color_end: color_end.to_string(),
            ..EngineConfig::default()
        };
        Self::from_engine_config(&config).map_err(js_error)
    }

    /// Builds an engine from a partial `EngineConfig` object; missing keys
    /// take their defaults.
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(config: JsValue) -> Result<WasmTrailEngine, JsValue> {
        console_error_panic_hook::set_once();

        let config: EngineConfig = if config.is_undefined() || config.is_null() {
            EngineConfig::default()
        } else {
            from_value(config).map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };
        Self::from_engine_config(&config).map_err(js_error)
    }

    pub fn advance(&mut self, speed: f64) -> Result<(), JsValue> {
        self.engine.advance(speed).map_err(js_error)
    }

    /// Advances by the stored speed multiplier.
    pub fn tick(&mut self) -> Result<(), JsValue> {
        self.engine.advance(self.speed).map_err(js_error)
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    pub fn set_field(&mut self, field_id: &str) -> Result<(), JsValue> {
        let field = catalog::get(field_id).map_err(js_error)?;
        self.engine.set_active_field(&field).map_err(js_error)?;
        console_log!("Switched to {}", field.id);
        Ok(())
    }

    pub fn field_id(&self) -> Result<String, JsValue> {
        let field = self.engine.field().map_err(js_error)?;
        Ok(field.id.to_string())
    }

    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), JsValue> {
        self.engine.set_parameter(name, value).map_err(|err| {
            console_log!("Rejected parameter {} = {}: {}", name, value, err);
            js_error(err)
        })
    }

    /// Replaces all parameters from a `{ field, ...knobs }` object.
    pub fn set_parameters(&mut self, params: JsValue) -> Result<(), JsValue> {
        let params: FieldParams = from_value(params)
            .map_err(|e| JsValue::from_str(&format!("Invalid parameters: {}", e)))?;
        self.engine.set_parameters(params).map_err(|err| {
            console_log!("Rejected parameters: {}", err);
            js_error(err)
        })
    }

    pub fn parameters(&self) -> Result<JsValue, JsValue> {
        let params = self.engine.parameters().map_err(js_error)?;
        to_value(&params).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn set_colors(&mut self, color_start: &str, color_end: &str) -> Result<(), JsValue> {
        let start = Rgb::from_hex_str(color_start).map_err(js_error)?;
        let end = Rgb::from_hex_str(color_end).map_err(js_error)?;
        self.engine.set_colors(start, end).map_err(js_error)
    }

    pub fn set_point_size(&mut self, size: f32) -> Result<(), JsValue> {
        self.engine.set_point_size(size).map_err(js_error)
    }

    pub fn resize(&mut self, particle_count: usize, trail_length: usize) -> Result<(), JsValue> {
        self.engine
            .resize(particle_count, trail_length)
            .map_err(js_error)?;
        console_log!(
            "Resized to {} particles x {} trail points",
            particle_count,
            trail_length
        );
        Ok(())
    }

    pub fn reseed(&mut self) -> Result<(), JsValue> {
        self.engine.reseed().map_err(js_error)
    }

    pub fn point_count(&self) -> Result<usize, JsValue> {
        self.engine.particle_point_count().map_err(js_error)
    }

    pub fn positions(&self) -> Result<Float32Array, JsValue> {
        let buffer = self.engine.buffer().map_err(js_error)?;
        Ok(Float32Array::from(buffer.positions()))
    }

    pub fn colors(&self) -> Result<Float32Array, JsValue> {
        let buffer = self.engine.buffer().map_err(js_error)?;
        Ok(Float32Array::from(buffer.colors()))
    }

    pub fn sizes(&self) -> Result<Float32Array, JsValue> {
        let buffer = self.engine.buffer().map_err(js_error)?;
        Ok(Float32Array::from(buffer.sizes()))
    }

    pub fn dispose(&mut self) -> Result<(), JsValue> {
        self.engine.dispose().map_err(js_error)?;
        console_log!("Trail engine disposed");
        Ok(())
    }
}

impl WasmTrailEngine {
    pub(crate) fn from_engine_config(
        config: &EngineConfig,
    ) -> Result<WasmTrailEngine, EngineError> {
        let field = config.field()?;
        let trails = config.trail_settings()?;
        let engine = match config.seed {
            Some(seed) => TrailEngine::seeded(&field, trails, seed)?,
            None => TrailEngine::new(&field, trails)?,
        };

        console_log!(
            "Trail engine ready: {} with {} particles x {} trail points",
            field.id,
            trails.particle_count,
            trails.trail_length
        );
        Ok(WasmTrailEngine {
            engine,
            speed: config.speed,
        })
    }
}
