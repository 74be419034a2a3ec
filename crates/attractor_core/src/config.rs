use crate::catalog::{self, FieldDescriptor};
use crate::color::Rgb;
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Population size and appearance of the trails.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSettings {
    pub particle_count: usize,
    pub trail_length: usize,
    /// Color of the newest trail point.
    pub color_start: Rgb,
    /// Color of the oldest trail point.
    pub color_end: Rgb,
    /// Size of the newest trail point; the oldest is drawn at 30% of it.
    pub point_size: f32,
}

impl TrailSettings {
    pub fn new(
        particle_count: usize,
        trail_length: usize,
        color_start: Rgb,
        color_end: Rgb,
    ) -> Self {
        Self {
            particle_count,
            trail_length,
            color_start,
            color_end,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_sizes(self.particle_count, self.trail_length)?;
        validate_point_size(self.point_size)
    }

    pub fn point_count(&self) -> usize {
        self.particle_count * self.trail_length
    }
}

impl Default for TrailSettings {
    fn default() -> Self {
        Self {
            particle_count: 2000,
            trail_length: 50,
            color_start: Rgb::from_hex(0xff3300),
            color_end: Rgb::from_hex(0x0033ff),
            point_size: 0.15,
        }
    }
}

pub(crate) fn validate_sizes(particle_count: usize, trail_length: usize) -> Result<()> {
    if particle_count == 0 {
        return Err(EngineError::InvalidConfiguration(
            "particle count must be positive".to_string(),
        ));
    }
    if trail_length == 0 {
        return Err(EngineError::InvalidConfiguration(
            "trail length must be at least 1".to_string(),
        ));
    }
    // The ring stores three f64 per point; the render buffer is smaller.
    let ring_bytes = particle_count
        .checked_mul(trail_length)
        .and_then(|points| points.checked_mul(std::mem::size_of::<[f64; 3]>()));
    if !matches!(ring_bytes, Some(bytes) if bytes <= isize::MAX as usize) {
        return Err(EngineError::InvalidConfiguration(format!(
            "{particle_count} particles x {trail_length} trail points overflows"
        )));
    }
    Ok(())
}

pub(crate) fn validate_point_size(size: f32) -> Result<()> {
    if !size.is_finite() || size <= 0.0 {
        return Err(EngineError::InvalidConfiguration(format!(
            "point size must be positive and finite, got {size}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_field(field: &FieldDescriptor) -> Result<()> {
    if field.params.attractor().id() != field.id {
        return Err(EngineError::InvalidConfiguration(format!(
            "descriptor `{}` carries parameters for `{}`",
            field.id,
            field.params.attractor()
        )));
    }
    if !(field.time_step.is_finite() && field.time_step > 0.0) {
        return Err(EngineError::InvalidConfiguration(format!(
            "time step of `{}` must be positive and finite",
            field.id
        )));
    }
    if !(field.display_scale.is_finite() && field.display_scale > 0.0) {
        return Err(EngineError::InvalidConfiguration(format!(
            "display scale of `{}` must be positive and finite",
            field.id
        )));
    }
    Ok(())
}

/// Driver-facing configuration, as sent from the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub field: String,
    pub particle_count: usize,
    pub trail_length: usize,
    pub color_start: String,
    pub color_end: String,
    pub point_size: f32,
    /// Multiplier on the field's time step used by the frame loop.
    pub speed: f64,
    /// Fixed RNG seed; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let trails = TrailSettings::default();
        Self {
            field: "lorenz".to_string(),
            particle_count: trails.particle_count,
            trail_length: trails.trail_length,
            color_start: trails.color_start.to_hex_string(),
            color_end: trails.color_end.to_hex_string(),
            point_size: trails.point_size,
            speed: 1.0,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn field(&self) -> Result<FieldDescriptor> {
        catalog::get(&self.field)
    }

    pub fn trail_settings(&self) -> Result<TrailSettings> {
        let settings = TrailSettings {
            particle_count: self.particle_count,
            trail_length: self.trail_length,
            color_start: Rgb::from_hex_str(&self.color_start)?,
            color_end: Rgb::from_hex_str(&self.color_end)?,
            point_size: self.point_size,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Checks everything the engine would reject, without building anything.
    pub fn validate(&self) -> Result<()> {
        self.field()?;
        self.trail_settings()?;
        Ok(())
    }
}
