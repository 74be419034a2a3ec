pub mod buffer;
pub mod catalog;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod sampler;
pub mod solvers;
/// The `attractor_core` crate integrates particle swarms through strange
/// attractors and keeps their recent history as fading trails.
///
/// Key components:
/// - **Traits**: `Scalar` (numeric type abstraction), `DynamicalSystem` (vector fields), `Steppable` (solvers).
/// - **Catalog**: the eight built-in fields with their defaults, slider ranges, time steps and display scales.
/// - **Solvers**: fixed-step explicit Euler.
/// - **Engine**: `TrailEngine`, the per-frame ring buffer and render-buffer repack.
pub mod traits;

pub use buffer::RenderBuffer;
pub use catalog::{Attractor, FieldDescriptor, FieldParams, ParamRange};
pub use color::Rgb;
pub use config::{EngineConfig, TrailSettings};
pub use engine::TrailEngine;
pub use error::EngineError;
pub use sampler::{CubeSampler, PositionSampler};
