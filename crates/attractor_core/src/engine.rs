//! Particle trail engine.
//!
//! Every particle keeps a ring of its most recent positions. All rings share
//! one rotating head index, so the whole population ages in lockstep and the
//! repack into [`RenderBuffer`] is a plain linear walk.
//!
//! Per frame, [`TrailEngine::advance`] takes one explicit Euler step for each
//! particle from the newest slot, writes the result over the oldest slot,
//! rotates the head onto it and rebuilds the render buffer. A step that
//! leaves the renderable range (NaN, infinity, or too large for `f32` once
//! scaled) is replaced by a freshly sampled position.

use crate::buffer::RenderBuffer;
use crate::catalog::{FieldDescriptor, FieldParams};
use crate::color::Rgb;
use crate::config::{validate_field, validate_point_size, validate_sizes, TrailSettings};
use crate::error::{EngineError, Result};
use crate::sampler::{CubeSampler, PositionSampler};
use crate::solvers::ExplicitEuler;
use crate::traits::Steppable;

/// Size of the oldest trail point relative to the newest.
pub const TAIL_SIZE_FRACTION: f32 = 0.3;

pub struct TrailEngine<S: PositionSampler = CubeSampler> {
    sampler: S,
    /// `None` once disposed.
    live: Option<Population>,
}

struct Population {
    field: FieldDescriptor,
    params: FieldParams,
    trails: TrailSettings,
    /// Particle-major: particle `i` owns `ring[i * trail_length..][..trail_length]`.
    ring: Vec<[f64; 3]>,
    /// Slot holding the newest position of every particle.
    head: usize,
    buffer: RenderBuffer,
    solver: ExplicitEuler<f64>,
    elapsed: f64,
}

impl TrailEngine<CubeSampler> {
    /// Builds an engine whose seeding draws from OS entropy.
    pub fn new(field: &FieldDescriptor, trails: TrailSettings) -> Result<Self> {
        Self::with_sampler(field, trails, CubeSampler::from_entropy())
    }

    /// Builds an engine whose seeding is reproducible from `seed`.
    pub fn seeded(field: &FieldDescriptor, trails: TrailSettings, seed: u64) -> Result<Self> {
        Self::with_sampler(field, trails, CubeSampler::from_seed(seed))
    }
}

impl<S: PositionSampler> TrailEngine<S> {
    /// Validates `trails`, then seeds every slot of every particle's ring
    /// with one sampled position per particle. Nothing is allocated on error.
    pub fn with_sampler(
        field: &FieldDescriptor,
        trails: TrailSettings,
        mut sampler: S,
    ) -> Result<Self> {
        validate_field(field)?;
        trails.validate()?;
        let live = Population::seed(field.clone(), field.params, trails, &mut sampler);
        Ok(Self {
            sampler,
            live: Some(live),
        })
    }

    fn live(&self) -> Result<&Population> {
        self.live.as_ref().ok_or(EngineError::UseAfterDispose)
    }

    fn live_mut(&mut self) -> Result<&mut Population> {
        self.live.as_mut().ok_or(EngineError::UseAfterDispose)
    }

    /// Switches to `field`, taking its parameters, and discards every
    /// trajectory: the population is reseeded exactly as on construction.
    pub fn set_active_field(&mut self, field: &FieldDescriptor) -> Result<()> {
        let trails = self.live()?.trails;
        validate_field(field)?;
        self.rebuild(field.clone(), field.params, trails);
        Ok(())
    }

    /// Reallocates the population and render buffer for new sizes.
    ///
    /// On error the engine is left untouched.
    pub fn resize(&mut self, particle_count: usize, trail_length: usize) -> Result<()> {
        let live = self.live()?;
        validate_sizes(particle_count, trail_length)?;
        let trails = TrailSettings {
            particle_count,
            trail_length,
            ..live.trails
        };
        let (field, params) = (live.field.clone(), live.params);
        self.rebuild(field, params, trails);
        Ok(())
    }

    /// Discards all trajectories and reseeds with the current field,
    /// parameters and sizes.
    pub fn reseed(&mut self) -> Result<()> {
        let live = self.live()?;
        let (field, params, trails) = (live.field.clone(), live.params, live.trails);
        self.rebuild(field, params, trails);
        Ok(())
    }

    fn rebuild(&mut self, field: FieldDescriptor, params: FieldParams, trails: TrailSettings) {
        // Drop the old population before allocating its replacement.
        self.live = None;
        self.live = Some(Population::seed(field, params, trails, &mut self.sampler));
    }

    /// Replaces the working parameters. Trails are kept; the change shows
    /// from the next `advance`. Values outside the slider ranges are accepted.
    pub fn set_parameters(&mut self, params: FieldParams) -> Result<()> {
        let live = self.live_mut()?;
        let active = live.field.attractor();
        if params.attractor() != active {
            return Err(EngineError::ParameterMismatch {
                active: active.id(),
                given: params.attractor().id(),
            });
        }
        live.params = params;
        Ok(())
    }

    /// Updates one named parameter of the active field.
    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<()> {
        self.live_mut()?.params.set(name, value)
    }

    /// New color endpoints, used from the next repack.
    pub fn set_colors(&mut self, start: Rgb, end: Rgb) -> Result<()> {
        let live = self.live_mut()?;
        live.trails.color_start = start;
        live.trails.color_end = end;
        Ok(())
    }

    /// New size of the newest trail point, used from the next repack.
    pub fn set_point_size(&mut self, size: f32) -> Result<()> {
        let live = self.live_mut()?;
        validate_point_size(size)?;
        live.trails.point_size = size;
        Ok(())
    }

    /// Integrates every particle one step of `time_step * speed` and
    /// rebuilds the render buffer.
    pub fn advance(&mut self, speed: f64) -> Result<()> {
        let Self { sampler, live } = self;
        let live = live.as_mut().ok_or(EngineError::UseAfterDispose)?;

        let dt = live.field.time_step * speed;
        let scale = live.field.display_scale;
        let len = live.trails.trail_length;
        let next = (live.head + 1) % len;

        for base in (0..live.ring.len()).step_by(len) {
            let mut state = live.ring[base + live.head];
            let mut t = live.elapsed;
            live.solver.step(&live.params, &mut t, &mut state, dt);
            if !renderable(state, scale) {
                state = sampler.sample(scale);
            }
            live.ring[base + next] = state;
        }

        live.head = next;
        live.elapsed += dt;
        live.repack();
        Ok(())
    }

    /// `particle_count * trail_length`.
    pub fn particle_point_count(&self) -> Result<usize> {
        Ok(self.live()?.trails.point_count())
    }

    pub fn buffer(&self) -> Result<&RenderBuffer> {
        Ok(&self.live()?.buffer)
    }

    pub fn field(&self) -> Result<&FieldDescriptor> {
        Ok(&self.live()?.field)
    }

    pub fn parameters(&self) -> Result<FieldParams> {
        Ok(self.live()?.params)
    }

    pub fn trail_settings(&self) -> Result<TrailSettings> {
        Ok(self.live()?.trails)
    }

    /// Integration time accumulated since the last reseed.
    pub fn elapsed(&self) -> Result<f64> {
        Ok(self.live()?.elapsed)
    }

    /// Raw positions of one particle's trail, oldest first.
    pub fn raw_trail(&self, particle: usize) -> Result<Option<Vec<[f64; 3]>>> {
        let live = self.live()?;
        if particle >= live.trails.particle_count {
            return Ok(None);
        }
        let len = live.trails.trail_length;
        let ring = &live.ring[particle * len..(particle + 1) * len];
        Ok(Some(
            (0..len)
                .map(|age_rank| ring[live.slot_for(age_rank)])
                .collect(),
        ))
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    pub fn is_disposed(&self) -> bool {
        self.live.is_none()
    }

    /// Frees the population and render buffer. Every later call fails with
    /// [`EngineError::UseAfterDispose`].
    pub fn dispose(&mut self) -> Result<()> {
        match self.live.take() {
            Some(_) => Ok(()),
            None => Err(EngineError::UseAfterDispose),
        }
    }
}

impl Population {
    fn seed(
        field: FieldDescriptor,
        params: FieldParams,
        trails: TrailSettings,
        sampler: &mut impl PositionSampler,
    ) -> Self {
        let len = trails.trail_length;
        let mut ring = Vec::with_capacity(trails.point_count());
        for _ in 0..trails.particle_count {
            let position = sampler.sample(field.display_scale);
            ring.extend(std::iter::repeat(position).take(len));
        }

        let mut population = Self {
            field,
            params,
            trails,
            ring,
            head: 0,
            buffer: RenderBuffer::new(trails.point_count()),
            solver: ExplicitEuler::new(3),
            elapsed: 0.0,
        };
        population.repack();
        population
    }

    /// Ring slot of the point `age_rank` places from the oldest.
    fn slot_for(&self, age_rank: usize) -> usize {
        (self.head + 1 + age_rank) % self.trails.trail_length
    }

    fn repack(&mut self) {
        let len = self.trails.trail_length;
        let scale = self.field.display_scale;
        let TrailSettings {
            color_start,
            color_end,
            point_size,
            ..
        } = self.trails;

        for age_rank in 0..len {
            let slot = self.slot_for(age_rank);
            // 1 for the oldest point, 0 for the newest.
            let age = if len > 1 {
                1.0 - age_rank as f32 / (len - 1) as f32
            } else {
                0.0
            };
            let color = color_start.lerp(color_end, age);
            let color = [color.r, color.g, color.b];
            let size = point_size * (1.0 - (1.0 - TAIL_SIZE_FRACTION) * age);

            for particle in 0..self.trails.particle_count {
                let p = self.ring[particle * len + slot];
                let position = [
                    (p[0] * scale) as f32,
                    (p[1] * scale) as f32,
                    (p[2] * scale) as f32,
                ];
                self.buffer.write(particle * len + age_rank, position, color, size);
            }
        }
    }
}

fn renderable(state: [f64; 3], scale: f64) -> bool {
    state
        .iter()
        .all(|v| v.is_finite() && ((v * scale) as f32).is_finite())
}

#[cfg(test)]
mod tests {
    use super::{TrailEngine, TAIL_SIZE_FRACTION};
    use crate::catalog::{self, Attractor, FieldParams};
    use crate::color::Rgb;
    use crate::config::TrailSettings;
    use crate::error::EngineError;
    use crate::sampler::{PositionSampler, SEED_CENTER};
    use proptest::prelude::*;

    /// Always hands out the same position and counts how often it was asked.
    struct FixedSampler {
        position: [f64; 3],
        calls: usize,
    }

    impl FixedSampler {
        fn at(position: [f64; 3]) -> Self {
            Self { position, calls: 0 }
        }
    }

    impl PositionSampler for FixedSampler {
        fn sample(&mut self, _half_width: f64) -> [f64; 3] {
            self.calls += 1;
            self.position
        }
    }

    fn settings(particle_count: usize, trail_length: usize) -> TrailSettings {
        TrailSettings::new(
            particle_count,
            trail_length,
            Rgb::from_hex(0xffffff),
            Rgb::from_hex(0x000000),
        )
    }

    fn lorenz() -> catalog::FieldDescriptor {
        catalog::get("lorenz").expect("catalog entry")
    }

    fn assert_all_finite(engine: &TrailEngine<impl PositionSampler>) {
        let buffer = engine.buffer().expect("live engine");
        assert!(buffer.positions().iter().all(|v| v.is_finite()));
        assert!(buffer.colors().iter().all(|v| v.is_finite()));
        assert!(buffer.sizes().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn lorenz_reference_step() {
        let mut engine =
            TrailEngine::with_sampler(&lorenz(), settings(1, 1), FixedSampler::at([1.0, 1.0, 26.0]))
                .expect("valid engine");
        engine.advance(1.0).expect("live engine");

        let trail = engine.raw_trail(0).expect("live engine").expect("particle 0");
        let [x, y, z] = trail[0];
        assert!((x - 1.0).abs() < 1e-12);
        assert!((y - 1.005).abs() < 1e-12);
        assert!((z - 25.658).abs() < 1e-3);

        let shown = engine.buffer().expect("live engine").position(0).expect("point 0");
        assert!((shown[0] - 1.5).abs() < 1e-5);
        assert!((shown[1] - 1.5075).abs() < 1e-5);
        assert!((shown[2] as f64 - z * 1.5).abs() < 1e-4);
        assert_eq!(engine.sampler().calls, 1);
    }

    #[test]
    fn advance_takes_the_same_step_as_the_catalog() {
        let start = [0.3, -0.2, 0.4];
        for attractor in Attractor::ALL {
            let field = attractor.descriptor();
            let mut engine =
                TrailEngine::with_sampler(&field, settings(1, 2), FixedSampler::at(start))
                    .expect("valid engine");
            engine.advance(1.0).expect("live engine");
            let expected = field.step(start, field.time_step);
            assert_eq!(engine.raw_trail(0), Ok(Some(vec![start, expected])), "{attractor}");
        }
    }

    #[test]
    fn point_count_is_particles_times_trail() {
        let engine = TrailEngine::seeded(&lorenz(), settings(7, 13), 1).expect("valid engine");
        assert_eq!(engine.particle_point_count(), Ok(91));
        let buffer = engine.buffer().expect("live engine");
        assert_eq!(buffer.point_count(), 91);
        assert_eq!(buffer.positions().len(), 273);
        assert_eq!(buffer.colors().len(), 273);
        assert_eq!(buffer.sizes().len(), 91);
    }

    #[test]
    fn zero_sizes_fail_construction() {
        for (n, t) in [(0, 10), (10, 0), (0, 0)] {
            let result = TrailEngine::seeded(&lorenz(), settings(n, t), 1);
            assert!(
                matches!(result, Err(EngineError::InvalidConfiguration(_))),
                "{n}x{t}"
            );
        }
    }

    #[test]
    fn construction_seeds_every_slot_with_one_position_per_particle() {
        let engine = TrailEngine::seeded(&lorenz(), settings(20, 6), 11).expect("valid engine");
        let scale = 1.5;
        for particle in 0..20 {
            let trail = engine.raw_trail(particle).expect("live").expect("in range");
            assert_eq!(trail.len(), 6);
            assert!(trail.iter().all(|p| *p == trail[0]));
            for axis in 0..3 {
                assert!((trail[0][axis] - SEED_CENTER[axis]).abs() <= scale);
            }
        }
        assert_eq!(engine.raw_trail(20), Ok(None));
    }

    #[test]
    fn ring_rotates_oldest_to_newest() {
        let field = lorenz();
        let start = [1.0, 2.0, 20.0];
        let mut engine =
            TrailEngine::with_sampler(&field, settings(1, 3), FixedSampler::at(start))
                .expect("valid engine");

        let first = field.step(start, field.time_step);
        let second = field.step(first, field.time_step);
        let third = field.step(second, field.time_step);

        engine.advance(1.0).expect("live");
        assert_eq!(engine.raw_trail(0), Ok(Some(vec![start, start, first])));
        engine.advance(1.0).expect("live");
        assert_eq!(engine.raw_trail(0), Ok(Some(vec![start, first, second])));
        engine.advance(1.0).expect("live");
        assert_eq!(engine.raw_trail(0), Ok(Some(vec![first, second, third])));

        let buffer = engine.buffer().expect("live");
        let newest = buffer.position(2).expect("point 2");
        assert!((newest[2] as f64 - third[2] * 1.5).abs() < 1e-4);
    }

    #[test]
    fn speed_scales_the_time_step() {
        let field = lorenz();
        let start = [1.0, 1.0, 26.0];
        let mut engine =
            TrailEngine::with_sampler(&field, settings(1, 1), FixedSampler::at(start))
                .expect("valid engine");
        engine.advance(2.5).expect("live");
        let expected = field.step(start, field.time_step * 2.5);
        let trail = engine.raw_trail(0).expect("live").expect("in range");
        for axis in 0..3 {
            assert!((trail[0][axis] - expected[axis]).abs() < 1e-12);
        }
        assert!((engine.elapsed().expect("live") - 0.0125).abs() < 1e-12);
    }

    #[test]
    fn colors_and_sizes_fade_with_age() {
        let mut engine =
            TrailEngine::seeded(&lorenz(), settings(2, 5), 3).expect("valid engine");
        engine.advance(1.0).expect("live");
        let buffer = engine.buffer().expect("live");
        let base = 0.15;

        for particle in 0..2 {
            let oldest = particle * 5;
            let newest = oldest + 4;
            assert!((buffer.sizes()[oldest] - base * TAIL_SIZE_FRACTION).abs() < 1e-6);
            assert!((buffer.sizes()[newest] - base).abs() < 1e-6);
            // start = white (newest), end = black (oldest)
            assert_eq!(&buffer.colors()[oldest * 3..oldest * 3 + 3], &[0.0, 0.0, 0.0]);
            assert_eq!(&buffer.colors()[newest * 3..newest * 3 + 3], &[1.0, 1.0, 1.0]);
            let middle = oldest + 2;
            assert!((buffer.colors()[middle * 3] - 0.5).abs() < 1e-6);
            assert!((buffer.sizes()[middle] - base * 0.65).abs() < 1e-6);
        }
    }

    #[test]
    fn single_slot_trail_is_drawn_at_full_size_and_start_color() {
        let engine = TrailEngine::seeded(&lorenz(), settings(3, 1), 3).expect("valid engine");
        let buffer = engine.buffer().expect("live");
        assert!(buffer.sizes().iter().all(|s| (*s - 0.15).abs() < 1e-6));
        assert!(buffer.colors().iter().all(|c| *c == 1.0));
    }

    #[test]
    fn set_colors_applies_on_next_advance() {
        let mut engine = TrailEngine::seeded(&lorenz(), settings(1, 2), 3).expect("valid engine");
        let red = Rgb::from_hex(0xff0000);
        let blue = Rgb::from_hex(0x0000ff);
        engine.set_colors(red, blue).expect("live");
        assert_eq!(&engine.buffer().expect("live").colors()[3..6], &[1.0, 1.0, 1.0]);

        engine.advance(1.0).expect("live");
        let colors = engine.buffer().expect("live").colors();
        assert_eq!(&colors[0..3], &[0.0, 0.0, 1.0]);
        assert_eq!(&colors[3..6], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn set_point_size_rejects_nonsense() {
        let mut engine = TrailEngine::seeded(&lorenz(), settings(1, 2), 3).expect("valid engine");
        assert!(matches!(
            engine.set_point_size(-1.0),
            Err(EngineError::InvalidConfiguration(_))
        ));
        engine.set_point_size(2.0).expect("valid size");
        engine.advance(1.0).expect("live");
        assert_eq!(engine.buffer().expect("live").sizes()[1], 2.0);
    }

    #[test]
    fn switching_fields_reseeds_inside_the_new_cube() {
        let mut engine = TrailEngine::seeded(&lorenz(), settings(50, 4), 9).expect("valid engine");
        for _ in 0..10 {
            engine.advance(1.0).expect("live");
        }
        let count = engine.particle_point_count();

        let aizawa = catalog::get("aizawa").expect("catalog entry");
        engine.set_active_field(&aizawa).expect("live");

        assert_eq!(engine.particle_point_count(), count);
        assert_eq!(engine.field().expect("live").id, "aizawa");
        assert_eq!(engine.parameters(), Ok(Attractor::Aizawa.default_params()));
        assert_eq!(engine.elapsed(), Ok(0.0));

        // Displayed coordinates are raw * 10, raw within 10 of (0, 0, 25).
        let positions = engine.buffer().expect("live").positions();
        for point in positions.chunks_exact(3) {
            assert!(point[0].abs() <= 100.0 + 1e-3);
            assert!(point[1].abs() <= 100.0 + 1e-3);
            assert!(point[2] >= 150.0 - 1e-3 && point[2] <= 350.0 + 1e-3);
        }
        // Every point of a trail is the same freshly seeded position.
        for trail in positions.chunks_exact(12) {
            assert!(trail.chunks_exact(3).all(|p| p == &trail[0..3]));
        }
    }

    #[test]
    fn malformed_descriptors_are_rejected() {
        let mut broken = lorenz();
        broken.display_scale = 0.0;
        assert!(matches!(
            TrailEngine::seeded(&broken, settings(1, 1), 1),
            Err(EngineError::InvalidConfiguration(_))
        ));

        let mut engine = TrailEngine::seeded(&lorenz(), settings(1, 1), 1).expect("valid engine");
        broken = lorenz();
        broken.time_step = f64::NAN;
        assert!(matches!(
            engine.set_active_field(&broken),
            Err(EngineError::InvalidConfiguration(_))
        ));
        assert_eq!(engine.field().expect("live").time_step, 0.005);

        let mut mislabeled = catalog::get("thomas").expect("catalog entry");
        mislabeled.id = "lorenz";
        assert!(matches!(
            engine.set_active_field(&mislabeled),
            Err(EngineError::InvalidConfiguration(_))
        ));
        assert_eq!(engine.parameters(), Ok(Attractor::Lorenz.default_params()));
    }

    #[test]
    fn unallocatable_population_is_an_error_not_a_panic() {
        let huge = usize::MAX / 8;
        assert!(matches!(
            TrailEngine::seeded(&lorenz(), settings(huge, 1), 1),
            Err(EngineError::InvalidConfiguration(_))
        ));

        let mut engine = TrailEngine::seeded(&lorenz(), settings(3, 4), 1).expect("valid engine");
        assert!(matches!(
            engine.resize(huge, 1),
            Err(EngineError::InvalidConfiguration(_))
        ));
        assert_eq!(engine.particle_point_count(), Ok(12));
        assert_eq!(engine.buffer().expect("live").point_count(), 12);
    }

    #[test]
    fn resize_reallocates_the_render_buffer() {
        let mut engine = TrailEngine::seeded(&lorenz(), settings(8, 50), 2).expect("valid engine");
        engine.advance(1.0).expect("live");
        assert_eq!(engine.buffer().expect("live").point_count(), 400);

        engine.resize(8, 10).expect("valid sizes");
        assert_eq!(engine.particle_point_count(), Ok(80));
        assert_eq!(engine.buffer().expect("live").positions().len(), 240);
        engine.advance(1.0).expect("live");
        assert_all_finite(&engine);
    }

    #[test]
    fn invalid_resize_leaves_engine_untouched() {
        let mut engine = TrailEngine::seeded(&lorenz(), settings(4, 5), 2).expect("valid engine");
        engine.advance(1.0).expect("live");
        let before = engine.buffer().expect("live").clone();

        assert!(matches!(
            engine.resize(0, 5),
            Err(EngineError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            engine.resize(4, 0),
            Err(EngineError::InvalidConfiguration(_))
        ));
        assert_eq!(engine.buffer().expect("live"), &before);
        assert_eq!(engine.particle_point_count(), Ok(20));
    }

    #[test]
    fn reseed_keeps_parameters_and_resets_history() {
        let mut engine = TrailEngine::with_sampler(
            &lorenz(),
            settings(1, 3),
            FixedSampler::at([0.5, 0.5, 24.0]),
        )
        .expect("valid engine");
        engine.set_parameter("rho", 14.0).expect("known parameter");
        engine.advance(1.0).expect("live");
        engine.reseed().expect("live");

        assert_eq!(engine.parameters().expect("live").get("rho"), Some(14.0));
        assert_eq!(engine.raw_trail(0), Ok(Some(vec![[0.5, 0.5, 24.0]; 3])));
        assert_eq!(engine.sampler().calls, 2);
    }

    #[test]
    fn default_parameters_reproduce_a_fresh_run() {
        let field = lorenz();
        let mut fresh = TrailEngine::seeded(&field, settings(16, 8), 5).expect("valid engine");
        let mut reset = TrailEngine::seeded(&field, settings(16, 8), 5).expect("valid engine");
        reset
            .set_parameters(Attractor::Lorenz.default_params())
            .expect("matching field");

        for _ in 0..25 {
            fresh.advance(1.0).expect("live");
            reset.advance(1.0).expect("live");
        }
        assert_eq!(fresh.buffer(), reset.buffer());
    }

    #[test]
    fn parameters_change_trajectory_but_not_history() {
        let field = lorenz();
        let mut engine =
            TrailEngine::with_sampler(&field, settings(1, 2), FixedSampler::at([1.0, 1.0, 26.0]))
                .expect("valid engine");
        let tweaked = FieldParams::Lorenz {
            sigma: 5.0,
            rho: 28.0,
            beta: 8.0 / 3.0,
        };
        engine.set_parameters(tweaked).expect("matching field");
        assert_eq!(engine.raw_trail(0), Ok(Some(vec![[1.0, 1.0, 26.0]; 2])));

        engine.advance(1.0).expect("live");
        let expected = tweaked.step([1.0, 1.0, 26.0], field.time_step);
        assert_eq!(engine.raw_trail(0), Ok(Some(vec![[1.0, 1.0, 26.0], expected])));
    }

    #[test]
    fn parameters_for_another_field_are_rejected() {
        let mut engine = TrailEngine::seeded(&lorenz(), settings(1, 1), 1).expect("valid engine");
        assert_eq!(
            engine.set_parameters(Attractor::Thomas.default_params()),
            Err(EngineError::ParameterMismatch {
                active: "lorenz",
                given: "thomas"
            })
        );
        assert_eq!(
            engine.set_parameter("b", 1.0),
            Err(EngineError::UnknownParameter {
                field: "lorenz",
                name: "b".to_string()
            })
        );
        assert_eq!(engine.parameters(), Ok(Attractor::Lorenz.default_params()));
    }

    #[test]
    fn divergence_is_replaced_by_fresh_samples() {
        let mut engine = TrailEngine::with_sampler(
            &lorenz(),
            settings(4, 3),
            FixedSampler::at([1.0, 1.0, 26.0]),
        )
        .expect("valid engine");
        engine.set_parameter("rho", 1e300).expect("known parameter");

        engine.advance(1.0).expect("live");
        // Four seeds plus four replacements.
        assert_eq!(engine.sampler().calls, 8);
        assert_eq!(engine.raw_trail(3), Ok(Some(vec![[1.0, 1.0, 26.0]; 3])));
        assert_all_finite(&engine);
    }

    #[test]
    fn nan_parameters_never_reach_the_buffer() {
        let mut engine = TrailEngine::seeded(&lorenz(), settings(32, 5), 4).expect("valid engine");
        engine.set_parameter("sigma", f64::NAN).expect("known parameter");
        for _ in 0..10 {
            engine.advance(1.0).expect("live");
        }
        assert_all_finite(&engine);
    }

    #[test]
    fn every_call_fails_after_dispose() {
        let mut engine = TrailEngine::seeded(&lorenz(), settings(2, 2), 1).expect("valid engine");
        engine.dispose().expect("first dispose");
        assert!(engine.is_disposed());

        let thomas = catalog::get("thomas").expect("catalog entry");
        let gone = Err(EngineError::UseAfterDispose);
        assert_eq!(engine.advance(1.0), gone);
        assert_eq!(engine.set_active_field(&thomas), gone);
        assert_eq!(
            engine.set_parameters(Attractor::Lorenz.default_params()),
            gone
        );
        assert_eq!(engine.set_parameter("rho", 1.0), gone);
        assert_eq!(
            engine.set_colors(Rgb::from_hex(0), Rgb::from_hex(0)),
            gone
        );
        assert_eq!(engine.set_point_size(1.0), gone);
        assert_eq!(engine.resize(1, 1), gone);
        assert_eq!(engine.reseed(), gone);
        assert_eq!(engine.dispose(), gone);
        assert_eq!(engine.particle_point_count(), Err(EngineError::UseAfterDispose));
        assert!(engine.buffer().is_err());
        assert!(engine.raw_trail(0).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn buffer_stays_finite_for_any_parameters(
            field_index in 0usize..8,
            scale in prop_oneof![Just(1.0), -1e3..1e3f64, Just(1e200), Just(-1e200)],
            speed in 0.1f64..3.0,
            steps in 1usize..40,
            seed in any::<u64>(),
        ) {
            let field = Attractor::ALL[field_index].descriptor();
            let mut params = field.params;
            for (name, value) in field.params.entries() {
                params.set(name, value * scale).expect("own parameter");
            }

            let mut engine = TrailEngine::seeded(&field, settings(6, 4), seed).expect("valid engine");
            engine.set_parameters(params).expect("matching field");
            for _ in 0..steps {
                engine.advance(speed).expect("live");
            }

            let buffer = engine.buffer().expect("live");
            prop_assert!(buffer.positions().iter().all(|v| v.is_finite()));
            prop_assert!(buffer.sizes().iter().all(|v| v.is_finite() && *v > 0.0));
        }

        #[test]
        fn point_count_tracks_resizes(
            n in 1usize..40,
            t in 1usize..40,
            m in 1usize..40,
            u in 1usize..40,
        ) {
            let mut engine = TrailEngine::seeded(&lorenz(), settings(n, t), 0).expect("valid engine");
            prop_assert_eq!(engine.particle_point_count(), Ok(n * t));
            engine.advance(1.0).expect("live");
            engine.resize(m, u).expect("valid sizes");
            prop_assert_eq!(engine.particle_point_count(), Ok(m * u));
            prop_assert_eq!(engine.buffer().expect("live").positions().len(), m * u * 3);
            engine.advance(1.0).expect("live");
            prop_assert_eq!(engine.raw_trail(m - 1).expect("live").map(|trail| trail.len()), Some(u));
        }
    }
}
