use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Raw-space center of the seeding cube. Keeps a fresh swarm in front of the
/// default camera; it has no physical meaning.
pub const SEED_CENTER: [f64; 3] = [0.0, 0.0, 25.0];

/// Source of fresh particle positions, in raw (unscaled) coordinates.
pub trait PositionSampler {
    /// Draws one position from the cube of the given half-width around
    /// [`SEED_CENTER`].
    fn sample(&mut self, half_width: f64) -> [f64; 3];
}

/// Uniform sampling over the seeding cube.
#[derive(Debug, Clone)]
pub struct CubeSampler {
    rng: ChaCha8Rng,
}

impl CubeSampler {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }

    /// Seeded when `seed` is given, entropy-seeded otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::from_seed)
    }
}

impl PositionSampler for CubeSampler {
    fn sample(&mut self, half_width: f64) -> [f64; 3] {
        let mut axis = |center: f64| center + half_width * self.rng.random_range(-1.0..=1.0);
        [
            axis(SEED_CENTER[0]),
            axis(SEED_CENTER[1]),
            axis(SEED_CENTER[2]),
        ]
    }
}
