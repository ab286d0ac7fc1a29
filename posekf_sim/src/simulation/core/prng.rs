// posekf_sim/src/simulation/core/prng.rs

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seed used when neither the CLI nor the scenario provides one.
pub const DEFAULT_SEED: u64 = 42;

/// A newtype wrapper around `ChaCha8Rng`.
/// This is the central, deterministic pseudo-random number generator for the simulation.
pub struct SimulationRng(pub ChaCha8Rng);

impl SimulationRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl Default for SimulationRng {
    fn default() -> Self {
        Self::from_seed(DEFAULT_SEED)
    }
}
