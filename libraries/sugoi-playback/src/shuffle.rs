//! Random track selection for shuffle mode

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform random picker over track indices
///
/// Owned by the controller state and only touched under its lock. A fixed
/// seed makes shuffle sequences reproducible.
#[derive(Debug, Clone)]
pub struct ShufflePicker {
    rng: StdRng,
}

impl ShufflePicker {
    /// Create a picker, seeded from the OS when `seed` is `None`
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Pick an index uniformly from `0..len`
    ///
    /// `len` must be non-zero; the controller guarantees a non-empty track list.
    pub fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}
