//! Deterministic RNG owned by the battle
//!
//! Every branch that may vary between replays routes through this
//! wrapper: attack target choice, round shuffles, speed rolls and
//! deployment row order. Cloning (or serializing) the wrapper snapshots
//! the stream, which is what makes undo and replay byte-exact.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seeded, snapshottable random source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleRng {
    inner: ChaCha8Rng,
}

impl BattleRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform draw in `[0, 1)`
    pub fn uniform(&mut self) -> f64 {
        self.inner.gen()
    }

    /// Uniform index in `[0, len)`; `len` must be non-zero
    pub fn index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }

    /// Pick one element of a non-empty slice, or `None` if empty
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            items.get(self.index(items.len()))
        }
    }

    /// Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }
}
