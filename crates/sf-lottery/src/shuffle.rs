//! Random permutation helpers

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// RNG used by a lottery session
pub type SessionRng = ChaCha8Rng;

/// Seeded RNG for reproducible sessions, entropy-seeded otherwise
pub fn session_rng(seed: Option<u64>) -> SessionRng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_os_rng(),
    }
}

/// In-place uniform shuffle (Fisher–Yates, walking from the back)
pub fn fisher_yates<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// `0..n` in uniformly random order
pub fn shuffled_indices<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    fisher_yates(&mut indices, rng);
    indices
}
