//! Deterministic seeded RNG for tie-breaking.
//!
//! Merge decisions must be reproducible per model seed, so this is a tiny
//! splitmix-style generator rather than a full entropy source.

/// Deterministic pseudo-random generator seeded from a model's merge seed.
#[derive(Clone, Debug)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    /// Create a generator from a seed. Equal seeds yield equal sequences.
    pub fn new(seed: u64) -> Self {
        // Avoid the all-zero fixpoint
        Self { state: seed.wrapping_add(0x9E3779B97F4A7C15) }
    }

    /// Next 64 random bits.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    /// Uniform index in `0..n`. `n` must be non-zero.
    pub fn gen_index(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    /// Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.gen_index(i + 1);
            items.swap(i, j);
        }
    }
}
