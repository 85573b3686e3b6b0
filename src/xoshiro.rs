//! The deterministic pseudo-random generator behind fountain part selection.
//!
//! Every UR implementation must derive the same fragment subsets from a part's
//! header, so the generator is pinned: Xoshiro256** whose state is the SHA-256
//! digest of the seed, read as four big-endian words.

use bitcoin_hashes::Hash;
use rand_xoshiro::rand_core::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

#[allow(clippy::module_name_repetitions)]
pub struct Xoshiro256 {
    inner: Xoshiro256StarStar,
}

#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
impl Xoshiro256 {
    /// Seeds the generator with the SHA-256 digest of `seed`.
    #[must_use]
    pub fn new(seed: &[u8]) -> Self {
        Self::from_digest(bitcoin_hashes::sha256::Hash::hash(seed).to_byte_array())
    }

    fn from_digest(digest: [u8; 32]) -> Self {
        // rand_xoshiro reads its state as little-endian words
        let mut state = [0_u8; 32];
        for (word, out) in digest.chunks_exact(8).zip(state.chunks_exact_mut(8)) {
            out.copy_from_slice(word);
            out.reverse();
        }
        Self {
            inner: Xoshiro256StarStar::from_seed(state),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// A double in `[0, 1)`.
    pub fn next_double(&mut self) -> f64 {
        self.next() as f64 / (u64::MAX as f64 + 1.0)
    }

    /// An integer in `low..=high`.
    pub fn next_int(&mut self, low: u64, high: u64) -> u64 {
        (self.next_double() * ((high - low + 1) as f64)) as u64 + low
    }

    pub fn next_bytes(&mut self, n: usize) -> Vec<u8> {
        (0..n).map(|_| self.next_int(0, 255) as u8).collect()
    }

    /// Draws the items one by one without replacement.
    pub fn shuffled<T>(&mut self, mut items: Vec<T>) -> Vec<T> {
        (0..items.len())
            .map(|_| {
                let last = items.len() as u64 - 1;
                items.remove(self.next_int(0, last) as usize)
            })
            .collect()
    }
}
