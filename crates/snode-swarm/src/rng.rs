//! Portable randomness shared by every rebalancing phase.
//!
//! Every participant recomputes membership independently, so the random
//! stream is part of the protocol. The generator is MT19937-64 seeded with
//! the standard `init_genrand64` routine, and index sampling uses one fixed
//! rejection scheme instead of a library distribution whose output may change
//! between versions or targets:
//!
//! ```text
//! secure_max = u64::MAX - (u64::MAX % n)
//! repeat x = next_u64() until x < secure_max
//! index = x / (secure_max / n)
//! ```
//!
//! Changing either half is a protocol break.

use rand_mt::Mt64;

/// Exclusively-owned generator for one rebalancing run.
pub struct SwarmRng {
    mt: Mt64,
    draws: u64,
}

impl SwarmRng {
    /// Seed a fresh generator.
    pub fn new(seed: u64) -> Self {
        Self {
            mt: Mt64::new(seed),
            draws: 0,
        }
    }

    /// Next raw 64-bit output.
    pub fn next_u64(&mut self) -> u64 {
        self.draws += 1;
        self.mt.next_u64()
    }

    /// Number of raw outputs consumed so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Uniform index in `[0, n)`.
    ///
    /// Consumes one output unless it lands in the rejected tail above
    /// `secure_max`, which happens with probability `(u64::MAX % n) / u64::MAX`.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn uniform(&mut self, n: u64) -> u64 {
        assert!(n > 0, "uniform sampling over an empty range");
        let secure_max = u64::MAX - u64::MAX % n;
        let mut x = self.next_u64();
        while x >= secure_max {
            x = self.next_u64();
        }
        x / (secure_max / n)
    }

    /// Draw one entry from a weighted pool. `None` if the pool is empty.
    pub fn pick<'a, T>(&mut self, pool: &'a [T]) -> Option<&'a T> {
        if pool.is_empty() {
            return None;
        }
        let idx = self.uniform(pool.len() as u64) as usize;
        pool.get(idx)
    }
}

impl std::fmt::Debug for SwarmRng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwarmRng")
            .field("draws", &self.draws)
            .finish()
    }
}
