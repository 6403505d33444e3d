//! # Pseudo-Random Number Generator
//!
//! A small xorshift generator behind the `rand_core` traits. The Random
//! scheduling strategy draws from it. It is seeded once at boot and is
//! fully deterministic for a given seed, which keeps the strategy
//! reproducible under the host test harness.

use rand_core::{impls, Error, RngCore, SeedableRng};

/// 32-bit xorshift generator (the 13/17/5 shift triple).
///
/// Not cryptographically strong; the scheduler only needs a cheap,
/// uniform-enough pick among at most
/// [`MAX_PROCESSES`](crate::config::MAX_PROCESSES) candidates.
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Create a generator from `seed`. Zero is mapped to a fixed
    /// non-zero constant; the all-zero state is xorshift's fixed point.
    pub const fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x6B8B_4567 } else { seed },
        }
    }
}

impl RngCore for XorShift32 {
    fn next_u32(&mut self) -> u32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for XorShift32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_seeds_yield_identical_streams() {
        let mut a = XorShift32::new(0xDEAD_BEEF);
        let mut b = XorShift32::new(0xDEAD_BEEF);

        for _ in 0..64 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn zero_seed_still_produces_output() {
        let mut rng = XorShift32::new(0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn from_seed_matches_new() {
        let mut a = XorShift32::from_seed(0x0102_0304u32.to_le_bytes());
        let mut b = XorShift32::new(0x0102_0304);
        assert_eq!(a.next_u32(), b.next_u32());
    }
}
