//! Deterministic per-game random streams derived from one user seed.

use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sha2::Sha256;

/// Independent RNG streams, one per minigame, so that playing slots never
/// perturbs the sequence of wheel outcomes for the same seed.
#[derive(Debug, Clone)]
pub struct RngBundle {
    wheel: CountingRng<SmallRng>,
    slots: CountingRng<SmallRng>,
    roulette: CountingRng<SmallRng>,
    plinko: CountingRng<SmallRng>,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            wheel: CountingRng::new(derive_stream_seed(seed, b"wheel")),
            slots: CountingRng::new(derive_stream_seed(seed, b"slots")),
            roulette: CountingRng::new(derive_stream_seed(seed, b"roulette")),
            plinko: CountingRng::new(derive_stream_seed(seed, b"plinko")),
        }
    }

    /// Access the prize wheel stream.
    pub const fn wheel(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.wheel
    }

    /// Access the slot machine stream.
    pub const fn slots(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.slots
    }

    /// Access the roulette stream.
    pub const fn roulette(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.roulette
    }

    /// Access the plinko stream.
    pub const fn plinko(&mut self) -> &mut CountingRng<SmallRng> {
        &mut self.plinko
    }
}

/// RNG wrapper that records how many draws were taken from the stream.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<SmallRng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    // HMAC-SHA256 takes keys of any length.
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
