//! Randomness source for short code generation.
//!
//! Draws from the operating system CSPRNG via `getrandom` and falls back to a
//! time-seeded [`StdRng`] when the OS source fails, so code production never
//! stops because entropy is unavailable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::warn;

static FALLBACK_REPORTED: AtomicBool = AtomicBool::new(false);

type EntropySource = fn(&mut [u8]) -> Result<(), getrandom::Error>;

/// CSPRNG-first random number generator with a non-cryptographic fallback.
///
/// Every draw tries the OS source first; the fallback generator is only seeded
/// on the first failure and only used for the draws that fail.
pub struct SecureRng {
    source: EntropySource,
    fallback: Option<StdRng>,
}

impl SecureRng {
    pub fn new() -> Self {
        Self {
            source: getrandom::fill,
            fallback: None,
        }
    }

    #[cfg(test)]
    fn with_source(source: EntropySource) -> Self {
        Self {
            source,
            fallback: None,
        }
    }

    /// Returns true once any draw had to use the fallback generator.
    pub fn is_degraded(&self) -> bool {
        self.fallback.is_some()
    }

    fn fallback(&mut self, cause: getrandom::Error) -> &mut StdRng {
        self.fallback.get_or_insert_with(|| {
            if !FALLBACK_REPORTED.swap(true, Ordering::Relaxed) {
                warn!(
                    error = %cause,
                    "OS random source unavailable, falling back to pseudorandom generator"
                );
            }
            StdRng::seed_from_u64(time_seed())
        })
    }
}

impl Default for SecureRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for SecureRng {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        if let Err(cause) = (self.source)(dst) {
            self.fallback(cause).fill_bytes(dst);
        }
    }
}

fn time_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    nanos ^ u64::from(std::process::id()).rotate_left(32)
}
