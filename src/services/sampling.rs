//! Injectable random source for synthetic data.
//!
//! Every sampler takes the same `SharedRng` so a seeded run reproduces the
//! same niches bonuses, prices and synthetic orders.

use parking_lot::Mutex;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

pub type SharedRng = Arc<Mutex<StdRng>>;

/// Seeded when `seed` is set, otherwise from OS entropy
pub fn shared_rng(seed: Option<u64>) -> SharedRng {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    Arc::new(Mutex::new(rng))
}

/// Uppercase alphanumeric token of `len` characters
pub fn random_token<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| rng.sample(Alphanumeric) as char)
        .collect::<String>()
        .to_uppercase()
}
