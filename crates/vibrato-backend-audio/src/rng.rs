//! Deterministic RNG using PCG32.
//!
//! Every random decision of the backend (morph shifts, random gains, RAF rates,
//! carrier phases) draws from a caller-supplied generator. This module builds
//! those generators from plan seeds so a rendered experiment is reproducible.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use vibrato_spec::{derive_condition_seed, derive_stimulus_seed, Condition};

/// Creates a PCG32 RNG from a 32-bit seed.
///
/// The 32-bit seed is expanded to 64 bits by duplicating the value in both
/// halves, as required by PCG32's state initialization.
pub fn create_rng(seed: u32) -> Pcg32 {
    let seed64 = (seed as u64) | ((seed as u64) << 32);
    Pcg32::seed_from_u64(seed64)
}

/// Creates the RNG for a single condition rendered outside an experiment.
pub fn create_condition_rng(base_seed: u32, condition: Condition) -> Pcg32 {
    create_rng(derive_condition_seed(base_seed, condition.file_stem()))
}

/// Creates the RNG for one stimulus of an experiment.
///
/// # Arguments
/// * `base_seed` - The plan's base seed
/// * `subject` - Subject index
/// * `block` - Block index
/// * `repeat` - Repeat index within the block
/// * `condition` - Condition being rendered
pub fn create_stimulus_rng(
    base_seed: u32,
    subject: u32,
    block: u32,
    repeat: u32,
    condition: Condition,
) -> Pcg32 {
    create_rng(derive_stimulus_seed(
        base_seed,
        subject,
        block,
        repeat,
        condition.file_stem(),
    ))
}
