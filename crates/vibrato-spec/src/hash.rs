//! Seed derivation.
//!
//! Every stimulus draws from its own PCG32 stream. Seeds are derived from the
//! plan's base seed with BLAKE3 so streams stay independent and reproducible:
//!
//! ```text
//! stimulus_seed = truncate_u32(BLAKE3(base_seed || subject || block || repeat || condition))
//! ```

/// Derives a seed for one condition from a base seed.
pub fn derive_condition_seed(base_seed: u32, condition_key: &str) -> u32 {
    let mut input = Vec::with_capacity(4 + condition_key.len());
    input.extend_from_slice(&base_seed.to_le_bytes());
    input.extend_from_slice(condition_key.as_bytes());
    truncate_hash(&input)
}

/// Derives a seed for one stimulus of an experiment.
///
/// # Arguments
/// * `base_seed` - The plan's base seed
/// * `subject` - Subject index
/// * `block` - Block index
/// * `repeat` - Repeat index within the block
/// * `condition_key` - Condition file stem (e.g. "SHUFFLE_RAF")
pub fn derive_stimulus_seed(
    base_seed: u32,
    subject: u32,
    block: u32,
    repeat: u32,
    condition_key: &str,
) -> u32 {
    let mut input = Vec::with_capacity(16 + condition_key.len());
    input.extend_from_slice(&base_seed.to_le_bytes());
    input.extend_from_slice(&subject.to_le_bytes());
    input.extend_from_slice(&block.to_le_bytes());
    input.extend_from_slice(&repeat.to_le_bytes());
    input.extend_from_slice(condition_key.as_bytes());
    truncate_hash(&input)
}

fn truncate_hash(input: &[u8]) -> u32 {
    let hash = blake3::hash(input);
    let bytes = hash.as_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
