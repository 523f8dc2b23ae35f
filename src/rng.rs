//! Deterministic counter-based PRNG and Fisher–Yates shuffling.
//!
//! The generator is a pure function from a seed to a value and the next
//! seed (SplitMix64). The same seed always produces the same sequence, which
//! is what makes openings reproducible and replays deterministic.

/// Advances the seed and produces the next value.
///
/// Pure: calling twice with the same seed yields the same pair.
pub fn next_u64(seed: u64) -> (u64, u64) {
    let next_seed = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = next_seed;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    (z ^ (z >> 31), next_seed)
}

/// Shuffles the slice in place with a Fisher–Yates pass consuming the
/// generator sequence. Returns the seed after the final draw so callers can
/// continue the stream.
pub fn shuffle<T>(items: &mut [T], mut seed: u64) -> u64 {
    for i in (1..items.len()).rev() {
        let (value, next_seed) = next_u64(seed);
        seed = next_seed;
        let j = (value % (i as u64 + 1)) as usize;
        items.swap(i, j);
    }
    seed
}
