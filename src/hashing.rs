//! Hashing and sizing helpers shared by the index.

/// 32-bit avalanche mix (xor-shift / multiply) used to pick a start slot.
///
/// Sequential identifiers land far apart, so linear probing does not
/// degrade into long clustered runs.
#[inline]
pub(crate) fn mix32(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x7feb_352d);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846c_a68b);
    x ^= x >> 16;
    x
}

/// Smallest power of two that is `>= x` (and at least 1).
#[inline]
pub(crate) fn next_pow2(x: usize) -> usize {
    x.max(1).next_power_of_two()
}
