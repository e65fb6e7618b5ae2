//! Small uniform-draw helpers on top of [`RngCore`].
use rand::RngCore;

/// Generate a random float in the range [0, 1).
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f64 {
    // 53 random mantissa bits.
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Uniform draw in `[lo, hi]`. Returns `lo` when the interval is empty or inverted.
#[inline]
pub(crate) fn uniform_f64(rng: &mut dyn RngCore, lo: f64, hi: f64) -> f64 {
    if hi <= lo {
        return lo;
    }
    (lo + (hi - lo) * rand01(rng)).min(hi)
}

/// Inclusive uniform integer draw in `[lo, hi]`.
#[inline]
pub(crate) fn uniform_inclusive_i64(rng: &mut dyn RngCore, lo: i64, hi: i64) -> i64 {
    if hi <= lo {
        return lo;
    }
    let span = (hi as i128 - lo as i128 + 1) as u128;
    let offset = ((rng.next_u64() as u128 * span) >> 64) as i128;
    (lo as i128 + offset) as i64
}

/// Uniform index in `0..len`. `len` must be non-zero.
#[inline]
pub(crate) fn uniform_index(rng: &mut dyn RngCore, len: usize) -> usize {
    debug_assert!(len > 0, "uniform_index requires a non-empty range");
    ((rng.next_u64() as u128 * len as u128) >> 64) as usize
}
