//! Relative error of a single estimate and the closed-form HyperLogLog error bound.
//!
//! Expected relative standard error for `m = 2^p` registers is `1.04 / sqrt(m)`:
//!   p = 10: 1.04 / sqrt(2^10) = 3.25%
//!   p = 12: 1.04 / sqrt(2^12) = 1.62%
//!   p = 14: 1.04 / sqrt(2^14) = 0.81%

/// Largest precision for which `2^p` registers still fit into `u64`
pub const MAX_PRECISION: u8 = 63;

/// Constant of the HyperLogLog standard error bound
const RSE_CONSTANT: f64 = 1.04;

/// Signed relative error `(estimate - true_f0) / true_f0`.
///
/// Zero ground truth yields `0.0` whatever the estimate is, so the function is total.
#[inline]
pub fn relative_error(estimate: f64, true_f0: u64) -> f64 {
    if true_f0 == 0 {
        return 0.0;
    }
    let actual = true_f0 as f64;
    (estimate - actual) / actual
}

/// Number of registers `m = 2^p`, `None` when `p > MAX_PRECISION`
#[inline]
pub fn register_count(p: u8) -> Option<u64> {
    1u64.checked_shl(u32::from(p))
}

/// Theoretical relative standard error `1.04 / sqrt(2^p)`
#[inline]
pub fn theoretical_rse(p: u8) -> f64 {
    RSE_CONSTANT / 2f64.powi(i32::from(p)).sqrt()
}
