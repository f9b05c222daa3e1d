//! Standard normal distribution helpers
//!
//! One implementation of Φ and Φ⁻¹ shared by the spending functions and the
//! boundary conditions.
//!
//! References:
//! - Acklam (2003): An algorithm for computing the inverse normal cumulative
//!   distribution function (relative error < 1.15e-9)

use std::f64::consts::FRAC_1_SQRT_2;

// Acklam rational approximation coefficients.
const A: [f64; 6] = [
    -3.969_683_028_665_376e1,
    2.209_460_984_245_205e2,
    -2.759_285_104_469_687e2,
    1.383_577_518_672_690e2,
    -3.066_479_806_614_716e1,
    2.506_628_277_459_239,
];
const B: [f64; 5] = [
    -5.447_609_879_822_406e1,
    1.615_858_368_580_409e2,
    -1.556_989_798_598_866e2,
    6.680_131_188_771_972e1,
    -1.328_068_155_288_572e1,
];
const C: [f64; 6] = [
    -7.784_894_002_430_293e-3,
    -3.223_964_580_411_365e-1,
    -2.400_758_277_161_838,
    -2.549_732_539_343_734,
    4.374_664_141_464_968,
    2.938_163_982_698_783,
];
const D: [f64; 4] = [
    7.784_695_709_041_462e-3,
    3.224_671_290_700_398e-1,
    2.445_134_137_142_996,
    3.754_408_661_907_416,
];

/// Lower break point between the tail and central approximations.
pub const P_LOW: f64 = 0.024_25;
/// Upper break point (`1 - P_LOW`).
pub const P_HIGH: f64 = 1.0 - P_LOW;

/// Standard normal CDF: Φ(x) = (1 + erf(x/√2)) / 2
#[inline]
#[must_use]
pub fn cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x * FRAC_1_SQRT_2))
}

/// Inverse standard normal CDF (quantile function).
///
/// Returns `None` unless `0 < p < 1`.
#[must_use]
pub fn ppf(p: f64) -> Option<f64> {
    if !(p > 0.0 && p < 1.0) {
        return None;
    }

    if p < P_LOW {
        return Some(tail(p));
    }
    if p > P_HIGH {
        return Some(-tail(1.0 - p));
    }

    let q = p - 0.5;
    let r = q * q;
    let num = (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q;
    let den = ((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0;
    Some(num / den)
}

/// Lower-tail branch, `p < P_LOW`.
fn tail(p: f64) -> f64 {
    let q = (-2.0 * p.ln()).sqrt();
    let num = ((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5];
    let den = (((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0;
    num / den
}

/// Two-sided critical value `Φ⁻¹(1 - alpha/2)`.
///
/// Returns `None` unless `0 < alpha < 2`.
#[must_use]
pub fn two_sided_critical(alpha: f64) -> Option<f64> {
    ppf(1.0 - alpha / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdf_known_values() {
        assert!((cdf(0.0) - 0.5).abs() < 1e-15);
        assert!((cdf(1.959_963_984_540_054) - 0.975).abs() < 1e-12);
        assert!((cdf(-1.0) - 0.158_655_253_931_457_05).abs() < 1e-12);
    }

    #[test]
    fn test_ppf_known_values() {
        assert!(ppf(0.5).unwrap().abs() < 1e-9);
        assert!((ppf(0.975).unwrap() - 1.959_963_984_540_054).abs() < 1e-8);
        assert!((ppf(0.025).unwrap() + 1.959_963_984_540_054).abs() < 1e-8);
        assert!((ppf(0.999_5).unwrap() - 3.290_526_731_491_926).abs() < 1e-7);
    }

    #[test]
    fn test_ppf_out_of_domain() {
        assert!(ppf(0.0).is_none());
        assert!(ppf(1.0).is_none());
        assert!(ppf(-0.1).is_none());
        assert!(ppf(f64::NAN).is_none());
    }

    #[test]
    fn test_ppf_inverts_cdf_across_branches() {
        for &p in &[1e-6, 1e-4, 0.01, P_LOW, 0.1, 0.5, 0.9, P_HIGH, 0.99, 1.0 - 1e-6] {
            let x = ppf(p).unwrap();
            assert!((cdf(x) - p).abs() / p.min(1.0 - p) < 1e-6, "p = {p}");
        }
    }

    #[test]
    fn test_two_sided_critical() {
        let z = two_sided_critical(0.05).unwrap();
        assert!((z - 1.959_963_984_540_054).abs() < 1e-8);
        assert!(two_sided_critical(0.0).is_none());
    }
}
