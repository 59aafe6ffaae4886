//! Two-proportion z-test (pooled variance, two-sided), as used to compare
//! refactoring prevalence between PR groups.

/// Complementary error function (Chebyshev fit, fractional error < 1.2e-7).
pub fn erfc(x: f64) -> f64 {
  let z = x.abs();
  let t = 1.0 / (1.0 + 0.5 * z);
  let poly = -z * z - 1.265_512_23
    + t * (1.000_023_68
      + t * (0.374_091_96
        + t * (0.096_784_18
          + t * (-0.186_288_06
            + t * (0.278_868_07
              + t * (-1.135_203_98 + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77))))))));
  let r = t * poly.exp();
  if x >= 0.0 { r } else { 2.0 - r }
}

/// Upper-tail probability of the standard normal distribution.
pub fn normal_sf(z: f64) -> f64 {
  0.5 * erfc(z / std::f64::consts::SQRT_2)
}

/// Two-sided p-value for H0: successes[0]/trials[0] == successes[1]/trials[1].
///
/// Returns None when the statistic is undefined (an empty group, proportions
/// outside [0, 1], or zero pooled variance).
pub fn two_proportion_ztest(successes: [u64; 2], trials: [u64; 2]) -> Option<f64> {
  if trials.iter().any(|&n| n == 0) || successes[0] > trials[0] || successes[1] > trials[1] {
    return None;
  }
  let (x1, x2) = (successes[0] as f64, successes[1] as f64);
  let (n1, n2) = (trials[0] as f64, trials[1] as f64);

  let pooled = (x1 + x2) / (n1 + n2);
  let var = pooled * (1.0 - pooled) * (1.0 / n1 + 1.0 / n2);
  if var <= 0.0 {
    return None;
  }
  let z = (x1 / n1 - x2 / n2) / var.sqrt();
  Some((2.0 * normal_sf(z.abs())).min(1.0))
}

/// Round half away from zero to `places` decimals.
pub fn round_to(v: f64, places: i32) -> f64 {
  let f = 10f64.powi(places);
  (v * f).round() / f
}
