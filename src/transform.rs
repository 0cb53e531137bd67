use num_traits::Float;

use alloc::vec::Vec;

/// Returns the one-step relative change `values[i] / values[i - 1] - 1`.
///
/// The first position has no predecessor and holds `NaN`, as does every
/// position whose predecessor is zero. The result is aligned with `values`.
///
/// Regressing percent changes rather than levels is the usual way to estimate
/// a beta between two instruments.
///
/// # Examples
///
/// ```
/// use ta_regression::{RegressOutput, pct_change, regress};
/// use assert_approx_eq::assert_approx_eq;
///
/// let returns = pct_change(&[100.0f64, 110.0, 99.0, 0.0, 5.0]);
/// assert!(returns[0].is_nan());
/// assert_approx_eq!(returns[1], 0.1);
/// assert_approx_eq!(returns[2], -0.1);
/// assert_approx_eq!(returns[3], -1.0);
/// assert!(returns[4].is_nan());
///
/// let market = pct_change(&[10.0f64, 10.5, 10.2, 10.8, 11.0]);
/// let asset = market.iter().map(|r| 1.5 * r).collect::<Vec<_>>();
/// let beta = regress(&market, &asset, 3, RegressOutput::Slope).unwrap();
/// assert_approx_eq!(beta.get(RegressOutput::Slope).unwrap()[4], 1.5);
/// ```
pub fn pct_change<T: Float>(values: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(T::nan());
    out.extend(values.windows(2).map(|w| {
        if w[0].is_zero() {
            T::nan()
        } else {
            w[1] / w[0] - T::one()
        }
    }));
    out
}
