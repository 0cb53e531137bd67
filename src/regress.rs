use num_traits::Float;

use alloc::vec::Vec;

use crate::{
    DEFAULT_RESYNC_INTERVAL, OutputSet, RegressOutput, RegressionError, RegressionSeries,
    RollingRegression, WindowStats, error::validate_window,
};

/// How each window's regression is solved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Recompute means and centered sums for every window, O(N * window)
    Direct,
    /// Rolling compensated moment sums, O(N)
    Incremental {
        /// Evictions between accumulator rebuilds, `0` never rebuilds
        resync_interval: usize,
    },
}

impl Default for Method {
    fn default() -> Self {
        Method::Incremental {
            resync_interval: DEFAULT_RESYNC_INTERVAL,
        }
    }
}

/// Batch rolling regression of `y` on `x`.
///
/// Configured with the window, the requested outputs (all of them by default)
/// and the solve [`Method`], then applied to a pair of equal-length series.
///
/// # Examples
///
/// ```
/// use ta_regression::{Method, RegressOutput, Regressor};
/// use assert_approx_eq::assert_approx_eq;
///
/// let x: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];
/// let y: [f64; 5] = [3.0, 5.0, 7.0, 9.0, 11.0];
///
/// let series = Regressor::new(3)
///     .outputs([RegressOutput::Slope, RegressOutput::Intercept])
///     .method(Method::Direct)
///     .apply(&x, &y)
///     .unwrap();
///
/// let slope = series.get(RegressOutput::Slope).unwrap();
/// let intercept = series.get(RegressOutput::Intercept).unwrap();
/// assert!(slope[0].is_nan() && slope[1].is_nan());
/// for i in 2..5 {
///     assert_approx_eq!(slope[i], 2.0);
///     assert_approx_eq!(intercept[i], 1.0);
/// }
/// assert!(series.get(RegressOutput::Residual).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regressor {
    window: usize,
    outputs: OutputSet,
    method: Method,
}

impl Regressor {
    /// Creates a regressor over `window` trailing observations, requesting every output
    ///
    /// The window is validated when the regressor is applied.
    ///
    /// # Arguments
    ///
    /// * `window` - Number of trailing observations per regression
    ///
    /// # Returns
    ///
    /// * `Self` - The regressor, using the default incremental method
    pub fn new(window: usize) -> Self {
        Self {
            window,
            outputs: OutputSet::all(),
            method: Method::default(),
        }
    }

    /// Sets the requested outputs
    ///
    /// # Arguments
    ///
    /// * `outputs` - A single output, an array or slice of outputs, or an [`OutputSet`]
    ///
    /// # Returns
    ///
    /// * `Self` - The regressor
    pub fn outputs(mut self, outputs: impl Into<OutputSet>) -> Self {
        self.outputs = outputs.into();
        self
    }

    /// Sets the solve method
    ///
    /// # Arguments
    ///
    /// * `method` - Direct recomputation or incremental sums
    ///
    /// # Returns
    ///
    /// * `Self` - The regressor
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Returns the window size
    ///
    /// # Returns
    ///
    /// * `usize` - The number of trailing observations per regression
    pub const fn window(&self) -> usize {
        self.window
    }

    /// Returns the requested outputs
    ///
    /// # Returns
    ///
    /// * `OutputSet` - The outputs each run produces
    pub const fn requested(&self) -> OutputSet {
        self.outputs
    }

    /// Returns the solve method
    ///
    /// # Returns
    ///
    /// * `Method` - The method each window is solved with
    pub const fn solve_method(&self) -> Method {
        self.method
    }

    /// Runs the regression of `y` on `x`
    ///
    /// # Arguments
    ///
    /// * `x` - Independent series
    /// * `y` - Dependent series, same length as `x`
    ///
    /// # Returns
    ///
    /// * `Result<RegressionSeries<T>, RegressionError>` - One series of `x.len()` values per
    ///   requested output, `NaN` where no full, finite, non-degenerate window exists
    ///
    /// # Errors
    ///
    /// * `ShapeMismatch` if `x` and `y` differ in length
    /// * `InvalidWindow` if the window is smaller than 2
    pub fn apply<T>(&self, x: &[T], y: &[T]) -> Result<RegressionSeries<T>, RegressionError>
    where
        T: Float + Default,
    {
        if x.len() != y.len() {
            return Err(RegressionError::ShapeMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        let window = validate_window(self.window)?;

        log::debug!(
            "rolling regression: len {}, window {}, method {:?}, outputs {:?}",
            x.len(),
            window,
            self.method,
            self.outputs
        );

        let mut series = RegressionSeries::filled(self.outputs, x.len(), T::nan());
        if self.outputs.is_empty() || window > x.len() {
            return Ok(series);
        }

        match self.method {
            Method::Direct => {
                for end in window - 1..x.len() {
                    let start = end + 1 - window;
                    let (xs, ys) = (&x[start..=end], &y[start..=end]);
                    if !xs.iter().chain(ys).all(|v| v.is_finite()) {
                        continue;
                    }
                    if let Some(stats) = WindowStats::from_window(xs, ys) {
                        write(&mut series, self.outputs, end, &stats, x[end], y[end]);
                    }
                }
            }
            Method::Incremental { resync_interval } => {
                let mut reg = RollingRegression::try_new(window)?;
                reg.set_resync_interval(resync_interval);
                for (i, (&xi, &yi)) in x.iter().zip(y).enumerate() {
                    if let Some(stats) = reg.next((xi, yi)).stats() {
                        write(&mut series, self.outputs, i, &stats, xi, yi);
                    }
                }
            }
        }

        Ok(series)
    }
}

#[inline]
fn write<T: Float>(
    series: &mut RegressionSeries<T>,
    outputs: OutputSet,
    i: usize,
    stats: &WindowStats<T>,
    x: T,
    y: T,
) {
    for output in outputs.iter() {
        if let Some(values) = series.series_mut(output) {
            values[i] = stats.project(output, x, y);
        }
    }
}

/// Rolling regression of `y` on `x` over `window` trailing observations.
///
/// Uses the default incremental method; see [`Regressor`] to choose another.
///
/// # Arguments
///
/// * `x` - Independent series
/// * `y` - Dependent series, same length as `x`
/// * `window` - Number of trailing observations per regression, at least 2
/// * `outputs` - The statistics to compute
///
/// # Returns
///
/// * `Result<RegressionSeries<T>, RegressionError>` - One series per requested output
///
/// # Examples
///
/// ```
/// use ta_regression::{RegressOutput, regress};
///
/// let x: [f64; 3] = [1.0, 1.0, 1.0];
/// let y: [f64; 3] = [5.0, 6.0, 7.0];
///
/// let series = regress(&x, &y, 3, RegressOutput::Slope).unwrap();
/// assert!(series.get(RegressOutput::Slope).unwrap().iter().all(|v| v.is_nan()));
/// ```
pub fn regress<T>(
    x: &[T],
    y: &[T],
    window: usize,
    outputs: impl Into<OutputSet>,
) -> Result<RegressionSeries<T>, RegressionError>
where
    T: Float + Default,
{
    Regressor::new(window).outputs(outputs).apply(x, y)
}

/// Convenience for [`regress`] requesting only [`RegressOutput::Slope`]
///
/// # Returns
///
/// * `Result<Vec<T>, RegressionError>` - The rolling slope series
pub fn rolling_slope<T>(x: &[T], y: &[T], window: usize) -> Result<Vec<T>, RegressionError>
where
    T: Float + Default,
{
    let mut map = regress(x, y, window, RegressOutput::Slope)?.into_map();
    Ok(map.remove(&RegressOutput::Slope).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    const METHODS: [Method; 3] = [
        Method::Direct,
        Method::Incremental {
            resync_interval: DEFAULT_RESYNC_INTERVAL,
        },
        Method::Incremental { resync_interval: 0 },
    ];

    fn run(x: &[f64], y: &[f64], window: usize, method: Method) -> RegressionSeries<f64> {
        match Regressor::new(window).method(method).apply(x, y) {
            Ok(series) => series,
            Err(err) => panic!("regression failed: {err}"),
        }
    }

    fn get(series: &RegressionSeries<f64>, output: RegressOutput) -> &[f64] {
        series.get(output).unwrap_or_default()
    }

    fn random_series(rng: &mut StdRng, len: usize) -> Vec<f64> {
        (0..len).map(|_| rng.r#gen::<f64>()).collect()
    }

    #[test]
    fn shape_mismatch_is_reported_first() {
        let err = regress(&[1.0, 2.0, 3.0], &[1.0, 2.0], 1, OutputSet::all()).err();
        assert_eq!(err, Some(RegressionError::ShapeMismatch { x_len: 3, y_len: 2 }));
    }

    #[test]
    fn window_below_two_is_invalid() {
        for window in [0, 1] {
            let err = regress(&[1.0, 2.0], &[1.0, 2.0], window, OutputSet::all()).err();
            assert_eq!(err, Some(RegressionError::InvalidWindow { window }));
        }
    }

    #[test]
    fn window_longer_than_input_is_all_nan() {
        for method in METHODS {
            let series = run(&[1.0, 2.0, 3.0], &[2.0, 1.0, 0.0], 4, method);
            assert_eq!(series.len(), 3);
            for output in RegressOutput::ALL {
                let values = get(&series, output);
                assert_eq!(values.len(), 3);
                assert!(values.iter().all(|v| v.is_nan()));
            }
        }
    }

    #[test]
    fn empty_inputs_and_empty_output_set() {
        let series = run(&[], &[], 3, Method::default());
        assert!(series.is_empty());
        assert!(get(&series, RegressOutput::Slope).is_empty());

        let series = regress(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], 2, OutputSet::empty());
        assert!(matches!(series, Ok(s) if s.outputs().is_empty() && s.len() == 3));
    }

    #[test]
    fn noiseless_line_end_to_end() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0];

        for method in METHODS {
            let series = run(&x, &y, 3, method);
            let slope = get(&series, RegressOutput::Slope);
            let intercept = get(&series, RegressOutput::Intercept);
            let fitted = get(&series, RegressOutput::Fitted);
            let residual = get(&series, RegressOutput::Residual);

            for output in RegressOutput::ALL {
                let values = get(&series, output);
                assert_eq!(values.len(), x.len());
                assert!(values[..2].iter().all(|v| v.is_nan()));
            }
            for i in 2..5 {
                assert_approx_eq!(slope[i], 2.0, 1e-12);
                assert_approx_eq!(intercept[i], 0.0, 1e-12);
                assert_approx_eq!(fitted[i], y[i], 1e-12);
                assert_approx_eq!(residual[i], 0.0, 1e-12);
            }
        }
    }

    #[test]
    fn affine_relation_recovers_coefficients() {
        let mut rng = StdRng::seed_from_u64(7);
        let x: Vec<f64> = (0..200).map(|_| rng.gen_range(-50.0..50.0)).collect();
        let y: Vec<f64> = x.iter().map(|v| -0.75 * v + 12.5).collect();

        for method in METHODS {
            let series = run(&x, &y, 10, method);
            let slope = get(&series, RegressOutput::Slope);
            let intercept = get(&series, RegressOutput::Intercept);
            let residual = get(&series, RegressOutput::Residual);
            for i in 9..x.len() {
                assert_approx_eq!(slope[i], -0.75, 1e-9);
                assert_approx_eq!(intercept[i], 12.5, 1e-9);
                assert_approx_eq!(residual[i], 0.0, 1e-9);
            }
        }
    }

    #[test]
    fn constant_x_slope_is_nan() {
        for method in METHODS {
            let series = run(&[1.0, 1.0, 1.0], &[5.0, 6.0, 7.0], 3, method);
            for output in RegressOutput::ALL {
                let values = get(&series, output);
                assert!(values.iter().all(|v| v.is_nan()));
            }
        }
    }

    #[test]
    fn two_point_window_is_secant() {
        let x = [0.5, 1.5, 1.0, 4.0, -2.0, 3.25];
        let y = [1.0, -2.0, 0.5, 7.0, 3.0, 3.5];

        for method in METHODS {
            let series = run(&x, &y, 2, method);
            let slope = get(&series, RegressOutput::Slope);
            assert!(slope[0].is_nan());
            for i in 1..x.len() {
                let secant = (y[i] - y[i - 1]) / (x[i] - x[i - 1]);
                assert_approx_eq!(slope[i], secant, 1e-12);
            }
        }
    }

    #[test]
    fn nan_blanks_every_window_containing_it() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let y = [1.0, 2.0, f64::NAN, 4.0, 5.0, 6.0, 7.0];

        for method in METHODS {
            let series = run(&x, &y, 3, method);
            let slope = get(&series, RegressOutput::Slope);
            let residual = get(&series, RegressOutput::Residual);
            for i in 0..5 {
                assert!(slope[i].is_nan(), "{method:?} slope[{i}]");
                assert!(residual[i].is_nan(), "{method:?} residual[{i}]");
            }
            assert_approx_eq!(slope[5], 1.0, 1e-12);
            assert_approx_eq!(slope[6], 1.0, 1e-12);
        }
    }

    #[test]
    fn fitted_and_residual_use_current_observation() {
        // window [(1, 1), (2, 3), (3, 2)]: slope 0.5, intercept 1
        let series = run(&[1.0, 2.0, 3.0], &[1.0, 3.0, 2.0], 3, Method::Direct);
        assert_approx_eq!(get(&series, RegressOutput::Slope)[2], 0.5);
        assert_approx_eq!(get(&series, RegressOutput::Intercept)[2], 1.0);
        assert_approx_eq!(get(&series, RegressOutput::Fitted)[2], 2.5);
        assert_approx_eq!(get(&series, RegressOutput::Residual)[2], -0.5);
    }

    #[test]
    fn direct_and_incremental_agree_on_random_inputs() {
        let mut rng = StdRng::seed_from_u64(1000);
        let x = random_series(&mut rng, 1000);
        let y = random_series(&mut rng, 1000);

        let direct = run(&x, &y, 30, Method::Direct);
        for method in &METHODS[1..] {
            let incremental = run(&x, &y, 30, *method);
            for output in RegressOutput::ALL {
                let expected = get(&direct, output);
                let actual = get(&incremental, output);
                assert_eq!(expected.len(), actual.len());
                for (i, (e, a)) in expected.iter().zip(actual).enumerate() {
                    if i < 29 {
                        assert!(e.is_nan() && a.is_nan());
                    } else {
                        assert_approx_eq!(e, a, 1e-6 * e.abs().max(1.0));
                    }
                }
            }
        }
    }

    #[test]
    fn methods_agree_on_offset_percent_changes() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut a = vec![100.0];
        let mut b = vec![50.0];
        for _ in 1..1000 {
            let (pa, pb) = (a[a.len() - 1], b[b.len() - 1]);
            a.push(pa * (1.0 + rng.gen_range(-0.02..0.02)));
            b.push(pb * (1.0 + rng.gen_range(-0.02..0.02)));
        }
        let x = crate::pct_change(&a);
        let y = crate::pct_change(&b);

        let direct = run(&x, &y, 30, Method::Direct);
        let incremental = run(&x, &y, 30, Method::default());
        let expected = get(&direct, RegressOutput::Slope);
        let actual = get(&incremental, RegressOutput::Slope);
        // the leading NaN of the transform blanks one extra window
        assert!(expected[..30].iter().all(|v| v.is_nan()));
        assert!(actual[..30].iter().all(|v| v.is_nan()));
        for i in 30..x.len() {
            assert_approx_eq!(expected[i], actual[i], 1e-6 * expected[i].abs().max(1.0));
        }
    }

    #[test]
    fn large_offset_keeps_unit_slope() {
        let x = [1e9, 1e9 + 1.0, 1e9 + 2.0, 1e9 + 3.0];
        let y = [0.0, 1.0, 2.0, 3.0];

        for method in METHODS {
            let series = run(&x, &y, 3, method);
            let slope = get(&series, RegressOutput::Slope);
            let residual = get(&series, RegressOutput::Residual);
            assert!(slope[..2].iter().all(|v| v.is_nan()));
            for i in 2..4 {
                assert_approx_eq!(slope[i], 1.0, 1e-9);
                assert_approx_eq!(residual[i], 0.0, 1e-6);
            }
        }
    }

    #[test]
    fn epoch_seconds_recover_analytic_slope() {
        let x: Vec<f64> = (0..600).map(|i| 1.7e9 + i as f64).collect();
        let y: Vec<f64> = (0..600).map(|i| 0.5 * i as f64 + 3.0).collect();

        let direct = run(&x, &y, 30, Method::Direct);
        let expected = get(&direct, RegressOutput::Slope);
        for method in METHODS {
            let series = run(&x, &y, 30, method);
            let slope = get(&series, RegressOutput::Slope);
            let intercept = get(&series, RegressOutput::Intercept);
            let fitted = get(&series, RegressOutput::Fitted);
            assert!(slope[..29].iter().all(|v| v.is_nan()));
            for i in 29..x.len() {
                assert_approx_eq!(slope[i], 0.5, 1e-6);
                assert_approx_eq!(slope[i], expected[i], 1e-6);
                assert_approx_eq!(intercept[i], 3.0 - 0.85e9, 1e-1);
                assert_approx_eq!(fitted[i], y[i], 1e-4);
            }
        }
    }

    #[test]
    fn methods_agree_with_large_common_offset() {
        let mut rng = StdRng::seed_from_u64(1_000_000);
        let x: Vec<f64> = (0..1000).map(|_| 1e6 + rng.r#gen::<f64>()).collect();
        let y: Vec<f64> = (0..1000).map(|_| 1e6 + rng.r#gen::<f64>()).collect();

        let direct = run(&x, &y, 30, Method::Direct);
        for method in &METHODS[1..] {
            let incremental = run(&x, &y, 30, *method);
            let expected = get(&direct, RegressOutput::Slope);
            let actual = get(&incremental, RegressOutput::Slope);
            for i in 29..x.len() {
                assert!(expected[i].is_finite(), "direct slope[{i}]");
                assert_approx_eq!(expected[i], actual[i], 1e-6 * expected[i].abs().max(1.0));
            }
        }

        // noiseless relation on the same offset x
        let y: Vec<f64> = x.iter().map(|v| -0.75 * (v - 1e6) + 12.0).collect();
        for method in METHODS {
            let series = run(&x, &y, 30, method);
            let slope = get(&series, RegressOutput::Slope);
            let residual = get(&series, RegressOutput::Residual);
            for i in 29..x.len() {
                assert_approx_eq!(slope[i], -0.75, 1e-6);
                assert_approx_eq!(residual[i], 0.0, 1e-6);
            }
        }
    }

    #[test]
    fn constant_window_after_varying_data() {
        let x = [1.0, 2.0, 0.1, 0.1, 0.1, 0.3];
        let y = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];

        for method in METHODS {
            let series = run(&x, &y, 3, method);
            let slope = get(&series, RegressOutput::Slope);
            assert!(slope[2].is_finite() && slope[3].is_finite(), "{method:?}");
            assert!(slope[4].is_nan(), "{method:?}");
            assert!(slope[5].is_finite(), "{method:?}");
        }
    }

    #[test]
    fn streaming_matches_batch() {
        let mut rng = StdRng::seed_from_u64(3);
        let x = random_series(&mut rng, 300);
        let y = random_series(&mut rng, 300);
        let series = run(&x, &y, 16, Method::default());
        let slope = get(&series, RegressOutput::Slope);

        let Ok(mut reg) = RollingRegression::try_new(16) else {
            panic!("period 16 is valid");
        };
        for (i, pair) in x.iter().copied().zip(y.iter().copied()).enumerate() {
            match reg.next(pair).slope() {
                Some(v) => assert_eq!(v, slope[i]),
                None => assert!(slope[i].is_nan()),
            }
        }
    }

    #[test]
    fn rolling_slope_and_f32() {
        let x = [1.0f32, 2.0, 4.0, 8.0];
        let y = [1.0f32, 3.0, 7.0, 15.0];
        let Ok(slope) = rolling_slope(&x, &y, 2) else {
            panic!("inputs are valid");
        };
        assert_eq!(slope.len(), 4);
        assert!(slope[0].is_nan());
        for v in &slope[1..] {
            assert_approx_eq!(*v, 2.0f32, 1e-5);
        }
    }

    #[test]
    fn builder_accessors() {
        let reg = Regressor::new(5)
            .outputs(RegressOutput::Residual)
            .method(Method::Direct);
        assert_eq!(reg.window(), 5);
        assert_eq!(reg.requested(), OutputSet::from(RegressOutput::Residual));
        assert_eq!(reg.solve_method(), Method::Direct);
        assert_eq!(
            Regressor::new(5).solve_method(),
            Method::Incremental {
                resync_interval: DEFAULT_RESYNC_INTERVAL
            }
        );
    }
}
