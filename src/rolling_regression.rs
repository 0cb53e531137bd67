use num_traits::Float;

use crate::{Kbn, RegressionError, Window, WindowStats, error::validate_window};

/// Number of evictions between two accumulator rebuilds by default
pub const DEFAULT_RESYNC_INTERVAL: usize = 256;

/// Streaming rolling regression of `y` on `x` over a fixed-size window of pairs.
///
/// `RollingRegression<T>` keeps the trailing `period` pairs in a circular buffer
/// together with compensated running sums of `x`, `y`, `x * x` and `x * y`,
/// taken as deviations from a recent pair.
/// Each push subtracts the evicted pair and adds the new one, so every update
/// is O(1). Subtracting large sums accumulates rounding error, so the sums are
/// rebuilt from the buffer every `resync_interval` evictions.
///
/// Pairs with a non-finite component are kept in the window but left out of
/// the sums; while any of them is inside the window no statistics are reported.
///
/// # Examples
///
/// ```
/// use ta_regression::RollingRegression;
/// use assert_approx_eq::assert_approx_eq;
///
/// let mut reg = RollingRegression::<f64>::try_new(3).unwrap();
/// let mut slopes = vec![];
/// let inputs = [(1.0, 2.0), (2.0, 4.0), (3.0, 6.5), (4.0, 8.0), (5.0, 9.0)];
/// inputs.iter().for_each(|i| {
///     reg.next(*i).slope().map(|v| slopes.push(v));
/// });
///
/// let expected: [f64; 3] = [2.25, 2.0, 1.25];
/// for (i, e) in expected.iter().enumerate() {
///     assert_approx_eq!(e, slopes[i], 1e-9);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RollingRegression<T> {
    /// Regression period
    period: usize,
    /// Fixed circular buffer of `(x, y)` pairs
    buf: Window<(T, T)>,
    /// Latest pair pushed into the window
    value: Option<(T, T)>,
    /// Pair evicted by the latest push, only available after full window
    popped: Option<(T, T)>,
    /// Number of pairs in the window with a non-finite component
    missing: usize,
    /// Evictions between accumulator rebuilds, 0 disables rebuilds
    resync_interval: usize,
    /// Evictions since the last rebuild
    since_resync: usize,
    /// Latest `x` pushed into the window
    last_x: Option<T>,
    /// Number of trailing pushes that repeated `last_x`, including it
    run: usize,
    /// Running sums of the finite pairs in the window
    sums: Sums<T>,
}

/// Compensated moment sums of a set of pairs, taken as deviations from an origin
///
/// The origin is the first pair added after a rebuild, so the sums stay on the
/// scale of the spread of the window rather than the magnitude of its values.
#[derive(Debug, Clone)]
struct Sums<T> {
    /// Pair every added value is shifted by
    origin: Option<(T, T)>,
    /// Sum of inputs
    sum: (Kbn<T>, Kbn<T>),
    /// Sum of squares of `x`
    sum_sq_x: Kbn<T>,
    /// Sum of products of `x` and `y`
    sum_prod: Kbn<T>,
}

impl<T: Float> Default for Sums<T> {
    fn default() -> Self {
        Self {
            origin: None,
            sum: (Kbn::default(), Kbn::default()),
            sum_sq_x: Kbn::default(),
            sum_prod: Kbn::default(),
        }
    }
}

impl<T: Float> Sums<T> {
    #[inline]
    fn shift(&mut self, (x, y): (T, T)) -> (T, T) {
        let (x0, y0) = *self.origin.get_or_insert((x, y));
        (x - x0, y - y0)
    }

    #[inline]
    fn add(&mut self, pair: (T, T)) {
        let (dx, dy) = self.shift(pair);
        self.sum.0 += dx;
        self.sum.1 += dy;
        self.sum_sq_x += dx * dx;
        self.sum_prod += dx * dy;
    }

    #[inline]
    fn remove(&mut self, pair: (T, T)) {
        let (dx, dy) = self.shift(pair);
        self.sum.0 -= dx;
        self.sum.1 -= dy;
        self.sum_sq_x -= dx * dx;
        self.sum_prod -= dx * dy;
    }

    fn solve(&self, count: usize) -> Option<WindowStats<T>> {
        WindowStats::from_moments(
            count,
            self.origin?,
            self.sum.0.total(),
            self.sum.1.total(),
            self.sum_sq_x.total(),
            self.sum_prod.total(),
        )
    }
}

#[inline]
fn is_missing<T: Float>((x, y): (T, T)) -> bool {
    !(x.is_finite() && y.is_finite())
}

impl<T> RollingRegression<T>
where
    T: Default + Copy + Float,
{
    /// Creates a new `RollingRegression` with the specified period.
    ///
    /// # Arguments
    ///
    /// * `period` - The number of trailing pairs each regression covers
    ///
    /// # Returns
    ///
    /// * `Result<Self, RegressionError>` - The regressor, or `InvalidWindow` if `period < 2`
    pub fn try_new(period: usize) -> Result<Self, RegressionError> {
        let period = validate_window(period)?;
        Ok(Self {
            period,
            buf: Window::new(period),
            value: None,
            popped: None,
            missing: 0,
            resync_interval: DEFAULT_RESYNC_INTERVAL,
            since_resync: 0,
            last_x: None,
            run: 0,
            sums: Sums::default(),
        })
    }

    /// Returns the period of the regression
    #[inline]
    pub const fn period(&self) -> usize {
        self.period
    }

    /// Returns the number of pairs currently in the window
    #[inline]
    pub const fn count(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` once the window holds `period` pairs
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.buf.is_full()
    }

    /// Returns the latest pair pushed into the window
    pub const fn value(&self) -> Option<(T, T)> {
        self.value
    }

    /// Returns the pair evicted by the latest push
    pub const fn popped(&self) -> Option<(T, T)> {
        self.popped
    }

    /// Returns the number of evictions between accumulator rebuilds
    pub const fn resync_interval(&self) -> usize {
        self.resync_interval
    }

    /// Sets the number of evictions between accumulator rebuilds
    ///
    /// # Arguments
    ///
    /// * `interval` - Evictions between rebuilds, `0` never rebuilds
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The regressor
    pub const fn set_resync_interval(&mut self, interval: usize) -> &mut Self {
        self.resync_interval = interval;
        self
    }

    /// Resets the regressor, keeping period and resync interval
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The regressor
    pub fn reset(&mut self) -> &mut Self {
        self.buf.reset();
        self.value = None;
        self.popped = None;
        self.missing = 0;
        self.since_resync = 0;
        self.last_x = None;
        self.run = 0;
        self.sums = Sums::default();
        self
    }

    /// Pushes a new `(x, y)` pair into the rolling window
    ///
    /// # Arguments
    ///
    /// * `value` - The `(x, y)` pair, `x` independent and `y` dependent
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The regressor for method chaining
    pub fn next(&mut self, value: (T, T)) -> &mut Self {
        self.value = Some(value);
        self.popped = self.buf.push(value);

        self.run = if self.last_x == Some(value.0) { self.run + 1 } else { 1 };
        self.last_x = Some(value.0);

        if let Some(popped) = self.popped {
            if is_missing(popped) {
                self.missing -= 1;
            } else {
                self.sums.remove(popped);
            }
            self.since_resync += 1;
        }

        if is_missing(value) {
            self.missing += 1;
        } else {
            self.sums.add(value);
        }

        if self.resync_interval > 0 && self.since_resync >= self.resync_interval {
            self.recompute();
        }
        self
    }

    /// Rebuilds the running sums from the pairs in the window, discarding
    /// rounding error accumulated by add/remove updates and moving the origin
    /// of the sums to the oldest finite pair
    ///
    /// # Returns
    ///
    /// * `&mut Self` - The regressor
    pub fn recompute(&mut self) -> &mut Self {
        log::trace!(
            "rolling regression: rebuilding sums after {} evictions (period {})",
            self.since_resync,
            self.period
        );
        let mut sums = Sums::default();
        self.buf
            .iter()
            .filter(|pair| !is_missing(**pair))
            .for_each(|pair| sums.add(*pair));
        self.sums = sums;
        self.since_resync = 0;
        self
    }

    /// Returns the regression solve of the current window
    ///
    /// # Returns
    ///
    /// * `Option<WindowStats<T>>` - The statistics, or `None` if the window is not
    ///   full or holds a non-finite pair
    pub fn stats(&self) -> Option<WindowStats<T>> {
        if !self.is_ready() || self.missing > 0 {
            return None;
        }
        let stats = self.sums.solve(self.period)?;
        // every x in the window equal: no variance to divide by
        if self.run >= self.period {
            Some(stats.into_degenerate())
        } else {
            Some(stats)
        }
    }

    /// Returns the slope of `y` on `x` over the window
    ///
    /// # Returns
    ///
    /// * `Option<T>` - The slope, or `None` if the window is not full, holds a
    ///   non-finite pair, or `x` has no variance
    pub fn slope(&self) -> Option<T> {
        self.stats()?.slope
    }

    /// Returns the intercept of the regression line over the window
    ///
    /// # Returns
    ///
    /// * `Option<T>` - The intercept, `None` under the same conditions as [`Self::slope`]
    pub fn intercept(&self) -> Option<T> {
        self.stats()?.intercept
    }

    /// Returns the regression line evaluated at the latest `x`
    ///
    /// # Examples
    ///
    /// ```
    /// use ta_regression::RollingRegression;
    /// use assert_approx_eq::assert_approx_eq;
    ///
    /// let mut reg = RollingRegression::<f64>::try_new(3).unwrap();
    /// for pair in [(1.0, 1.0), (2.0, 3.0), (3.0, 2.0)] {
    ///     reg.next(pair);
    /// }
    /// // slope 0.5, intercept 1.0
    /// assert_approx_eq!(reg.fitted().unwrap(), 2.5);
    /// assert_approx_eq!(reg.residual().unwrap(), -0.5);
    /// ```
    pub fn fitted(&self) -> Option<T> {
        let (x, _) = self.value?;
        self.stats()?.fitted_at(x)
    }

    /// Returns the latest `y` minus the regression line evaluated at the latest `x`
    pub fn residual(&self) -> Option<T> {
        let (x, y) = self.value?;
        self.stats()?.residual_at(x, y)
    }
}
