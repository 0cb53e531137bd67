use num_traits::Float;

use crate::RegressOutput;

/// Regression solve of a single full window.
///
/// Computed once per window and projected into whichever outputs were
/// requested. `slope` and `intercept` are `None` when the window is
/// degenerate, i.e. every `x` in it is the same value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats<T> {
    /// Number of observations in the window
    pub count: usize,
    /// Mean of `x`
    pub mean_x: T,
    /// Mean of `y`
    pub mean_y: T,
    /// Sum of squared deviations of `x`
    pub sxx: T,
    /// Sum of cross deviations of `x` and `y`
    pub sxy: T,
    /// Slope of the regression line
    pub slope: Option<T>,
    /// Intercept of the regression line
    pub intercept: Option<T>,
}

impl<T: Float> WindowStats<T> {
    /// Solves the window from moment sums taken relative to an origin
    ///
    /// Summing deviations from an origin close to the data instead of raw values
    /// keeps `sum_sq_x - sum_x * mean_x` from cancelling away the spread of `x`
    /// when the values share a large common offset.
    ///
    /// # Arguments
    ///
    /// * `count` - Number of observations
    /// * `origin` - The `(x0, y0)` every observation was shifted by
    /// * `sum_x` - Sum of `x - x0`
    /// * `sum_y` - Sum of `y - y0`
    /// * `sum_sq_x` - Sum of `(x - x0)^2`
    /// * `sum_prod` - Sum of `(x - x0) * (y - y0)`
    ///
    /// # Returns
    ///
    /// * `Option<Self>` - The window statistics, or `None` if `count` is zero
    pub fn from_moments(
        count: usize,
        (x0, y0): (T, T),
        sum_x: T,
        sum_y: T,
        sum_sq_x: T,
        sum_prod: T,
    ) -> Option<Self> {
        if count == 0 {
            return None;
        }
        let n = T::from(count)?;
        let mean_dx = sum_x / n;
        let mean_dy = sum_y / n;
        // cancellation can leave a tiny negative residue
        let sxx = (sum_sq_x - sum_x * mean_dx).max(T::zero());
        let sxy = sum_prod - sum_x * mean_dy;

        Some(Self::solve(count, x0 + mean_dx, y0 + mean_dy, sxx, sxy, false))
    }

    /// Solves the window from a slice pair by recomputing means and centered sums
    ///
    /// # Arguments
    ///
    /// * `x` - Independent values of the window
    /// * `y` - Dependent values of the window, same length as `x`
    ///
    /// # Returns
    ///
    /// * `Option<Self>` - The window statistics, or `None` if the window is empty
    pub fn from_window(x: &[T], y: &[T]) -> Option<Self> {
        let count = x.len().min(y.len());
        if count == 0 {
            return None;
        }
        let (x, y) = (&x[..count], &y[..count]);
        let n = T::from(count)?;

        let mean_x = x.iter().fold(T::zero(), |acc, &v| acc + v) / n;
        let mean_y = y.iter().fold(T::zero(), |acc, &v| acc + v) / n;

        let (sxx, sxy) = x
            .iter()
            .zip(y)
            .fold((T::zero(), T::zero()), |(sxx, sxy), (&xi, &yi)| {
                let dx = xi - mean_x;
                (sxx + dx * dx, sxy + dx * (yi - mean_y))
            });
        let constant = x.iter().all(|&v| v == x[0]);

        Some(Self::solve(count, mean_x, mean_y, sxx, sxy, constant))
    }

    /// Marks the window as having no variance in `x`, dropping the fit
    pub(crate) fn into_degenerate(self) -> Self {
        Self {
            slope: None,
            intercept: None,
            ..self
        }
    }

    /// A constant `x` has no regression line; the rounding residue of its
    /// centered sum must not be divided by
    fn solve(count: usize, mean_x: T, mean_y: T, sxx: T, sxy: T, constant: bool) -> Self {
        let slope = (!constant && sxx > T::zero()).then_some(sxy / sxx);
        let intercept = slope.map(|slope| mean_y - slope * mean_x);

        Self {
            count,
            mean_x,
            mean_y,
            sxx,
            sxy,
            slope,
            intercept,
        }
    }

    /// Returns `true` if `x` had no variance in the window
    pub fn is_degenerate(&self) -> bool {
        self.slope.is_none()
    }

    /// Evaluates the regression line at `x`
    pub fn fitted_at(&self, x: T) -> Option<T> {
        self.slope
            .zip(self.intercept)
            .map(|(slope, intercept)| slope * x + intercept)
    }

    /// Returns `y` minus the regression line evaluated at `x`
    pub fn residual_at(&self, x: T, y: T) -> Option<T> {
        self.fitted_at(x).map(|fitted| y - fitted)
    }

    /// Projects the solve into one output for the observation `(x, y)`
    ///
    /// # Returns
    ///
    /// * `T` - The requested statistic, `NaN` for a degenerate window
    pub fn project(&self, output: RegressOutput, x: T, y: T) -> T {
        match output {
            RegressOutput::Slope => self.slope,
            RegressOutput::Intercept => self.intercept,
            RegressOutput::Fitted => self.fitted_at(x),
            RegressOutput::Residual => self.residual_at(x, y),
        }
        .unwrap_or_else(T::nan)
    }
}
