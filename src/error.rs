use thiserror::Error;

/// Errors reported by the rolling regression entry points.
///
/// Numerically degenerate windows (no variance in `x`, non-finite samples) are
/// not errors; they surface as `NaN` positions in the output series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegressionError {
    /// The independent and dependent series have different lengths
    #[error("regression: shape mismatch: x has {x_len} values, y has {y_len}")]
    ShapeMismatch {
        /// Length of the independent series
        x_len: usize,
        /// Length of the dependent series
        y_len: usize,
    },
    /// The window can not hold a regression (fewer than two observations)
    #[error("regression: invalid window: {window}, must be at least 2")]
    InvalidWindow {
        /// The rejected window size
        window: usize,
    },
}

/// Checks that a window size can carry a regression
///
/// # Arguments
///
/// * `window` - The window size
///
/// # Returns
///
/// * `Result<usize, RegressionError>` - The window, or `InvalidWindow` if it is smaller than 2
#[inline]
pub(crate) const fn validate_window(window: usize) -> Result<usize, RegressionError> {
    if window < 2 {
        Err(RegressionError::InvalidWindow { window })
    } else {
        Ok(window)
    }
}
