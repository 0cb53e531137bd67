use ahash::RandomState;
use hashbrown::HashMap;

use alloc::vec::Vec;

/// A statistic derived from the per-window regression solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegressOutput {
    /// Slope of the regression line
    Slope,
    /// Intercept of the regression line
    Intercept,
    /// Regression line evaluated at the current `x`
    Fitted,
    /// Current `y` minus the fitted value
    Residual,
}

impl RegressOutput {
    /// Every output, in canonical order
    pub const ALL: [RegressOutput; 4] = [
        RegressOutput::Slope,
        RegressOutput::Intercept,
        RegressOutput::Fitted,
        RegressOutput::Residual,
    ];

    /// Returns the lowercase name of the output
    pub const fn name(self) -> &'static str {
        match self {
            RegressOutput::Slope => "slope",
            RegressOutput::Intercept => "intercept",
            RegressOutput::Fitted => "fitted",
            RegressOutput::Residual => "residual",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            RegressOutput::Slope => 1,
            RegressOutput::Intercept => 1 << 1,
            RegressOutput::Fitted => 1 << 2,
            RegressOutput::Residual => 1 << 3,
        }
    }
}

impl core::fmt::Display for RegressOutput {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of outputs requested from a regression run
///
/// # Examples
///
/// ```
/// use ta_regression::{OutputSet, RegressOutput};
///
/// let set = OutputSet::from([RegressOutput::Slope, RegressOutput::Residual]);
/// assert!(set.contains(RegressOutput::Slope));
/// assert!(!set.contains(RegressOutput::Fitted));
/// assert_eq!(set.len(), 2);
///
/// let all = OutputSet::all();
/// assert_eq!(all.iter().collect::<Vec<_>>(), RegressOutput::ALL.to_vec());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OutputSet(u8);

impl OutputSet {
    /// Returns a set with no outputs
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns a set with every output
    pub const fn all() -> Self {
        Self(0b1111)
    }

    /// Returns the set with `output` added
    pub const fn with(self, output: RegressOutput) -> Self {
        Self(self.0 | output.bit())
    }

    /// Returns `true` if `output` is in the set
    pub const fn contains(&self, output: RegressOutput) -> bool {
        self.0 & output.bit() != 0
    }

    /// Returns the number of outputs in the set
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns `true` if no output is requested
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns the outputs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = RegressOutput> + '_ {
        RegressOutput::ALL
            .into_iter()
            .filter(move |output| self.contains(*output))
    }
}

impl From<RegressOutput> for OutputSet {
    fn from(output: RegressOutput) -> Self {
        Self::empty().with(output)
    }
}

impl<const N: usize> From<[RegressOutput; N]> for OutputSet {
    fn from(outputs: [RegressOutput; N]) -> Self {
        outputs.into_iter().collect()
    }
}

impl From<&[RegressOutput]> for OutputSet {
    fn from(outputs: &[RegressOutput]) -> Self {
        outputs.iter().copied().collect()
    }
}

impl FromIterator<RegressOutput> for OutputSet {
    fn from_iter<I: IntoIterator<Item = RegressOutput>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

/// Output series of a regression run, keyed by the requested outputs
///
/// Every series has the length of the input and is aligned index for index
/// with it; positions without a defined value hold `NaN`.
#[derive(Debug, Clone)]
pub struct RegressionSeries<T> {
    /// Length shared by every series
    len: usize,
    /// One series per requested output
    series: HashMap<RegressOutput, Vec<T>, RandomState>,
}

impl<T> RegressionSeries<T> {
    /// Allocates one series of `len` fill values per requested output
    pub(crate) fn filled(outputs: OutputSet, len: usize, fill: T) -> Self
    where
        T: Copy,
    {
        let mut series = HashMap::with_capacity_and_hasher(outputs.len(), RandomState::default());
        for output in outputs.iter() {
            series.insert(output, vec![fill; len]);
        }
        Self { len, series }
    }

    pub(crate) fn series_mut(&mut self, output: RegressOutput) -> Option<&mut [T]> {
        self.series.get_mut(&output).map(Vec::as_mut_slice)
    }

    /// Returns the series of `output`, or `None` if it was not requested
    pub fn get(&self, output: RegressOutput) -> Option<&[T]> {
        self.series.get(&output).map(Vec::as_slice)
    }

    /// Returns `true` if `output` was requested
    pub fn contains(&self, output: RegressOutput) -> bool {
        self.series.contains_key(&output)
    }

    /// Returns the set of outputs carried
    pub fn outputs(&self) -> OutputSet {
        self.series.keys().copied().collect()
    }

    /// Returns the length of every series, equal to the input length
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the input was empty
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns an iterator over `(output, series)` pairs in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (RegressOutput, &[T])> {
        self.series
            .iter()
            .map(|(output, values)| (*output, values.as_slice()))
    }

    /// Consumes the result and returns the underlying map
    pub fn into_map(self) -> HashMap<RegressOutput, Vec<T>, RandomState> {
        self.series
    }
}
