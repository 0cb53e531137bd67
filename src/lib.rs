#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), no_std)]
#![deny(
    unsafe_code,
    unused_imports,
    unused_variables,
    unused_must_use,
    missing_docs,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented
)]
#![allow(clippy::len_without_is_empty)]

#[macro_use]
extern crate alloc;

pub(crate) type Kbn<T> = compensated_summation::KahanBabuskaNeumaier<T>;

mod utils;
pub(crate) use utils::Window;

mod error;
pub use error::RegressionError;

mod output;
pub use output::{OutputSet, RegressOutput, RegressionSeries};

mod window_stats;
pub use window_stats::WindowStats;

mod rolling_regression;
pub use rolling_regression::{DEFAULT_RESYNC_INTERVAL, RollingRegression};

mod regress;
pub use regress::{Method, Regressor, regress, rolling_slope};

mod transform;
pub use transform::pct_change;
