//! Statistical summaries for streaming data
//!
//! This module provides a mergeable accumulator of the first four central
//! moments, computed in a single pass with constant memory.
//!
//! # Example
//!
//! ```
//! use momentstats::statistics::MomentAccumulator;
//!
//! let mut stats = MomentAccumulator::new();
//!
//! for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
//!     stats.add(value);
//! }
//!
//! println!("Mean: {}", stats.mean());
//! println!("Stddev: {}", stats.std());
//! println!("Skewness: {}", stats.skewness());
//! println!("Kurtosis: {}", stats.kurtosis());
//! ```

mod moments;
mod persisted;

#[cfg(feature = "parallel")]
mod parallel;

pub use moments::{MomentAccumulator, MomentSummary, PERSISTED_SCALE};
pub use persisted::PersistedMoments;

#[cfg(feature = "parallel")]
#[cfg_attr(docsrs, doc(cfg(feature = "parallel")))]
pub use parallel::{par_combine, par_from_samples};
