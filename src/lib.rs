//! # Momentstats
//!
//! Mergeable running moments for Rust.
//!
//! Momentstats computes the mean, variance, skewness and excess kurtosis of a
//! numeric stream without storing the samples, and merges independently
//! computed accumulators into one covering the combined data.
//!
//! ## Features
//!
//! - **Single pass**: Welford's numerically stable recurrence
//! - **Full Mergeability**: Chan's pairwise formula for distributed merges
//! - **Checked queries**: explicit errors for ill-defined statistics
//! - **Persisted state**: read and write the `[count, m1, m2, m3, m4]` shape
//!
//! ## Quick Start
//!
//! ```rust
//! use momentstats::prelude::*;
//!
//! let mut stats = MomentAccumulator::new();
//! for value in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
//!     stats.add(value);
//! }
//! println!("{} (skew {})", stats, stats.skewness());
//! ```
//!
//! ## Distributed Computing
//!
//! Accumulators implement the [`Sketch`](traits::Sketch) trait, which includes
//! a `merge` operation, and also offer a non-mutating `combine`:
//!
//! ```rust
//! use momentstats::statistics::MomentAccumulator;
//! use momentstats::traits::Sketch;
//!
//! let mut worker1 = MomentAccumulator::new();
//! let mut worker2 = MomentAccumulator::new();
//!
//! // Each worker processes its partition
//! worker1.add(1.0);
//! worker2.add(3.0);
//!
//! // Merge results
//! worker1.merge(&worker2).unwrap();
//! assert_eq!(worker1.mean(), 2.0);
//! ```
//!
//! ## Persisted Scale
//!
//! [`MomentAccumulator::from_sample`] and [`MomentAccumulator::from_parts`]
//! read persisted data and divide every moment by ten. Use the `from_raw_*`
//! constructors or [`MomentAccumulator::add`] for live samples.
//!
//! ## Feature Flags
//!
//! - `std` (default): Standard library support, libm otherwise
//! - `serde`: Serialization of the persisted shape
//! - `parallel`: Rayon reductions over slices
//! - `full`: Enable all of the above

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod statistics;
pub mod traits;

mod math;

pub mod prelude {
    pub use crate::error::{DecodeError, MomentsError};
    pub use crate::statistics::{MomentAccumulator, MomentSummary, PersistedMoments};
    pub use crate::traits::*;
}

pub use error::{DecodeError, MomentsError};
pub use statistics::MomentAccumulator;
