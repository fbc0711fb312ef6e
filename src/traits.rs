//! Core traits for streaming accumulators
//!
//! Every accumulator implements [`Sketch`], which is what makes it usable in
//! distributed pipelines: workers update local copies and a coordinator
//! merges them.

use core::fmt::Debug;

/// Error during accumulator merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// The combined sample count does not fit in a `u64`
    #[error("sample count overflow: {left} + {right} exceeds u64::MAX")]
    CountOverflow { left: u64, right: u64 },
}

/// Core trait for all streaming accumulators
pub trait Sketch: Clone + Debug {
    /// The type of item this sketch processes
    type Item: ?Sized;

    /// Add an item to the sketch
    fn update(&mut self, item: &Self::Item);

    /// Merge another sketch into this one
    ///
    /// Returns an error if the sketches cannot be combined
    fn merge(&mut self, other: &Self) -> Result<(), MergeError>;

    /// Reset sketch to empty state
    fn clear(&mut self);

    /// Memory usage in bytes
    fn size_bytes(&self) -> usize;

    /// Number of items processed
    fn count(&self) -> u64;

    /// Check if sketch is empty
    fn is_empty(&self) -> bool {
        self.count() == 0
    }
}
