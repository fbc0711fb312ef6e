//! Error types for statistic queries and persisted-state decoding

/// A derived statistic that cannot be computed from the accumulated data
///
/// Only returned by the `checked_*` query family. The plain queries follow
/// IEEE semantics and yield NaN or infinity instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MomentsError {
    /// Fewer samples than the statistic needs
    #[error("insufficient samples: need at least {required}, have {found}")]
    InsufficientSamples { required: u64, found: u64 },
    /// All samples are identical, so the second moment is zero
    #[error("degenerate distribution: second central moment is zero")]
    DegenerateDistribution,
    /// The computation overflowed or hit a negative square root
    #[error("{statistic} is not finite")]
    NonFinite { statistic: &'static str },
}

/// Error decoding a persisted `[count, m1, m2, m3, m4]` sequence
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// Sequence does not have exactly five elements
    #[error("wrong length: expected {expected} elements, found {found}")]
    WrongLength { expected: usize, found: usize },
    /// Count is negative, fractional or not finite
    #[error("invalid sample count: {0}")]
    InvalidCount(f64),
    /// One of the moment sums is NaN or infinite
    #[error("moment at index {index} is not finite")]
    NonFiniteMoment { index: usize },
}
