//! Parallel reductions over moment accumulators
//!
//! Splits the input into chunks, accumulates each chunk on a rayon worker and
//! merges the partial accumulators in a reduction tree.

use super::MomentAccumulator;
use rayon::prelude::*;

/// Smallest chunk handed to a worker
const MIN_CHUNK: usize = 4096;

/// Accumulate raw samples across the rayon thread pool
///
/// Gives the same statistics as [`MomentAccumulator::from_samples`] up to
/// floating-point rounding.
pub fn par_from_samples(samples: &[f64]) -> MomentAccumulator {
    let chunk = chunk_size(samples.len());
    log::trace!(
        "accumulating {} samples in chunks of {} across {} threads",
        samples.len(),
        chunk,
        rayon::current_num_threads()
    );

    samples
        .par_chunks(chunk)
        .map(MomentAccumulator::from_samples)
        .reduce(MomentAccumulator::empty, |a, b| a.combine(&b))
}

/// Merge many partial accumulators across the rayon thread pool
pub fn par_combine(parts: &[MomentAccumulator]) -> MomentAccumulator {
    parts
        .par_iter()
        .copied()
        .reduce(MomentAccumulator::empty, |a, b| a.combine(&b))
}

fn chunk_size(len: usize) -> usize {
    let threads = rayon::current_num_threads().max(1);
    len.div_ceil(threads).max(MIN_CHUNK)
}
