//! Running central moments (mean, variance, skewness, kurtosis)
//!
//! Computes streaming moments up to the fourth order using Welford's
//! numerically stable recurrence, and merges partial results with the
//! pairwise formula of Chan, Golub and LeVeque.

use crate::error::{DecodeError, MomentsError};
use crate::math;
use crate::statistics::persisted::PersistedMoments;
use crate::traits::{MergeError, Sketch};
use core::fmt;
use core::iter::Sum;

/// Factor between persisted values and the moments they encode.
///
/// Persisted accumulators store every moment multiplied by ten, so the
/// persisted-state constructors ([`MomentAccumulator::from_sample`] and
/// [`MomentAccumulator::from_parts`]) divide by it. The count is never scaled.
pub const PERSISTED_SCALE: f64 = 10.0;

/// Mergeable accumulator of the first four central moments
///
/// Holds the sample count, the running mean and the sums of the 2nd, 3rd and
/// 4th powers of deviations from the mean. Samples are never stored.
///
/// The type is a plain `Copy` value. [`combine`](Self::combine) returns a new
/// accumulator and leaves both operands usable, so partial results computed
/// on separate threads or machines can be merged in any order or tree shape.
///
/// # Scaled constructors
///
/// **[`from_sample`](Self::from_sample) and [`from_parts`](Self::from_parts)
/// divide their moment inputs by [`PERSISTED_SCALE`] (10).** They read the
/// persisted representation, in which moments were written multiplied by ten.
/// Feed live data through [`from_raw_sample`](Self::from_raw_sample),
/// [`from_raw_parts`](Self::from_raw_parts) or [`add`](Self::add) instead.
///
/// # Example
///
/// ```
/// use momentstats::statistics::MomentAccumulator;
///
/// let acc = MomentAccumulator::from_samples(&[1.0, 2.0, 3.0, 4.0, 5.0]);
///
/// assert!((acc.mean() - 3.0).abs() < 1e-12);
/// assert!((acc.variance() - 2.5).abs() < 1e-12);
/// assert!(acc.skewness().abs() < 1e-12);
/// assert!((acc.kurtosis() + 1.3).abs() < 1e-12);
/// ```
///
/// # Distributed Usage
///
/// ```
/// use momentstats::statistics::MomentAccumulator;
///
/// // Worker 1
/// let left = MomentAccumulator::from_samples(&[1.0, 2.0, 3.0]);
/// // Worker 2
/// let right = MomentAccumulator::from_samples(&[4.0, 5.0, 6.0]);
///
/// let merged = left.combine(&right);
/// assert_eq!(merged.count(), 6);
/// assert!((merged.mean() - 3.5).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MomentAccumulator {
    /// Number of samples represented
    count: u64,
    /// Running mean
    m1: f64,
    /// Sum of squared deviations from the mean
    m2: f64,
    /// Sum of cubed deviations
    m3: f64,
    /// Sum of fourth-power deviations
    m4: f64,
}

/// Every derived statistic of an accumulator, computed with the checked queries
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MomentSummary {
    pub count: u64,
    pub mean: f64,
    /// Sample variance (Bessel-corrected)
    pub variance: f64,
    pub std: f64,
    /// Standard error of the mean
    pub mean_std: f64,
    /// `None` when all samples are identical
    pub skewness: Option<f64>,
    /// Excess kurtosis, `None` when all samples are identical
    pub kurtosis: Option<f64>,
}

impl Default for MomentAccumulator {
    fn default() -> Self {
        Self::empty()
    }
}

impl MomentAccumulator {
    /// Create an empty accumulator
    pub const fn empty() -> Self {
        Self {
            count: 0,
            m1: 0.0,
            m2: 0.0,
            m3: 0.0,
            m4: 0.0,
        }
    }

    /// Alias for [`empty`](Self::empty)
    pub const fn new() -> Self {
        Self::empty()
    }

    /// Single-sample accumulator from a persisted (×10) value
    ///
    /// The mean is `value / 10`. Use [`from_raw_sample`](Self::from_raw_sample)
    /// for unscaled data.
    pub fn from_sample(value: f64) -> Self {
        Self::from_raw_sample(value / PERSISTED_SCALE)
    }

    /// Single-sample accumulator holding `value` as is
    pub const fn from_raw_sample(value: f64) -> Self {
        Self {
            count: 1,
            m1: value,
            m2: 0.0,
            m3: 0.0,
            m4: 0.0,
        }
    }

    /// Rebuild an accumulator from persisted components
    ///
    /// Each moment is divided by [`PERSISTED_SCALE`]; `count` is taken as is.
    pub fn from_parts(count: u64, m1: f64, m2: f64, m3: f64, m4: f64) -> Self {
        Self::from_raw_parts(
            count,
            m1 / PERSISTED_SCALE,
            m2 / PERSISTED_SCALE,
            m3 / PERSISTED_SCALE,
            m4 / PERSISTED_SCALE,
        )
    }

    /// Rebuild an accumulator from unscaled components
    ///
    /// A zero count always yields the empty accumulator, whatever the moments.
    pub fn from_raw_parts(count: u64, m1: f64, m2: f64, m3: f64, m4: f64) -> Self {
        if count == 0 {
            if m1 != 0.0 || m2 != 0.0 || m3 != 0.0 || m4 != 0.0 {
                log::debug!("discarding non-zero moments of a zero-count accumulator");
            }
            return Self::empty();
        }

        Self {
            count,
            m1,
            m2,
            m3,
            m4,
        }
    }

    /// Rebuild an accumulator from its persisted shape
    ///
    /// The count of a sequence must be a non-negative integer and every moment
    /// must be finite.
    pub fn from_persisted(persisted: PersistedMoments) -> Result<Self, DecodeError> {
        let result = persisted.validate().map(|persisted| match persisted {
            PersistedMoments::Empty => Self::empty(),
            PersistedMoments::Scalar(value) => Self::from_sample(value),
            PersistedMoments::Parts([count, m1, m2, m3, m4]) => {
                Self::from_parts(count as u64, m1, m2, m3, m4)
            }
        });

        if let Err(ref err) = result {
            log::debug!("rejecting persisted accumulator: {}", err);
        }
        result
    }

    /// Components in persisted (×10) scale: `[count, m1, m2, m3, m4]`
    ///
    /// `from_parts` applied to these values reconstructs this accumulator.
    pub fn to_parts(&self) -> [f64; 5] {
        [
            self.count as f64,
            self.m1 * PERSISTED_SCALE,
            self.m2 * PERSISTED_SCALE,
            self.m3 * PERSISTED_SCALE,
            self.m4 * PERSISTED_SCALE,
        ]
    }

    /// Persisted shape of this accumulator
    ///
    /// Empty accumulators persist as [`PersistedMoments::Empty`], single
    /// samples as a scaled scalar, everything else as a five-element sequence.
    /// A count of one with non-zero higher moments (only reachable through
    /// `from_parts`) keeps the sequence form so nothing is dropped.
    pub fn to_persisted(&self) -> PersistedMoments {
        match self.count {
            0 => PersistedMoments::Empty,
            1 if self.m2 == 0.0 && self.m3 == 0.0 && self.m4 == 0.0 => {
                PersistedMoments::Scalar(self.m1 * PERSISTED_SCALE)
            }
            _ => PersistedMoments::Parts(self.to_parts()),
        }
    }

    /// Accumulate a slice of raw samples
    pub fn from_samples(samples: &[f64]) -> Self {
        let mut acc = Self::empty();
        acc.extend_from_slice(samples);
        acc
    }

    /// Number of samples represented
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Get the number of samples, same as [`count`](Self::count)
    pub fn len(&self) -> u64 {
        self.count
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Running mean (first raw moment)
    pub fn m1(&self) -> f64 {
        self.m1
    }

    /// Sum of squared deviations from the mean
    pub fn m2(&self) -> f64 {
        self.m2
    }

    /// Sum of cubed deviations from the mean
    pub fn m3(&self) -> f64 {
        self.m3
    }

    /// Sum of fourth-power deviations from the mean
    pub fn m4(&self) -> f64 {
        self.m4
    }

    /// Combine two accumulators into one covering both sample sets
    ///
    /// Returns a new accumulator; neither operand changes. Combining with an
    /// empty accumulator returns the other operand unchanged, and two empties
    /// give an empty accumulator.
    ///
    /// # Panics
    ///
    /// Panics if the combined count overflows `u64`. Use
    /// [`try_combine`](Self::try_combine) to handle that case.
    pub fn combine(&self, other: &Self) -> Self {
        match self.try_combine(other) {
            Ok(combined) => combined,
            Err(err) => panic!("{}", err),
        }
    }

    /// Combine two accumulators, failing if the combined count overflows
    pub fn try_combine(&self, other: &Self) -> Result<Self, MergeError> {
        let count = self
            .count
            .checked_add(other.count)
            .ok_or(MergeError::CountOverflow {
                left: self.count,
                right: other.count,
            })?;

        if count == 0 {
            log::trace!("combining two empty accumulators");
            return Ok(Self::empty());
        }
        if other.count == 0 {
            return Ok(*self);
        }
        if self.count == 0 {
            return Ok(*other);
        }

        let (a, b) = (self, other);
        let na = a.count as f64;
        let nb = b.count as f64;
        let n = count as f64;

        let delta = b.m1 - a.m1;
        let delta2 = delta * delta;
        let delta3 = delta2 * delta;
        let delta4 = delta2 * delta2;

        let m1 = (na * a.m1 + nb * b.m1) / n;
        let m2 = a.m2 + b.m2 + delta2 * na * nb / n;
        let m3 = a.m3
            + b.m3
            + delta3 * na * nb * (na - nb) / (n * n)
            + 3.0 * delta * (na * b.m2 - nb * a.m2) / n;
        let m4 = a.m4
            + b.m4
            + delta4 * na * nb * (na * na - na * nb + nb * nb) / (n * n * n)
            + 6.0 * delta2 * (na * na * b.m2 + nb * nb * a.m2) / (n * n)
            + 4.0 * delta * (na * b.m3 - nb * a.m3) / n;

        Ok(Self {
            count,
            m1,
            m2,
            m3,
            m4,
        })
    }

    /// New accumulator with one persisted (×10) sample added
    ///
    /// Equivalent to `self.combine(&MomentAccumulator::from_sample(value))`.
    pub fn with_sample(&self, value: f64) -> Self {
        self.combine(&Self::from_sample(value))
    }

    /// Add a raw sample in place
    ///
    /// Specialises [`combine`](Self::combine) for a single-sample right-hand
    /// side. NaN values are ignored to prevent poisoning the moments.
    pub fn add(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }

        let n1 = self.count as f64;
        self.count += 1;
        let n = self.count as f64;

        let delta = value - self.m1;
        let delta_n = delta / n;
        let delta_n2 = delta_n * delta_n;
        let term1 = delta * delta_n * n1;

        // m4 and m3 read the old m2 and m3, so m2 is updated last.
        self.m1 += delta_n;
        self.m4 += term1 * delta_n2 * (n * n - 3.0 * n + 3.0) + 6.0 * delta_n2 * self.m2
            - 4.0 * delta_n * self.m3;
        self.m3 += term1 * delta_n * (n - 2.0) - 3.0 * delta_n * self.m2;
        self.m2 += term1;
    }

    /// Add every raw sample in a slice
    pub fn extend_from_slice(&mut self, samples: &[f64]) {
        for &value in samples {
            self.add(value);
        }
    }

    /// Get the mean, `0.0` when empty
    pub fn mean(&self) -> f64 {
        self.m1
    }

    /// Get the sum of all samples
    pub fn sum(&self) -> f64 {
        self.m1 * self.count as f64
    }

    /// Get the sample variance, `m2 / (count - 1)`
    ///
    /// Not finite for fewer than two samples.
    pub fn variance(&self) -> f64 {
        // `count - 1` in floating point keeps count 0 from wrapping.
        self.m2 / (self.count as f64 - 1.0)
    }

    /// Get the population variance, `m2 / count`
    pub fn population_variance(&self) -> f64 {
        self.m2 / self.count as f64
    }

    /// Get the sample standard deviation
    pub fn std(&self) -> f64 {
        math::sqrt(self.variance())
    }

    /// Get the standard error of the mean, `std / sqrt(count)`
    pub fn mean_std(&self) -> f64 {
        self.std() / math::sqrt(self.count as f64)
    }

    /// Get the mean together with its standard error
    pub fn mean_with_error(&self) -> (f64, f64) {
        (self.mean(), self.mean_std())
    }

    /// Get the sample skewness, `sqrt(n) * m3 / m2^1.5`
    ///
    /// Not finite when `m2` is zero.
    pub fn skewness(&self) -> f64 {
        math::sqrt(self.count as f64) * self.m3 / (self.m2 * math::sqrt(self.m2))
    }

    /// Get the excess kurtosis, `n * m4 / m2^2 - 3`
    ///
    /// Not finite when `m2` is zero.
    pub fn kurtosis(&self) -> f64 {
        self.count as f64 * self.m4 / (self.m2 * self.m2) - 3.0
    }

    fn require(&self, required: u64) -> Result<(), MomentsError> {
        if self.count < required {
            Err(MomentsError::InsufficientSamples {
                required,
                found: self.count,
            })
        } else {
            Ok(())
        }
    }

    fn require_spread(&self) -> Result<(), MomentsError> {
        self.require(2)?;
        if self.m2 == 0.0 {
            return Err(MomentsError::DegenerateDistribution);
        }
        Ok(())
    }

    /// Mean, or an error when empty
    pub fn checked_mean(&self) -> Result<f64, MomentsError> {
        self.require(1)?;
        finite(self.mean(), "mean")
    }

    /// Sample variance, or an error for fewer than two samples
    pub fn checked_variance(&self) -> Result<f64, MomentsError> {
        self.require(2)?;
        finite(self.variance(), "variance")
    }

    /// Sample standard deviation, or an error for fewer than two samples
    pub fn checked_std(&self) -> Result<f64, MomentsError> {
        let variance = self.checked_variance()?;
        finite(math::sqrt(variance), "standard deviation")
    }

    /// Standard error of the mean, or an error for fewer than two samples
    pub fn checked_mean_std(&self) -> Result<f64, MomentsError> {
        let std = self.checked_std()?;
        finite(std / math::sqrt(self.count as f64), "standard error")
    }

    /// Skewness, or an error when undefined
    pub fn checked_skewness(&self) -> Result<f64, MomentsError> {
        self.require_spread()?;
        finite(self.skewness(), "skewness")
    }

    /// Excess kurtosis, or an error when undefined
    pub fn checked_kurtosis(&self) -> Result<f64, MomentsError> {
        self.require_spread()?;
        finite(self.kurtosis(), "kurtosis")
    }

    /// All derived statistics at once
    ///
    /// Requires at least two samples. Skewness and kurtosis are `None` when
    /// every sample is identical.
    pub fn summary(&self) -> Result<MomentSummary, MomentsError> {
        let shape = |value: Result<f64, MomentsError>| match value {
            Ok(v) => Ok(Some(v)),
            Err(MomentsError::DegenerateDistribution) => Ok(None),
            Err(err) => Err(err),
        };

        Ok(MomentSummary {
            count: self.count,
            mean: self.checked_mean()?,
            variance: self.checked_variance()?,
            std: self.checked_std()?,
            mean_std: self.checked_mean_std()?,
            skewness: shape(self.checked_skewness())?,
            kurtosis: shape(self.checked_kurtosis())?,
        })
    }
}

fn finite(value: f64, statistic: &'static str) -> Result<f64, MomentsError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MomentsError::NonFinite { statistic })
    }
}

/// Renders `mean +- std`; the spread of fewer than two samples shows as `0`.
impl fmt::Display for MomentAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count < 2 {
            write!(f, "{} +- 0", self.mean())
        } else {
            write!(f, "{} +- {}", self.mean(), self.std())
        }
    }
}

impl Sum for MomentAccumulator {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::empty(), |acc, next| acc.combine(&next))
    }
}

impl<'a> Sum<&'a MomentAccumulator> for MomentAccumulator {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::empty(), |acc, next| acc.combine(next))
    }
}

impl Extend<f64> for MomentAccumulator {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<'a> Extend<&'a f64> for MomentAccumulator {
    fn extend<I: IntoIterator<Item = &'a f64>>(&mut self, iter: I) {
        for &value in iter {
            self.add(value);
        }
    }
}

impl FromIterator<f64> for MomentAccumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = Self::empty();
        acc.extend(iter);
        acc
    }
}

impl Sketch for MomentAccumulator {
    type Item = f64;

    fn update(&mut self, item: &Self::Item) {
        self.add(*item);
    }

    fn merge(&mut self, other: &Self) -> Result<(), MergeError> {
        *self = self.try_combine(other)?;
        Ok(())
    }

    fn clear(&mut self) {
        *self = Self::empty();
    }

    fn size_bytes(&self) -> usize {
        core::mem::size_of::<Self>()
    }

    fn count(&self) -> u64 {
        self.count
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for MomentAccumulator {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_persisted().serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for MomentAccumulator {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let persisted = PersistedMoments::deserialize(deserializer)?;
        Self::from_persisted(persisted).map_err(serde::de::Error::custom)
    }
}
