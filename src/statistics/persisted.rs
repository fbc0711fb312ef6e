//! Persisted shape of a moment accumulator
//!
//! Accumulators are stored in one of three shapes: nothing (empty), a bare
//! number (a single sample), or a `[count, m1, m2, m3, m4]` sequence. Moments
//! are stored multiplied by [`PERSISTED_SCALE`](super::PERSISTED_SCALE).

use crate::error::DecodeError;
use crate::math;

/// Exclusive upper bound for a count that fits in `u64` (2^64)
const COUNT_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Persisted accumulator state, before validation
///
/// Convert to an accumulator with
/// [`MomentAccumulator::from_persisted`](super::MomentAccumulator::from_persisted).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PersistedMoments {
    /// No samples
    Empty,
    /// One sample, scaled
    Scalar(f64),
    /// `[count, m1, m2, m3, m4]`, moments scaled, count unscaled
    Parts([f64; 5]),
}

impl PersistedMoments {
    /// Read the sequence form
    pub fn from_slice(values: &[f64]) -> Result<Self, DecodeError> {
        let parts: [f64; 5] = values.try_into().map_err(|_| DecodeError::WrongLength {
            expected: 5,
            found: values.len(),
        })?;
        Ok(PersistedMoments::Parts(parts))
    }

    /// Check that the count is a non-negative integer and the moments are finite
    pub fn validate(self) -> Result<Self, DecodeError> {
        match self {
            PersistedMoments::Empty => {}
            PersistedMoments::Scalar(value) => {
                if !value.is_finite() {
                    return Err(DecodeError::NonFiniteMoment { index: 1 });
                }
            }
            PersistedMoments::Parts(parts) => {
                let count = parts[0];
                if !is_valid_count(count) {
                    return Err(DecodeError::InvalidCount(count));
                }
                if let Some(index) = (1..5).find(|&i| !parts[i].is_finite()) {
                    return Err(DecodeError::NonFiniteMoment { index });
                }
            }
        }
        Ok(self)
    }

    /// Truncate every moment toward zero
    ///
    /// Legacy writers stored `int(10 * moment)`; this reproduces their output
    /// from exact values.
    pub fn truncated(self) -> Self {
        match self {
            PersistedMoments::Empty => PersistedMoments::Empty,
            PersistedMoments::Scalar(value) => PersistedMoments::Scalar(math::trunc(value)),
            PersistedMoments::Parts([count, m1, m2, m3, m4]) => PersistedMoments::Parts([
                count,
                math::trunc(m1),
                math::trunc(m2),
                math::trunc(m3),
                math::trunc(m4),
            ]),
        }
    }
}

fn is_valid_count(count: f64) -> bool {
    count.is_finite() && count >= 0.0 && count < COUNT_LIMIT && math::trunc(count) == count
}

#[cfg(feature = "serde")]
impl serde::Serialize for PersistedMoments {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeTuple;
        match *self {
            PersistedMoments::Empty => serializer.serialize_none(),
            PersistedMoments::Scalar(value) => serializer.serialize_f64(value),
            PersistedMoments::Parts([count, m1, m2, m3, m4]) => {
                let mut tuple = serializer.serialize_tuple(5)?;
                if is_valid_count(count) {
                    tuple.serialize_element(&(count as u64))?;
                } else {
                    tuple.serialize_element(&count)?;
                }
                tuple.serialize_element(&m1)?;
                tuple.serialize_element(&m2)?;
                tuple.serialize_element(&m3)?;
                tuple.serialize_element(&m4)?;
                tuple.end()
            }
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for PersistedMoments {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(PersistedVisitor)
    }
}

#[cfg(feature = "serde")]
struct PersistedVisitor;

#[cfg(feature = "serde")]
impl<'de> serde::de::Visitor<'de> for PersistedVisitor {
    type Value = PersistedMoments;

    fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("null, a number, or a sequence [count, m1, m2, m3, m4]")
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(PersistedMoments::Empty)
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(PersistedMoments::Empty)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }

    fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(PersistedMoments::Scalar(value))
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(PersistedMoments::Scalar(value as f64))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(PersistedMoments::Scalar(value as f64))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        use serde::de::Error;

        let mut parts = [0.0; 5];
        for (i, slot) in parts.iter_mut().enumerate() {
            *slot = seq
                .next_element::<f64>()?
                .ok_or_else(|| A::Error::invalid_length(i, &self))?;
        }
        if seq.next_element::<serde::de::IgnoredAny>()?.is_some() {
            return Err(A::Error::invalid_length(6, &self));
        }
        Ok(PersistedMoments::Parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice() {
        assert_eq!(
            PersistedMoments::from_slice(&[3.0, 1.0, 2.0, 3.0, 4.0]),
            Ok(PersistedMoments::Parts([3.0, 1.0, 2.0, 3.0, 4.0]))
        );
        assert_eq!(
            PersistedMoments::from_slice(&[3.0, 1.0]),
            Err(DecodeError::WrongLength {
                expected: 5,
                found: 2
            })
        );
    }

    #[test]
    fn test_validate_count() {
        for bad in [-1.0, 2.5, f64::NAN, f64::INFINITY, 1e20] {
            let result = PersistedMoments::Parts([bad, 0.0, 0.0, 0.0, 0.0]).validate();
            assert!(
                matches!(result, Err(DecodeError::InvalidCount(_))),
                "count {} should be rejected",
                bad
            );
        }

        assert!(PersistedMoments::Parts([0.0, 0.0, 0.0, 0.0, 0.0])
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_moments() {
        assert_eq!(
            PersistedMoments::Parts([4.0, 1.0, 2.0, f64::NAN, 4.0]).validate(),
            Err(DecodeError::NonFiniteMoment { index: 3 })
        );
        assert_eq!(
            PersistedMoments::Scalar(f64::NEG_INFINITY).validate(),
            Err(DecodeError::NonFiniteMoment { index: 1 })
        );
        assert_eq!(
            PersistedMoments::Empty.validate(),
            Ok(PersistedMoments::Empty)
        );
    }

    #[test]
    fn test_truncated() {
        assert_eq!(
            PersistedMoments::Scalar(-12.9).truncated(),
            PersistedMoments::Scalar(-12.0)
        );
        assert_eq!(
            PersistedMoments::Parts([3.0, 30.7, 25.2, -1.5, 99.99]).truncated(),
            PersistedMoments::Parts([3.0, 30.0, 25.0, -1.0, 99.0])
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_shapes() {
        let json = serde_json::to_string(&PersistedMoments::Parts([3.0, 30.0, 20.0, 0.0, 8.0]))
            .unwrap();
        assert_eq!(json, "[3,30.0,20.0,0.0,8.0]");

        assert_eq!(
            serde_json::from_str::<PersistedMoments>("null").unwrap(),
            PersistedMoments::Empty
        );
        assert_eq!(
            serde_json::from_str::<PersistedMoments>("42").unwrap(),
            PersistedMoments::Scalar(42.0)
        );
        assert_eq!(
            serde_json::from_str::<PersistedMoments>("[2, 15, 5, 0, 1]").unwrap(),
            PersistedMoments::Parts([2.0, 15.0, 5.0, 0.0, 1.0])
        );
        assert!(serde_json::from_str::<PersistedMoments>("[2, 15, 5]").is_err());
        assert!(serde_json::from_str::<PersistedMoments>("[2, 15, 5, 0, 1, 9]").is_err());
        assert!(serde_json::from_str::<PersistedMoments>("\"text\"").is_err());
    }
}
