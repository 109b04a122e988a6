//! Distance metrics and score transform.
//!
//! Metrics are distances, not similarities: lower means more similar. The
//! [`score`] transform maps a distance onto a bounded similarity for ranking.

use thiserror::Error;

/// Errors that can occur when computing a distance.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DistanceError {
    /// The two input vectors have different dimensionality.
    #[error("dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
}

/// Result type for distance operations.
pub type Result<T> = std::result::Result<T, DistanceError>;

/// A distance metric over embedding vectors.
///
/// Implementations must be symmetric, non-negative, and zero for identical
/// inputs; ranking assumes it. Supplied to
/// [`Memory`](crate::Memory) at construction time.
pub trait Distance: Send + Sync {
    fn distance(&self, x: &[f64], y: &[f64]) -> Result<f64>;
}

/// Stabilizer added under each square root so all-zero vectors do not divide
/// by zero.
const NORM_EPSILON: f64 = 1e-8;

/// Cosine distance: `1 - (x·y) / (|x| * |y|)`, with epsilon-stabilized norms.
///
/// Identical non-zero vectors land near zero (not exactly, due to the
/// stabilizer); orthogonal vectors land near one.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cosine;

impl Distance for Cosine {
    fn distance(&self, x: &[f64], y: &[f64]) -> Result<f64> {
        check_dims(x, y)?;

        let mut xsum = 0.0;
        let mut ysum = 0.0;
        let mut dot = 0.0;
        for (a, b) in x.iter().zip(y) {
            xsum += a * a;
            ysum += b * b;
            dot += a * b;
        }

        let xps = (xsum + NORM_EPSILON).sqrt();
        let yps = (ysum + NORM_EPSILON).sqrt();

        Ok(1.0 - dot / (xps * yps))
    }
}

/// Euclidean (L2) distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl Distance for Euclidean {
    fn distance(&self, x: &[f64], y: &[f64]) -> Result<f64> {
        check_dims(x, y)?;

        let sum: f64 = x.iter().zip(y).map(|(a, b)| (a - b) * (a - b)).sum();
        Ok(sum.sqrt())
    }
}

/// Converts a distance in `[0, ∞)` into a similarity score in `(0, 1]`.
///
/// Monotonically decreasing in distance; a distance of zero scores 1.0.
pub fn score(distance: f64) -> f64 {
    1.0 / (1.0 + distance)
}

fn check_dims(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(DistanceError::DimensionMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_reference_value() {
        let x = [1.0, 2.0, 3.0];
        let y = [4.0, 5.0, 6.0];

        let d = Cosine.distance(&x, &y).unwrap();
        assert!((d - 0.02536815421429417).abs() < 1e-12);
    }

    #[test]
    fn test_euclidean_reference_value() {
        let x = [1.0, 2.0, 3.0];
        let y = [4.0, 5.0, 6.0];

        let d = Euclidean.distance(&x, &y).unwrap();
        assert!((d - 5.196152422706632).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_self_distance_near_zero() {
        let x = [1.0, 2.0, 3.0];
        let d = Cosine.distance(&x, &x).unwrap();
        assert!(d > 0.0);
        assert!(d < 1e-8);
    }

    #[test]
    fn test_cosine_zero_vectors_do_not_divide_by_zero() {
        let x = [0.0, 0.0, 0.0];
        let d = Cosine.distance(&x, &x).unwrap();
        assert!(d.is_finite());
        assert_eq!(d, 1.0);
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let x = [1.0, 2.0];
        let y = [1.0, 2.0, 3.0];

        assert_eq!(
            Cosine.distance(&x, &y),
            Err(DistanceError::DimensionMismatch { left: 2, right: 3 })
        );
        assert_eq!(
            Euclidean.distance(&x, &y),
            Err(DistanceError::DimensionMismatch { left: 2, right: 3 })
        );
    }

    #[test]
    fn test_score_is_bounded_and_decreasing() {
        assert_eq!(score(0.0), 1.0);
        assert!(score(0.5) > score(1.0));
        assert!(score(1000.0) > 0.0);
    }

    #[test]
    fn test_euclidean_identical_vectors() {
        let x = [4.0, 5.0, 6.0];
        assert_eq!(Euclidean.distance(&x, &x).unwrap(), 0.0);
    }
}
