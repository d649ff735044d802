//! Validated square-sample type shared by the embedding and the evaluators.

use crate::EmbedError;

/// A dense height x width matrix of finite values, row-major.
///
/// Samples are adjacency matrices or image grids; the height doubles as the
/// vertex count when a sample is interpreted as a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    values: Vec<f64>,
    height: usize,
    width: usize,
}

impl Sample {
    /// Create a validated sample from row-major values.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EmbedError::InvalidShape`] | `height * width != values.len()`, or either dimension is zero |
    /// | [`EmbedError::NonFiniteValue`] | any value is NaN or infinite |
    pub fn new(values: Vec<f64>, height: usize, width: usize) -> Result<Self, EmbedError> {
        if height == 0 || width == 0 || height * width != values.len() {
            return Err(EmbedError::InvalidShape {
                height,
                width,
                n_values: values.len(),
            });
        }
        for (i, &v) in values.iter().enumerate() {
            if !v.is_finite() {
                return Err(EmbedError::NonFiniteValue {
                    row: i / width,
                    col: i % width,
                });
            }
        }
        Ok(Self {
            values,
            height,
            width,
        })
    }

    /// Create a validated square sample of the given order.
    ///
    /// # Errors
    ///
    /// Same as [`Sample::new`] with `height = width = order`.
    pub fn square(values: Vec<f64>, order: usize) -> Result<Self, EmbedError> {
        Self::new(values, order, order)
    }

    /// Return the sample height (vertex count for square samples).
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Return the sample width.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Return `true` when height equals width.
    #[must_use]
    pub fn is_square(&self) -> bool {
        self.height == self.width
    }

    /// Return the value at `(row, col)`.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.width + col]
    }

    /// Return the row-major values.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_sample_roundtrip() {
        let s = Sample::square(vec![1.0, 2.0, 3.0, 4.0], 2).unwrap();
        assert_eq!(s.height(), 2);
        assert_eq!(s.width(), 2);
        assert!(s.is_square());
        assert!((s.get(0, 1) - 2.0).abs() < f64::EPSILON);
        assert!((s.get(1, 0) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rectangular_sample_allowed() {
        let s = Sample::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        assert!(!s.is_square());
        assert!((s.get(1, 2) - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn shape_mismatch_rejected() {
        let err = Sample::new(vec![1.0, 2.0, 3.0], 2, 2).unwrap_err();
        assert!(matches!(
            err,
            EmbedError::InvalidShape {
                height: 2,
                width: 2,
                n_values: 3
            }
        ));
    }

    #[test]
    fn zero_dimension_rejected() {
        assert!(Sample::new(vec![], 0, 3).is_err());
        assert!(Sample::new(vec![], 3, 0).is_err());
    }

    #[test]
    fn non_finite_rejected_with_position() {
        let err = Sample::square(vec![1.0, 2.0, f64::NAN, 4.0], 2).unwrap_err();
        assert!(matches!(
            err,
            EmbedError::NonFiniteValue { row: 1, col: 0 }
        ));
    }
}
