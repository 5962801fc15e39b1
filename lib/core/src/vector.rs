use crate::descriptor::Shape;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::Neg;

/// A fixed-length vector of floating point features
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn from_slice(data: &[f32]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    #[inline]
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self {
            data: vec![0.0; dim],
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Sum of all components
    #[inline]
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Euclidean length
    #[inline]
    pub fn norm(&self) -> f32 {
        crate::simd::norm_simd(&self.data)
    }

    /// Dot product, rejecting vectors of different length
    #[inline]
    pub fn dot(&self, other: &Vector) -> Result<f32> {
        self.check_dim(other)?;
        Ok(crate::simd::dot_product_simd(&self.data, &other.data))
    }

    /// Fail with a shape mismatch unless both vectors have the same length
    #[inline]
    pub fn check_dim(&self, other: &Vector) -> Result<()> {
        if self.dim() != other.dim() {
            return Err(Error::shape_mismatch(
                Shape::Flat(self.dim()),
                Shape::Flat(other.dim()),
            ));
        }
        Ok(())
    }

    /// Scale to unit length. The zero vector is left untouched.
    ///
    /// Components are first divided by the largest magnitude so the squared
    /// norm cannot overflow for large finite inputs.
    pub fn normalize(&mut self) {
        let scale = self.data.iter().fold(0.0f32, |m, x| m.max(x.abs()));
        if scale == 0.0 || !scale.is_finite() {
            return;
        }
        for x in &mut self.data {
            *x /= scale;
        }
        let inv_norm = 1.0 / self.norm();
        for x in &mut self.data {
            *x *= inv_norm;
        }
    }

    /// Get normalized copy
    #[inline]
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut v = self.clone();
        v.normalize();
        v
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Vector::new(data)
    }
}

impl Neg for &Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector::new(self.data.iter().map(|x| -x).collect())
    }
}
