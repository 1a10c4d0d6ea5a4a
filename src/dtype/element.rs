//! Element trait linking Rust types to runtime dtypes

use super::DType;
use bytemuck::{Pod, Zeroable};
use std::ops::{Add, Div, Mul, Sub};

/// Types that can be stored as tensor elements
///
/// Implementors are plain-old-data with a known [`DType`] and can bridge
/// through f64 for dtype-generic scalar math.
pub trait Element:
    Copy
    + Clone
    + Send
    + Sync
    + Pod
    + Zeroable
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + PartialOrd
{
    /// The runtime dtype of this element type
    const DTYPE: DType;

    /// Convert to f64 (lossy for large integers)
    fn to_f64(self) -> f64;

    /// Convert from f64 (saturating/truncating for integers)
    fn from_f64(v: f64) -> Self;

    /// Additive identity
    fn zero() -> Self;

    /// Multiplicative identity
    fn one() -> Self;
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;

    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(v: f64) -> Self {
        v
    }

    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(v: f64) -> Self {
        v as f32
    }

    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }
}

impl Element for i64 {
    const DTYPE: DType = DType::I64;

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(v: f64) -> Self {
        v as i64
    }

    fn zero() -> Self {
        0
    }

    fn one() -> Self {
        1
    }
}

impl Element for i32 {
    const DTYPE: DType = DType::I32;

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(v: f64) -> Self {
        v as i32
    }

    fn zero() -> Self {
        0
    }

    fn one() -> Self {
        1
    }
}
