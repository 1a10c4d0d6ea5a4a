//! Error types for spnr operations

use crate::dtype::DType;

/// Result type alias for spnr operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during tensor operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Shape mismatch between tensors
    #[error("shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Invalid dimension index
    #[error("invalid dimension {dim} for tensor with {ndim} dimensions")]
    InvalidDimension {
        /// The offending dimension
        dim: isize,
        /// Number of dimensions in the tensor
        ndim: usize,
    },

    /// Unsupported dtype for an operation
    #[error("unsupported dtype {dtype:?} for operation {op}")]
    UnsupportedDType {
        /// The dtype that is not supported
        dtype: DType,
        /// The operation name
        op: &'static str,
    },

    /// DType mismatch between operands
    #[error("dtype mismatch: {lhs:?} vs {rhs:?}")]
    DTypeMismatch {
        /// Left-hand side dtype
        lhs: DType,
        /// Right-hand side dtype
        rhs: DType,
    },

    /// Operands live on different devices
    #[error("operands are on different devices")]
    DeviceMismatch,

    /// Device memory allocation failed
    #[error("out of memory: failed to allocate {size} bytes")]
    OutOfMemory {
        /// Requested allocation size in bytes
        size: usize,
    },

    /// Index out of bounds
    #[error("index {index} out of bounds for size {size}")]
    IndexOutOfBounds {
        /// The offending index
        index: usize,
        /// The valid size
        size: usize,
    },

    /// Invalid argument value
    #[error("invalid argument {arg}: {reason}")]
    InvalidArgument {
        /// Argument name
        arg: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Operation requires a contiguous tensor
    #[error("tensor is not contiguous")]
    NotContiguous,

    /// Backend-specific error
    #[error("backend error: {0}")]
    Backend(String),

    /// Operation is not supported by a backend in this configuration
    #[error("{backend} backend does not support {operation}: {reason}")]
    BackendLimitation {
        /// Backend name
        backend: &'static str,
        /// Operation name
        operation: &'static str,
        /// Why the configuration is unsupported
        reason: String,
    },

    /// CUDA driver error
    #[cfg(feature = "cuda")]
    #[error("CUDA error: {0}")]
    Cuda(#[from] cudarc::driver::DriverError),

    /// Internal invariant violation
    #[error("internal error: {0}")]
    Internal(String),
}

/// Construct a [`Error::ShapeMismatch`] from shape slices
pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Error {
    Error::ShapeMismatch {
        expected: expected.to_vec(),
        got: got.to_vec(),
    }
}

/// Construct a [`Error::UnsupportedDType`]
pub fn unsupported_dtype(dtype: DType, op: &'static str) -> Error {
    Error::UnsupportedDType { dtype, op }
}

/// Construct a [`Error::BackendLimitation`]
pub fn backend_limitation(
    backend: &'static str,
    operation: &'static str,
    reason: impl Into<String>,
) -> Error {
    Error::BackendLimitation {
        backend,
        operation,
        reason: reason.into(),
    }
}
