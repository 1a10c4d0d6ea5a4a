//! # spnr
//!
//! **Grouped parameter normalization for probabilistic circuits, with CPU
//! and CUDA backends.**
//!
//! spnr renormalizes the edge parameters of sum-product networks so that
//! every sum-node group holds a probability distribution, with optional
//! pseudocount smoothing, plus the segment/reduction primitives the
//! operation is built from.
//!
//! ## Why spnr?
//!
//! - **Multi-backend**: the same operation traits run on CPU and CUDA
//! - **In-place by contract**: normalization mutates through `&mut`,
//!   never through hidden shared handles
//! - **Zero-safe**: degenerate (all-zero) groups normalize to zeros,
//!   never NaN
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spnr::ops::NormalizeOps;
//! use spnr::prelude::*;
//! use spnr::runtime::Runtime;
//!
//! let device = CpuRuntime::default_device();
//! let client = CpuRuntime::default_client(&device);
//!
//! // Two parameter blocks feeding one sum-node group
//! let mut params = Tensor::<CpuRuntime>::from_slice(&[3.0f32, 1.0, 0.0, 0.0], &[2, 1, 2], &device);
//! let node_ids = Tensor::<CpuRuntime>::from_slice(&[0i64, 0], &[2], &device);
//!
//! client.normalize_parameters(&mut params, &node_ids, 1, 2, None, 1.0)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `cpu` (default): CPU backend
//! - `cuda`: NVIDIA CUDA backend
//! - `rayon` (default): multi-threaded CPU rescale

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod dtype;
pub mod error;
pub mod ops;
pub mod runtime;
pub mod tensor;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dtype::DType;
    pub use crate::error::{Error, Result};
    pub use crate::runtime::{Device, Runtime, RuntimeClient};
    pub use crate::tensor::{Layout, Tensor};

    pub use crate::runtime::cpu::CpuRuntime;

    #[cfg(feature = "cuda")]
    pub use crate::runtime::cuda::CudaRuntime;
}

/// Default runtime based on enabled features
///
/// - With `cuda` feature: `CudaRuntime`
/// - Otherwise: `CpuRuntime`
#[cfg(feature = "cuda")]
pub type DefaultRuntime = runtime::cuda::CudaRuntime;

/// Default runtime based on enabled features
#[cfg(not(feature = "cuda"))]
pub type DefaultRuntime = runtime::cpu::CpuRuntime;
