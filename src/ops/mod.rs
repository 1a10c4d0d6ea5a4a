//! Tensor operations
//!
//! Operations are defined as traits over a [`Runtime`](crate::runtime::Runtime)
//! and implemented by each backend's client. Shared argument validation
//! lives here so every backend enforces identical contracts.

pub mod dispatch;
pub(crate) mod normalize;
pub(crate) mod reduce;
pub(crate) mod segment;
pub mod traits;

mod cpu;
#[cfg(feature = "cuda")]
mod cuda;

pub use traits::{MatmulOps, NormalizeOps, ReduceOps, SegmentOps};
