//! CPU backend
//!
//! Host-memory runtime with raw-pointer kernels. Always available; also
//! serves as the fallback target for GPU operations without native kernels.

mod client;
mod device;
pub(crate) mod kernels;
mod runtime;

pub use client::{CpuAllocator, CpuClient};
pub use device::CpuDevice;
pub use runtime::CpuRuntime;
