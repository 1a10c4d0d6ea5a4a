//! CUDA backend
//!
//! Device memory is stream-ordered (`cuMemAllocAsync`/`cuMemFreeAsync`)
//! and clients are cached per device. Kernels are PTX modules compiled by
//! the build script and loaded lazily.

mod cache;
mod client;
mod device;
pub(crate) mod kernels;
mod runtime;

pub use client::{CudaAllocator, CudaClient};
pub use device::CudaDevice;
pub use runtime::CudaRuntime;

/// Check whether a CUDA device can be initialized.
///
/// Returns false when the driver is missing or no device is present,
/// swallowing the panic cudarc raises on an unusable driver.
pub fn is_cuda_available() -> bool {
    std::panic::catch_unwind(|| cudarc::driver::CudaContext::new(0).is_ok()).unwrap_or(false)
}
