//! Host fallback for GPU operations without native kernels
//!
//! The roundtrip (device -> host -> compute -> device) is slow but keeps
//! the op surface uniform across backends. Only operations that are
//! probe/reference primitives rather than hot paths go through here.

use crate::dispatch_dtype;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::ops::traits::MatmulOps;
use crate::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
use crate::runtime::{Device, Runtime};
use crate::tensor::Tensor;

/// Host device and client bundle for fallback execution
pub struct CpuFallbackContext {
    /// Host device
    pub device: CpuDevice,
    /// Host client
    pub client: CpuClient,
}

impl CpuFallbackContext {
    /// Create a fallback context
    pub fn new() -> Self {
        let device = CpuRuntime::default_device();
        let client = CpuRuntime::default_client(&device);
        Self { device, client }
    }

    /// Copy a GPU tensor to an equivalent host tensor
    pub fn tensor_from_gpu<T: Element, R: Runtime>(
        &self,
        tensor: &Tensor<R>,
    ) -> Result<Tensor<CpuRuntime>> {
        let packed = tensor.contiguous()?;
        let data: Vec<T> = packed.to_vec();
        Tensor::try_from_slice(&data, packed.shape(), &self.device)
    }
}

impl Default for CpuFallbackContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Matrix product via the host backend
pub(crate) fn matmul_fallback<R: Runtime>(
    a: &Tensor<R>,
    b: &Tensor<R>,
    device: &R::Device,
) -> Result<Tensor<R>> {
    if a.dtype() != b.dtype() {
        return Err(Error::DTypeMismatch {
            lhs: a.dtype(),
            rhs: b.dtype(),
        });
    }
    if !a.device().is_same(b.device()) {
        return Err(Error::DeviceMismatch);
    }

    let cpu = CpuFallbackContext::new();
    dispatch_dtype!(a.dtype(), T => {
        let a_cpu = cpu.tensor_from_gpu::<T, R>(a)?;
        let b_cpu = cpu.tensor_from_gpu::<T, R>(b)?;
        let out_cpu = cpu.client.matmul(&a_cpu, &b_cpu)?;
        let data: Vec<T> = out_cpu.to_vec();
        Tensor::<R>::try_from_slice(&data, out_cpu.shape(), device)
    })
}
